use crate::{env::Pos, util::unique_count};

use super::Mode;

/// The attempt in progress: where the agent is, where it has been, and how long it has taken
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Episode {
    pub(super) pos: Pos,
    pub(super) path: Vec<Pos>,
    pub(super) steps: u32,
}

impl Episode {
    pub(super) fn fresh(start: Pos) -> Self {
        Self {
            pos: start,
            path: vec![start],
            steps: 0,
        }
    }

    /// Move to `next`, recording it unless the agent stayed in place
    pub(super) fn advance(&mut self, next: Pos) {
        self.pos = next;
        self.steps += 1;
        if self.path.last() != Some(&next) {
            self.path.push(next);
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn path(&self) -> &[Pos] {
        &self.path
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

/// The shortest route found in training, measured in distinct cells
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BestPath {
    path: Vec<Pos>,
    len: usize,
}

impl BestPath {
    pub(super) fn new(path: Vec<Pos>) -> Self {
        let len = unique_count(&path);
        Self { path, len }
    }

    /// The full ordered path, revisits included
    pub fn path(&self) -> &[Pos] {
        &self.path
    }

    /// Number of distinct cells on the path
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// How an episode ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    ReachedGoal,
    StepLimit,
}

/// Statistics for one finished episode
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub mode: Mode,
    /// Episode number within the mode, starting from 1
    pub episode: u32,
    pub steps: u32,
    /// Distinct cells visited
    pub unique_states: usize,
    pub termination: Termination,
    /// Exploration rate in effect during the episode
    pub epsilon: f32,
}

impl EpisodeSummary {
    pub fn reached_goal(&self) -> bool {
        self.termination == Termination::ReachedGoal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_skips_repeated_tail() {
        let mut episode = Episode::fresh((0, 0));
        episode.advance((0, 0));
        episode.advance((1, 0));
        episode.advance((1, 0));
        episode.advance((0, 0));
        assert_eq!(episode.path(), &[(0, 0), (1, 0), (0, 0)]);
        assert_eq!(episode.steps(), 4);
        assert_eq!(episode.pos(), (0, 0));
    }

    #[test]
    fn best_path_counts_distinct_cells() {
        let best = BestPath::new(vec![(0, 0), (1, 0), (0, 0), (1, 0), (2, 0)]);
        assert_eq!(best.len(), 3);
        assert_eq!(best.path().len(), 5, "Revisits are kept");
    }
}
