use std::time::Duration;

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng};
use strum::Display;

use crate::{
    algo::QLearningAgent,
    env::{GridEnvironment, Pos},
    error::{Error, Result},
    util::unique_count,
};

mod episode;

pub use episode::{BestPath, Episode, EpisodeSummary, Termination};

/// What the controller does on each tick
#[derive(Display, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Epsilon greedy episodes with Q-updates
    #[default]
    Training,
    /// Greedy episodes, no learning
    Demonstration,
    /// Replay a stored path on a loop
    #[strum(to_string = "Best path")]
    BestPathPlayback,
}

/// Configuration for the [`EpisodeController`]
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerConfig {
    /// Episodes end after this many steps without reaching the goal
    pub max_steps_per_episode: u32,
    /// Training episodes to run before switching to demonstration
    pub training_episodes: u32,
    /// Demonstration episodes to run before switching to best path playback
    pub demonstration_episodes: u32,
    /// Step budget for the greedy rollout behind the best path view
    pub rollout_max_steps: u32,
    /// Pause after any episode that reaches the goal
    pub goal_pause: Duration,
    /// Pause at the end of each playback loop
    pub playback_pause: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_steps_per_episode: 1000,
            training_episodes: 500,
            demonstration_episodes: 10,
            rollout_max_steps: 1000,
            goal_pause: Duration::from_millis(500),
            playback_pause: Duration::from_secs(1),
        }
    }
}

impl ControllerConfig {
    /// **Errors** if either step budget is zero
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_steps_per_episode", self.max_steps_per_episode),
            ("rollout_max_steps", self.rollout_max_steps),
        ] {
            if value == 0 {
                return Err(Error::InvalidParameter {
                    name,
                    value: 0.0,
                    expected: "at least one step",
                });
            }
        }
        Ok(())
    }
}

/// A mode switch that happened during a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeChange {
    pub from: Mode,
    pub to: Mode,
}

/// What happened during one [`tick`](EpisodeController::tick)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickOutcome {
    /// Set when the tick ended an episode
    pub finished: Option<EpisodeSummary>,
    /// Set when the episode schedule moved to another mode
    pub mode_change: Option<ModeChange>,
    /// A pause the driver should hold before the next tick
    pub pause: Option<Duration>,
}

/// Result of a best path view request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Playback started on a greedy path of this many positions
    Entered { path_len: usize },
    /// Playback stopped and `resumed` is active again
    Exited { resumed: Mode },
    /// The greedy policy does not reach the goal yet, nothing changed
    NoPathYet,
}

/// Read-only view of the controller for renderers
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub env: &'a GridEnvironment,
    pub mode: Mode,
    pub position: Pos,
    pub path: &'a [Pos],
    pub best_path: &'a [Pos],
    /// Distinct cells on the best path, once there is one
    pub best_len: Option<usize>,
    pub playback: &'a [Pos],
    pub playback_index: usize,
    pub episode: u32,
    /// Episodes the active mode runs before moving on, `None` in playback
    pub episode_budget: Option<u32>,
    pub steps_in_episode: u32,
    pub total_steps: u64,
    pub epsilon: f32,
    /// The episode that ended on this tick, as it stood at its last step. Cleared on the next tick.
    pub finished: Option<&'a Episode>,
}

impl<'a> Snapshot<'a> {
    /// Where the agent should be drawn: the final cell of an episode that just ended, otherwise
    /// the live position
    pub fn shown_position(&self) -> Pos {
        self.finished.map_or(self.position, Episode::pos)
    }

    /// The episode path to draw, following the same rule as [`shown_position`](Self::shown_position)
    pub fn shown_path(&self) -> &'a [Pos] {
        match self.finished {
            Some(episode) => episode.path(),
            None => self.path,
        }
    }
}

/// Drives the agent through the maze one step per tick and sequences training, demonstration and
/// best path playback
///
/// ### Generics
/// - `R` - The agent's random number source
pub struct EpisodeController<R: Rng = StdRng> {
    env: GridEnvironment,
    agent: QLearningAgent<R>,
    config: ControllerConfig,
    mode: Mode,
    /// Mode to restore when leaving playback
    previous_mode: Option<Mode>,
    episode: Episode,
    /// The episode closed by the latest tick, kept until the next one so frontends can show it
    finished: Option<Episode>,
    episode_count: u32,
    total_steps: u64,
    best: Option<BestPath>,
    playback: Vec<Pos>,
    playback_index: usize,
}

impl<R: Rng> EpisodeController<R> {
    /// Start in training mode at the maze entrance
    ///
    /// **Errors** if the configuration does not [validate](ControllerConfig::validate)
    pub fn new(env: GridEnvironment, agent: QLearningAgent<R>, config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        let episode = Episode::fresh(env.start());
        Ok(Self {
            env,
            agent,
            config,
            mode: Mode::Training,
            previous_mode: None,
            episode,
            finished: None,
            episode_count: 1,
            total_steps: 0,
            best: None,
            playback: Vec::new(),
            playback_index: 0,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn env(&self) -> &GridEnvironment {
        &self.env
    }

    pub fn agent(&self) -> &QLearningAgent<R> {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut QLearningAgent<R> {
        &mut self.agent
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    /// Current episode number within the active mode, starting from 1
    pub fn episode_count(&self) -> u32 {
        self.episode_count
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn best_path(&self) -> Option<&BestPath> {
        self.best.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            env: &self.env,
            mode: self.mode,
            position: self.episode.pos,
            path: &self.episode.path,
            best_path: self.best.as_ref().map(BestPath::path).unwrap_or_default(),
            best_len: self.best.as_ref().map(BestPath::len),
            playback: &self.playback,
            playback_index: self.playback_index,
            episode: self.episode_count,
            episode_budget: match self.mode {
                Mode::Training => Some(self.config.training_episodes),
                Mode::Demonstration => Some(self.config.demonstration_episodes),
                Mode::BestPathPlayback => None,
            },
            steps_in_episode: self.episode.steps,
            total_steps: self.total_steps,
            epsilon: self.agent.epsilon(),
            finished: self.finished.as_ref(),
        }
    }

    /// Advance the active mode by one step
    pub fn tick(&mut self) -> TickOutcome {
        self.finished = None;
        match self.mode {
            Mode::BestPathPlayback => self.tick_playback(),
            mode => self.tick_episode(mode),
        }
    }

    /// Restart the current episode from the entrance. Counters are left alone.
    pub fn reset_episode(&mut self) {
        self.episode = Episode::fresh(self.env.start());
        self.finished = None;
    }

    /// Enter or leave best path playback
    ///
    /// Entering replays the agent's current greedy path, and is refused while that path does not
    /// reach the goal. Leaving restores the mode that was active before and restarts the episode.
    pub fn toggle_best_path_view(&mut self) -> ToggleOutcome {
        if self.mode == Mode::BestPathPlayback {
            let resumed = self.previous_mode.take().unwrap_or(Mode::Demonstration);
            info!("Leaving best path view, back to {resumed}");
            self.mode = resumed;
            self.reset_episode();
            return ToggleOutcome::Exited { resumed };
        }

        let env = &self.env;
        let path = self.agent.best_rollout(
            env.start(),
            env.goal(),
            |pos| env.is_valid(pos),
            self.config.rollout_max_steps,
        );

        if path.len() > 1 && path.last() == Some(&env.goal()) {
            info!("Showing current best path ({} positions)", path.len());
            let path_len = path.len();
            self.previous_mode = Some(self.mode);
            self.finished = None;
            self.start_playback(path);
            ToggleOutcome::Entered { path_len }
        } else {
            warn!("No path to the goal has been learned yet");
            ToggleOutcome::NoPathYet
        }
    }

    fn tick_playback(&mut self) -> TickOutcome {
        let Some(&pos) = self.playback.get(self.playback_index) else {
            return TickOutcome::default();
        };

        self.episode.pos = pos;
        self.playback_index += 1;

        let mut outcome = TickOutcome::default();
        if self.playback_index >= self.playback.len() {
            self.playback_index = 0;
            outcome.pause = Some(self.config.playback_pause);
        }
        outcome
    }

    fn tick_episode(&mut self, mode: Mode) -> TickOutcome {
        let training = mode == Mode::Training;
        let state = self.episode.pos;

        let action = self.agent.choose_action(state, !training);
        let (next_state, reward) = self.env.apply(state, action, self.episode.steps);
        if training {
            self.agent.update(state, action, reward, next_state);
        }

        self.episode.advance(next_state);
        self.total_steps += 1;

        let termination = if next_state == self.env.goal() {
            Termination::ReachedGoal
        } else if self.episode.steps >= self.config.max_steps_per_episode {
            Termination::StepLimit
        } else {
            return TickOutcome::default();
        };

        self.finish_episode(mode, termination)
    }

    fn finish_episode(&mut self, mode: Mode, termination: Termination) -> TickOutcome {
        let training = mode == Mode::Training;
        let reached_goal = termination == Termination::ReachedGoal;

        let summary = EpisodeSummary {
            mode,
            episode: self.episode_count,
            steps: self.episode.steps,
            unique_states: unique_count(&self.episode.path),
            termination,
            epsilon: self.agent.epsilon(),
        };

        if reached_goal {
            debug!(
                "{mode} episode {} reached the goal in {} steps",
                summary.episode, summary.steps
            );
        } else {
            debug!("{mode} episode {} hit the step limit", summary.episode);
        }

        if reached_goal && training {
            let improved = self
                .best
                .as_ref()
                .map_or(true, |best| summary.unique_states < best.len());
            if improved {
                let best = BestPath::new(self.episode.path.clone());
                info!("New best path found: {} cells", best.len());
                self.best = Some(best);
            }
        }

        self.episode_count += 1;
        let fresh = Episode::fresh(self.env.start());
        self.finished = Some(std::mem::replace(&mut self.episode, fresh));

        if reached_goal && training {
            self.agent.decay_epsilon();
        }

        TickOutcome {
            finished: Some(summary),
            mode_change: self.follow_schedule(),
            pause: reached_goal.then_some(self.config.goal_pause),
        }
    }

    /// Move on to the next mode once the current one has used up its episode budget
    fn follow_schedule(&mut self) -> Option<ModeChange> {
        let from = self.mode;

        if self.mode == Mode::Training && self.episode_count > self.config.training_episodes {
            self.mode = Mode::Demonstration;
            self.episode_count = 1;
            match &self.best {
                Some(best) => info!("Training finished, best path: {} cells", best.len()),
                None => info!("Training finished without reaching the goal"),
            }
        }

        if self.mode == Mode::Demonstration && self.episode_count > self.config.demonstration_episodes {
            info!("Demonstration finished, showing best path");
            let path = self.best.as_ref().map(|b| b.path().to_vec()).unwrap_or_default();
            if path.is_empty() {
                warn!("No best path was recorded during training");
            }
            self.previous_mode = Some(Mode::Demonstration);
            self.episode_count = 1;
            self.start_playback(path);
        }

        (self.mode != from).then_some(ModeChange { from, to: self.mode })
    }

    fn start_playback(&mut self, path: Vec<Pos>) {
        self.mode = Mode::BestPathPlayback;
        self.playback = path;
        self.playback_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{
        algo::AgentConfig,
        env::Action,
        maze::TextMaze,
    };

    fn controller(map: &str, agent: AgentConfig, config: ControllerConfig) -> EpisodeController {
        let maze: TextMaze = map.parse().unwrap();
        let env = GridEnvironment::from_source(&maze).unwrap();
        let agent = QLearningAgent::new(agent, StdRng::seed_from_u64(3)).unwrap();
        EpisodeController::new(env, agent, config).unwrap()
    }

    fn corridor() -> EpisodeController {
        controller("S..G", AgentConfig::default(), ControllerConfig::default())
    }

    /// Tick until an episode ends
    fn run_episode<R: Rng>(ctl: &mut EpisodeController<R>) -> TickOutcome {
        for _ in 0..100_000 {
            let outcome = ctl.tick();
            if outcome.finished.is_some() {
                return outcome;
            }
        }
        panic!("episode never finished");
    }

    fn prime_corridor<R: Rng>(ctl: &mut EpisodeController<R>) {
        for x in 0..3 {
            ctl.agent_mut().q_table_mut().set((x, 0), Action::Right, 1.0);
        }
    }

    #[test]
    fn config_validation() {
        assert!(ControllerConfig::default().validate().is_ok());
        assert!(ControllerConfig {
            max_steps_per_episode: 0,
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn mode_labels() {
        assert_eq!(Mode::Training.to_string(), "Training");
        assert_eq!(Mode::BestPathPlayback.to_string(), "Best path");
    }

    #[test]
    fn starts_fresh() {
        let ctl = corridor();
        let snap = ctl.snapshot();
        assert_eq!(snap.mode, Mode::Training);
        assert_eq!(snap.position, (0, 0));
        assert_eq!(snap.path, &[(0, 0)]);
        assert_eq!(snap.episode, 1);
        assert_eq!(snap.best_len, None);
        assert!(snap.best_path.is_empty());
    }

    #[test]
    fn termination_resets_episode() {
        let mut ctl = controller(
            "S..G",
            AgentConfig::default(),
            ControllerConfig {
                max_steps_per_episode: 5,
                ..Default::default()
            },
        );
        for _ in 0..10 {
            let outcome = run_episode(&mut ctl);
            assert!(outcome.finished.is_some());
            let snap = ctl.snapshot();
            assert_eq!(snap.position, (0, 0));
            assert_eq!(snap.path, &[(0, 0)]);
            assert_eq!(snap.steps_in_episode, 0);
        }
        assert_eq!(ctl.episode_count(), 11);
    }

    #[test]
    fn finished_episode_stays_visible_for_one_tick() {
        let mut ctl = controller("S..G", AgentConfig::default(), ControllerConfig::default());
        prime_corridor(&mut ctl);

        let outcome = run_episode(&mut ctl);
        assert!(outcome.finished.unwrap().reached_goal());

        let snap = ctl.snapshot();
        assert_eq!(snap.position, (0, 0), "Live episode already restarted");
        assert_eq!(snap.path, &[(0, 0)]);
        assert_eq!(snap.shown_position(), (3, 0));
        assert_eq!(snap.shown_path().last(), Some(&(3, 0)));

        ctl.tick();
        let snap = ctl.snapshot();
        assert!(snap.finished.is_none());
        assert_eq!(snap.shown_position(), snap.position);
        assert!(snap.path.len() <= 2, "Next step starts from the entrance");
    }

    #[test]
    fn step_limit_keeps_epsilon() {
        // Goal is walled off
        let mut ctl = controller(
            "S#G",
            AgentConfig::default(),
            ControllerConfig {
                max_steps_per_episode: 20,
                ..Default::default()
            },
        );
        for _ in 0..20 {
            let outcome = run_episode(&mut ctl);
            let summary = outcome.finished.unwrap();
            assert_eq!(summary.termination, Termination::StepLimit);
            assert_eq!(summary.steps, 20);
            assert_eq!(outcome.pause, None);
        }
        assert_eq!(ctl.agent().epsilon(), 0.2);
        assert!(ctl.best_path().is_none());
    }

    #[test]
    fn goal_decays_epsilon() {
        let mut ctl = controller(
            "SG",
            AgentConfig {
                epsilon: 0.5,
                min_epsilon: 0.01,
                epsilon_decay: 0.5,
                ..Default::default()
            },
            ControllerConfig::default(),
        );
        let outcome = run_episode(&mut ctl);
        assert!(outcome.finished.unwrap().reached_goal());
        assert_eq!(outcome.pause, Some(Duration::from_millis(500)));
        assert_eq!(ctl.agent().epsilon(), 0.25);
    }

    #[test]
    fn demonstration_does_not_learn_or_decay() {
        // Purely greedy training keeps the primed moves on top
        let mut ctl = controller(
            "S..G",
            AgentConfig {
                epsilon: 0.0,
                min_epsilon: 0.0,
                ..Default::default()
            },
            ControllerConfig {
                training_episodes: 0,
                demonstration_episodes: 100,
                ..Default::default()
            },
        );
        prime_corridor(&mut ctl);
        let outcome = run_episode(&mut ctl);
        assert_eq!(
            outcome.mode_change,
            Some(ModeChange {
                from: Mode::Training,
                to: Mode::Demonstration
            })
        );
        let epsilon = ctl.agent().epsilon();
        let rows = ctl.agent().q_table().peek((0, 0)).copied();

        let outcome = run_episode(&mut ctl);
        let summary = outcome.finished.unwrap();
        assert_eq!(summary.mode, Mode::Demonstration);
        assert_eq!(summary.steps, 3);
        assert!(summary.reached_goal());
        assert_eq!(ctl.agent().epsilon(), epsilon);
        assert_eq!(ctl.agent().q_table().peek((0, 0)).copied(), rows);
    }

    #[test]
    fn schedule_runs_without_commands() {
        let (n, m) = (4, 3);
        let mut ctl = controller(
            "S..G",
            AgentConfig::default(),
            ControllerConfig {
                max_steps_per_episode: 50,
                training_episodes: n,
                demonstration_episodes: m,
                ..Default::default()
            },
        );

        for i in 1..=n {
            assert_eq!(ctl.mode(), Mode::Training);
            let outcome = run_episode(&mut ctl);
            assert_eq!(outcome.finished.unwrap().episode, i);
            if i < n {
                assert_eq!(outcome.mode_change, None);
            }
        }
        assert_eq!(ctl.mode(), Mode::Demonstration);
        assert_eq!(ctl.episode_count(), 1);

        for i in 1..=m {
            assert_eq!(ctl.mode(), Mode::Demonstration);
            let outcome = run_episode(&mut ctl);
            assert_eq!(outcome.finished.unwrap().mode, Mode::Demonstration);
            if i == m {
                assert_eq!(
                    outcome.mode_change,
                    Some(ModeChange {
                        from: Mode::Demonstration,
                        to: Mode::BestPathPlayback
                    })
                );
            }
        }
        assert_eq!(ctl.mode(), Mode::BestPathPlayback);
        assert_eq!(ctl.snapshot().playback_index, 0);
        assert_eq!(ctl.snapshot().playback, ctl.snapshot().best_path);
    }

    #[test]
    fn best_path_only_improves() {
        let mut ctl = controller(
            "S..G\n....",
            AgentConfig::default(),
            ControllerConfig {
                training_episodes: 1000,
                ..Default::default()
            },
        );
        let mut last = usize::MAX;
        for _ in 0..100 {
            run_episode(&mut ctl);
            if let Some(best) = ctl.best_path() {
                assert!(best.len() <= last);
                assert!(best.len() >= 4);
                assert_eq!(best.path().first(), Some(&(0, 0)));
                assert_eq!(best.path().last(), Some(&(3, 0)));
                last = best.len();
            }
        }
        assert!(ctl.best_path().is_some());
    }

    #[test]
    fn toggle_refused_without_path() {
        let mut ctl = corridor();
        assert_eq!(ctl.toggle_best_path_view(), ToggleOutcome::NoPathYet);
        assert_eq!(ctl.mode(), Mode::Training);
    }

    #[test]
    fn toggle_round_trip() {
        let mut ctl = corridor();
        prime_corridor(&mut ctl);
        ctl.tick();

        assert_eq!(
            ctl.toggle_best_path_view(),
            ToggleOutcome::Entered { path_len: 4 }
        );
        assert_eq!(ctl.mode(), Mode::BestPathPlayback);

        for expected in [(0, 0), (1, 0), (2, 0)] {
            let outcome = ctl.tick();
            assert_eq!(ctl.snapshot().position, expected);
            assert_eq!(outcome.pause, None);
        }
        let outcome = ctl.tick();
        assert_eq!(ctl.snapshot().position, (3, 0));
        assert_eq!(outcome.pause, Some(Duration::from_secs(1)));
        assert_eq!(ctl.snapshot().playback_index, 0);
        ctl.tick();
        assert_eq!(ctl.snapshot().position, (0, 0), "Playback loops");

        let total = ctl.total_steps();
        assert_eq!(
            ctl.toggle_best_path_view(),
            ToggleOutcome::Exited {
                resumed: Mode::Training
            }
        );
        let snap = ctl.snapshot();
        assert_eq!(snap.mode, Mode::Training);
        assert_eq!(snap.path, &[(0, 0)]);
        assert_eq!(snap.steps_in_episode, 0);
        assert_eq!(snap.total_steps, total, "Playback does not count as steps");
    }

    #[test]
    fn empty_playback_is_idle() {
        // Goal is unreachable so training never records a path
        let mut ctl = controller(
            "S#G",
            AgentConfig::default(),
            ControllerConfig {
                max_steps_per_episode: 5,
                training_episodes: 1,
                demonstration_episodes: 1,
                ..Default::default()
            },
        );
        run_episode(&mut ctl);
        run_episode(&mut ctl);
        assert_eq!(ctl.mode(), Mode::BestPathPlayback);
        assert_eq!(ctl.tick(), TickOutcome::default());

        assert_eq!(
            ctl.toggle_best_path_view(),
            ToggleOutcome::Exited {
                resumed: Mode::Demonstration
            }
        );
    }
}
