use std::collections::HashSet;

use ratatui::{prelude::*, widgets::*};

use crate::{
    controller::{Mode, Snapshot},
    env::Pos,
};

/// The maze with the agent, drawn two terminal columns per cell
pub struct MazeGrid<'a> {
    snapshot: &'a Snapshot<'a>,
}

impl<'a> MazeGrid<'a> {
    pub fn new(snapshot: &'a Snapshot<'a>) -> Self {
        Self { snapshot }
    }

    fn cell(&self, pos: Pos, trail: &HashSet<Pos>, ahead: &HashSet<Pos>) -> Span<'static> {
        let snap = self.snapshot;
        let env = snap.env;

        if pos == snap.shown_position() {
            Span::from("@@").light_yellow().bold()
        } else if pos == env.goal() {
            Span::from("GG").black().on_light_red()
        } else if pos == env.start() {
            Span::from("SS").black().on_yellow()
        } else if env.is_wall(pos) {
            Span::from("██").gray()
        } else if trail.contains(&pos) {
            Span::from("::").light_green()
        } else if ahead.contains(&pos) {
            Span::from("··").green()
        } else {
            Span::from("  ")
        }
    }
}

impl Widget for MazeGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snap = self.snapshot;

        let (trail, ahead): (HashSet<Pos>, HashSet<Pos>) = match snap.mode {
            Mode::Training => Default::default(),
            Mode::Demonstration => (snap.shown_path().iter().copied().collect(), HashSet::new()),
            Mode::BestPathPlayback => {
                let (played, remaining) = snap.playback.split_at(snap.playback_index);
                (
                    played.iter().copied().collect(),
                    remaining.iter().copied().collect(),
                )
            }
        };

        let lines = (0..snap.env.height() as i32)
            .map(|y| {
                (0..snap.env.width() as i32)
                    .map(|x| self.cell((x, y), &trail, &ahead))
                    .collect::<Vec<_>>()
                    .into()
            })
            .collect::<Vec<Line>>();

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Maze"),
            )
            .render(area, buf);
    }
}
