use ratatui::{prelude::*, widgets::*};

use crate::{
    controller::{Episode, Snapshot},
    sim::Hud,
};

/// Run statistics next to the maze
pub struct InfoPanel<'a> {
    snapshot: &'a Snapshot<'a>,
    hud: &'a Hud,
}

impl<'a> InfoPanel<'a> {
    pub fn new(snapshot: &'a Snapshot<'a>, hud: &'a Hud) -> Self {
        Self { snapshot, hud }
    }
}

impl Widget for InfoPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snap = self.snapshot;
        let field = |name: &'static str, value: String| {
            Line::from(vec![Span::from(name).light_cyan().bold(), Span::raw(value)])
        };

        let best = match snap.best_len {
            Some(len) => format!("{len} cells"),
            None => String::from("none yet"),
        };
        let speed = format!(
            "{} ticks/s{}",
            self.hud.tick_rate,
            if self.hud.slow { " (slow)" } else { "" }
        );

        let lines = vec![
            field("Mode        ", snap.mode.to_string()),
            field("Episode     ", snap.episode.to_string()),
            field(
                "Steps       ",
                snap.finished
                    .map_or(snap.steps_in_episode, Episode::steps)
                    .to_string(),
            ),
            field("Total steps ", snap.total_steps.to_string()),
            field("Epsilon     ", format!("{:.3}", snap.epsilon)),
            field("Best path   ", best),
            field("Speed       ", speed),
            Line::default(),
            Line::from("h: help").dark_gray(),
        ];

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .padding(Padding::horizontal(1))
                    .title("Info"),
            )
            .render(area, buf);
    }
}
