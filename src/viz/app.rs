use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event, KeyCode};
use ratatui::{prelude::*, widgets::*};

use super::{
    components::{help::render_help, Component, InfoPanel, Logs, MazeGrid},
    tui::{self, Tui},
    util::{command_for, event_keycode},
};
use crate::{
    controller::Snapshot,
    error::Result,
    sim::{Clock, Command, Flow, Hud, InputSource, Renderer},
};

/// Redraw at most this often, however fast the simulation ticks
const MIN_DRAW_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Maze,
    Logs,
}

impl Tab {
    const TITLES: [&'static str; 2] = ["Maze", "Logs"];

    fn next(self) -> Self {
        match self {
            Tab::Maze => Tab::Logs,
            Tab::Logs => Tab::Maze,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// The terminal frontend: draws the maze, reads the keyboard and paces ticks
///
/// Restores the terminal when dropped.
pub struct App {
    terminal: Tui,
    tab: Tab,
    show_help: bool,
    logs: Logs,
    commands: VecDeque<Command>,
    frame_start: Instant,
    last_draw: Option<Instant>,
}

impl App {
    /// Take over the terminal
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: tui::init()?,
            tab: Tab::default(),
            show_help: false,
            logs: Logs::new(),
            commands: VecDeque::new(),
            frame_start: Instant::now(),
            last_draw: None,
        })
    }

    /// Route a terminal event to the UI or queue it as a simulation command
    fn handle_event(&mut self, event: Event) {
        let Some(key) = event_keycode(&event) else {
            return;
        };

        match key {
            KeyCode::Tab => {
                self.tab = self.tab.next();
                return;
            }
            KeyCode::Char('h') => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        if self.tab == Tab::Logs && self.logs.handle_ui_event(&event) {
            return;
        }

        if let Some(command) = command_for(key) {
            self.commands.push_back(command);
        }
    }

    /// Drain terminal events for up to `timeout`, stopping early on quit
    fn pump_events(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(());
            }
            let event = event::read()?;
            self.handle_event(event);
            if self.commands.contains(&Command::Quit) || remaining.is_zero() {
                return Ok(());
            }
        }
    }

    fn draw(&mut self, snapshot: &Snapshot<'_>, hud: &Hud) -> Result<()> {
        let screen = Screen {
            snapshot,
            hud,
            tab: self.tab,
            show_help: self.show_help,
            logs: &self.logs,
        };
        self.terminal
            .draw(|frame| frame.render_widget(screen, frame.size()))?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = tui::restore();
    }
}

impl InputSource for App {
    fn poll(&mut self) -> Result<Option<Command>> {
        if self.commands.is_empty() {
            self.pump_events(Duration::ZERO)?;
        }
        Ok(self.commands.pop_front())
    }
}

impl Renderer for App {
    fn render(&mut self, snapshot: &Snapshot<'_>, hud: &Hud) -> Result<()> {
        let due = self
            .last_draw
            .map_or(true, |t| t.elapsed() >= MIN_DRAW_INTERVAL);
        if due {
            self.draw(snapshot, hud)?;
            self.last_draw = Some(Instant::now());
        }
        Ok(())
    }
}

impl Clock for App {
    fn wait_frame(&mut self, rate_hz: u32) -> Result<()> {
        let frame = Duration::from_secs(1) / rate_hz.max(1);
        let elapsed = self.frame_start.elapsed();
        if elapsed < frame {
            self.pump_events(frame - elapsed)?;
        }
        self.frame_start = Instant::now();
        Ok(())
    }

    fn pause(&mut self, duration: Duration) -> Result<Flow> {
        let deadline = Instant::now() + duration;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            if remaining.is_zero() {
                break;
            }
            self.pump_events(remaining)?;
            if self.commands.contains(&Command::Quit) {
                return Ok(Flow::Quit);
            }
        }
        self.frame_start = Instant::now();
        Ok(Flow::Continue)
    }
}

/// One full frame
struct Screen<'a> {
    snapshot: &'a Snapshot<'a>,
    hud: &'a Hud,
    tab: Tab,
    show_help: bool,
    logs: &'a Logs,
}

impl Widget for Screen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Layout
        let [menu_area, main_area, progress_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        // Menu
        Tabs::new(Tab::TITLES)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.tab.index())
            .render(menu_area, buf);

        // Main
        match self.tab {
            Tab::Maze => {
                let maze_width = self.snapshot.env.width() as u16 * 2 + 2;
                let [maze_area, info_area] =
                    Layout::horizontal([Constraint::Length(maze_width), Constraint::Fill(1)])
                        .areas(main_area);
                MazeGrid::new(self.snapshot).render(maze_area, buf);
                InfoPanel::new(self.snapshot, self.hud).render(info_area, buf);
            }
            Tab::Logs => self.logs.render_ref(main_area, buf),
        }

        // Progress through the active mode's episodes
        let (ratio, label) = match self.snapshot.episode_budget {
            Some(budget) if budget > 0 => {
                let done = self.snapshot.episode.saturating_sub(1).min(budget);
                (
                    done as f64 / budget as f64,
                    format!("{} {done}/{budget}", self.snapshot.mode),
                )
            }
            _ => (1.0, self.snapshot.mode.to_string()),
        };
        Gauge::default()
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Progress"),
            )
            .gauge_style(Color::Cyan)
            .ratio(ratio)
            .label(label)
            .render(progress_area, buf);

        if self.show_help {
            render_help(area, buf, self.tab);
        }
    }
}
