pub mod help;
pub mod info;
pub mod log;
pub mod maze;

use crossterm::event::Event;
pub use info::InfoPanel;
pub use log::Logs;
pub use maze::MazeGrid;
use ratatui::widgets::WidgetRef;

pub trait Component: WidgetRef {
    /// **Returns** whether the event was consumed
    fn handle_ui_event(&mut self, event: &Event) -> bool;
}
