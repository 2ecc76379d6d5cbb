//! A ratatui frontend for the maze: the grid, run statistics, captured logs and a help popup
//!
//! ```ignore
//! tui_logger::init_logger(log::LevelFilter::Debug)?;
//! let mut sim = SimConfig::default().build(&TextMaze::demo())?;
//! let mut app = viz::App::new()?;
//! sim.run(&mut app)?;
//! ```

mod app;
mod components;
pub mod tui;
mod util;

pub use app::App;
