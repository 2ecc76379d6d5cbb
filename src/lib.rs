/// Tabular Q-learning: the value table and the agent
pub mod algo;

/// The episode state machine that sequences training, demonstration and playback
pub mod controller;

/// The maze world, its moves and rewards
pub mod env;

/// Crate error type
pub mod error;

/// Exploration policies
pub mod exploration;

/// Maze sources
pub mod maze;

/// The tick driver and its collaborators
pub mod sim;

/// Terminal visualization
#[cfg(feature = "viz")]
pub mod viz;

mod util;

pub use error::{Error, Result};
