use thiserror::Error;

/// Errors raised while building a maze or configuring a run
///
/// Everything past initialization is infallible except terminal I/O.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("maze has no start position")]
    MissingStart,

    #[error("maze has no goal position")]
    MissingGoal,

    #[error("invalid maze: {reason}")]
    InvalidMaze { reason: String },

    #[error("invalid value for `{name}`: {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_maze(reason: impl Into<String>) -> Self {
        Self::InvalidMaze {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
