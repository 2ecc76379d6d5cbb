pub mod q_agent;
pub mod q_table;

pub use q_agent::{AgentConfig, QLearningAgent};
pub use q_table::QTable;
