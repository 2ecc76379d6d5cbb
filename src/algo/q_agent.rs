use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::VariantArray;

use crate::{
    env::{Action, Pos},
    error::{Error, Result},
    exploration::{Choice, EpsilonGreedy},
    util::check_unit_interval,
};

use super::q_table::QTable;

/// Configuration for the [`QLearningAgent`]
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// Learning rate. At `1.0` every update replaces the old value outright.
    pub alpha: f32,
    /// Discount factor
    pub gamma: f32,
    /// Initial exploration probability
    pub epsilon: f32,
    /// Floor for the exploration probability
    pub min_epsilon: f32,
    /// Factor applied to epsilon each time an episode reaches the goal in training
    pub epsilon_decay: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            gamma: 0.9,
            epsilon: 0.2,
            min_epsilon: 0.01,
            epsilon_decay: 0.995,
        }
    }
}

impl AgentConfig {
    /// **Errors** if any rate is outside `[0,1]` or the epsilon schedule is inconsistent
    pub fn validate(&self) -> Result<()> {
        check_unit_interval!(self.alpha)?;
        check_unit_interval!(self.gamma)?;
        check_unit_interval!(self.epsilon)?;
        check_unit_interval!(self.min_epsilon)?;
        check_unit_interval!(self.epsilon_decay)?;
        if self.epsilon_decay == 0.0 {
            return Err(Error::InvalidParameter {
                name: "epsilon_decay",
                value: 0.0,
                expected: "a value in (0, 1]",
            });
        }
        if self.min_epsilon > self.epsilon {
            return Err(Error::InvalidParameter {
                name: "min_epsilon",
                value: self.min_epsilon as f64,
                expected: "a value no greater than `epsilon`",
            });
        }
        Ok(())
    }

    fn exploration(&self) -> Result<EpsilonGreedy> {
        EpsilonGreedy::new(self.epsilon, self.min_epsilon, self.epsilon_decay)
    }
}

/// A tabular Q-learning agent for the maze
///
/// ### Generics
/// - `R` - The random number source used for exploration. Seed it for reproducible runs.
pub struct QLearningAgent<R: Rng = StdRng> {
    q_table: QTable,
    exploration: EpsilonGreedy,
    config: AgentConfig,
    rng: R,
}

impl QLearningAgent<StdRng> {
    /// Initialize an agent with a seeded generator, or an entropy-seeded one when `seed` is `None`
    pub fn with_seed(config: AgentConfig, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, rng)
    }
}

impl<R: Rng> QLearningAgent<R> {
    /// Initialize a new agent with an empty Q-table
    ///
    /// **Errors** if the configuration does not [validate](AgentConfig::validate)
    pub fn new(config: AgentConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q_table: QTable::new(),
            exploration: config.exploration()?,
            config,
            rng,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon()
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn q_table_mut(&mut self) -> &mut QTable {
        &mut self.q_table
    }

    /// Choose an action for `state`
    ///
    /// Greedy when `exploit_only` is set, otherwise epsilon greedy. Ties go to the lowest-indexed action.
    pub fn choose_action(&mut self, state: Pos, exploit_only: bool) -> Action {
        let choice = if exploit_only {
            Choice::Exploit
        } else {
            self.exploration.choose(&mut self.rng)
        };

        match choice {
            Choice::Exploit => self.q_table.best_action(state),
            Choice::Explore => Action::VARIANTS[self.rng.gen_range(0..Action::VARIANTS.len())],
        }
    }

    /// Q(s,a) <- Q(s,a) + α (r + γ max<sub>a'</sub> Q(s',a') - Q(s,a))
    pub fn update(&mut self, state: Pos, action: Action, reward: f32, next_state: Pos) {
        let max_next_q = self.q_table.max_value(next_state);
        let q_value = self.q_table.get(state, action);
        let target = reward + self.config.gamma * max_next_q;
        // Weighted form so that α = 1 lands exactly on the target
        let new_q_value = (1.0 - self.config.alpha) * q_value + self.config.alpha * target;

        self.q_table.set(state, action, new_q_value);
    }

    pub fn decay_epsilon(&mut self) {
        self.exploration.decay();
    }

    /// Follow the greedy policy from `start` for at most `max_steps` moves
    ///
    /// A move into an invalid cell leaves the agent in place but still uses up a step. The walk ends
    /// early at `goal`.
    ///
    /// **Returns** the positions visited, starting with `start`. Check the last element to see
    /// whether the goal was actually reached.
    pub fn best_rollout(
        &mut self,
        start: Pos,
        goal: Pos,
        is_valid: impl Fn(Pos) -> bool,
        max_steps: u32,
    ) -> Vec<Pos> {
        let mut current = start;
        let mut path = vec![current];
        let mut steps = 0;

        while current != goal && steps < max_steps {
            let next = self.choose_action(current, true).apply(current);
            if is_valid(next) {
                current = next;
                path.push(current);
            }
            steps += 1;
        }

        path
    }
}
