use std::collections::HashMap;

use strum::VariantArray;

use crate::env::{Action, Pos};

/// Sparse table of action values, one row of [`Action::COUNT`] entries per visited state
///
/// Rows are created on first reference, all zero, and never evicted.
#[derive(Clone, Debug, Default)]
pub struct QTable {
    rows: HashMap<Pos, [f32; Action::COUNT]>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value row for `state`, materializing a zero row if the state is new
    pub fn row(&mut self, state: Pos) -> &mut [f32; Action::COUNT] {
        self.rows.entry(state).or_insert([0.0; Action::COUNT])
    }

    /// The value row for `state` without materializing it
    pub fn peek(&self, state: Pos) -> Option<&[f32; Action::COUNT]> {
        self.rows.get(&state)
    }

    pub fn get(&mut self, state: Pos, action: Action) -> f32 {
        self.row(state)[action.index()]
    }

    pub fn set(&mut self, state: Pos, action: Action, value: f32) {
        debug_assert!(value.is_finite(), "Q-values must stay finite");
        self.row(state)[action.index()] = value;
    }

    /// `max_a Q(state, a)`
    pub fn max_value(&mut self, state: Pos) -> f32 {
        self.row(state).iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// The greedy action for `state`, the lowest-indexed one if several share the maximum
    pub fn best_action(&mut self, state: Pos) -> Action {
        let row = self.row(state);
        let mut best = 0;
        for (i, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = i;
            }
        }
        Action::VARIANTS[best]
    }

    /// Number of materialized states
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
