use strum::{EnumIter, FromRepr, VariantArray};

use crate::{
    error::{Error, Result},
    maze::MazeSource,
};

/// A cell coordinate `(x, y)` with `(0, 0)` at the top left
pub type Pos = (i32, i32);

/// The four moves available in every cell
///
/// The declaration order is the action index used by the Q-table.
#[derive(EnumIter, VariantArray, FromRepr, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    pub const COUNT: usize = 4;

    /// Unit displacement `(dx, dy)` of the move
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Position reached by taking this action from `pos`, ignoring walls
    pub fn apply(self, pos: Pos) -> Pos {
        let (dx, dy) = self.delta();
        (pos.0 + dx, pos.1 + dy)
    }
}

/// Reward for reaching the goal before the length bonus
pub const GOAL_REWARD: f32 = 100.0;
/// Numerator of the length bonus, `GOAL_BONUS / steps`
pub const GOAL_BONUS: f32 = 1000.0;
pub const COLLISION_REWARD: f32 = -10.0;
pub const STEP_REWARD: f32 = -0.1;

/// The maze world: bounds, walls, start, goal and the reward function
///
/// Holds no agent state, so it can be shared by training, demonstration and greedy rollouts alike.
#[derive(Debug, Clone)]
pub struct GridEnvironment {
    width: u32,
    height: u32,
    walls: Vec<bool>,
    start: Pos,
    goal: Pos,
}

impl GridEnvironment {
    /// Build the environment from a maze source
    ///
    /// **Errors** if the source has no start or no goal, or if either lies outside the free cells
    pub fn from_source<M: MazeSource + ?Sized>(source: &M) -> Result<Self> {
        let start = source.start().ok_or(Error::MissingStart)?;
        let goal = source.goal().ok_or(Error::MissingGoal)?;
        let (width, height) = source.dimensions();

        let mut walls = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                walls.push(source.is_wall((x, y)));
            }
        }

        let env = Self {
            width,
            height,
            walls,
            start,
            goal,
        };

        if !env.is_valid(start) {
            return Err(Error::invalid_maze(format!(
                "start {start:?} is not a free cell"
            )));
        }
        if !env.is_valid(goal) {
            return Err(Error::invalid_maze(format!(
                "goal {goal:?} is not a free cell"
            )));
        }

        Ok(env)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    fn in_bounds(&self, pos: Pos) -> bool {
        pos.0 >= 0 && pos.1 >= 0 && (pos.0 as u32) < self.width && (pos.1 as u32) < self.height
    }

    /// Is there a wall at `pos`? Cells outside the grid are not walls, just invalid.
    pub fn is_wall(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.walls[pos.1 as usize * self.width as usize + pos.0 as usize]
    }

    /// Can the agent stand on `pos`?
    pub fn is_valid(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && !self.is_wall(pos)
    }

    /// Reward for arriving at (or bumping into) `pos` after `steps_taken` steps of the episode
    ///
    /// Shorter episodes earn a larger goal bonus. Every other move costs a little, collisions cost a lot.
    pub fn reward(&self, pos: Pos, steps_taken: u32) -> f32 {
        if pos == self.goal {
            GOAL_REWARD + GOAL_BONUS / steps_taken.max(1) as f32
        } else if !self.is_valid(pos) {
            COLLISION_REWARD
        } else {
            STEP_REWARD
        }
    }

    /// Take `action` from `pos`
    ///
    /// **Returns** `(next_pos, reward)`. A move into a wall or off the grid leaves the agent where it was
    /// and is charged the collision penalty.
    pub fn apply(&self, pos: Pos, action: Action, steps_taken: u32) -> (Pos, f32) {
        let proposed = action.apply(pos);
        let reward = self.reward(proposed, steps_taken);
        let next = if self.is_valid(proposed) {
            proposed
        } else {
            pos
        };
        (next, reward)
    }
}
