mod pixels;
mod text;

pub use pixels::PixelMaze;
pub use text::TextMaze;

use crate::env::Pos;

/// Classification of a single maze cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Free,
    Wall,
    Start,
    Goal,
}

/// Anything that can describe a maze's topology
///
/// The learning core only ever sees a maze through this trait, so the concrete format
/// (a text map, a bitmap, a generator) stays an adapter concern.
pub trait MazeSource {
    /// `(width, height)` in cells
    fn dimensions(&self) -> (u32, u32);

    /// The cell episodes begin in, if the maze defines one
    fn start(&self) -> Option<Pos>;

    /// The cell episodes end in, if the maze defines one
    fn goal(&self) -> Option<Pos>;

    fn is_wall(&self, pos: Pos) -> bool;
}

/// A dense row-major grid of [`Cell`]s shared by the concrete maze sources
#[derive(Clone, Debug, PartialEq, Eq)]
struct CellGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    start: Option<Pos>,
    goal: Option<Pos>,
}

impl CellGrid {
    fn get(&self, pos: Pos) -> Option<Cell> {
        if pos.0 < 0 || pos.1 < 0 || pos.0 as u32 >= self.width || pos.1 as u32 >= self.height {
            return None;
        }
        self.cells
            .get(pos.1 as usize * self.width as usize + pos.0 as usize)
            .copied()
    }
}

impl MazeSource for CellGrid {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn start(&self) -> Option<Pos> {
        self.start
    }

    fn goal(&self) -> Option<Pos> {
        self.goal
    }

    fn is_wall(&self, pos: Pos) -> bool {
        self.get(pos) == Some(Cell::Wall)
    }
}
