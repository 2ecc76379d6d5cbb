use crate::{
    env::Pos,
    error::{Error, Result},
};

use super::{Cell, CellGrid, MazeSource};

pub type Rgb = [u8; 3];

impl Cell {
    /// Classify a pixel: yellow is the start, red the goal, near-black a wall, anything else free
    pub fn from_rgb([r, g, b]: Rgb) -> Self {
        if r > 200 && g > 200 && b < 100 {
            Cell::Start
        } else if r > 200 && g < 100 && b < 100 {
            Cell::Goal
        } else if r < 50 && g < 50 && b < 50 {
            Cell::Wall
        } else {
            Cell::Free
        }
    }
}

/// A maze decoded from a bitmap where every pixel is one cell
///
/// The decoding works on raw RGB triples, so any image library can feed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelMaze {
    grid: CellGrid,
}

impl PixelMaze {
    /// Decode a row-major RGB buffer of `width * height` pixels
    ///
    /// If several pixels are coloured as the start (or goal), the last one in scan order wins.
    ///
    /// **Errors** if the buffer length doesn't match the dimensions
    pub fn from_rgb(width: u32, height: u32, pixels: &[Rgb]) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::invalid_maze(format!(
                "expected {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }

        let mut start = None;
        let mut goal = None;
        let cells = pixels
            .iter()
            .enumerate()
            .map(|(i, &px)| {
                let pos = ((i % width as usize) as i32, (i / width as usize) as i32);
                let cell = Cell::from_rgb(px);
                match cell {
                    Cell::Start => start = Some(pos),
                    Cell::Goal => goal = Some(pos),
                    _ => {}
                }
                cell
            })
            .collect();

        Ok(Self {
            grid: CellGrid {
                width,
                height,
                cells,
                start,
                goal,
            },
        })
    }
}

impl MazeSource for PixelMaze {
    fn dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }

    fn start(&self) -> Option<Pos> {
        self.grid.start()
    }

    fn goal(&self) -> Option<Pos> {
        self.grid.goal()
    }

    fn is_wall(&self, pos: Pos) -> bool {
        self.grid.is_wall(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YELLOW: Rgb = [255, 255, 0];
    const RED: Rgb = [255, 0, 0];
    const BLACK: Rgb = [0, 0, 0];
    const WHITE: Rgb = [255, 255, 255];

    #[test]
    fn classify_pixels() {
        assert_eq!(Cell::from_rgb(YELLOW), Cell::Start);
        assert_eq!(Cell::from_rgb(RED), Cell::Goal);
        assert_eq!(Cell::from_rgb(BLACK), Cell::Wall);
        assert_eq!(Cell::from_rgb([40, 40, 40]), Cell::Wall);
        assert_eq!(Cell::from_rgb(WHITE), Cell::Free);
        assert_eq!(Cell::from_rgb([128, 128, 128]), Cell::Free);
        assert_eq!(Cell::from_rgb([201, 99, 0]), Cell::Goal);
    }

    #[test]
    fn decode_bitmap() {
        #[rustfmt::skip]
        let pixels = [
            YELLOW, WHITE, BLACK,
            BLACK,  WHITE, RED,
        ];
        let maze = PixelMaze::from_rgb(3, 2, &pixels).unwrap();
        assert_eq!(maze.dimensions(), (3, 2));
        assert_eq!(maze.start(), Some((0, 0)));
        assert_eq!(maze.goal(), Some((2, 1)));
        assert!(maze.is_wall((2, 0)));
        assert!(maze.is_wall((0, 1)));
        assert!(!maze.is_wall((1, 1)));
    }

    #[test]
    fn last_marker_wins() {
        let maze = PixelMaze::from_rgb(2, 2, &[YELLOW, RED, YELLOW, RED]).unwrap();
        assert_eq!(maze.start(), Some((0, 1)));
        assert_eq!(maze.goal(), Some((1, 1)));
    }

    #[test]
    fn size_mismatch() {
        assert!(PixelMaze::from_rgb(2, 2, &[WHITE; 3]).is_err());
    }
}
