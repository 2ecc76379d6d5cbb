use std::{fmt, fs, path::Path, str::FromStr};

use crate::{
    env::Pos,
    error::{Error, Result},
};

use super::{Cell, CellGrid, MazeSource};

const DEMO: &str = "\
###############
#S..#.........#
#.#.#.#####.#.#
#.#...#...#.#.#
#.#####.#.#.#.#
#.....#.#...#.#
#####.#.#####.#
#...#...#.....#
#.#.#####.###.#
#.#.........#G#
###############";

/// A maze read from an ASCII map
///
/// | glyph | cell |
/// |-------|------|
/// | `#` | wall |
/// | `.` or space | free |
/// | `S` | start |
/// | `G` | goal |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMaze {
    grid: CellGrid,
}

impl TextMaze {
    /// A small built-in maze winding from the top left to the bottom right
    pub fn demo() -> Self {
        DEMO.parse().expect("built-in demo maze is well formed")
    }

    /// Read and parse a map file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        fs::read_to_string(path)?.parse()
    }

    pub fn cell(&self, pos: Pos) -> Option<Cell> {
        self.grid.get(pos)
    }
}

impl FromStr for TextMaze {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rows = s
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .collect::<Vec<_>>();
        let rows = match rows.iter().rposition(|r| !r.is_empty()) {
            Some(last) => &rows[..=last],
            None => return Err(Error::invalid_maze("map is empty")),
        };

        let width = rows[0].chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());
        let mut start = None;
        let mut goal = None;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(Error::invalid_maze(format!(
                    "row {y} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }

            for (x, glyph) in row.chars().enumerate() {
                let pos = (x as i32, y as i32);
                let cell = match glyph {
                    '#' => Cell::Wall,
                    '.' | ' ' => Cell::Free,
                    'S' => Cell::Start,
                    'G' => Cell::Goal,
                    other => {
                        return Err(Error::invalid_maze(format!(
                            "unknown glyph {other:?} at {pos:?}"
                        )))
                    }
                };

                let slot = match cell {
                    Cell::Start => Some((&mut start, "start")),
                    Cell::Goal => Some((&mut goal, "goal")),
                    _ => None,
                };
                if let Some((slot, name)) = slot {
                    if let Some(prev) = slot.replace(pos) {
                        return Err(Error::invalid_maze(format!(
                            "second {name} at {pos:?}, first at {prev:?}"
                        )));
                    }
                }

                cells.push(cell);
            }
        }

        Ok(Self {
            grid: CellGrid {
                width: width as u32,
                height: rows.len() as u32,
                cells,
                start,
                goal,
            },
        })
    }
}

impl fmt::Display for TextMaze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.grid.height as i32 {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..self.grid.width as i32 {
                let glyph = match self.grid.get((x, y)).unwrap_or_default() {
                    Cell::Wall => '#',
                    Cell::Free => '.',
                    Cell::Start => 'S',
                    Cell::Goal => 'G',
                };
                write!(f, "{glyph}")?;
            }
        }
        Ok(())
    }
}

impl MazeSource for TextMaze {
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
