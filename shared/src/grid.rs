//! World model shared by server and client: cells, glyph templates and the
//! authoritative grid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Terminal color attribute for a cell. Presentation metadata only; the
/// server never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Default,
    Black,
    Red,
    Green,
    DarkGray,
    Yellow,
}

/// One grid square: a display glyph, its style, and whether it blocks entry.
///
/// Cells are immutable value objects. The world changes by replacing the
/// cell stored at a coordinate, never by mutating a cell in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub symbol: char,
    pub fg: Color,
    pub bg: Color,
    pub tangible: bool,
}

impl Cell {
    /// Open terrain; the only cell clients may spawn on.
    pub const EMPTY: Cell = Cell {
        symbol: ' ',
        fg: Color::Default,
        bg: Color::Default,
        tangible: false,
    };

    /// Outer wall.
    pub const WALL: Cell = Cell {
        symbol: '▤',
        fg: Color::Black,
        bg: Color::DarkGray,
        tangible: true,
    };

    /// Free-standing obstacle.
    pub const BARRIER: Cell = Cell {
        symbol: '#',
        fg: Color::Red,
        bg: Color::Default,
        tangible: true,
    };

    /// Passable vegetation.
    pub const VEGETATION: Cell = Cell {
        symbol: '♣',
        fg: Color::Green,
        bg: Color::Default,
        tangible: false,
    };

    /// A player character occupying a coordinate.
    pub const PLAYER: Cell = Cell {
        symbol: '☺',
        fg: Color::Black,
        bg: Color::Default,
        tangible: true,
    };

    fn from_glyph(symbol: char) -> Cell {
        match symbol {
            s if s == Cell::WALL.symbol => Cell::WALL,
            s if s == Cell::BARRIER.symbol => Cell::BARRIER,
            s if s == Cell::VEGETATION.symbol => Cell::VEGETATION,
            // The spawn marker is only a hint for map authors; it loads as
            // open terrain so nobody starts the session pre-occupied.
            _ => Cell::EMPTY,
        }
    }
}

/// Raised when the world source cannot be turned into a grid. Fatal at
/// startup; the server refuses to run without a world.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read world map: {0}")]
    Io(#[from] std::io::Error),
    #[error("world map contains no cells")]
    EmptyMap,
}

/// The authoritative 2D world: a rectangular, row-major array of cells.
///
/// Dimensions are fixed once loaded. The grid does no locking of its own;
/// the synchronization service serializes all access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Parses a textual map: one row per line, one cell per character.
    /// Unrecognized characters load as open terrain; short rows are padded
    /// so the grid stays rectangular.
    pub fn parse(text: &str) -> Result<Grid, LoadError> {
        let lines: Vec<&str> = text.lines().collect();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if width == 0 || lines.is_empty() {
            return Err(LoadError::EmptyMap);
        }

        let mut cells = Vec::with_capacity(width * lines.len());
        for line in &lines {
            let mut row_len = 0;
            for symbol in line.chars() {
                cells.push(Cell::from_glyph(symbol));
                row_len += 1;
            }
            cells.resize(cells.len() + width - row_len, Cell::EMPTY);
        }

        Ok(Grid {
            width,
            height: lines.len(),
            cells,
        })
    }

    /// Reads and parses a map file.
    pub fn load(path: impl AsRef<Path>) -> Result<Grid, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Grid::parse(&text)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether a wire coordinate lands on the grid. Wire coordinates are
    /// signed because clients compute move targets without clamping.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Cell at (column, row). Callers check bounds first.
    pub fn at(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.width + x]
    }

    /// Replaces the cell at (column, row).
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[y * self.width + x] = cell;
    }

    /// Coordinates currently holding open terrain, i.e. valid spawn points.
    pub fn vacant_cells(&self) -> Vec<(usize, usize)> {
        let mut vacant = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.at(x, y) == Cell::EMPTY {
                    vacant.push((x, y));
                }
            }
        }
        vacant
    }

    /// Iterates rows top to bottom, each row a slice of cells.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                write!(f, "{}", cell.symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
