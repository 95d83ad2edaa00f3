use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ROWS: usize = 3;
pub const DEFAULT_COLS: usize = 3;
pub const DEFAULT_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("invalid pattern configuration: {length} cells on a {rows}x{cols} grid")]
    InvalidConfiguration {
        rows: usize,
        cols: usize,
        length: usize,
    },

    #[error("cell {index} is outside a grid of {cells} cells")]
    InvalidInput { index: usize, cells: usize },

    #[error("cell {index} appears more than once in the pattern")]
    DuplicateCell { index: usize },

    #[error("cursor {cursor} is past the end of a pattern of length {length}")]
    CursorOutOfRange { cursor: usize, length: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Grid { rows, cols }
    }

    pub fn checked_cells(&self) -> Option<usize> {
        if self.rows == 0 || self.cols == 0 {
            return None;
        }
        self.rows.checked_mul(self.cols)
    }

    pub fn cells(&self) -> usize {
        self.checked_cells().unwrap_or(0)
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.cells()
    }

    fn validate_length(&self, length: usize) -> Result<usize, PatternError> {
        let invalid = PatternError::InvalidConfiguration {
            rows: self.rows,
            cols: self.cols,
            length,
        };
        match self.checked_cells() {
            Some(cells) if length > 0 && length <= cells => Ok(cells),
            _ => Err(invalid),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    grid: Grid,
    cells: Vec<usize>,
}

impl Pattern {
    /// Builds a pattern from explicit cells, checking every invariant a
    /// generated pattern would hold.
    pub fn new(grid: Grid, cells: Vec<usize>) -> Result<Self, PatternError> {
        let total = grid.validate_length(cells.len())?;
        let mut seen = vec![false; total];
        for &index in &cells {
            if index >= total {
                return Err(PatternError::InvalidInput {
                    index,
                    cells: total,
                });
            }
            if seen[index] {
                return Err(PatternError::DuplicateCell { index });
            }
            seen[index] = true;
        }
        Ok(Pattern { grid, cells })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, cursor: usize) -> Option<usize> {
        self.cells.get(cursor).copied()
    }

    pub fn step_of(&self, index: usize) -> Option<usize> {
        self.cells.iter().position(|&cell| cell == index)
    }
}

fn sample<R: Rng + ?Sized>(grid: Grid, total: usize, length: usize, rng: &mut R) -> Pattern {
    let mut pool: Vec<usize> = (0..total).collect();
    let (picked, _) = pool.partial_shuffle(rng, length);
    let cells = picked.to_vec();
    debug!(rows = grid.rows, cols = grid.cols, ?cells, "generated pattern");
    Pattern { grid, cells }
}

/// Draws `length` distinct cells uniformly at random, in random order.
pub fn generate_pattern<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    length: usize,
    rng: &mut R,
) -> Result<Pattern, PatternError> {
    let grid = Grid::new(rows, cols);
    let total = grid.validate_length(length)?;
    Ok(sample(grid, total, length, rng))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternGenerator {
    grid: Grid,
    length: usize,
}

impl Default for PatternGenerator {
    fn default() -> Self {
        PatternGenerator {
            grid: Grid::default(),
            length: DEFAULT_LENGTH,
        }
    }
}

impl PatternGenerator {
    pub fn new(rows: usize, cols: usize, length: usize) -> Result<Self, PatternError> {
        let grid = Grid::new(rows, cols);
        grid.validate_length(length)?;
        Ok(PatternGenerator { grid, length })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Pattern {
        sample(self.grid, self.grid.cells(), self.length, rng)
    }

    pub fn generate(&self) -> Pattern {
        self.generate_with(&mut rand::rng())
    }
}
