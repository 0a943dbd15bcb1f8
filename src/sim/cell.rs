//! Grid cell addressing
//!
//! Cells are indexed row-major: `index = row * GRID_COLS + col`, row 0 at the
//! top and col 0 at the left. Every constructor clamps, so a `Cell` is always
//! a valid index.

use serde::{Deserialize, Serialize};

use crate::consts::{CELL_COUNT, GRID_COLS, GRID_ROWS};

/// One of the nine target positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Cell(u8);

impl Cell {
    pub const TOP_LEFT: Cell = Cell(0);
    pub const CENTER: Cell = Cell(4);
    pub const BOTTOM_RIGHT: Cell = Cell(8);

    /// Build from any integer, clamping into `[0, CELL_COUNT - 1]`
    pub fn new(index: i64) -> Self {
        let clamped = index.clamp(0, CELL_COUNT as i64 - 1);
        if clamped != index {
            log::warn!("Cell index {} out of range, clamped to {}", index, clamped);
        }
        Cell(clamped as u8)
    }

    /// Build from row/column, clamping each axis
    pub fn from_row_col(row: i64, col: i64) -> Self {
        let row = row.clamp(0, GRID_ROWS as i64 - 1) as usize;
        let col = col.clamp(0, GRID_COLS as i64 - 1) as usize;
        Cell((row * GRID_COLS + col) as u8)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn row(self) -> usize {
        self.index() / GRID_COLS
    }

    #[inline]
    pub fn col(self) -> usize {
        self.index() % GRID_COLS
    }

    /// All cells in index order
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..CELL_COUNT as u8).map(Cell)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::CENTER
    }
}

impl From<i64> for Cell {
    fn from(index: i64) -> Self {
        Cell::new(index)
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        cell.0
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell {} (r{} c{})", self.0, self.row(), self.col())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_out_of_range_clamps() {
        assert_eq!(Cell::new(-5), Cell::TOP_LEFT);
        assert_eq!(Cell::new(9), Cell::BOTTOM_RIGHT);
        assert_eq!(Cell::new(i64::MAX), Cell::BOTTOM_RIGHT);
        assert_eq!(Cell::from_row_col(7, -2), Cell::new(6));
    }

    #[test]
    fn test_center_is_default() {
        assert_eq!(Cell::default().index(), 4);
        assert_eq!(Cell::CENTER.row(), 1);
        assert_eq!(Cell::CENTER.col(), 1);
    }

    #[test]
    fn test_serde_clamps_on_load() {
        let cell: Cell = serde_json::from_str("42").unwrap();
        assert_eq!(cell, Cell::BOTTOM_RIGHT);
        assert_eq!(serde_json::to_string(&Cell::new(3)).unwrap(), "3");
    }

    proptest! {
        #[test]
        fn row_col_round_trips(row in 0usize..GRID_ROWS, col in 0usize..GRID_COLS) {
            let cell = Cell::from_row_col(row as i64, col as i64);
            prop_assert_eq!(cell.index(), row * GRID_COLS + col);
            prop_assert_eq!(cell.row(), row);
            prop_assert_eq!(cell.col(), col);
        }

        #[test]
        fn any_index_is_in_range(index in any::<i64>()) {
            prop_assert!(Cell::new(index).index() < CELL_COUNT);
        }
    }
}
