//! Resistance field: per-cell permeability in `[0, 1]`.
//!
//! 0.0 is fully open, anything `>= 1.0` fully opaque, values in between
//! attenuate. The engine only reads it; values outside `[0, 1]` are the
//! caller's problem.

use crate::error::SenseError;

/// Read-only view of a resistance field.
pub trait ResistanceMap {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Resistance at `(x, y)`. Callers must stay within `in_bounds`.
    fn resistance(&self, x: usize, y: usize) -> f64;

    /// Whether the signed global position lies on the map.
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }
}

/// Flat row-major resistance grid: `index = y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResistanceGrid {
    width: usize,
    height: usize,
    cells: Vec<f64>,
}

impl ResistanceGrid {
    /// A fully open grid.
    pub fn new(width: usize, height: usize) -> Result<Self, SenseError> {
        Self::filled(width, height, 0.0)
    }

    /// A grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self, SenseError> {
        if width == 0 || height == 0 {
            return Err(SenseError::EmptyGrid);
        }
        Ok(ResistanceGrid {
            width,
            height,
            cells: vec![value; width * height],
        })
    }

    /// Wrap an existing row-major buffer.
    pub fn from_flat(width: usize, height: usize, cells: Vec<f64>) -> Result<Self, SenseError> {
        if width == 0 || height == 0 {
            return Err(SenseError::EmptyGrid);
        }
        if cells.len() != width * height {
            return Err(SenseError::DimensionMismatch {
                expected: width * height,
                actual: cells.len(),
            });
        }
        Ok(ResistanceGrid {
            width,
            height,
            cells,
        })
    }

    /// Build from a nested `grid[x][y]` layout.
    pub fn from_nested(grid: &[Vec<f64>]) -> Result<Self, SenseError> {
        let width = grid.len();
        let height = grid.first().map_or(0, Vec::len);
        if let Some(column) = grid.iter().find(|column| column.len() != height) {
            return Err(SenseError::DimensionMismatch {
                expected: height,
                actual: column.len(),
            });
        }
        Self::from_flat(width, height, flatten_grid(grid))
    }

    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let idx = self.index(x, y);
        self.cells[idx] = value;
    }

    /// Set every cell of the `w` x `h` rectangle at `(x, y)` that lies on the grid.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, value: f64) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for yy in y..y_end {
            for xx in x..x_end {
                self.set(xx, yy, value);
            }
        }
    }

    /// The raw row-major cells.
    pub fn as_slice(&self) -> &[f64] {
        &self.cells
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "({x}, {y}) outside {}x{} resistance grid",
            self.width,
            self.height
        );
        y * self.width + x
    }
}

impl ResistanceMap for ResistanceGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn resistance(&self, x: usize, y: usize) -> f64 {
        self.cells[self.index(x, y)]
    }
}

impl<R: ResistanceMap + ?Sized> ResistanceMap for &R {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn resistance(&self, x: usize, y: usize) -> f64 {
        (**self).resistance(x, y)
    }
}

/// Convert `grid[x][y]` to a flat row-major `Vec` (`y * width + x`).
pub fn flatten_grid(grid: &[Vec<f64>]) -> Vec<f64> {
    let width = grid.len();
    let height = grid.first().map_or(0, Vec::len);
    let mut flat = vec![0.0; width * height];
    for (x, column) in grid.iter().enumerate() {
        for (y, &value) in column.iter().enumerate() {
            flat[y * width + x] = value;
        }
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_is_rejected() {
        assert_eq!(ResistanceGrid::new(0, 4), Err(SenseError::EmptyGrid));
        assert_eq!(ResistanceGrid::new(4, 0), Err(SenseError::EmptyGrid));
    }

    #[test]
    fn from_flat_checks_length() {
        let err = ResistanceGrid::from_flat(3, 3, vec![0.0; 8]).unwrap_err();
        assert_eq!(
            err,
            SenseError::DimensionMismatch {
                expected: 9,
                actual: 8
            }
        );
    }

    #[test]
    fn nested_layout_is_column_major() {
        // grid[x][y]: 2 wide, 3 tall
        let nested = vec![vec![0.0, 0.1, 0.2], vec![1.0, 1.1, 1.2]];
        let grid = ResistanceGrid::from_nested(&nested).unwrap();
        assert_eq!((grid.width(), grid.height()), (2, 3));
        assert_eq!(grid.resistance(1, 2), 1.2);
        assert_eq!(grid.resistance(0, 1), 0.1);
        assert_eq!(grid.as_slice(), &[0.0, 1.0, 0.1, 1.1, 0.2, 1.2]);
    }

    #[test]
    fn ragged_nested_grid_is_rejected() {
        let nested = vec![vec![0.0, 0.0], vec![0.0]];
        assert!(matches!(
            ResistanceGrid::from_nested(&nested),
            Err(SenseError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn fill_rect_clips_to_grid() {
        let mut grid = ResistanceGrid::new(4, 4).unwrap();
        grid.fill_rect(2, 2, 10, 10, 1.0);
        assert_eq!(grid.resistance(3, 3), 1.0);
        assert_eq!(grid.resistance(2, 2), 1.0);
        assert_eq!(grid.resistance(1, 3), 0.0);
    }

    #[test]
    fn signed_bounds() {
        let grid = ResistanceGrid::new(3, 2).unwrap();
        assert!(grid.in_bounds(0, 0));
        assert!(grid.in_bounds(2, 1));
        assert!(!grid.in_bounds(-1, 0));
        assert!(!grid.in_bounds(3, 0));
        assert!(!grid.in_bounds(0, 2));
    }
}
