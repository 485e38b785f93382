//! Dense event matrix
//!
//! A small row-major 2-D buffer: one row per event code, one column per sample
//! across all concatenated segments. Downstream signal-processing code only
//! needs typed scalar reads and writes, so this stays a plain owned buffer
//! instead of pulling in an array library.

/// Dense 2-D matrix of f64 values, rows = event codes, columns = samples
#[derive(Debug, Clone, PartialEq)]
pub struct EventMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl EventMatrix {
    /// Create an all-zero matrix of the given shape
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            data: vec![0.0; n_rows * n_cols],
        }
    }

    /// Number of rows (event codes)
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (total samples)
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Shape as `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Read one cell. Panics when the position is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.n_rows && col < self.n_cols, "position out of bounds");
        self.data[row * self.n_cols + col]
    }

    /// Write one cell, overwriting any previous value. Panics when the
    /// position is out of bounds; callers validate sample indices first.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.n_rows && col < self.n_cols, "position out of bounds");
        self.data[row * self.n_cols + col] = value;
    }

    /// Borrow one row as a slice
    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.n_rows, "row out of bounds");
        &self.data[row * self.n_cols..(row + 1) * self.n_cols]
    }

    /// Borrow the whole buffer in row-major order
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
