//! The Game of Life grid.

use std::fmt;

use rand::Rng;

use super::ServiceError;

/// Largest accepted height or width.
pub const MAX_DIMENSION: usize = 1000;

/// A toroidal grid of cells: the top edge neighbours the bottom edge and the
/// left edge neighbours the right.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    height: usize,
    width: usize,
    cells: Vec<bool>,
}

impl World {
    /// An all-dead world.
    pub fn new(height: usize, width: usize) -> Result<Self, ServiceError> {
        if height == 0 || width == 0 || height > MAX_DIMENSION || width > MAX_DIMENSION {
            return Err(ServiceError::InvalidDimensions { height, width });
        }
        Ok(Self { height, width, cells: vec![false; height * width] })
    }

    /// Brings each cell to life with probability `fill` (clamped to `0.0..=1.0`).
    pub fn seed<R: Rng + ?Sized>(&mut self, fill: f64, rng: &mut R) {
        let fill = fill.clamp(0.0, 1.0);
        for cell in &mut self.cells {
            *cell = rng.gen_bool(fill);
        }
    }

    pub fn height(&self) -> usize { self.height }
    pub fn width(&self) -> usize { self.width }

    /// Coordinates wrap, so any `row`/`col` is valid.
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        let i = self.index(row, col);
        self.cells[i] = alive;
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Live cells among the eight surrounding `(row, col)`.
    pub fn neighbours(&self, row: usize, col: usize) -> usize {
        let (row, col) = (row % self.height, col % self.width);
        let mut count = 0;
        for dr in -1..=1isize {
            for dc in -1..=1isize {
                if (dr, dc) == (0, 0) {
                    continue;
                }
                // On a 1- or 2-wide world some of these land on the same cell,
                // which then counts once per offset.
                let r = (row + self.height).wrapping_add_signed(dr);
                let c = (col + self.width).wrapping_add_signed(dc);
                if self.is_alive(r, c) {
                    count += 1;
                }
            }
        }
        count
    }

    /// The next generation under B3/S23.
    pub fn next_state(&self) -> World {
        let mut next = World {
            height: self.height,
            width: self.width,
            cells: vec![false; self.cells.len()],
        };
        for row in 0..self.height {
            for col in 0..self.width {
                let alive = matches!(
                    (self.is_alive(row, col), self.neighbours(row, col)),
                    (true, 2) | (_, 3)
                );
                next.set(row, col, alive);
            }
        }
        next
    }

    fn index(&self, row: usize, col: usize) -> usize {
        (row % self.height) * self.width + (col % self.width)
    }
}

/// One line per row, `#` for live cells and `.` for dead ones.
impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for &cell in row {
                f.write_str(if cell { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
