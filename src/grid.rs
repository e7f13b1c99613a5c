use std::fmt;

use rand::Rng;

use crate::pattern::Pattern;

/// A toroidal Life board.
///
/// Cells are stored row-major. `next` is the back buffer written by [`Grid::step`], so a
/// generation is always computed entirely from the previous one.
#[derive(Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,

    /// Front buffer
    cells: Vec<bool>,

    /// Back buffer
    next: Vec<bool>,
}

impl Grid {
    /// Create an empty grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
            next: vec![false; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns whether the cell at `(row, col)` is alive. Out of range cells are dead.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.index(row, col).is_some_and(|i| self.cells[i])
    }

    /// Set the cell at `(row, col)`. Out of range coordinates are ignored.
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = alive;
        }
    }

    /// Flip a single cell. Returns `false` if `(row, col)` is outside the grid.
    pub fn toggle(&mut self, row: usize, col: usize) -> bool {
        let Some(i) = self.index(row, col) else {
            return false;
        };

        self.cells[i] = !self.cells[i];

        true
    }

    /// Kill every cell
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Replace the grid with an empty one of the given dimensions
    pub fn resize(&mut self, rows: usize, cols: usize) {
        *self = Self::new(rows, cols);
    }

    /// Each cell is independently set alive with probability `density`, clamped to `[0, 1]`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) {
        let p = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };

        for cell in self.cells.iter_mut() {
            *cell = rng.gen_bool(p);
        }
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Live cells as `(row, col)` pairs, in row-major order
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .map(|(i, _)| (i / self.cols, i % self.cols))
    }

    /// Count the live cells among the 8 neighbors of `(row, col)`, wrapping around the edges.
    pub fn neighbors(&self, row: usize, col: usize) -> u8 {
        if self.index(row, col).is_none() {
            return 0;
        }

        let mut n = 0;

        // Offsets `0..3` stand for -1, 0 and +1. Starting from `row + rows - 1` keeps the sum
        // unsigned.
        for dr in 0..3 {
            for dc in 0..3 {
                if dr == 1 && dc == 1 {
                    continue;
                }

                let r = (row + self.rows - 1 + dr) % self.rows;
                let c = (col + self.cols - 1 + dc) % self.cols;

                n += self.cells[r * self.cols + c] as u8;
            }
        }

        n
    }

    /// Advance the board by one generation under B3/S23.
    pub fn step(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let alive = self.cells[row * self.cols + col];
                let n = self.neighbors(row, col);

                self.next[row * self.cols + col] = matches!((alive, n), (true, 2 | 3) | (_, 3));
            }
        }

        std::mem::swap(&mut self.cells, &mut self.next);
    }

    /// Write the live cells of `pattern` with its bounding box centered on the grid.
    ///
    /// Cells landing outside the grid are dropped, not wrapped.
    pub fn stamp(&mut self, pattern: &Pattern) {
        let top = (self.rows / 2) as isize - (pattern.rows() / 2) as isize;
        let left = (self.cols / 2) as isize - (pattern.cols() / 2) as isize;

        for &(r, c) in pattern.cells() {
            let row = top + r as isize;
            let col = left + c as isize;

            if row < 0 || col < 0 {
                continue;
            }

            self.set(row as usize, col as usize, true);
        }
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }
}

// The back buffer holds stale data and doesn't take part in equality
impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.cells == other.cells
    }
}

impl Eq for Grid {}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            if row > 0 {
                writeln!(f)?;
            }

            for col in 0..self.cols {
                let c = if self.cells[row * self.cols + col] {
                    '#'
                } else {
                    '.'
                };

                write!(f, "{c}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid {}x{}\n{self}", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::Grid;

    fn grid_with(rows: usize, cols: usize, live: &[(usize, usize)]) -> Grid {
        let mut grid = Grid::new(rows, cols);
        for &(r, c) in live {
            grid.set(r, c, true);
        }

        grid
    }

    #[test]
    fn neighbors_wrap_at_corners() {
        let grid = grid_with(5, 5, &[(4, 4), (0, 4), (4, 0)]);

        assert_eq!(grid.neighbors(0, 0), 3);
        assert_eq!(grid.neighbors(2, 2), 0);
    }

    #[test]
    fn neighbors_skip_self() {
        let grid = grid_with(3, 3, &[(1, 1)]);

        assert_eq!(grid.neighbors(1, 1), 0);
        assert_eq!(grid.neighbors(0, 0), 1);
    }

    #[test]
    fn lonely_cell_dies() {
        let mut grid = grid_with(6, 6, &[(2, 2), (2, 3)]);
        grid.step();

        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn crowded_cell_dies() {
        // Center has 4 neighbors
        let mut grid = grid_with(7, 7, &[(3, 3), (2, 3), (4, 3), (3, 2), (3, 4)]);
        grid.step();

        assert!(!grid.get(3, 3));
    }

    #[test]
    fn block_survives() {
        let live = [(1, 1), (1, 2), (2, 1), (2, 2)];
        let mut grid = grid_with(6, 6, &live);
        let before = grid.clone();

        grid.step();

        assert_eq!(grid, before);
    }

    #[test]
    fn birth_on_three() {
        let mut grid = grid_with(6, 6, &[(1, 1), (1, 3), (3, 2)]);
        grid.step();

        assert!(grid.get(2, 2));
    }

    #[test]
    fn blinker_across_the_edge() {
        // Horizontal blinker straddling the left/right seam
        let mut grid = grid_with(5, 6, &[(2, 5), (2, 0), (2, 1)]);
        let start = grid.clone();

        grid.step();
        assert_eq!(grid.population(), 3);
        assert!(grid.get(1, 0) && grid.get(2, 0) && grid.get(3, 0));

        grid.step();
        assert_eq!(grid, start);
    }

    #[test]
    fn toggle_out_of_range_is_ignored() {
        let mut grid = Grid::new(3, 4);

        assert!(!grid.toggle(3, 0));
        assert!(!grid.toggle(0, 4));
        assert_eq!(grid.population(), 0);

        assert!(grid.toggle(2, 3));
        assert!(grid.get(2, 3));
        assert!(grid.toggle(2, 3));
        assert!(!grid.get(2, 3));
    }

    #[test]
    fn randomize_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = Grid::new(8, 9);

        grid.randomize(1.0, &mut rng);
        assert_eq!(grid.population(), 72);

        grid.randomize(0.0, &mut rng);
        assert_eq!(grid.population(), 0);

        grid.randomize(4.0, &mut rng);
        assert_eq!(grid.population(), 72);

        grid.randomize(f64::NAN, &mut rng);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn empty_dimensions_are_inert() {
        let mut grid = Grid::new(0, 10);
        grid.step();

        assert!(!grid.toggle(0, 0));
        assert_eq!(grid.population(), 0);
        assert_eq!(grid.to_string(), "");
    }

    #[test]
    fn display() {
        let grid = grid_with(2, 3, &[(0, 1), (1, 2)]);

        assert_eq!(grid.to_string(), ".#.\n..#");
    }

    #[test]
    fn live_cells_in_row_major_order() {
        let grid = grid_with(3, 3, &[(2, 0), (0, 2), (1, 1)]);
        let cells: Vec<_> = grid.live_cells().collect();

        assert_eq!(cells, vec![(0, 2), (1, 1), (2, 0)]);
    }
}
