use std::fmt;
use std::path::Path;

use config_file::FromConfigFile;
use serde::Deserialize;

use crate::error::{GridError, Result};

/// Cell value marking an impassable wall.
pub const WALL: i32 = -1;
/// Cell value marking a free, traversable cell.
pub const FREE: i32 = 0;

/// What occupies a grid cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Cell {
    Free,
    Wall,
    /// Terminal cell. The value is the reward for entering it.
    Terminal(i32),
}

impl From<i32> for Cell {
    fn from(value: i32) -> Cell {
        match value {
            FREE => Cell::Free,
            WALL => Cell::Wall,
            r => Cell::Terminal(r),
        }
    }
}

/// A grid coordinate.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct State {
    pub row: usize,
    pub col: usize,
}

impl State {
    pub fn new(row: usize, col: usize) -> State {
        State { row, col }
    }

    pub fn index(&self) -> [usize; 2] {
        [self.row, self.col]
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(row: {}, col: {})", self.row, self.col)
    }
}

/// Enumerates every coordinate of a grid in row-major order.
pub struct StateIterator {
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
}

impl StateIterator {
    pub fn new(rows: usize, cols: usize) -> StateIterator {
        StateIterator { row: 0, col: 0, rows, cols }
    }
}

impl Iterator for StateIterator {
    type Item = State;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.rows || self.cols == 0 {
            return None;
        }
        let state = State::new(self.row, self.col);
        if self.col + 1 < self.cols {
            self.col += 1;
        } else {
            self.col = 0;
            self.row += 1;
        }
        Some(state)
    }
}

/// Grid description as it appears on disk.
///
/// ```json
/// { "rows": 1, "cols": 3, "map": [[1, 0, -1]] }
/// ```
#[derive(Deserialize, Debug)]
pub struct GridDescription {
    pub rows: usize,
    pub cols: usize,
    pub map: Vec<Vec<i32>>,
}

impl GridDescription {
    pub fn load(path: &Path) -> Result<GridDescription> {
        GridDescription::from_config_file(path).map_err(|source| GridError::Load {
            path: path.display().to_string(),
            source,
        })
    }
}

impl TryFrom<GridDescription> for Grid {
    type Error = GridError;

    fn try_from(desc: GridDescription) -> Result<Grid> {
        let grid = Grid::new(desc.map)?;
        if grid.rows() != desc.rows || grid.cols() != desc.cols {
            return Err(GridError::DimensionMismatch {
                declared_rows: desc.rows,
                declared_cols: desc.cols,
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }
        Ok(grid)
    }
}

/// Immutable grid world.
///
/// Cells are `-1` for walls, `0` for free cells, and anything else for a
/// terminal whose value is the reward for entering it.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: ndarray::Array2<i32>,
}

impl Grid {
    /// Build a grid from rows of cell values. Rows must be non-empty and
    /// all the same length.
    pub fn new(map: Vec<Vec<i32>>) -> Result<Grid> {
        let rows = map.len();
        let cols = map.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty { rows, cols });
        }
        for (row, cells) in map.iter().enumerate() {
            if cells.len() != cols {
                return Err(GridError::RowLength {
                    row,
                    expected: cols,
                    found: cells.len(),
                });
            }
        }
        let flat: Vec<i32> = map.into_iter().flatten().collect();
        let cells = ndarray::Array2::from_shape_vec((rows, cols), flat)?;
        Ok(Grid { cells })
    }

    pub fn load(path: &Path) -> Result<Grid> {
        Grid::try_from(GridDescription::load(path)?)
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn value(&self, s: &State) -> i32 {
        self.cells[s.index()]
    }

    pub fn cell(&self, s: &State) -> Cell {
        Cell::from(self.value(s))
    }

    pub fn is_wall(&self, s: &State) -> bool {
        self.value(s) == WALL
    }

    /// Free cells are the only ones with a decision to make.
    pub fn is_free(&self, s: &State) -> bool {
        self.value(s) == FREE
    }

    pub fn states(&self) -> StateIterator {
        StateIterator::new(self.rows(), self.cols())
    }

    pub fn cells(&self) -> &ndarray::Array2<i32> {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use test_case::test_case;

    #[test]
    fn iterate_states() {
        // Arrange
        let state_iter = StateIterator::new(2, 3);
        let mut states: HashSet<State> = HashSet::new();
        // Act
        for s in state_iter {
            assert!(s.row < 2);
            assert!(s.col < 3);
            states.insert(s);
        }
        // Assert
        assert_eq!(states.len(), 6);
    }

    #[test]
    fn iterate_states_row_major() {
        let states: Vec<State> = StateIterator::new(2, 2).collect();
        assert_eq!(
            states,
            vec![State::new(0, 0), State::new(0, 1), State::new(1, 0), State::new(1, 1)]
        );
    }

    #[test_case(0, Cell::Free; "Free cell")]
    #[test_case(-1, Cell::Wall; "Wall")]
    #[test_case(5, Cell::Terminal(5); "Positive terminal")]
    #[test_case(-10, Cell::Terminal(-10); "Negative terminal")]
    fn classify_cell(value: i32, cell: Cell) {
        assert_eq!(Cell::from(value), cell);
    }

    #[test]
    fn build_grid() {
        // Act
        let grid = Grid::new(vec![vec![0, -1, 3], vec![0, 0, 0]]).unwrap();
        // Assert
        assert_eq!(grid.dim(), (2, 3));
        assert!(grid.is_wall(&State::new(0, 1)));
        assert!(grid.is_free(&State::new(1, 2)));
        assert_eq!(grid.cell(&State::new(0, 2)), Cell::Terminal(3));
        assert_eq!(grid.states().count(), 6);
    }

    #[test]
    fn reject_ragged_rows() {
        let err = Grid::new(vec![vec![0, 0, 0], vec![0, 0]]).unwrap_err();
        assert!(matches!(
            err,
            GridError::RowLength { row: 1, expected: 3, found: 2 }
        ));
    }

    #[test_case(vec![]; "No rows")]
    #[test_case(vec![vec![]]; "No columns")]
    fn reject_empty_grid(map: Vec<Vec<i32>>) {
        assert!(matches!(Grid::new(map), Err(GridError::Empty { .. })));
    }

    #[test]
    fn reject_mismatched_description() {
        // Arrange
        let desc = GridDescription { rows: 2, cols: 3, map: vec![vec![0, 0, 1]] };
        // Act
        let result = Grid::try_from(desc);
        // Assert
        assert!(matches!(
            result,
            Err(GridError::DimensionMismatch { declared_rows: 2, rows: 1, .. })
        ));
    }

    #[test]
    fn load_missing_file() {
        let result = Grid::load(Path::new("maps/does_not_exist.json"));
        assert!(matches!(result, Err(GridError::Load { .. })));
    }

    #[test]
    fn load_shipped_map() {
        let grid = Grid::load(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/maps/uturn.json")))
            .unwrap();
        assert_eq!(grid.dim(), (4, 5));
        assert_eq!(grid.cell(&State::new(3, 2)), Cell::Terminal(1));
    }

    #[test_case("linear.json", (1, 8); "Linear corridor")]
    #[test_case("uturn.json", (4, 5); "U-turn")]
    #[test_case("center.json", (5, 5); "Center")]
    #[test_case("multi_reward.json", (5, 6); "Multiple rewards")]
    fn load_every_json_map(name: &str, dim: (usize, usize)) {
        // Arrange
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("maps").join(name);
        // Act
        let grid = Grid::load(&path).unwrap();
        // Assert
        assert_eq!(grid.dim(), dim);
    }
}
