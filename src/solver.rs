use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::config::PlanningConfig;
use crate::error::{GridError, Result};
use crate::grid::{Grid, State};

/// The four moves available from a free cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Canonical order. Ties between actions go to the earliest one here.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Row and column offsets of one step.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Action> {
        Action::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GridError::UnrecognizedAction(s.to_string()))
    }
}

/// Deterministic transition and reward model over a grid.
#[derive(Debug, Clone, Copy)]
pub struct Mdp<'a> {
    pub grid: &'a Grid,
    pub gamma: f64,
}

impl<'a> Mdp<'a> {
    pub fn new(grid: &'a Grid, gamma: f64) -> Mdp<'a> {
        Mdp { grid, gamma }
    }

    /// Where `action` actually takes the agent from `s`.
    ///
    /// Moving off the grid or into a wall leaves the agent where it was.
    pub fn destination(&self, s: &State, action: Action) -> State {
        let (dr, dc) = action.delta();
        let (Some(row), Some(col)) = (s.row.checked_add_signed(dr), s.col.checked_add_signed(dc))
        else {
            return *s;
        };
        if row >= self.grid.rows() || col >= self.grid.cols() {
            return *s;
        }
        let intended = State::new(row, col);
        if self.grid.is_wall(&intended) {
            return *s;
        }
        intended
    }

    /// Probability of reaching `next` from `s` by taking `action`. Always
    /// 0.0 or 1.0.
    pub fn probability(&self, s: &State, action: Action, next: &State) -> f64 {
        if self.destination(s, action) == *next {
            1.0
        } else {
            0.0
        }
    }

    /// Reward for arriving at `next`.
    pub fn reward(&self, next: &State) -> f64 {
        f64::from(self.grid.value(next))
    }

    /// Bellman Q-value of taking `action` in `s` under `values`.
    ///
    /// Only the destination carries probability mass, so the sum over
    /// next states reduces to a single term.
    pub fn q_value(&self, s: &State, action: Action, values: &ndarray::Array2<f64>) -> f64 {
        let next = self.destination(s, action);
        self.reward(&next) + self.gamma * values[next.index()]
    }

    /// Best action in canonical order and its Q-value. A later action only
    /// wins with a strictly greater Q-value.
    pub fn best_action(&self, s: &State, values: &ndarray::Array2<f64>) -> (Action, f64) {
        let mut best = (Action::ALL[0], self.q_value(s, Action::ALL[0], values));
        for action in &Action::ALL[1..] {
            let q = self.q_value(s, *action, values);
            if q > best.1 {
                best = (*action, q);
            }
        }
        best
    }
}

/// Result of a value iteration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Value estimate per cell. Walls and terminals stay at 0.0.
    pub values: ndarray::Array2<f64>,
    /// Number of sweeps performed
    pub sweeps: usize,
    /// Largest value change during the last sweep
    pub delta: f64,
    /// Whether `delta` fell below the threshold before the sweep limit
    pub converged: bool,
}

/// Value iteration engine.
///
/// Sweeps update the value grid in place, row by row, so later states in a
/// sweep already see the values written earlier in that same sweep.
pub struct ValueIteration<'a> {
    pub mdp: Mdp<'a>,
    pub threshold: f64,
    pub max_iterations: usize,
}

impl<'a> ValueIteration<'a> {
    pub fn new(grid: &'a Grid, config: &PlanningConfig) -> Result<ValueIteration<'a>> {
        let config = config.validate()?;
        Ok(ValueIteration {
            mdp: Mdp::new(grid, config.gamma),
            threshold: config.threshold,
            max_iterations: config.max_iterations,
        })
    }

    /// One Bellman sweep over the free cells. Returns the largest change.
    pub fn sweep(&self, values: &mut ndarray::Array2<f64>) -> f64 {
        let mut delta: f64 = 0.0;
        for s in self.mdp.grid.states() {
            if !self.mdp.grid.is_free(&s) {
                continue;
            }
            let old = values[s.index()];
            let (_, q) = self.mdp.best_action(&s, values);
            values[s.index()] = q;
            delta = delta.max((old - q).abs());
        }
        delta
    }

    pub fn run(&self) -> Solution {
        let mut values = ndarray::Array2::<f64>::zeros(self.mdp.grid.dim());
        let mut delta = 0.0;
        for sweep in 1..=self.max_iterations {
            delta = self.sweep(&mut values);
            debug!(sweep, delta, "value iteration sweep");
            if delta < self.threshold {
                info!(sweeps = sweep, gamma = self.mdp.gamma, "value iteration converged");
                return Solution { values, sweeps: sweep, delta, converged: true };
            }
        }
        warn!(
            sweeps = self.max_iterations,
            delta,
            threshold = self.threshold,
            "value iteration stopped before converging"
        );
        Solution { values, sweeps: self.max_iterations, delta, converged: false }
    }
}

/// Fixture maps shared by the solver and policy tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use crate::grid::Grid;

    pub fn linear() -> Grid {
        Grid::new(vec![vec![4, 0, 0, 0, 0, 0, 0, 1]]).unwrap()
    }

    pub fn uturn() -> Grid {
        Grid::new(vec![
            vec![0, 0, 0, 0, 0],
            vec![0, -1, 0, -1, 0],
            vec![0, -1, 0, -1, 0],
            vec![0, -1, 1, -1, 0],
        ])
        .unwrap()
    }

    pub fn center() -> Grid {
        Grid::new(vec![
            vec![1, 0, 0, 0, 1],
            vec![0, -1, 0, -1, 0],
            vec![0, 0, 10, 0, 0],
            vec![0, -1, 0, -1, 0],
            vec![1, 0, 0, 0, 1],
        ])
        .unwrap()
    }
}
