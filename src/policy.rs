use crate::error::{GridError, Result};
use crate::solver::{Action, Mdp};

/// Greedy policy over a grid. `None` where there is no decision to make
/// (walls and terminals).
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub actions: ndarray::Array2<Option<Action>>,
}

impl Policy {
    /// Pick the action with the highest Q-value under `values` in every
    /// free cell.
    pub fn extract(mdp: &Mdp, values: &ndarray::Array2<f64>) -> Result<Policy> {
        let grid = mdp.grid;
        if values.dim() != grid.dim() {
            return Err(GridError::ShapeMismatch { expected: grid.dim(), found: values.dim() });
        }
        let mut actions = ndarray::Array2::<Option<Action>>::from_elem(grid.dim(), None);
        for s in grid.states().filter(|s| grid.is_free(s)) {
            let (action, _) = mdp.best_action(&s, values);
            actions[s.index()] = Some(action);
        }
        Ok(Policy { actions })
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Action> {
        self.actions.get([row, col]).copied().flatten()
    }

    pub fn rows(&self) -> Vec<Vec<Option<Action>>> {
        self.actions.rows().into_iter().map(|r| r.to_vec()).collect()
    }
}
