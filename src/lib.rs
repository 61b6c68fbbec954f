pub mod config;
pub mod display;
pub mod error;
pub mod grid;
pub mod policy;
pub mod solver;

pub use config::PlanningConfig;
pub use error::{GridError, Result};
pub use grid::{Cell, Grid, State};
pub use policy::Policy;
pub use solver::{Action, Mdp, Solution, ValueIteration};

/// Run value iteration on `grid` and extract the greedy policy from the
/// resulting values.
pub fn plan(grid: &Grid, config: &PlanningConfig) -> Result<(Solution, Policy)> {
    let engine = ValueIteration::new(grid, config)?;
    let solution = engine.run();
    let policy = Policy::extract(&engine.mdp, &solution.values)?;
    Ok((solution, policy))
}
