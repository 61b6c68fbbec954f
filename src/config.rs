use std::path::Path;

use config_file::FromConfigFile;
use serde::Deserialize;

use crate::error::{GridError, Result};

/// Planning parameters, read from a TOML file such as:
///
/// ```toml
/// gamma = 0.8
/// threshold = 0.0001
/// max_iterations = 100
/// ```
///
/// Missing keys take their defaults.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PlanningConfig {
    /// Discount rate, in (0, 1]
    pub gamma: f64,
    /// Sweeps stop once the largest value change falls below this
    pub threshold: f64,
    /// Upper bound on the number of sweeps
    pub max_iterations: usize,
}

impl Default for PlanningConfig {
    fn default() -> PlanningConfig {
        PlanningConfig { gamma: 0.9, threshold: 0.0001, max_iterations: 100 }
    }
}

impl PlanningConfig {
    pub fn new(gamma: f64, threshold: f64, max_iterations: usize) -> Result<PlanningConfig> {
        let config = PlanningConfig { gamma, threshold, max_iterations };
        config.validate()?;
        Ok(config)
    }

    pub fn with_gamma(gamma: f64) -> Result<PlanningConfig> {
        PlanningConfig { gamma, ..PlanningConfig::default() }.validate()
    }

    pub fn load(path: &Path) -> Result<PlanningConfig> {
        let config = PlanningConfig::from_config_file(path).map_err(|source| GridError::Load {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()
    }

    pub fn validate(self) -> Result<PlanningConfig> {
        // NaN fails every comparison, so test for the valid range.
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(GridError::InvalidParameter {
                name: "gamma",
                reason: format!("{} is not in (0, 1]", self.gamma),
            });
        }
        if !(self.threshold > 0.0) {
            return Err(GridError::InvalidParameter {
                name: "threshold",
                reason: format!("{} is not positive", self.threshold),
            });
        }
        if self.max_iterations == 0 {
            return Err(GridError::InvalidParameter {
                name: "max_iterations",
                reason: String::from("must be at least 1"),
            });
        }
        Ok(self)
    }
}
