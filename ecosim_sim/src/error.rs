// Error taxonomy for the simulation.
//
// - `ConfigError`: the configuration (or the world it produces) is invalid.
//   Carries every violated constraint, not just the first, and is reported
//   before any tick runs. Values are never clamped into range.
// - `CellError`: a single grid or grass operation was refused (cell occupied,
//   rock, wrong occupant, no grass). Callers that checked first never see one;
//   inside the engine it means the claim protocol was broken.
// - `SimError`: what `TickEngine` returns. `EngineStopped` is a caller error;
//   `InvariantViolation` is a bug and stops the engine for good.
//
// See also: `config.rs` for `EcoConfig::validate()`, `grid.rs` / `grass.rs`
// for the operations that return `CellError`, `engine.rs` for the fail-fast
// handling of invariant violations.

use crate::types::{AgentId, Coord};
use std::fmt;
use thiserror::Error;

/// One violated configuration constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigViolation {
    /// Dotted path of the offending field, e.g. `herbivore.reproduction_split`.
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every constraint a configuration failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid configuration ({} violation(s)): {}", .violations.len(), join(.violations))]
pub struct ConfigError {
    pub violations: Vec<ConfigViolation>,
}

impl ConfigError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![ConfigViolation {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// Whether any violation names `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates violations while a config is checked.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<ConfigViolation>);

impl Violations {
    pub(crate) fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.0.push(ConfigViolation {
                field: field.to_string(),
                message: message.into(),
            });
        }
    }

    pub(crate) fn extend(&mut self, other: Violations) {
        self.0.extend(other.0);
    }

    pub(crate) fn into_result(self) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { violations: self.0 })
        }
    }
}

/// A refused grid or grass operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("cell {0} is rock")]
    Rock(Coord),
    #[error("cell {coord} is already held by {occupant}")]
    Occupied { coord: Coord, occupant: AgentId },
    #[error("cell {coord} does not hold {expected}")]
    NotOccupant { coord: Coord, expected: AgentId },
    #[error("cell {0} has no occupant")]
    Empty(Coord),
    #[error("cell {0} has no grass to eat")]
    NoGrass(Coord),
}

/// Errors surfaced by `TickEngine`.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("engine is stopped; step() is no longer allowed")]
    EngineStopped,
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
    #[error("checkpoint could not be decoded: {0}")]
    Checkpoint(#[from] serde_json::Error),
}

impl From<CellError> for SimError {
    fn from(err: CellError) -> Self {
        SimError::InvariantViolation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_lists_every_violation() {
        let mut v = Violations::default();
        v.check(false, "grid_width", "must be at least 1");
        v.check(true, "grid_height", "unused");
        v.check(false, "terrain.rock_threshold", "must lie in [-1, 1]");
        let err = v.into_result().unwrap_err();
        assert_eq!(err.violations.len(), 2);
        let text = err.to_string();
        assert!(text.contains("2 violation(s)"));
        assert!(text.contains("grid_width: must be at least 1"));
        assert!(text.contains("terrain.rock_threshold"));
        assert!(err.mentions("grid_width"));
        assert!(!err.mentions("grid_height"));
    }

    #[test]
    fn empty_violations_are_ok() {
        assert!(Violations::default().into_result().is_ok());
    }

    #[test]
    fn cell_error_becomes_invariant_violation() {
        let err: SimError = CellError::Occupied {
            coord: Coord::new(1, 2),
            occupant: AgentId(9),
        }
        .into();
        match err {
            SimError::InvariantViolation(msg) => {
                assert!(msg.contains("(1, 2)"));
                assert!(msg.contains("agent#9"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
