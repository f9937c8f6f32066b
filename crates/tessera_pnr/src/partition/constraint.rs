//! Resource constraints: a hard maximum and a target utilisation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised when constructing a [`Constraint`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstraintError {
    /// The maximum is not a positive, finite number.
    #[error("constraint maximum must be positive and finite, got {0}")]
    InvalidMaximum(f64),

    /// The target is outside (0, 1].
    #[error("constraint target must be in (0, 1], got {0}")]
    InvalidTarget(f64),
}

/// A limit on one resource of a core (memory, cycles, ...).
///
/// `max_usage = maximum * target` is the budget a partition chunk may use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    maximum: f64,
    target: f64,
    name: Option<String>,
}

impl Constraint {
    /// Creates a constraint that may be used up to its maximum.
    pub fn new(maximum: f64) -> Result<Self, ConstraintError> {
        Self::with_target(maximum, 1.0)
    }

    /// Creates a constraint that may only be used up to `target` of its maximum.
    pub fn with_target(maximum: f64, target: f64) -> Result<Self, ConstraintError> {
        if !(maximum.is_finite() && maximum > 0.0) {
            return Err(ConstraintError::InvalidMaximum(maximum));
        }
        if !(target > 0.0 && target <= 1.0) {
            return Err(ConstraintError::InvalidTarget(target));
        }
        Ok(Self {
            maximum,
            target,
            name: None,
        })
    }

    /// Attaches a resource name used when reporting failures.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The hard limit of the resource.
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// The fraction of the maximum that may be used.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// The usable budget.
    pub fn max_usage(&self) -> f64 {
        self.maximum * self.target
    }

    /// The resource name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "`{name}` ")?;
        }
        write!(
            f,
            "(maximum {}, target {}, usable {})",
            self.maximum,
            self.target,
            self.max_usage()
        )
    }
}
