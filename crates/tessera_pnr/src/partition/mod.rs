//! Constraint-driven partitioning of vertex index ranges.
//!
//! A vertex whose resource usage exceeds what one core offers is split into
//! contiguous chunks. Each resource is described by a [`Constraint`] paired
//! with a usage estimator; the partitioner walks the range left to right and
//! cuts the largest chunk that every estimator accepts.
//!
//! Estimators must be monotonically non-decreasing in chunk length. The
//! per-constraint binary search relies on it and cannot check it.

mod constraint;

pub use constraint::{Constraint, ConstraintError};

use std::ops::Range;
use tracing::{debug, trace};

/// Estimates the usage of one resource by a chunk of atoms.
pub type UsageFn<'a> = Box<dyn Fn(&Range<u32>) -> f64 + 'a>;

/// Errors raised by the partitioner.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PartitionError {
    /// Even a single atom at `position` exceeds the constraint's budget.
    #[error("cannot place atom {position}: a single-atom chunk exceeds constraint {constraint}")]
    Unpartitionable {
        /// The first constraint that rejected a one-atom chunk.
        constraint: Constraint,
        /// Index of the atom that could not be placed.
        position: u32,
    },
}

/// An ordered list of constraints, each with its usage estimator.
#[derive(Default)]
pub struct ConstraintSet<'a> {
    entries: Vec<(Constraint, UsageFn<'a>)>,
}

impl<'a> ConstraintSet<'a> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a constraint and its estimator.
    pub fn push(&mut self, constraint: Constraint, usage: impl Fn(&Range<u32>) -> f64 + 'a) {
        self.entries.push((constraint, Box::new(usage)));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, constraint: Constraint, usage: impl Fn(&Range<u32>) -> f64 + 'a) -> Self {
        self.push(constraint, usage);
        self
    }

    /// The constraints in insertion order.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.entries.iter().map(|(c, _)| c)
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the set has no constraints.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lazily splits `range` into the fewest contiguous chunks satisfying
/// every constraint.
///
/// Each item is either the next chunk or the error that stopped the
/// partition; the iterator is fused after an error.
pub fn partition<'s, 'a>(range: Range<u32>, constraints: &'s ConstraintSet<'a>) -> Partition<'s, 'a> {
    Partition {
        cursor: range.start,
        stop: range.end,
        constraints,
        failed: false,
    }
}

/// Collects [`partition`] into a vector, stopping at the first error.
pub fn partition_all(
    range: Range<u32>,
    constraints: &ConstraintSet<'_>,
) -> Result<Vec<Range<u32>>, PartitionError> {
    let chunks = partition(range.clone(), constraints).collect::<Result<Vec<_>, _>>()?;
    debug!(
        start = range.start,
        stop = range.end,
        chunks = chunks.len(),
        "partitioned range"
    );
    Ok(chunks)
}

/// Iterator returned by [`partition`].
pub struct Partition<'s, 'a> {
    cursor: u32,
    stop: u32,
    constraints: &'s ConstraintSet<'a>,
    failed: bool,
}

impl Partition<'_, '_> {
    /// Largest chunk length starting at the cursor that `usage` keeps within
    /// `budget`. Lengths are never probed at 0.
    fn max_length(&self, usage: &UsageFn<'_>, budget: f64) -> u32 {
        let fits = |len: u32| usage(&(self.cursor..self.cursor + len)) <= budget;

        let (mut lo, mut hi) = (0u32, self.stop - self.cursor);
        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            if fits(mid) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }
}

impl Iterator for Partition<'_, '_> {
    type Item = Result<Range<u32>, PartitionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.stop {
            return None;
        }

        let mut length = self.stop - self.cursor;
        for (constraint, usage) in &self.constraints.entries {
            let fit = self.max_length(usage, constraint.max_usage());
            trace!(cursor = self.cursor, fit, %constraint, "constraint fit");
            if fit == 0 {
                self.failed = true;
                return Some(Err(PartitionError::Unpartitionable {
                    constraint: constraint.clone(),
                    position: self.cursor,
                }));
            }
            length = length.min(fit);
        }

        let chunk = self.cursor..self.cursor + length;
        self.cursor += length;
        Some(Ok(chunk))
    }
}

impl std::iter::FusedIterator for Partition<'_, '_> {}
