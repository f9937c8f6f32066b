//! Error types for filter construction and region encoding.

use tessera_common::InternalError;
use tessera_keyspace::KeyspaceError;

/// Errors raised by filter parameters or their discretization.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// A lowpass time constant that is not positive and finite.
    #[error("lowpass time constant must be positive and finite, got {0}")]
    InvalidTimeConstant(f64),

    /// A transfer function without denominator coefficients.
    #[error("transfer function has an empty denominator")]
    EmptyDenominator,

    /// A transfer function whose leading denominator coefficient is zero.
    #[error("leading denominator coefficient must be non-zero")]
    ZeroLeadingDenominator,

    /// A transfer function with more zeros than poles.
    #[error("transfer function is improper: numerator has {num} coefficients, denominator {den}")]
    Improper {
        /// Number of numerator coefficients.
        num: usize,
        /// Number of denominator coefficients.
        den: usize,
    },

    /// A coefficient or parameter that is NaN or infinite.
    #[error("filter parameters must be finite")]
    NonFinite,

    /// A simulation timestep that is not positive and finite.
    #[error("simulation timestep must be positive and finite, got {0}")]
    InvalidTimestep(f64),

    /// The discretized filter has a direct feed-through term, which the
    /// firmware's filter loop cannot represent.
    #[error("discretized filter is not strictly proper (leading numerator coefficient {leading})")]
    NotStrictlyProper {
        /// The discretized leading numerator coefficient.
        leading: f64,
    },
}

/// Errors raised while encoding a memory region.
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    /// A filter in the table could not be packed.
    #[error("filter {index}: {source}")]
    Filter {
        /// Position of the filter in the filter table.
        index: usize,
        /// The underlying filter error.
        #[source]
        source: FilterError,
    },

    /// A routing key lacks a field the region layout needs.
    #[error(transparent)]
    Keyspace(#[from] KeyspaceError),

    /// A count or width does not fit in one 32-bit word.
    #[error("{what} ({value}) does not fit in a 32-bit word")]
    Overflow {
        /// What was being written.
        what: &'static str,
        /// The offending value.
        value: usize,
    },

    /// A region's encoding disagrees with its declared layout.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// Writing the encoded region failed.
    #[error("failed to write region: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_strictly_proper() {
        let err = FilterError::NotStrictlyProper { leading: 1.0 };
        assert_eq!(
            format!("{err}"),
            "discretized filter is not strictly proper (leading numerator coefficient 1)"
        );
    }

    #[test]
    fn display_region_filter_error() {
        let err = RegionError::Filter {
            index: 3,
            source: FilterError::EmptyDenominator,
        };
        assert_eq!(
            format!("{err}"),
            "filter 3: transfer function has an empty denominator"
        );
    }

    #[test]
    fn keyspace_error_is_transparent() {
        let err: RegionError = KeyspaceError::DuplicateField("index".into()).into();
        assert_eq!(format!("{err}"), "field `index` is declared more than once");
    }
}
