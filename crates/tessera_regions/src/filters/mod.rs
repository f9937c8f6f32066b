//! Discretized signal filters as the firmware executes them.
//!
//! Each filter is applied to a vector of `width` values. The firmware selects
//! the filter loop by method index and reads the payload words the loop
//! needs; the payload is computed here at a fixed simulation timestep.

pub mod discretize;

use crate::error::FilterError;
use serde::{Deserialize, Serialize};
use tessera_common::{fix_slice, value_to_fix};

pub use discretize::{zoh, DiscreteTf};

/// Number of header words preceding each filter's payload.
pub const FILTER_HEADER_WORDS: usize = 4;

/// Flag bit set when the filter holds its input between packets.
pub const FLAG_LATCHING: u32 = 1 << 0;

/// The continuous-time synapse model of a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterKind {
    /// Values pass through unchanged.
    None,
    /// First-order exponential decay with the given time constant in seconds.
    Lowpass {
        /// Time constant `τ` in seconds.
        time_constant: f64,
    },
    /// A general linear transfer function `num(s) / den(s)`, coefficients
    /// ordered from the highest power of `s`.
    Linear {
        /// Numerator coefficients.
        num: Vec<f64>,
        /// Denominator coefficients.
        den: Vec<f64>,
    },
}

impl FilterKind {
    /// Creates a validated lowpass filter.
    pub fn lowpass(time_constant: f64) -> Result<Self, FilterError> {
        let kind = FilterKind::Lowpass { time_constant };
        kind.validate()?;
        Ok(kind)
    }

    /// Creates a validated linear filter.
    pub fn linear(num: Vec<f64>, den: Vec<f64>) -> Result<Self, FilterError> {
        let kind = FilterKind::Linear { num, den };
        kind.validate()?;
        Ok(kind)
    }

    /// Checks the continuous-time parameters.
    pub fn validate(&self) -> Result<(), FilterError> {
        match self {
            FilterKind::None => Ok(()),
            FilterKind::Lowpass { time_constant } => {
                if time_constant.is_finite() && *time_constant > 0.0 {
                    Ok(())
                } else {
                    Err(FilterError::InvalidTimeConstant(*time_constant))
                }
            }
            FilterKind::Linear { num, den } => {
                let lead = *den.first().ok_or(FilterError::EmptyDenominator)?;
                if num.iter().chain(den).any(|v| !v.is_finite()) {
                    return Err(FilterError::NonFinite);
                }
                if lead == 0.0 {
                    return Err(FilterError::ZeroLeadingDenominator);
                }
                if num.len() > den.len() {
                    return Err(FilterError::Improper {
                        num: num.len(),
                        den: den.len(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Index of the firmware loop that executes this filter.
    pub fn method_index(&self) -> u32 {
        match self {
            FilterKind::None => 0,
            FilterKind::Lowpass { .. } => 1,
            FilterKind::Linear { .. } => 2,
        }
    }

    /// Number of payload words, independent of the timestep.
    pub fn payload_words(&self) -> usize {
        match self {
            FilterKind::None => 0,
            FilterKind::Lowpass { .. } => 2,
            FilterKind::Linear { den, .. } => 1 + 2 * den.len().saturating_sub(1),
        }
    }

    /// Computes the payload words at timestep `dt`.
    pub fn payload(&self, dt: f64) -> Result<Vec<u32>, FilterError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(FilterError::InvalidTimestep(dt));
        }
        self.validate()?;

        match self {
            FilterKind::None => Ok(Vec::new()),
            FilterKind::Lowpass { time_constant } => {
                let a = (-dt / time_constant).exp();
                let b = 1.0 - a;
                Ok(vec![fix_word(a), fix_word(b)])
            }
            FilterKind::Linear { num, den } => {
                let tf = zoh(num, den, dt)?;
                if tf.num[0] != 0.0 {
                    return Err(FilterError::NotStrictlyProper { leading: tf.num[0] });
                }

                let order = tf.order();
                let feedback: Vec<f64> = tf.den[1..].iter().map(|a| -a).collect();
                let feedforward = fix_slice(&tf.num[1..]);

                let mut words = Vec::with_capacity(1 + 2 * order);
                words.push(order as u32);
                for (a, b) in fix_slice(&feedback).into_iter().zip(feedforward) {
                    words.push(a as u32);
                    words.push(b as u32);
                }
                Ok(words)
            }
        }
    }
}

fn fix_word(value: f64) -> u32 {
    value_to_fix(value) as u32
}

/// A filter as stored in the filter region.
///
/// Equality is exact and drives deduplication of the filter table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Number of values the filter operates on.
    pub width: u32,
    /// Whether the filter holds its input until the next packet arrives.
    pub latching: bool,
    /// The synapse model.
    pub kind: FilterKind,
}

impl Filter {
    /// Creates a filter.
    pub fn new(width: u32, latching: bool, kind: FilterKind) -> Self {
        Self {
            width,
            latching,
            kind,
        }
    }

    /// Header flags word.
    pub fn flags(&self) -> u32 {
        if self.latching {
            FLAG_LATCHING
        } else {
            0
        }
    }

    /// Total words occupied by this filter: header plus payload.
    pub fn size_words(&self) -> usize {
        FILTER_HEADER_WORDS + self.kind.payload_words()
    }

    /// Appends the header and payload words for this filter.
    pub fn pack_into(&self, dt: f64, words: &mut Vec<u32>) -> Result<(), FilterError> {
        let payload = self.kind.payload(dt)?;
        words.extend([
            payload.len() as u32,
            self.kind.method_index(),
            self.width,
            self.flags(),
        ]);
        words.extend(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_common::fix_to_value;

    #[test]
    fn method_indices_and_sizes() {
        let none = Filter::new(3, false, FilterKind::None);
        let lowpass = Filter::new(3, false, FilterKind::lowpass(0.05).unwrap());
        let linear = Filter::new(
            3,
            false,
            FilterKind::linear(vec![1.0], vec![1.0, 3.0, 2.0]).unwrap(),
        );
        assert_eq!(none.kind.method_index(), 0);
        assert_eq!(lowpass.kind.method_index(), 1);
        assert_eq!(linear.kind.method_index(), 2);
        assert_eq!(none.size_words(), 4);
        assert_eq!(lowpass.size_words(), 6);
        assert_eq!(linear.size_words(), 9);
    }

    #[test]
    fn lowpass_payload() {
        let words = FilterKind::lowpass(0.01).unwrap().payload(0.001).unwrap();
        assert_eq!(
            words,
            vec![
                value_to_fix((-0.1f64).exp()) as u32,
                value_to_fix(1.0 - (-0.1f64).exp()) as u32,
            ]
        );
    }

    #[test]
    fn first_order_linear_matches_lowpass() {
        let tau = 0.01;
        let dt = 0.001;
        let lowpass = FilterKind::lowpass(tau).unwrap().payload(dt).unwrap();
        let linear = FilterKind::linear(vec![1.0], vec![tau, 1.0])
            .unwrap()
            .payload(dt)
            .unwrap();

        assert_eq!(linear.len(), 3);
        assert_eq!(linear[0], 1);
        // -den[1] and num[1] of the discretized filter are a and b.
        for (got, want) in linear[1..].iter().zip(&lowpass) {
            let diff = (*got as i32 as i64 - *want as i32 as i64).abs();
            assert!(diff <= 1, "{got:#x} vs {want:#x}");
        }
    }

    #[test]
    fn second_order_payload_layout() {
        let words = FilterKind::linear(vec![1.0], vec![1.0, 3.0, 2.0])
            .unwrap()
            .payload(0.1)
            .unwrap();
        assert_eq!(words.len(), 5);
        assert_eq!(words[0], 2);
        let (p1, p2) = ((-0.1f64).exp(), (-0.2f64).exp());
        let a1 = fix_to_value(words[1] as i32);
        let a2 = fix_to_value(words[3] as i32);
        assert!((a1 - (p1 + p2)).abs() < 1e-4);
        assert!((a2 + p1 * p2).abs() < 1e-4);
    }

    #[test]
    fn feedthrough_is_rejected() {
        let err = FilterKind::linear(vec![1.0, 1.0], vec![1.0, 1.0])
            .unwrap()
            .payload(0.001)
            .unwrap_err();
        assert!(matches!(err, FilterError::NotStrictlyProper { leading } if leading == 1.0));
    }

    #[test]
    fn invalid_parameters() {
        assert_eq!(
            FilterKind::lowpass(0.0).unwrap_err(),
            FilterError::InvalidTimeConstant(0.0)
        );
        assert!(FilterKind::lowpass(f64::INFINITY).is_err());
        assert_eq!(
            FilterKind::linear(vec![1.0], vec![]).unwrap_err(),
            FilterError::EmptyDenominator
        );
        assert_eq!(
            FilterKind::None.payload(-1.0).unwrap_err(),
            FilterError::InvalidTimestep(-1.0)
        );
    }

    #[test]
    fn pack_header() {
        let filter = Filter::new(16, true, FilterKind::lowpass(0.01).unwrap());
        let mut words = Vec::new();
        filter.pack_into(0.001, &mut words).unwrap();
        assert_eq!(words.len(), filter.size_words());
        assert_eq!(&words[..4], &[2, 1, 16, FLAG_LATCHING]);
    }

    #[test]
    fn equality_is_exact() {
        let a = Filter::new(2, false, FilterKind::lowpass(0.05).unwrap());
        assert_eq!(a, Filter::new(2, false, FilterKind::lowpass(0.05).unwrap()));
        assert_ne!(a, Filter::new(2, true, FilterKind::lowpass(0.05).unwrap()));
        assert_ne!(a, Filter::new(3, false, FilterKind::lowpass(0.05).unwrap()));
        assert_ne!(a, Filter::new(2, false, FilterKind::lowpass(0.050001).unwrap()));
        assert_ne!(
            Filter::new(2, false, FilterKind::linear(vec![1.0], vec![1.0, 1.0]).unwrap()),
            Filter::new(2, false, FilterKind::linear(vec![0.0, 1.0], vec![1.0, 1.0]).unwrap()),
        );
    }

    #[test]
    fn serde_roundtrip() {
        let f = Filter::new(4, false, FilterKind::linear(vec![1.0], vec![0.1, 1.0]).unwrap());
        let json = serde_json::to_string(&f).unwrap();
        let back: Filter = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }
}
