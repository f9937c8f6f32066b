//! Shared foundational types used across the Tessera mapping backend.
//!
//! This crate provides the internal-error result type, content hashing of
//! emitted memory images, and the fixed-point convention shared by every
//! region encoder.

#![warn(missing_docs)]

pub mod fixed;
pub mod hash;
pub mod result;

pub use fixed::{fix_slice, fix_to_value, value_to_fix, FRACTIONAL_BITS};
pub use hash::{ContentHash, ImageHasher};
pub use result::{InternalError, TessResult};
