//! Opaque ID newtypes for netlist entities.
//!
//! [`VertexId`], [`SliceId`], and [`NetId`] are thin `u32` wrappers used
//! as indices into the [`Netlist`](crate::Netlist). They are `Copy`, `Hash`,
//! `Ord`, and `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a logical computational unit.
    VertexId
);

define_id!(
    /// Opaque, copyable ID for the part of a vertex realized on one core.
    SliceId
);

define_id!(
    /// Opaque, copyable ID for a signal net.
    NetId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        assert_eq!(VertexId::from_raw(42).as_raw(), 42);
        assert_eq!(SliceId::from_raw(7).as_raw(), 7);
        assert_eq!(NetId::from_raw(99).as_raw(), 99);
    }

    #[test]
    fn id_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(SliceId::from_raw(1));
        set.insert(SliceId::from_raw(2));
        set.insert(SliceId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_ordering() {
        assert!(SliceId::from_raw(1) < SliceId::from_raw(2));
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = NetId::from_raw(55);
        let json = serde_json::to_string(&id).unwrap();
        let restored: NetId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn id_display() {
        assert_eq!(format!("{}", VertexId::from_raw(3)), "3");
    }
}
