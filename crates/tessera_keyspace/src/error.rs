//! Error types for key formats and routing keys.

/// Errors raised while declaring key formats or reading and writing keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyspaceError {
    /// The field is not declared by the key's format.
    #[error("field `{field}` is not available in key format `{format}`")]
    UnavailableField {
        /// The requested field name.
        field: String,
        /// The name of the key's format.
        format: String,
    },

    /// The value does not fit in the field's bit width.
    #[error("value {value} does not fit in the {length}-bit field `{field}`")]
    ValueTooLarge {
        /// The field being written.
        field: String,
        /// The rejected value.
        value: u32,
        /// Width of the field in bits.
        length: u32,
    },

    /// A field declaration is malformed.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// The offending field name.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two fields claim the same key bits.
    #[error("fields `{first}` and `{second}` overlap")]
    OverlappingFields {
        /// The field declared first.
        first: String,
        /// The field declared second.
        second: String,
    },

    /// A field name is declared twice.
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unavailable_field() {
        let err = KeyspaceError::UnavailableField {
            field: "cluster".into(),
            format: "test".into(),
        };
        assert_eq!(
            format!("{err}"),
            "field `cluster` is not available in key format `test`"
        );
    }

    #[test]
    fn display_value_too_large() {
        let err = KeyspaceError::ValueTooLarge {
            field: "cluster".into(),
            value: 64,
            length: 6,
        };
        assert_eq!(
            format!("{err}"),
            "value 64 does not fit in the 6-bit field `cluster`"
        );
    }
}
