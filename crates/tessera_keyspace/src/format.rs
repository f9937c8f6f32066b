//! Key formats: named, tagged bit fields inside a 32-bit routing key.

use crate::error::KeyspaceError;
use crate::{CLUSTER_FIELD, FILTER_ROUTING_TAG, INDEX_FIELD, ROUTING_TAG};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Width of a routing key in bits.
pub const KEY_BITS: u32 = 32;

/// A named bit field inside a routing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyField {
    /// The field name (e.g. `"cluster"`).
    pub name: String,
    /// Position of the least significant bit of the field.
    pub offset: u32,
    /// Width of the field in bits.
    pub length: u32,
    /// Tags selecting the field into tag-wide key/mask pairs.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl KeyField {
    /// Creates a field from its name, position and tags.
    pub fn new(name: impl Into<String>, offset: u32, length: u32, tags: &[&str]) -> Self {
        Self {
            name: name.into(),
            offset,
            length,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Largest value the field can hold.
    pub fn max_value(&self) -> u32 {
        if self.length >= KEY_BITS {
            u32::MAX
        } else {
            (1u32 << self.length) - 1
        }
    }

    /// The field's bits within the key.
    pub fn mask(&self) -> u32 {
        self.max_value() << self.offset
    }

    /// Returns whether the field carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    fn validate(&self) -> Result<(), KeyspaceError> {
        let reason = if self.name.is_empty() {
            Some("field name is empty".to_string())
        } else if self.length == 0 {
            Some("field has zero width".to_string())
        } else if self.offset >= KEY_BITS || self.length > KEY_BITS - self.offset {
            Some(format!(
                "bits {}..{} exceed the {KEY_BITS}-bit key",
                self.offset,
                u64::from(self.offset) + u64::from(self.length)
            ))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(KeyspaceError::InvalidField {
                field: self.name.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// A validated set of fields describing one family of routing keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFormat {
    name: String,
    fields: Vec<KeyField>,
}

impl KeyFormat {
    /// Starts declaring a new format.
    pub fn builder(name: impl Into<String>) -> KeyFormatBuilder {
        KeyFormatBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// The standard layout used for neural signal keys.
    ///
    /// | field        | bits    | tags                      |
    /// |--------------|---------|---------------------------|
    /// | `object`     | 24..32  | routing, filter_routing   |
    /// | `cluster`    | 18..24  | routing, filter_routing   |
    /// | `connection` | 10..18  | filter_routing            |
    /// | `index`      | 0..10   |                           |
    pub fn standard() -> Arc<Self> {
        Arc::new(Self {
            name: "nengo".to_string(),
            fields: vec![
                KeyField::new("object", 24, 8, &[ROUTING_TAG, FILTER_ROUTING_TAG]),
                KeyField::new(CLUSTER_FIELD, 18, 6, &[ROUTING_TAG, FILTER_ROUTING_TAG]),
                KeyField::new("connection", 10, 8, &[FILTER_ROUTING_TAG]),
                KeyField::new(INDEX_FIELD, 0, 10, &[]),
            ],
        })
    }

    /// The format name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All declared fields in declaration order.
    pub fn fields(&self) -> &[KeyField] {
        &self.fields
    }

    /// Looks up a declared field.
    pub fn field(&self, name: &str) -> Option<&KeyField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns whether the format declares the field.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Looks up a declared field, failing with `UnavailableField` otherwise.
    pub fn require_field(&self, name: &str) -> Result<&KeyField, KeyspaceError> {
        self.field(name)
            .ok_or_else(|| KeyspaceError::UnavailableField {
                field: name.to_string(),
                format: self.name.clone(),
            })
    }

    /// Fields carrying the given tag.
    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a KeyField> + 'a {
        self.fields.iter().filter(move |f| f.has_tag(tag))
    }

    /// Union of the masks of every field carrying the tag.
    pub fn mask_for_tag(&self, tag: &str) -> u32 {
        self.tagged(tag).fold(0, |mask, f| mask | f.mask())
    }

    /// Union of every field mask.
    pub fn mask(&self) -> u32 {
        self.fields.iter().fold(0, |mask, f| mask | f.mask())
    }
}

/// Incremental declaration of a [`KeyFormat`].
#[derive(Debug, Clone)]
pub struct KeyFormatBuilder {
    name: String,
    fields: Vec<KeyField>,
}

impl KeyFormatBuilder {
    /// Declares a field at `offset` spanning `length` bits.
    pub fn field(mut self, name: impl Into<String>, offset: u32, length: u32, tags: &[&str]) -> Self {
        self.fields.push(KeyField::new(name, offset, length, tags));
        self
    }

    /// Declares an already-built field.
    pub fn with_field(mut self, field: KeyField) -> Self {
        self.fields.push(field);
        self
    }

    /// Validates the declarations and freezes the format.
    pub fn build(self) -> Result<Arc<KeyFormat>, KeyspaceError> {
        for (i, field) in self.fields.iter().enumerate() {
            field.validate()?;
            for earlier in &self.fields[..i] {
                if earlier.name == field.name {
                    return Err(KeyspaceError::DuplicateField(field.name.clone()));
                }
                if earlier.mask() & field.mask() != 0 {
                    return Err(KeyspaceError::OverlappingFields {
                        first: earlier.name.clone(),
                        second: field.name.clone(),
                    });
                }
            }
        }
        Ok(Arc::new(KeyFormat {
            name: self.name,
            fields: self.fields,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_masks() {
        let f = KeyField::new("cluster", 18, 6, &[]);
        assert_eq!(f.max_value(), 63);
        assert_eq!(f.mask(), 0x00FC_0000);

        let whole = KeyField::new("all", 0, 32, &[]);
        assert_eq!(whole.max_value(), u32::MAX);
        assert_eq!(whole.mask(), u32::MAX);
    }

    #[test]
    fn standard_layout() {
        let fmt = KeyFormat::standard();
        assert_eq!(fmt.name(), "nengo");
        assert!(fmt.has_field(CLUSTER_FIELD));
        assert!(fmt.has_field(INDEX_FIELD));
        assert_eq!(fmt.mask_for_tag(ROUTING_TAG), 0xFFFC_0000);
        assert_eq!(fmt.mask_for_tag(FILTER_ROUTING_TAG), 0xFFFF_FC00);
        assert_eq!(fmt.mask(), u32::MAX);
    }

    #[test]
    fn builder_accepts_disjoint_fields() {
        let fmt = KeyFormat::builder("test")
            .field("object", 16, 16, &[ROUTING_TAG])
            .field("index", 0, 8, &[])
            .build()
            .unwrap();
        assert_eq!(fmt.fields().len(), 2);
        assert!(!fmt.has_field(CLUSTER_FIELD));
        assert_eq!(fmt.tagged(ROUTING_TAG).count(), 1);
    }

    #[test]
    fn builder_rejects_overlap() {
        let err = KeyFormat::builder("test")
            .field("a", 0, 8, &[])
            .field("b", 4, 8, &[])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            KeyspaceError::OverlappingFields {
                first: "a".into(),
                second: "b".into()
            }
        );
    }

    #[test]
    fn builder_rejects_duplicate() {
        let err = KeyFormat::builder("test")
            .field("a", 0, 8, &[])
            .field("a", 8, 8, &[])
            .build()
            .unwrap_err();
        assert_eq!(err, KeyspaceError::DuplicateField("a".into()));
    }

    #[test]
    fn builder_rejects_out_of_range() {
        let err = KeyFormat::builder("test")
            .field("a", 28, 8, &[])
            .build()
            .unwrap_err();
        assert!(matches!(err, KeyspaceError::InvalidField { .. }));

        let err = KeyFormat::builder("test")
            .field("a", 0, 0, &[])
            .build()
            .unwrap_err();
        assert!(matches!(err, KeyspaceError::InvalidField { .. }));

        let err = KeyFormat::builder("test")
            .field("a", u32::MAX, 1, &[])
            .build()
            .unwrap_err();
        assert!(matches!(err, KeyspaceError::InvalidField { .. }));
    }

    #[test]
    fn require_missing_field() {
        let fmt = KeyFormat::builder("other").field("x", 0, 4, &[]).build().unwrap();
        let err = fmt.require_field(CLUSTER_FIELD).unwrap_err();
        assert!(matches!(err, KeyspaceError::UnavailableField { .. }));
    }

    #[test]
    fn field_serde_roundtrip() {
        let f = KeyField::new("object", 24, 8, &[ROUTING_TAG]);
        let json = serde_json::to_string(&f).unwrap();
        let back: KeyField = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }
}
