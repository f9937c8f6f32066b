//! Mutable routing-key values.

use crate::error::KeyspaceError;
use crate::format::{KeyField, KeyFormat};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One routing key: a shared format plus a value for each field.
///
/// Declared fields that were never written read as 0 and still contribute
/// their mask.
#[derive(Clone, PartialEq, Eq)]
pub struct RoutingKey {
    format: Arc<KeyFormat>,
    values: BTreeMap<String, u32>,
}

impl RoutingKey {
    /// Creates a key with every field at its default value.
    pub fn new(format: Arc<KeyFormat>) -> Self {
        Self {
            format,
            values: BTreeMap::new(),
        }
    }

    /// Builder form of [`set_field`](Self::set_field).
    pub fn with_field(mut self, name: &str, value: u32) -> Result<Self, KeyspaceError> {
        self.set_field(name, value)?;
        Ok(self)
    }

    /// The key's format.
    pub fn format(&self) -> &Arc<KeyFormat> {
        &self.format
    }

    /// Returns whether the field can be written on this key.
    pub fn has_field(&self, name: &str) -> bool {
        self.format.has_field(name)
    }

    /// Reads a field.
    pub fn get_field(&self, name: &str) -> Result<u32, KeyspaceError> {
        let field = self.format.require_field(name)?;
        Ok(self.values.get(&field.name).copied().unwrap_or(0))
    }

    /// Writes a field.
    pub fn set_field(&mut self, name: &str, value: u32) -> Result<(), KeyspaceError> {
        let field = self.format.require_field(name)?;
        if value > field.max_value() {
            return Err(KeyspaceError::ValueTooLarge {
                field: field.name.clone(),
                value,
                length: field.length,
            });
        }
        self.values.insert(field.name.clone(), value);
        Ok(())
    }

    fn value_of<'a>(&self, fields: impl Iterator<Item = &'a KeyField>) -> u32 {
        fields.fold(0, |key, f| {
            let value = self.values.get(&f.name).copied().unwrap_or(0);
            key | (value << f.offset)
        })
    }

    /// Key bits of every field carrying the tag.
    pub fn value_for_tag(&self, tag: &str) -> u32 {
        self.value_of(self.format.tagged(tag))
    }

    /// Mask of every field carrying the tag.
    pub fn mask_for_tag(&self, tag: &str) -> u32 {
        self.format.mask_for_tag(tag)
    }

    /// Mask of a single field.
    pub fn field_mask(&self, name: &str) -> Result<u32, KeyspaceError> {
        Ok(self.format.require_field(name)?.mask())
    }

    /// Key bits of every field.
    pub fn key(&self) -> u32 {
        self.value_of(self.format.fields().iter())
    }

    /// Mask of every field.
    pub fn mask(&self) -> u32 {
        self.format.mask()
    }
}

impl fmt::Debug for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RoutingKey({}: {:#010x}/{:#010x})",
            self.format.name(),
            self.key(),
            self.mask()
        )
    }
}
