//! How serious a mapping diagnostic is.
//!
//! An [`Error`](Severity::Error) means the vertex or region it names is not
//! emitted. A [`Warning`](Severity::Warning) leaves the output intact but
//! flags a mapping that may not behave as intended on the machine, such as
//! placed instances of a partitioned vertex that share routing keys.

use crate::code::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity of a diagnostic, least severe first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Context attached to another diagnostic.
    Note,
    /// The output is produced but is suspect.
    Warning,
    /// The named vertex or region is dropped from the output.
    Error,
}

impl Severity {
    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    /// SGR colour used for the rendered header.
    pub fn ansi_colour(self) -> u8 {
        match self {
            Severity::Note => 36,
            Severity::Warning => 33,
            Severity::Error => 31,
        }
    }
}

/// Codes are issued per category; each category has one severity.
impl From<Category> for Severity {
    fn from(category: Category) -> Self {
        match category {
            Category::Error => Severity::Error,
            Category::Warning => Severity::Warning,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}
