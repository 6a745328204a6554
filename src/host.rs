//! Contracts the kanban view consumes from its host.
//!
//! The view never reaches into global state: every collaborator is handed to
//! it at construction. Everything here runs on the host's single UI thread,
//! hence `Rc` and non-`Send` async methods.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::RawValue;

/// Identifier of a property as the host names it, e.g. `note.status` or
/// `file.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyKey(String);

impl PropertyKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Source namespace before the first dot (`note`, `file`, `formula`), if any.
    pub fn source(&self) -> Option<&str> {
        self.0.split_once('.').map(|(source, _)| source)
    }

    /// The metadata field name: everything after the first dot, or the whole
    /// id when it has no namespace.
    pub fn name(&self) -> &str {
        self.0.split_once('.').map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Failure to read a single entry's property.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("unknown property {0}")]
    UnknownProperty(PropertyKey),
    #[error("{0}")]
    Other(String),
}

/// One host-managed note shown as a card.
pub trait Entry {
    /// Stable identity; used to find the entry again after a drop.
    fn path(&self) -> &str;

    fn display_name(&self) -> &str;

    fn value(&self, property: &PropertyKey) -> std::result::Result<RawValue, EntryError>;
}

/// The host's current query result.
pub trait EntrySource {
    fn entries(&self) -> Result<Vec<std::rc::Rc<dyn Entry>>>;

    fn property_keys(&self) -> Vec<PropertyKey>;
}

/// Per-view configuration, read fresh on every update cycle.
pub trait ViewConfig {
    fn property(&self, option: &str) -> Option<PropertyKey>;
}

/// A change to one note's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataEdit {
    Set { field: String, value: String },
    Remove { field: String },
}

impl MetadataEdit {
    pub fn field(&self) -> &str {
        match self {
            Self::Set { field, .. } | Self::Remove { field } => field,
        }
    }

    /// Apply the edit to a frontmatter document in place. Other keys keep
    /// their order, comments and formatting.
    pub fn apply(&self, frontmatter: &mut toml_edit::Table) {
        match self {
            Self::Set { field, value } => {
                let mut new = toml_edit::Value::from(value.as_str());
                if let Some(old) = frontmatter.get(field).and_then(toml_edit::Item::as_value) {
                    *new.decor_mut() = old.decor().clone();
                }
                frontmatter[field.as_str()] = toml_edit::Item::Value(new);
            }
            Self::Remove { field } => {
                frontmatter.remove(field);
            }
        }
    }
}

/// Transactional metadata writes, scoped to one entry's backing file.
#[async_trait(?Send)]
pub trait MetadataStore {
    async fn mutate(&self, path: &str, edit: MetadataEdit) -> Result<()>;
}

/// Durable column order, keyed by property.
#[async_trait(?Send)]
pub trait OrderStore {
    fn order(&self, property: &PropertyKey) -> Option<Vec<String>>;

    async fn set_order(&self, property: &PropertyKey, order: Vec<String>) -> Result<()>;
}

/// Opens a note; fire-and-forget.
pub trait Navigator {
    fn open(&self, path: &str);
}
