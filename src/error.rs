use std::error::Error as StdError;
use std::fmt::Write as _;

use crate::dom::DomError;

/// Result type for kanban view operations
pub type Result<T> = std::result::Result<T, KanbanError>;

#[derive(Debug, thiserror::Error)]
pub enum KanbanError {
    #[error("could not load entries: {0}")]
    EntrySource(String),

    #[error("failed to update {path}: {reason}")]
    Metadata { path: String, reason: String },

    #[error("failed to save column order for {property}: {reason}")]
    OrderPersistence { property: String, reason: String },

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl KanbanError {
    /// Short name of the failure class, used as the error's "name" in
    /// user-facing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EntrySource(_) => "EntrySourceError",
            Self::Metadata { .. } => "MetadataError",
            Self::OrderPersistence { .. } => "OrderPersistenceError",
            Self::Dom(_) => "DomError",
        }
    }
}

/// `[context] Kind: message`
pub fn format_error_message(error: &KanbanError, context: &str) -> String {
    format!("[{context}] {}: {error}", error.kind())
}

/// The error followed by every `source()` in its chain, one per line.
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(out, "\n  caused by: {cause}");
        source = cause.source();
    }
    out
}
