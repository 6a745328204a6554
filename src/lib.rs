//! Kanban board view over notes grouped by a metadata property.
//!
//! The view core ([`view`], [`board`], [`drag`]) talks to its host only
//! through the traits in [`host`]. [`vault`] is a host backed by a directory
//! of Markdown notes with TOML frontmatter.

pub mod board;
pub mod dom;
pub mod drag;
pub mod error;
pub mod host;
pub mod plugin;
pub mod value;
pub mod vault;
pub mod view;

#[cfg(test)]
mod testing;

pub use error::{KanbanError, Result};
