//! A folder of Markdown notes acting as the view's host.

pub mod settings;
pub mod storage;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{KanbanError, Result};
use crate::host::{Entry, EntryError, EntrySource, MetadataEdit, MetadataStore, PropertyKey};
use crate::value::RawValue;
use storage::StorageError;

pub use settings::Settings;

/// Built-in file properties, listed after the frontmatter ones.
pub const FILE_PROPERTIES: [&str; 4] = ["file.name", "file.path", "file.folder", "file.ext"];

/// One Markdown file with its parsed frontmatter.
#[derive(Debug)]
pub struct Note {
    path: String,
    name: String,
    frontmatter: toml::Table,
    modified: Option<DateTime<Utc>>,
}

impl Note {
    fn load(root: &Path, file: &Path) -> std::result::Result<Self, StorageError> {
        let note = storage::load_note(file)?;
        let path = storage::relative_path(root, file).ok_or_else(|| StorageError::InvalidNote {
            path: file.to_path_buf(),
            reason: "not inside the vault".into(),
        })?;
        let name = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        Ok(Self {
            path,
            name,
            frontmatter: note.frontmatter,
            modified: storage::modified_at(file),
        })
    }

    pub fn frontmatter(&self) -> &toml::Table {
        &self.frontmatter
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    /// Folder part of the path, `/` for the vault root.
    pub fn folder(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((folder, _)) => folder,
            None => "/",
        }
    }

    fn file_value(&self, name: &str) -> Option<RawValue> {
        let value = match name {
            "name" => self.name.as_str(),
            "path" => self.path.as_str(),
            "folder" => self.folder(),
            "ext" => "md",
            _ => return None,
        };
        Some(RawValue::text(value))
    }
}

impl Entry for Note {
    fn path(&self) -> &str {
        &self.path
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn value(&self, property: &PropertyKey) -> std::result::Result<RawValue, EntryError> {
        match property.source() {
            Some("note") | None => Ok(self
                .frontmatter
                .get(property.name())
                .map(|v| RawValue::from(v.clone()))
                .unwrap_or(RawValue::Null)),
            Some("file") => self
                .file_value(property.name())
                .ok_or_else(|| EntryError::UnknownProperty(property.clone())),
            Some(_) => Err(EntryError::UnknownProperty(property.clone())),
        }
    }
}

/// Directory of notes. Holds a snapshot that [`Vault::reload`] refreshes.
#[derive(Debug)]
pub struct Vault {
    root: PathBuf,
    notes: RefCell<Vec<Rc<Note>>>,
}

impl Vault {
    pub fn open(root: &Path) -> std::result::Result<Self, StorageError> {
        if !root.is_dir() {
            return Err(StorageError::NotFound(root.to_path_buf()));
        }
        let vault = Self {
            root: root.to_path_buf(),
            notes: RefCell::new(Vec::new()),
        };
        vault.reload()?;
        Ok(vault)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rescan the directory. Notes that fail to parse are skipped.
    pub fn reload(&self) -> std::result::Result<(), StorageError> {
        let mut notes = Vec::new();
        for file in storage::scan_notes(&self.root)? {
            match Note::load(&self.root, &file) {
                Ok(note) => notes.push(Rc::new(note)),
                Err(e) => tracing::warn!(path = %file.display(), "skipping note: {e}"),
            }
        }
        tracing::debug!(root = %self.root.display(), notes = notes.len(), "scanned vault");
        *self.notes.borrow_mut() = notes;
        Ok(())
    }

    pub fn notes(&self) -> Vec<Rc<Note>> {
        self.notes.borrow().clone()
    }

    /// Find a note by vault path, path without `.md`, or unique file stem.
    pub fn find(&self, query: &str) -> Option<Rc<Note>> {
        let notes = self.notes.borrow();
        let query = query.trim_start_matches("./");
        if let Some(note) = notes
            .iter()
            .find(|n| n.path == query || n.path.strip_suffix(".md") == Some(query))
        {
            return Some(Rc::clone(note));
        }
        let mut by_name = notes.iter().filter(|n| n.name == query);
        match (by_name.next(), by_name.next()) {
            (Some(note), None) => Some(Rc::clone(note)),
            _ => None,
        }
    }
}

impl EntrySource for Vault {
    fn entries(&self) -> Result<Vec<Rc<dyn Entry>>> {
        Ok(self
            .notes
            .borrow()
            .iter()
            .map(|n| Rc::clone(n) as Rc<dyn Entry>)
            .collect())
    }

    fn property_keys(&self) -> Vec<PropertyKey> {
        let notes = self.notes.borrow();
        if notes.is_empty() {
            return Vec::new();
        }
        let keys: BTreeSet<&str> = notes
            .iter()
            .flat_map(|n| n.frontmatter.keys().map(String::as_str))
            .collect();
        keys.into_iter()
            .map(|k| PropertyKey::new(format!("note.{k}")))
            .chain(FILE_PROPERTIES.iter().map(|&k| PropertyKey::from(k)))
            .collect()
    }
}

#[async_trait(?Send)]
impl MetadataStore for Vault {
    async fn mutate(&self, path: &str, edit: MetadataEdit) -> Result<()> {
        let metadata_error = |e: StorageError| KanbanError::Metadata {
            path: path.to_string(),
            reason: e.to_string(),
        };
        let file = storage::resolve_in_vault(&self.root, path).map_err(metadata_error)?;
        storage::rewrite_note(&file, &edit).await.map_err(metadata_error)?;
        tracing::debug!(path, field = edit.field(), "updated frontmatter");
        Ok(())
    }
}

/// Format a note's age as a human-readable string.
pub fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - since).num_days().max(0) as u64;
    if days == 0 {
        "new".to_string()
    } else if days < 14 {
        format!("{days}d")
    } else if days < 60 {
        format!("{}w", days / 7)
    } else {
        format!("{}mo", days / 30)
    }
}
