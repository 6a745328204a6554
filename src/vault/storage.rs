use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::host::MetadataEdit;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("toml deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("vault directory not found: {0}")]
    NotFound(PathBuf),
    #[error("invalid note {path}: {reason}")]
    InvalidNote { path: PathBuf, reason: String },
    #[error("note path escapes the vault: {0:?}")]
    OutsideVault(String),
}

/// A note split into its frontmatter table and Markdown body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteFile {
    pub frontmatter: toml::Table,
    pub body: String,
}

/// Parse `---` delimited TOML frontmatter from a string.
/// Returns (frontmatter, body), or `None` when there is no complete block.
///
/// Normalizes `\r\n` to `\n` so files edited on Windows parse correctly.
/// The body is kept as written, minus the newline after the closing `---`.
/// A `---` line inside a multi-line string does not close the block: the
/// first delimiter line after which the block parses as TOML wins.
pub fn parse_frontmatter(content: &str) -> Option<(String, String)> {
    let content = content.replace("\r\n", "\n");
    let content = content.trim_start();
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let mut offset = first.len();
    let mut frontmatter = String::new();
    let mut fallback = None;
    for line in lines {
        offset += line.len();
        if line.trim_end() == "---" {
            let fm = frontmatter.strip_suffix('\n').unwrap_or(&frontmatter);
            let split = (fm.to_string(), content[offset..].to_string());
            if fm.parse::<toml_edit::DocumentMut>().is_ok() {
                return Some(split);
            }
            fallback.get_or_insert(split);
        }
        frontmatter.push_str(line);
    }
    fallback
}

fn invalid_note(path: &Path, reason: impl Into<String>) -> StorageError {
    StorageError::InvalidNote {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Split a note. Text without a leading `---` has an empty frontmatter.
pub fn parse_note(path: &Path, content: &str) -> Result<NoteFile, StorageError> {
    if !content.trim_start().starts_with("---") {
        return Ok(NoteFile {
            frontmatter: toml::Table::new(),
            body: content.to_string(),
        });
    }
    let (frontmatter, body) =
        parse_frontmatter(content).ok_or_else(|| invalid_note(path, "unterminated frontmatter"))?;
    let frontmatter: toml::Table =
        toml::from_str(&frontmatter).map_err(|e| invalid_note(path, format!("invalid TOML: {e}")))?;
    Ok(NoteFile { frontmatter, body })
}

/// Apply `edit` to the frontmatter of `content` and return the new file text.
///
/// Only the edited key changes: comments, key order and formatting of the
/// rest of the block survive, and the body is kept as written. A block left
/// with nothing in it is dropped.
pub fn edit_note(path: &Path, content: &str, edit: &MetadataEdit) -> Result<String, StorageError> {
    let (frontmatter, body) = if content.trim_start().starts_with("---") {
        parse_frontmatter(content).ok_or_else(|| invalid_note(path, "unterminated frontmatter"))?
    } else {
        (String::new(), content.to_string())
    };
    let mut doc: toml_edit::DocumentMut = frontmatter
        .parse()
        .map_err(|e: toml_edit::TomlError| invalid_note(path, format!("invalid TOML: {e}")))?;
    edit.apply(&mut doc);

    let fm = doc.to_string();
    if fm.trim().is_empty() {
        return Ok(body);
    }
    let mut out = String::with_capacity(fm.len() + body.len() + 8);
    out.push_str("---\n");
    out.push_str(&fm);
    if !fm.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(&body);
    Ok(out)
}

pub fn load_note(path: &Path) -> Result<NoteFile, StorageError> {
    let content = fs::read_to_string(path)?;
    parse_note(path, &content)
}

/// Last modification time, if the platform reports one.
pub fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path).and_then(|m| m.modified()).ok().map(DateTime::<Utc>::from)
}

/// Re-read a note, apply `edit` to its frontmatter and write it back.
pub async fn rewrite_note(path: &Path, edit: &MetadataEdit) -> Result<(), StorageError> {
    let content = tokio::fs::read_to_string(path).await?;
    let out = edit_note(path, &content, edit)?;
    if out != content.replace("\r\n", "\n") {
        tokio::fs::write(path, out).await?;
    }
    Ok(())
}

/// Every `*.md` file below `root`, skipping hidden directories, sorted.
pub fn scan_notes(root: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut found = Vec::new();
    scan_dir(root, &mut found)?;
    found.sort();
    Ok(found)
}

fn scan_dir(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), StorageError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if !hidden {
                scan_dir(&path, found)?;
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            found.push(path);
        }
    }
    Ok(())
}

/// Vault-relative identity of a note: `/`-separated, no leading slash.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Resolve a vault-relative path, rejecting anything that could leave `root`.
pub fn resolve_in_vault(root: &Path, rel: &str) -> Result<PathBuf, StorageError> {
    let rel_path = Path::new(rel);
    let safe = !rel.is_empty() && rel_path.components().all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(StorageError::OutsideVault(rel.to_string()));
    }
    Ok(root.join(rel_path))
}
