use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::storage::StorageError;
use crate::error::{KanbanError, Result};
use crate::host::{OrderStore, PropertyKey, ViewConfig};
use crate::view::GROUP_BY_OPTION;

pub const SETTINGS_FILE: &str = ".bases-kanban.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewSection {
    #[serde(rename = "groupByProperty", default, skip_serializing_if = "Option::is_none")]
    pub group_by_property: Option<String>,
}

/// Contents of `.bases-kanban.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub view: ViewSection,
    /// Column order per property id.
    #[serde(default)]
    pub column_orders: BTreeMap<String, Vec<String>>,
}

/// View configuration and column order, backed by the settings file.
#[derive(Debug)]
pub struct Settings {
    path: PathBuf,
    data: RefCell<SettingsFile>,
    /// Session-only group-by property, e.g. from `--property`.
    property_override: RefCell<Option<PropertyKey>>,
}

impl Settings {
    /// Load settings for the vault at `root`.
    /// Returns defaults if the file is absent; surfaces a `StorageError`
    /// if the file exists but cannot be parsed.
    pub fn load(root: &Path) -> std::result::Result<Self, StorageError> {
        let path = root.join(SETTINGS_FILE);
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            SettingsFile::default()
        };
        Ok(Self {
            path,
            data: RefCell::new(data),
            property_override: RefCell::new(None),
        })
    }

    pub fn with_property_override(self, property: Option<PropertyKey>) -> Self {
        *self.property_override.borrow_mut() = property;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> SettingsFile {
        self.data.borrow().clone()
    }

    /// Persist a new group-by property. Clears any session override.
    pub async fn set_property(&self, property: &PropertyKey) -> std::result::Result<(), StorageError> {
        self.property_override.borrow_mut().take();
        self.data.borrow_mut().view.group_by_property = Some(property.to_string());
        self.save().await
    }

    async fn save(&self) -> std::result::Result<(), StorageError> {
        let content = toml::to_string_pretty(&*self.data.borrow())?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

impl ViewConfig for Settings {
    fn property(&self, option: &str) -> Option<PropertyKey> {
        if option != GROUP_BY_OPTION {
            return None;
        }
        if let Some(p) = self.property_override.borrow().clone() {
            return Some(p);
        }
        self.data
            .borrow()
            .view
            .group_by_property
            .as_deref()
            .map(PropertyKey::from)
    }
}

#[async_trait(?Send)]
impl OrderStore for Settings {
    fn order(&self, property: &PropertyKey) -> Option<Vec<String>> {
        self.data.borrow().column_orders.get(property.as_str()).cloned()
    }

    async fn set_order(&self, property: &PropertyKey, order: Vec<String>) -> Result<()> {
        self.data
            .borrow_mut()
            .column_orders
            .insert(property.to_string(), order);
        self.save().await.map_err(|e| KanbanError::OrderPersistence {
            property: property.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(property = %property, path = %self.path.display(), "saved settings");
        Ok(())
    }
}
