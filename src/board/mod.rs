pub mod normalize;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::host::{Entry, PropertyKey};

pub use normalize::normalize;

/// Label used for entries without a usable property value.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Trim whitespace and byte order marks, so labels that look the same group
/// together.
pub(crate) fn trim_label(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Canonical grouping key: non-empty, trimmed text.
///
/// Keys are compared by their text only, so an entry whose property literally
/// reads "Uncategorized" lands in the same column as entries with no value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(String);

impl GroupKey {
    pub fn uncategorized() -> Self {
        Self(UNCATEGORIZED.to_string())
    }

    /// Build a key from arbitrary text: trimmed, empty becomes uncategorized.
    pub fn from_text(s: &str) -> Self {
        let trimmed = trim_label(s);
        if trimmed.is_empty() {
            Self::uncategorized()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub(crate) fn from_trimmed(s: String) -> Self {
        debug_assert!(!s.is_empty() && trim_label(&s) == s);
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_uncategorized(&self) -> bool {
        self.0 == UNCATEGORIZED
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GroupKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One column: entries sharing a key, in the order the host listed them.
#[derive(Clone)]
pub struct Group {
    pub key: GroupKey,
    pub entries: Vec<Rc<dyn Entry>>,
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("key", &self.key)
            .field("entries", &self.entries.iter().map(|e| e.path()).collect::<Vec<_>>())
            .finish()
    }
}

/// All columns for one property selection, in display order.
#[derive(Debug, Clone)]
pub struct Board {
    pub property: PropertyKey,
    pub groups: Vec<Group>,
}

impl Board {
    /// Group `entries` by `property` and order the groups against the
    /// persisted order for that property.
    pub fn build(entries: &[Rc<dyn Entry>], property: &PropertyKey, persisted: Option<&[String]>) -> Self {
        let mut grouped = group_entries(entries, property);
        let order = order_keys(grouped.keys().cloned(), persisted);
        let groups = order
            .into_iter()
            .filter_map(|key| grouped.remove(&key).map(|entries| Group { key, entries }))
            .collect();
        Self {
            property: property.clone(),
            groups,
        }
    }

    pub fn keys(&self) -> Vec<&GroupKey> {
        self.groups.iter().map(|g| &g.key).collect()
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.key.as_str() == key)
    }

    /// Total number of entries across all groups.
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }
}

/// Bucket entries by the normalized value of `property`.
///
/// An entry whose value cannot be read is routed to the uncategorized group;
/// one bad entry never aborts the board.
pub fn group_entries(entries: &[Rc<dyn Entry>], property: &PropertyKey) -> BTreeMap<GroupKey, Vec<Rc<dyn Entry>>> {
    let mut grouped: BTreeMap<GroupKey, Vec<Rc<dyn Entry>>> = BTreeMap::new();
    for entry in entries {
        let key = match entry.value(property) {
            Ok(value) => normalize(&value),
            Err(e) => {
                tracing::warn!(path = entry.path(), property = %property, "failed to read property, grouping as uncategorized: {e}");
                GroupKey::uncategorized()
            }
        };
        grouped.entry(key).or_default().push(Rc::clone(entry));
    }
    grouped
}

/// Reconcile the live keys with a persisted column order.
///
/// Without a persisted order the keys sort ascending. Otherwise persisted keys
/// that are still live come first, in persisted order, followed by the
/// remaining live keys in ascending order. Stale and repeated persisted keys
/// are skipped.
pub fn order_keys(live: impl IntoIterator<Item = GroupKey>, persisted: Option<&[String]>) -> Vec<GroupKey> {
    let mut live: Vec<GroupKey> = live.into_iter().collect();
    live.sort();
    live.dedup();

    let Some(persisted) = persisted else {
        return live;
    };

    let mut placed: HashSet<&str> = HashSet::new();
    let mut order: Vec<GroupKey> = Vec::with_capacity(live.len());
    for saved in persisted {
        if placed.contains(saved.as_str()) {
            continue;
        }
        if let Some(key) = live.iter().find(|k| k.as_str() == saved) {
            placed.insert(key.as_str());
            order.push(key.clone());
        }
    }
    let rest: Vec<GroupKey> = live
        .iter()
        .filter(|k| !placed.contains(k.as_str()))
        .cloned()
        .collect();
    order.extend(rest);
    order
}

/// Outcome of checking the configured property against the live set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySelection {
    Selected(PropertyKey),
    NoProperties,
}

/// Keep the configured property if it is still available, otherwise fall
/// back to the first available one.
pub fn resolve_property(configured: Option<&PropertyKey>, available: &[PropertyKey]) -> PropertySelection {
    match configured {
        Some(key) if available.contains(key) => PropertySelection::Selected(key.clone()),
        _ => match available.first() {
            Some(first) => PropertySelection::Selected(first.clone()),
            None => PropertySelection::NoProperties,
        },
    }
}
