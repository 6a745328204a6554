//! In-memory collaborators shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use async_trait::async_trait;

use crate::dom::{Dom, NodeId, SharedDom};
use crate::drag::{DirectEngine, SharedDragEngine};
use crate::error::{KanbanError, Result};
use crate::host::{
    Entry, EntryError, EntrySource, MetadataEdit, MetadataStore, Navigator, OrderStore, PropertyKey, ViewConfig,
};
use crate::value::RawValue;
use crate::view::ViewContext;

pub const STATUS: &str = "note.status";

#[derive(Debug)]
pub struct MockEntry {
    path: String,
    name: String,
    values: RefCell<BTreeMap<String, RawValue>>,
    failing: bool,
}

impl MockEntry {
    pub fn new(path: &str) -> Self {
        let name = path.strip_suffix(".md").unwrap_or(path).to_string();
        Self {
            path: path.to_string(),
            name,
            values: RefCell::new(BTreeMap::new()),
            failing: false,
        }
    }

    pub fn with(self, key: &str, value: impl Into<RawValue>) -> Self {
        self.values.borrow_mut().insert(key.to_string(), value.into());
        self
    }

    /// Every property read fails.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    fn apply(&self, edit: &MetadataEdit) {
        let key = format!("note.{}", edit.field());
        let mut values = self.values.borrow_mut();
        match edit {
            MetadataEdit::Set { value, .. } => {
                values.insert(key, RawValue::text(value.clone()));
            }
            MetadataEdit::Remove { .. } => {
                values.remove(&key);
            }
        }
    }
}

impl Entry for MockEntry {
    fn path(&self) -> &str {
        &self.path
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn value(&self, property: &PropertyKey) -> std::result::Result<RawValue, EntryError> {
        if self.failing {
            return Err(EntryError::Other(format!("cannot read {property}")));
        }
        Ok(self
            .values
            .borrow()
            .get(property.as_str())
            .cloned()
            .unwrap_or(RawValue::Null))
    }
}

/// `Task 1.md`, `Task 2.md`, ... with `note.status` set to each value.
pub fn entries_with_status(values: &[&str]) -> Vec<Rc<dyn Entry>> {
    mock_entries(values)
        .into_iter()
        .map(|e| e as Rc<dyn Entry>)
        .collect()
}

fn mock_entries(values: &[&str]) -> Vec<Rc<MockEntry>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Rc::new(MockEntry::new(&format!("Task {}.md", i + 1)).with(STATUS, *v)))
        .collect()
}

#[derive(Default)]
pub struct MockSource {
    pub entries: RefCell<Vec<Rc<MockEntry>>>,
    pub properties: RefCell<Vec<PropertyKey>>,
    pub fail: Cell<bool>,
    pub reads: Cell<usize>,
}

impl MockSource {
    pub fn with_status(values: &[&str]) -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(mock_entries(values)),
            properties: RefCell::new(vec![PropertyKey::from(STATUS)]),
            ..Self::default()
        })
    }

    /// Apply an edit the way the host would after a successful write.
    pub fn apply(&self, path: &str, edit: &MetadataEdit) {
        if let Some(entry) = self.entries.borrow().iter().find(|e| e.path == path) {
            entry.apply(edit);
        }
    }
}

impl EntrySource for MockSource {
    fn entries(&self) -> Result<Vec<Rc<dyn Entry>>> {
        self.reads.set(self.reads.get() + 1);
        if self.fail.get() {
            return Err(KanbanError::EntrySource("query failed".into()));
        }
        Ok(self
            .entries
            .borrow()
            .iter()
            .map(|e| Rc::clone(e) as Rc<dyn Entry>)
            .collect())
    }

    fn property_keys(&self) -> Vec<PropertyKey> {
        self.properties.borrow().clone()
    }
}

#[derive(Default)]
pub struct MockConfig {
    pub group_by: RefCell<Option<PropertyKey>>,
}

impl MockConfig {
    pub fn grouped_by(property: &str) -> Rc<Self> {
        Rc::new(Self {
            group_by: RefCell::new(Some(PropertyKey::from(property))),
        })
    }
}

impl ViewConfig for MockConfig {
    fn property(&self, option: &str) -> Option<PropertyKey> {
        if option == crate::view::GROUP_BY_OPTION {
            self.group_by.borrow().clone()
        } else {
            None
        }
    }
}

/// Records every write; optionally fails them or forwards them to a source.
#[derive(Default)]
pub struct RecordingMetadata {
    pub calls: RefCell<Vec<(String, MetadataEdit)>>,
    pub fail: Cell<bool>,
    pub apply_to: RefCell<Option<Rc<MockSource>>>,
}

#[async_trait(?Send)]
impl MetadataStore for RecordingMetadata {
    async fn mutate(&self, path: &str, edit: MetadataEdit) -> Result<()> {
        self.calls.borrow_mut().push((path.to_string(), edit.clone()));
        if self.fail.get() {
            return Err(KanbanError::Metadata {
                path: path.to_string(),
                reason: "disk full".into(),
            });
        }
        if let Some(source) = self.apply_to.borrow().as_ref() {
            source.apply(path, &edit);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingOrders {
    pub orders: RefCell<BTreeMap<PropertyKey, Vec<String>>>,
    pub saves: Cell<usize>,
    pub fail: Cell<bool>,
}

#[async_trait(?Send)]
impl OrderStore for RecordingOrders {
    fn order(&self, property: &PropertyKey) -> Option<Vec<String>> {
        self.orders.borrow().get(property).cloned()
    }

    async fn set_order(&self, property: &PropertyKey, order: Vec<String>) -> Result<()> {
        self.saves.set(self.saves.get() + 1);
        if self.fail.get() {
            return Err(KanbanError::OrderPersistence {
                property: property.to_string(),
                reason: "read-only".into(),
            });
        }
        self.orders.borrow_mut().insert(property.clone(), order);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub opened: RefCell<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn open(&self, path: &str) {
        self.opened.borrow_mut().push(path.to_string());
    }
}

/// Everything a view test needs, with handles kept for assertions.
pub struct Harness {
    pub dom: SharedDom,
    pub mount: NodeId,
    pub engine: Rc<RefCell<DirectEngine>>,
    pub source: Rc<MockSource>,
    pub config: Rc<MockConfig>,
    pub metadata: Rc<RecordingMetadata>,
    pub orders: Rc<RecordingOrders>,
    pub navigator: Rc<RecordingNavigator>,
}

impl Harness {
    pub fn new(source: Rc<MockSource>) -> Self {
        let dom = Dom::shared();
        let mount = dom.borrow_mut().create_element("div");
        Self {
            dom,
            mount,
            engine: Rc::new(RefCell::new(DirectEngine::new())),
            source,
            config: MockConfig::grouped_by(STATUS),
            metadata: Rc::new(RecordingMetadata::default()),
            orders: Rc::new(RecordingOrders::default()),
            navigator: Rc::new(RecordingNavigator::default()),
        }
    }

    pub fn context(&self) -> ViewContext {
        let engine: SharedDragEngine = self.engine.clone();
        ViewContext {
            source: self.source.clone(),
            config: self.config.clone(),
            metadata: self.metadata.clone(),
            orders: Some(self.orders.clone()),
            navigator: self.navigator.clone(),
            drag: engine,
            dom: Rc::clone(&self.dom),
        }
    }
}
