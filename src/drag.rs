//! Drag-and-drop collaborator and the bookkeeping around it.
//!
//! A [`DragEngine`] owns pointer tracking and performs the DOM move itself;
//! when a gesture ends it reports a [`DragEnd`] back to the view. The
//! [`DragController`] remembers which instances belong to which zone so they
//! can be torn down before every rebuild.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::board::GroupKey;
use crate::dom::{Dom, DomError, NodeId};
use crate::view::css;

/// Shared group name letting cards move between any two columns.
pub const CARD_GROUP: &str = "kanban-columns";

pub const ANIMATION_MS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DragInstanceId(pub u64);

/// How one drag zone behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOptions {
    /// Zones with the same group exchange items.
    pub group: Option<String>,
    /// Class of the element that starts a drag; `None` means the whole item.
    pub handle: Option<String>,
    /// Class of the items that can be dragged; `None` means every child.
    pub draggable: Option<String>,
    pub animation_ms: u32,
    pub ghost_class: String,
    pub drag_class: String,
    pub chosen_class: Option<String>,
}

impl DragOptions {
    /// Card zone: one per column body.
    pub fn cards() -> Self {
        Self {
            group: Some(CARD_GROUP.to_string()),
            handle: None,
            draggable: None,
            animation_ms: ANIMATION_MS,
            ghost_class: css::CARD_GHOST.to_string(),
            drag_class: css::CARD_DRAGGING.to_string(),
            chosen_class: Some(css::CARD_CHOSEN.to_string()),
        }
    }

    /// Column zone: spans the board, dragged by the header handle.
    pub fn columns() -> Self {
        Self {
            group: None,
            handle: Some(css::COLUMN_HANDLE.to_string()),
            draggable: Some(css::COLUMN.to_string()),
            animation_ms: ANIMATION_MS,
            ghost_class: css::COLUMN_GHOST.to_string(),
            drag_class: css::COLUMN_DRAGGING.to_string(),
            chosen_class: None,
        }
    }
}

/// End of a drag gesture, after the engine already moved `item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    pub instance: DragInstanceId,
    pub item: NodeId,
    pub from: NodeId,
    pub to: NodeId,
    pub old_index: usize,
    pub new_index: usize,
}

pub trait DragEngine {
    fn attach(&mut self, container: NodeId, options: DragOptions) -> DragInstanceId;

    fn detach(&mut self, instance: DragInstanceId);
}

pub type SharedDragEngine = Rc<RefCell<dyn DragEngine>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragZone {
    Cards,
    Columns,
}

/// Instances attached for the current board.
pub struct DragController {
    engine: SharedDragEngine,
    instances: Vec<(DragInstanceId, DragZone)>,
}

impl DragController {
    pub fn new(engine: SharedDragEngine) -> Self {
        Self {
            engine,
            instances: Vec::new(),
        }
    }

    /// Attach one card zone per column body and one column zone on `board`.
    /// Any previous instances are detached first.
    pub fn bind(&mut self, dom: &Dom, board: NodeId) {
        self.teardown();
        let mut engine = self.engine.borrow_mut();
        for body in dom.query_all(board, css::COLUMN_BODY) {
            let id = engine.attach(body, DragOptions::cards());
            self.instances.push((id, DragZone::Cards));
        }
        let id = engine.attach(board, DragOptions::columns());
        self.instances.push((id, DragZone::Columns));
    }

    pub fn teardown(&mut self) {
        if self.instances.is_empty() {
            return;
        }
        let mut engine = self.engine.borrow_mut();
        for (id, _) in self.instances.drain(..) {
            engine.detach(id);
        }
    }

    /// Zone of an instance attached by this controller.
    pub fn zone(&self, instance: DragInstanceId) -> Option<DragZone> {
        self.instances
            .iter()
            .find(|(id, _)| *id == instance)
            .map(|(_, zone)| *zone)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

/// A card dropped into a different column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMove {
    pub path: String,
    pub from: Option<GroupKey>,
    pub to: GroupKey,
}

/// Why a card drop needs no write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardDropSkip {
    MissingPath,
    UnknownDestination,
    SameColumn,
}

fn column_key(dom: &Dom, node: NodeId) -> Option<GroupKey> {
    let column = dom.closest(node, css::COLUMN)?;
    dom.attr(column, css::ATTR_COLUMN_VALUE).map(GroupKey::from_text)
}

/// Read what a card drop means from the tree the engine already mutated.
pub fn resolve_card_drop(dom: &Dom, end: &DragEnd) -> Result<CardMove, CardDropSkip> {
    let path = dom
        .attr(end.item, css::ATTR_ENTRY_PATH)
        .ok_or(CardDropSkip::MissingPath)?
        .to_string();
    let to = column_key(dom, end.to).ok_or(CardDropSkip::UnknownDestination)?;
    let from = column_key(dom, end.from);
    if from.as_ref() == Some(&to) {
        return Err(CardDropSkip::SameColumn);
    }
    Ok(CardMove { path, from, to })
}

/// Column keys in their current on-screen order.
pub fn column_order(dom: &Dom, board: NodeId) -> Vec<String> {
    dom.children_with_class(board, css::COLUMN)
        .into_iter()
        .filter_map(|col| dom.attr(col, css::ATTR_COLUMN_VALUE).map(str::to_string))
        .collect()
}

/// Engine driven by explicit move commands instead of pointer tracking.
///
/// Used by the terminal front end, where a key press stands in for a drag.
#[derive(Debug, Default)]
pub struct DirectEngine {
    next: u64,
    instances: BTreeMap<DragInstanceId, (NodeId, DragOptions)>,
}

impl DirectEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> usize {
        self.instances.len()
    }

    pub fn instance_for(&self, container: NodeId) -> Option<DragInstanceId> {
        self.instances
            .iter()
            .find(|(_, (node, _))| *node == container)
            .map(|(id, _)| *id)
    }

    pub fn options(&self, instance: DragInstanceId) -> Option<&DragOptions> {
        self.instances.get(&instance).map(|(_, opts)| opts)
    }

    /// Move `item` into `to` at `index`, the way a completed pointer drag
    /// would, and report the gesture.
    ///
    /// Returns `Ok(None)` when the move is not allowed: the item's container
    /// is not attached, the item is not draggable there, or `to` accepts no
    /// items from it.
    pub fn drag(&self, dom: &mut Dom, item: NodeId, to: NodeId, index: usize) -> Result<Option<DragEnd>, DomError> {
        let Some(from) = dom.parent(item) else {
            return Ok(None);
        };
        let Some(instance) = self.instance_for(from) else {
            return Ok(None);
        };
        let Some(options) = self.options(instance) else {
            return Ok(None);
        };
        if let Some(class) = &options.draggable {
            if !dom.has_class(item, class) {
                return Ok(None);
            }
        }
        if to != from {
            let target = self.instance_for(to).and_then(|id| self.options(id));
            let shared = match (target, &options.group) {
                (Some(target), Some(group)) => target.group.as_deref() == Some(group.as_str()),
                _ => false,
            };
            if !shared {
                return Ok(None);
            }
        }
        let old_index = dom.index_in_parent(item).unwrap_or(0);
        dom.insert_child(to, index, item)?;
        let new_index = dom.index_in_parent(item).unwrap_or(0);
        Ok(Some(DragEnd {
            instance,
            item,
            from,
            to,
            old_index,
            new_index,
        }))
    }
}

impl DragEngine for DirectEngine {
    fn attach(&mut self, container: NodeId, options: DragOptions) -> DragInstanceId {
        self.next += 1;
        let id = DragInstanceId(self.next);
        self.instances.insert(id, (container, options));
        id
    }

    fn detach(&mut self, instance: DragInstanceId) {
        self.instances.remove(&instance);
    }
}
