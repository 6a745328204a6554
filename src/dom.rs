//! Minimal element tree the view renders into.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Freed slots are
//! reused, so rebuilding a board on every update does not grow the arena.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Tree shared between the view, the drag engine and the renderer.
pub type SharedDom = Rc<RefCell<Dom>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    Missing(NodeId),
    #[error("cannot move {child:?} under its own descendant {parent:?}")]
    Cycle { child: NodeId, parent: NodeId },
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Default)]
pub struct Dom {
    slots: Vec<Option<Element>>,
    free: Vec<usize>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedDom {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let el = Element::new(tag);
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(el);
                NodeId(idx)
            }
            None => {
                self.slots.push(Some(el));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Create an element with an optional class and append it to `parent`.
    pub fn create_child(&mut self, parent: NodeId, tag: &str, class: &str) -> Result<NodeId, DomError> {
        self.get(parent)?;
        let id = self.create_element(tag);
        if !class.is_empty() {
            self.add_class(id, class)?;
        }
        self.append_child(parent, id)?;
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Result<&Element, DomError> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(DomError::Missing(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(DomError::Missing(id))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let el = self.get_mut(id)?;
        if !el.has_class(class) {
            el.classes.push(class.to_string());
        }
        Ok(())
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        self.get_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id).is_ok_and(|el| el.has_class(class))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> Result<(), DomError> {
        self.get_mut(id)?.attrs.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).ok().and_then(|el| el.attr(name))
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        self.get_mut(id)?.text = Some(text.into());
        Ok(())
    }

    /// Own text followed by the text of all descendants, depth first.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Ok(el) = self.get(id) {
            if let Some(text) = &el.text {
                out.push_str(text);
            }
            for &child in &el.children {
                self.collect_text(child, out);
            }
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Element::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).ok().and_then(Element::parent)
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Whether `node` is `ancestor` or lies inside it.
    pub fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let len = self.get(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Insert `child` at `index` among `parent`'s children (clamped),
    /// detaching it from its current position first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), DomError> {
        self.get(child)?;
        self.get(parent)?;
        if self.is_inclusive_descendant(parent, child) {
            return Err(DomError::Cycle { child, parent });
        }
        self.detach(child)?;
        let p = self.get_mut(parent)?;
        let index = index.min(p.children.len());
        p.children.insert(index, child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Unlink a node from its parent without freeing it.
    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.get(id)?.parent {
            if let Ok(p) = self.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
            self.get_mut(id)?.parent = None;
        }
        Ok(())
    }

    /// Detach and free a node with its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        self.detach(id)?;
        self.free_subtree(id);
        Ok(())
    }

    /// Free every child of `id`, leaving `id` itself in place.
    pub fn empty(&mut self, id: NodeId) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.get_mut(id)?.children);
        for child in children {
            self.free_subtree(child);
        }
        Ok(())
    }

    fn free_subtree(&mut self, id: NodeId) {
        if let Some(el) = self.slots.get_mut(id.0).and_then(Option::take) {
            self.free.push(id.0);
            for child in el.children {
                self.free_subtree(child);
            }
        }
    }

    /// The node itself or its nearest ancestor carrying `class`.
    pub fn closest(&self, id: NodeId, class: &str) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(node) = cur {
            let el = self.get(node).ok()?;
            if el.has_class(class) {
                return Some(node);
            }
            cur = el.parent;
        }
        None
    }

    /// Descendants of `root` (excluding `root`) carrying `class`, in document order.
    pub fn query_all(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &child in self.children(root) {
            self.query_into(child, class, &mut out);
        }
        out
    }

    fn query_into(&self, id: NodeId, class: &str, out: &mut Vec<NodeId>) {
        if let Ok(el) = self.get(id) {
            if el.has_class(class) {
                out.push(id);
            }
            for &child in &el.children {
                self.query_into(child, class, out);
            }
        }
    }

    /// First descendant of `root` carrying `class`.
    pub fn query(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.query_all(root, class).into_iter().next()
    }

    /// Direct children of `parent` carrying `class`.
    pub fn children_with_class(&self, parent: NodeId, class: &str) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|&c| self.has_class(c, class))
            .collect()
    }
}
