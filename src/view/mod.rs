//! The kanban view: render pipeline, click handling and drop handlers.

pub mod css;
pub mod render;

use std::rc::Rc;

use crate::board::{resolve_property, Board, PropertySelection};
use crate::dom::{NodeId, SharedDom};
use crate::drag::{self, CardDropSkip, DragController, DragEnd, DragZone, SharedDragEngine};
use crate::error::{error_chain, format_error_message, KanbanError, Result};
use crate::host::{Entry, EntrySource, MetadataEdit, MetadataStore, Navigator, OrderStore, PropertyKey, ViewConfig};

pub const VIEW_TYPE: &str = "kanban-view";

/// Configuration key of the group-by property.
pub const GROUP_BY_OPTION: &str = "groupByProperty";

/// Lifecycle every view exposes to the host.
pub trait BasesView {
    fn view_type(&self) -> &'static str;

    /// Reload entries and rebuild everything under the mount.
    fn on_data_updated(&mut self);

    /// Release listeners and restore the mount.
    fn on_close(&mut self);
}

/// Collaborators injected at construction.
#[derive(Clone)]
pub struct ViewContext {
    pub source: Rc<dyn EntrySource>,
    pub config: Rc<dyn ViewConfig>,
    pub metadata: Rc<dyn MetadataStore>,
    /// `None` when the host has no settings storage yet.
    pub orders: Option<Rc<dyn OrderStore>>,
    pub navigator: Rc<dyn Navigator>,
    pub drag: SharedDragEngine,
    pub dom: SharedDom,
}

/// What happens when a render fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorDisplay {
    /// Replace the board with a message, a retry button and details.
    #[default]
    Panel,
    /// Only log; the mount is left empty.
    LogOnly,
}

/// What the mount currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Board,
    Empty(&'static str),
    Error(String),
    Closed,
}

pub struct KanbanView {
    ctx: ViewContext,
    mount: NodeId,
    error_display: ErrorDisplay,
    drag: DragController,
    entries: Vec<Rc<dyn Entry>>,
    property: Option<PropertyKey>,
    board: Option<Board>,
    board_node: Option<NodeId>,
    state: ViewState,
    renders: usize,
}

impl KanbanView {
    pub fn new(ctx: ViewContext, mount: NodeId) -> Self {
        if let Err(e) = ctx.dom.borrow_mut().add_class(mount, css::CONTAINER) {
            tracing::error!("kanban mount is not in the tree: {e}");
        }
        let drag = DragController::new(Rc::clone(&ctx.drag));
        Self {
            ctx,
            mount,
            error_display: ErrorDisplay::default(),
            drag,
            entries: Vec::new(),
            property: None,
            board: None,
            board_node: None,
            state: ViewState::Idle,
            renders: 0,
        }
    }

    pub fn with_error_display(mut self, display: ErrorDisplay) -> Self {
        self.error_display = display;
        self
    }

    pub fn mount(&self) -> NodeId {
        self.mount
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Property the current board is grouped by.
    pub fn property(&self) -> Option<&PropertyKey> {
        self.property.as_ref()
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn board_node(&self) -> Option<NodeId> {
        self.board_node
    }

    /// Number of render passes so far, failed ones included.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    fn reset(&mut self) {
        self.drag.teardown();
        self.board = None;
        self.board_node = None;
        self.property = None;
    }

    fn render(&mut self) -> Result<()> {
        self.renders += 1;
        self.reset();
        let dom_rc = Rc::clone(&self.ctx.dom);
        let mut dom = dom_rc.borrow_mut();
        dom.empty(self.mount)?;

        self.entries = self.ctx.source.entries()?;
        if self.entries.is_empty() {
            render::empty_state(&mut dom, self.mount, render::NO_ENTRIES)?;
            self.state = ViewState::Empty(render::NO_ENTRIES);
            return Ok(());
        }

        let available = self.ctx.source.property_keys();
        let configured = self.ctx.config.property(GROUP_BY_OPTION);
        let property = match resolve_property(configured.as_ref(), &available) {
            PropertySelection::Selected(p) => p,
            PropertySelection::NoProperties => {
                render::empty_state(&mut dom, self.mount, render::NO_PROPERTIES)?;
                self.state = ViewState::Empty(render::NO_PROPERTIES);
                return Ok(());
            }
        };
        if configured.as_ref() != Some(&property) {
            tracing::debug!(configured = ?configured, selected = %property, "group-by property defaulted");
        }

        let persisted = self.ctx.orders.as_ref().and_then(|o| o.order(&property));
        let board = Board::build(&self.entries, &property, persisted.as_deref());
        let node = render::board(&mut dom, self.mount, &board)?;
        self.drag.bind(&dom, node);

        tracing::debug!(property = %property, columns = board.groups.len(), entries = board.entry_count(), "rendered board");
        self.property = Some(property);
        self.board = Some(board);
        self.board_node = Some(node);
        self.state = ViewState::Board;
        Ok(())
    }

    fn show_error(&mut self, error: &KanbanError) {
        let message = format_error_message(error, "render");
        let details = error_chain(error);
        tracing::error!(details = %details, "{message}");
        self.reset();

        let dom_rc = Rc::clone(&self.ctx.dom);
        let mut dom = dom_rc.borrow_mut();
        let shown = dom.empty(self.mount).and_then(|()| match self.error_display {
            ErrorDisplay::Panel => render::error_panel(&mut dom, self.mount, &message, &details).map(|_| ()),
            ErrorDisplay::LogOnly => Ok(()),
        });
        if let Err(e) = shown {
            tracing::error!("could not show error panel: {e}");
        }
        self.state = ViewState::Error(message);
    }

    /// Dispatch a click on `node`: retry on the error panel, open a card.
    pub fn on_click(&mut self, node: NodeId) {
        let (retry, path) = {
            let dom = self.ctx.dom.borrow();
            let retry = dom
                .closest(node, css::ERROR_RETRY)
                .is_some_and(|b| dom.attr(b, css::ATTR_ACTION) == Some(css::ACTION_RETRY));
            let path = dom
                .closest(node, css::CARD)
                .and_then(|card| dom.attr(card, css::ATTR_ENTRY_PATH))
                .map(str::to_string);
            (retry, path)
        };
        if retry {
            tracing::info!("retrying render");
            self.on_data_updated();
        } else if let Some(path) = path {
            self.ctx.navigator.open(&path);
        }
    }

    /// Handle the end of a drag reported by the engine.
    pub async fn on_drag_end(&mut self, end: DragEnd) {
        match self.drag.zone(end.instance) {
            Some(DragZone::Cards) => self.on_card_drop(end).await,
            Some(DragZone::Columns) => self.on_column_drop().await,
            None => tracing::debug!(instance = ?end.instance, "drag end from a detached instance"),
        }
    }

    async fn on_card_drop(&mut self, end: DragEnd) {
        let resolved = drag::resolve_card_drop(&self.ctx.dom.borrow(), &end);
        let mv = match resolved {
            Ok(mv) => mv,
            Err(CardDropSkip::SameColumn) => return,
            Err(skip) => {
                tracing::warn!(reason = ?skip, "ignoring card drop");
                return;
            }
        };
        let Some(entry) = self.entries.iter().find(|e| e.path() == mv.path).cloned() else {
            tracing::warn!(path = %mv.path, "dropped card has no matching entry");
            return;
        };
        let Some(property) = self.property.clone() else {
            tracing::warn!("no group-by property configured, ignoring card drop");
            return;
        };

        let field = property.name().to_string();
        let edit = if mv.to.is_uncategorized() {
            MetadataEdit::Remove { field }
        } else {
            MetadataEdit::Set {
                field,
                value: mv.to.as_str().to_string(),
            }
        };
        let metadata = Rc::clone(&self.ctx.metadata);
        match metadata.mutate(entry.path(), edit).await {
            Ok(()) => tracing::info!(path = entry.path(), to = %mv.to, "moved card"),
            Err(e) => {
                tracing::error!(path = entry.path(), "{}", format_error_message(&e, "card drop"));
                self.on_data_updated();
            }
        }
    }

    async fn on_column_drop(&mut self) {
        let Some(property) = self.property.clone() else {
            return;
        };
        let Some(orders) = self.ctx.orders.clone() else {
            tracing::debug!("no order storage, column order not saved");
            return;
        };
        let Some(node) = self.board_node else {
            return;
        };
        let order = drag::column_order(&self.ctx.dom.borrow(), node);
        match orders.set_order(&property, order).await {
            Ok(()) => tracing::debug!(property = %property, "saved column order"),
            Err(e) => tracing::error!("{}", format_error_message(&e, "column drop")),
        }
    }

    /// The one user-facing option of this view.
    pub fn describe_configuration_options() -> Vec<ViewOption> {
        vec![ViewOption {
            display_name: "Group by",
            kind: OptionKind::Property,
            key: GROUP_BY_OPTION,
            placeholder: "Select property",
            filter: not_file_property,
        }]
    }
}

impl BasesView for KanbanView {
    fn view_type(&self) -> &'static str {
        VIEW_TYPE
    }

    fn on_data_updated(&mut self) {
        if self.state == ViewState::Closed {
            return;
        }
        if let Err(e) = self.render() {
            self.show_error(&e);
        }
    }

    fn on_close(&mut self) {
        self.reset();
        self.entries.clear();
        let mut dom = self.ctx.dom.borrow_mut();
        let restored = dom
            .empty(self.mount)
            .and_then(|()| dom.remove_class(self.mount, css::CONTAINER));
        if let Err(e) = restored {
            tracing::warn!("could not restore mount: {e}");
        }
        self.state = ViewState::Closed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Property,
}

#[derive(Debug, Clone, Copy)]
pub struct ViewOption {
    pub display_name: &'static str,
    pub kind: OptionKind,
    pub key: &'static str,
    pub placeholder: &'static str,
    pub filter: fn(&PropertyKey) -> bool,
}

impl ViewOption {
    pub fn accepts(&self, property: &PropertyKey) -> bool {
        (self.filter)(property)
    }
}

fn not_file_property(property: &PropertyKey) -> bool {
    !property.as_str().starts_with("file.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, MockSource, STATUS};

    fn view(h: &Harness) -> KanbanView {
        let mut v = KanbanView::new(h.context(), h.mount);
        v.on_data_updated();
        v
    }

    fn columns(h: &Harness) -> Vec<(String, String)> {
        let dom = h.dom.borrow();
        dom.query_all(h.mount, css::COLUMN)
            .into_iter()
            .map(|col| {
                let key = dom.attr(col, css::ATTR_COLUMN_VALUE).unwrap_or_default().to_string();
                let count = dom.query(col, css::COLUMN_COUNT).map(|c| dom.text_content(c)).unwrap_or_default();
                (key, count)
            })
            .collect()
    }

    fn body_of(h: &Harness, key: &str) -> NodeId {
        let dom = h.dom.borrow();
        let col = dom
            .query_all(h.mount, css::COLUMN)
            .into_iter()
            .find(|&c| dom.attr(c, css::ATTR_COLUMN_VALUE) == Some(key))
            .unwrap();
        dom.query(col, css::COLUMN_BODY).unwrap()
    }

    fn card(h: &Harness, path: &str) -> NodeId {
        let dom = h.dom.borrow();
        dom.query_all(h.mount, css::CARD)
            .into_iter()
            .find(|&c| dom.attr(c, css::ATTR_ENTRY_PATH) == Some(path))
            .unwrap()
    }

    fn drag_card(h: &Harness, path: &str, to: &str) -> DragEnd {
        let item = card(h, path);
        let body = body_of(h, to);
        h.engine
            .borrow()
            .drag(&mut h.dom.borrow_mut(), item, body, 0)
            .unwrap()
            .unwrap()
    }

    fn drag_column(h: &Harness, v: &KanbanView, key: &str, index: usize) -> DragEnd {
        let board = v.board_node().unwrap();
        let col = {
            let dom = h.dom.borrow();
            dom.children_with_class(board, css::COLUMN)
                .into_iter()
                .find(|&c| dom.attr(c, css::ATTR_COLUMN_VALUE) == Some(key))
                .unwrap()
        };
        h.engine
            .borrow()
            .drag(&mut h.dom.borrow_mut(), col, board, index)
            .unwrap()
            .unwrap()
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    fn empty_message(h: &Harness) -> Option<String> {
        let dom = h.dom.borrow();
        dom.query(h.mount, css::EMPTY_STATE).map(|n| dom.text_content(n))
    }

    // ── rendering ──

    #[test]
    fn renders_columns_in_ascending_order() {
        let h = Harness::new(MockSource::with_status(&["To Do", "To Do", "Doing", "Done", "Done"]));
        let v = view(&h);
        assert_eq!(v.state(), &ViewState::Board);
        assert_eq!(columns(&h), pairs(&[("Doing", "(1)"), ("Done", "(2)"), ("To Do", "(2)")]));
        assert!(h.dom.borrow().has_class(h.mount, css::CONTAINER));
        assert_eq!(v.view_type(), "kanban-view");
    }

    #[test]
    fn renders_with_persisted_order() {
        let h = Harness::new(MockSource::with_status(&["To Do", "Doing", "Done"]));
        h.orders
            .orders
            .borrow_mut()
            .insert(PropertyKey::from(STATUS), vec!["Done".into(), "Archived".into(), "Doing".into()]);
        view(&h);
        let keys: Vec<String> = columns(&h).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Done", "Doing", "To Do"]);
    }

    #[test]
    fn empty_entries_state() {
        let h = Harness::new(MockSource::with_status(&[]));
        let v = view(&h);
        assert_eq!(v.state(), &ViewState::Empty(render::NO_ENTRIES));
        assert_eq!(empty_message(&h).as_deref(), Some(render::NO_ENTRIES));
        assert_eq!(h.engine.borrow().active(), 0);
    }

    #[test]
    fn no_properties_state() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        h.source.properties.borrow_mut().clear();
        let v = view(&h);
        assert_eq!(v.state(), &ViewState::Empty(render::NO_PROPERTIES));
        assert_eq!(empty_message(&h).as_deref(), Some(render::NO_PROPERTIES));
        assert!(v.property().is_none());
    }

    #[test]
    fn stale_configured_property_falls_back_to_first() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        *h.config.group_by.borrow_mut() = Some(PropertyKey::from("note.deleted"));
        let v = view(&h);
        assert_eq!(v.property(), Some(&PropertyKey::from(STATUS)));
    }

    #[test]
    fn configuration_reread_each_update() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        h.source.properties.borrow_mut().push(PropertyKey::from("note.priority"));
        let mut v = view(&h);
        assert_eq!(v.property(), Some(&PropertyKey::from(STATUS)));
        *h.config.group_by.borrow_mut() = Some(PropertyKey::from("note.priority"));
        v.on_data_updated();
        assert_eq!(v.property(), Some(&PropertyKey::from("note.priority")));
        assert_eq!(columns(&h), pairs(&[("Uncategorized", "(1)")]));
    }

    #[test]
    fn rerender_does_not_accumulate() {
        let h = Harness::new(MockSource::with_status(&["To Do", "Doing", "Done"]));
        let mut v = view(&h);
        let live = h.dom.borrow().len();
        for _ in 0..10 {
            v.on_data_updated();
        }
        assert_eq!(h.dom.borrow().len(), live);
        assert_eq!(h.engine.borrow().active(), 4);
        assert_eq!(h.dom.borrow().children(h.mount).len(), 1);
    }

    // ── render failures ──

    #[test]
    fn render_failure_shows_error_panel() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        h.source.fail.set(true);
        let v = view(&h);
        let ViewState::Error(message) = v.state() else {
            panic!("expected error state, got {:?}", v.state());
        };
        assert_eq!(message, "[render] EntrySourceError: could not load entries: query failed");
        let dom = h.dom.borrow();
        assert!(dom.query(h.mount, css::ERROR_RETRY).is_some());
        assert!(dom.query(h.mount, css::BOARD).is_none());
        assert_eq!(h.engine.borrow().active(), 0);
    }

    #[test]
    fn render_failure_discards_previous_board() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        let mut v = view(&h);
        h.source.fail.set(true);
        v.on_data_updated();
        assert!(h.dom.borrow().query(h.mount, css::CARD).is_none());
        assert!(v.board().is_none());
    }

    #[test]
    fn log_only_error_display_leaves_mount_empty() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        h.source.fail.set(true);
        let mut v = KanbanView::new(h.context(), h.mount).with_error_display(ErrorDisplay::LogOnly);
        v.on_data_updated();
        assert!(matches!(v.state(), ViewState::Error(_)));
        assert!(h.dom.borrow().children(h.mount).is_empty());
    }

    #[test]
    fn retry_reruns_update_cycle() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        h.source.fail.set(true);
        let mut v = view(&h);
        h.source.fail.set(false);
        let retry = h.dom.borrow().query(h.mount, css::ERROR_RETRY).unwrap();
        v.on_click(retry);
        assert_eq!(v.state(), &ViewState::Board);
        assert_eq!(h.source.reads.get(), 2);
    }

    // ── clicks ──

    #[test]
    fn click_card_opens_entry() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        let mut v = view(&h);
        let title = {
            let dom = h.dom.borrow();
            dom.query(card(&h, "Task 1.md"), css::CARD_TITLE).unwrap()
        };
        v.on_click(title);
        assert_eq!(*h.navigator.opened.borrow(), vec!["Task 1.md".to_string()]);
    }

    #[test]
    fn click_header_does_nothing() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        let mut v = view(&h);
        let header = h.dom.borrow().query(h.mount, css::COLUMN_HEADER).unwrap();
        v.on_click(header);
        assert!(h.navigator.opened.borrow().is_empty());
        assert_eq!(v.render_count(), 1);
    }

    // ── card drops ──

    #[tokio::test]
    async fn cross_column_drop_writes_once() {
        let h = Harness::new(MockSource::with_status(&["To Do", "Doing"]));
        let mut v = view(&h);
        let end = drag_card(&h, "Task 1.md", "Doing");
        v.on_drag_end(end).await;
        let calls = h.metadata.calls.borrow();
        assert_eq!(
            *calls,
            vec![(
                "Task 1.md".to_string(),
                MetadataEdit::Set {
                    field: "status".into(),
                    value: "Doing".into()
                }
            )]
        );
        assert_eq!(v.render_count(), 1);
    }

    #[tokio::test]
    async fn same_column_drop_writes_nothing() {
        let h = Harness::new(MockSource::with_status(&["To Do", "To Do"]));
        let mut v = view(&h);
        let end = drag_card(&h, "Task 2.md", "To Do");
        assert_eq!(end.new_index, 0);
        v.on_drag_end(end).await;
        assert!(h.metadata.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn drop_into_uncategorized_removes_property() {
        let h = Harness::new(MockSource::with_status(&["To Do", ""]));
        let mut v = view(&h);
        let end = drag_card(&h, "Task 1.md", "Uncategorized");
        v.on_drag_end(end).await;
        assert_eq!(
            h.metadata.calls.borrow()[0].1,
            MetadataEdit::Remove { field: "status".into() }
        );
    }

    #[tokio::test]
    async fn failed_write_rerenders_once() {
        let h = Harness::new(MockSource::with_status(&["To Do", "Doing"]));
        h.metadata.fail.set(true);
        let mut v = view(&h);
        let end = drag_card(&h, "Task 1.md", "Doing");
        v.on_drag_end(end).await;
        assert_eq!(h.metadata.calls.borrow().len(), 1);
        assert_eq!(v.render_count(), 2);
        // speculative move discarded
        assert_eq!(columns(&h), pairs(&[("Doing", "(1)"), ("To Do", "(1)")]));
        let dom = h.dom.borrow();
        let card = card(&h, "Task 1.md");
        let col = dom.closest(card, css::COLUMN).unwrap();
        assert_eq!(dom.attr(col, css::ATTR_COLUMN_VALUE), Some("To Do"));
    }

    #[tokio::test]
    async fn drop_with_unknown_entry_is_ignored() {
        let h = Harness::new(MockSource::with_status(&["To Do", "Doing"]));
        let mut v = view(&h);
        let node = card(&h, "Task 1.md");
        h.dom.borrow_mut().set_attr(node, css::ATTR_ENTRY_PATH, "ghost.md").unwrap();
        let end = drag_card(&h, "ghost.md", "Doing");
        v.on_drag_end(end).await;
        assert!(h.metadata.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn drop_from_detached_instance_is_ignored() {
        let h = Harness::new(MockSource::with_status(&["To Do", "Doing"]));
        let mut v = view(&h);
        let end = drag_card(&h, "Task 1.md", "Doing");
        v.on_data_updated();
        v.on_drag_end(end).await;
        assert!(h.metadata.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn property_name_after_first_dot() {
        let h = Harness::new(MockSource::with_status(&["a", "b"]));
        *h.source.properties.borrow_mut() = vec![PropertyKey::from("note.project.phase")];
        *h.config.group_by.borrow_mut() = Some(PropertyKey::from("note.project.phase"));
        let mut v = view(&h);
        // both cards are uncategorized under this property; add a target column
        let target = {
            let mut dom = h.dom.borrow_mut();
            let board = v.board_node().unwrap();
            let col = dom.create_child(board, "div", css::COLUMN).unwrap();
            dom.set_attr(col, css::ATTR_COLUMN_VALUE, "Beta").unwrap();
            dom.create_child(col, "div", css::COLUMN_BODY).unwrap()
        };
        let instance = h.engine.borrow().instance_for(body_of(&h, "Uncategorized")).unwrap();
        let item = card(&h, "Task 1.md");
        let from = body_of(&h, "Uncategorized");
        h.dom.borrow_mut().append_child(target, item).unwrap();
        v.on_drag_end(DragEnd {
            instance,
            item,
            from,
            to: target,
            old_index: 0,
            new_index: 0,
        })
        .await;
        assert_eq!(h.metadata.calls.borrow()[0].1.field(), "project.phase");
    }

    // ── column drops ──

    #[tokio::test]
    async fn column_drop_persists_dom_order() {
        let h = Harness::new(MockSource::with_status(&["To Do", "Doing", "Done"]));
        let mut v = view(&h);
        let end = drag_column(&h, &v, "To Do", 0);
        v.on_drag_end(end).await;
        assert_eq!(h.orders.saves.get(), 1);
        assert_eq!(
            h.orders.orders.borrow()[&PropertyKey::from(STATUS)],
            vec!["To Do", "Doing", "Done"]
        );
        assert!(h.metadata.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn column_drop_failure_keeps_dom() {
        let h = Harness::new(MockSource::with_status(&["To Do", "Doing"]));
        h.orders.fail.set(true);
        let mut v = view(&h);
        let end = drag_column(&h, &v, "To Do", 0);
        v.on_drag_end(end).await;
        assert_eq!(h.orders.saves.get(), 1);
        assert_eq!(v.render_count(), 1);
        let keys: Vec<String> = columns(&h).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["To Do", "Doing"]);
    }

    #[tokio::test]
    async fn column_drop_without_order_store_is_noop() {
        let h = Harness::new(MockSource::with_status(&["To Do", "Doing"]));
        let mut ctx = h.context();
        ctx.orders = None;
        let mut v = KanbanView::new(ctx, h.mount);
        v.on_data_updated();
        let end = drag_column(&h, &v, "To Do", 0);
        v.on_drag_end(end).await;
        assert_eq!(h.orders.saves.get(), 0);
    }

    // ── lifecycle ──

    #[test]
    fn close_restores_mount_and_detaches() {
        let h = Harness::new(MockSource::with_status(&["To Do", "Doing"]));
        h.dom.borrow_mut().add_class(h.mount, "host-pane").unwrap();
        let mut v = view(&h);
        v.on_close();
        let dom = h.dom.borrow();
        assert!(dom.children(h.mount).is_empty());
        assert_eq!(dom.get(h.mount).unwrap().classes(), &["host-pane".to_string()]);
        assert_eq!(dom.len(), 1);
        assert_eq!(h.engine.borrow().active(), 0);
        assert_eq!(v.state(), &ViewState::Closed);
    }

    #[test]
    fn update_after_close_is_ignored() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        let mut v = view(&h);
        v.on_close();
        v.on_data_updated();
        assert!(h.dom.borrow().children(h.mount).is_empty());
        assert_eq!(v.render_count(), 1);
    }

    #[test]
    fn configuration_options() {
        let options = KanbanView::describe_configuration_options();
        assert_eq!(options.len(), 1);
        let opt = options[0];
        assert_eq!(opt.display_name, "Group by");
        assert_eq!(opt.key, "groupByProperty");
        assert_eq!(opt.placeholder, "Select property");
        assert_eq!(opt.kind, OptionKind::Property);
        assert!(opt.accepts(&PropertyKey::from("note.status")));
        assert!(!opt.accepts(&PropertyKey::from("file.name")));
        assert!(opt.accepts(&PropertyKey::from("formula.file")));
    }

    // ── end to end ──

    #[tokio::test]
    async fn move_card_then_host_update() {
        let h = Harness::new(MockSource::with_status(&["To Do", "To Do", "Doing", "Done", "Done"]));
        *h.metadata.apply_to.borrow_mut() = Some(Rc::clone(&h.source));
        let mut v = view(&h);
        assert_eq!(columns(&h), pairs(&[("Doing", "(1)"), ("Done", "(2)"), ("To Do", "(2)")]));

        let end = drag_card(&h, "Task 1.md", "Doing");
        v.on_drag_end(end).await;
        assert_eq!(h.metadata.calls.borrow().len(), 1);

        v.on_data_updated();
        assert_eq!(columns(&h), pairs(&[("Doing", "(2)"), ("Done", "(2)"), ("To Do", "(1)")]));
    }

    #[test]
    fn mount_must_exist() {
        let h = Harness::new(MockSource::with_status(&["To Do"]));
        let ghost = {
            let mut dom = h.dom.borrow_mut();
            let n = dom.create_element("div");
            dom.remove(n).unwrap();
            n
        };
        let mut v = KanbanView::new(h.context(), ghost);
        v.on_data_updated();
        assert!(matches!(v.state(), ViewState::Error(_)));
    }
}
