use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use color_eyre::eyre::eyre;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use tokio::runtime::Runtime;

use bases_kanban::dom::{Dom, NodeId, SharedDom};
use bases_kanban::drag::DirectEngine;
use bases_kanban::host::{EntrySource, Navigator, PropertyKey};
use bases_kanban::plugin::Plugin;
use bases_kanban::vault::storage::resolve_in_vault;
use bases_kanban::vault::{Settings, Vault};
use bases_kanban::view::{css, BasesView, KanbanView, ViewContext, ViewState, VIEW_TYPE};

use crate::input::action::Action;
use crate::input::keymap::map_key;
use crate::ui::Screen;

/// Current interaction mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
    Picker { items: Vec<PropertyKey>, selected: usize },
}

/// Notification severity for statusbar coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Terminal-side state: focus, mode, transient notifications.
pub struct AppState {
    pub mode: Mode,
    pub focused_column: usize,
    pub selected_card: usize,
    pub notification: Option<String>,
    pub notification_level: NotificationLevel,
    pub notification_expires: Option<Instant>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            focused_column: 0,
            selected_card: 0,
            notification: None,
            notification_level: NotificationLevel::Info,
            notification_expires: None,
            should_quit: false,
        }
    }

    /// Show a transient notification.
    pub fn notify(&mut self, msg: impl Into<String>) {
        self.notification = Some(msg.into());
        self.notification_level = NotificationLevel::Info;
        self.notification_expires = Some(Instant::now() + Duration::from_secs(3));
    }

    /// Show a transient error notification (rendered in red).
    pub fn notify_error(&mut self, msg: impl Into<String>) {
        self.notification = Some(msg.into());
        self.notification_level = NotificationLevel::Error;
        self.notification_expires = Some(Instant::now() + Duration::from_secs(3));
    }

    /// Clear expired notifications.
    pub fn tick_notification(&mut self) {
        if let Some(expires) = self.notification_expires {
            if Instant::now() >= expires {
                self.notification = None;
                self.notification_level = NotificationLevel::Info;
                self.notification_expires = None;
            }
        }
    }
}

/// Queues note opens; the event loop hands them to `$EDITOR` between frames.
pub struct EditorNavigator {
    root: PathBuf,
    pending: RefCell<Option<PathBuf>>,
}

impl EditorNavigator {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            pending: RefCell::new(None),
        }
    }

    pub fn take_pending(&self) -> Option<PathBuf> {
        self.pending.borrow_mut().take()
    }
}

impl Navigator for EditorNavigator {
    fn open(&self, path: &str) {
        match resolve_in_vault(&self.root, path) {
            Ok(file) => *self.pending.borrow_mut() = Some(file),
            Err(e) => tracing::warn!("not opening {path}: {e}"),
        }
    }
}

/// The terminal host: owns the vault, the element tree and the kanban view.
pub struct App {
    vault: Rc<Vault>,
    settings: Rc<Settings>,
    dom: SharedDom,
    engine: Rc<RefCell<DirectEngine>>,
    navigator: Rc<EditorNavigator>,
    view: KanbanView,
    runtime: Runtime,
    vault_name: String,
    pub state: AppState,
}

impl App {
    pub fn new(vault: Vault, settings: Settings) -> color_eyre::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let vault_name = vault
            .root()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| vault.root().display().to_string());

        let vault = Rc::new(vault);
        let settings = Rc::new(settings);
        let dom = Dom::shared();
        let mount = dom.borrow_mut().create_element("div");
        let engine = Rc::new(RefCell::new(DirectEngine::new()));
        let navigator = Rc::new(EditorNavigator::new(vault.root()));

        let ctx = ViewContext {
            source: vault.clone(),
            config: settings.clone(),
            metadata: vault.clone(),
            orders: Some(settings.clone()),
            navigator: navigator.clone(),
            drag: engine.clone(),
            dom: Rc::clone(&dom),
        };
        let plugin = Plugin::load();
        let registration = plugin
            .view(VIEW_TYPE)
            .ok_or_else(|| eyre!("view {VIEW_TYPE} is not registered"))?;
        let mut view = registration.create(ctx, mount);
        view.on_data_updated();

        Ok(Self {
            vault,
            settings,
            dom,
            engine,
            navigator,
            view,
            runtime,
            vault_name,
            state: AppState::new(),
        })
    }

    pub fn view(&self) -> &KanbanView {
        &self.view
    }

    pub fn dom(&self) -> &SharedDom {
        &self.dom
    }

    pub fn screen<'a>(&'a self, dom: &'a Dom) -> Screen<'a> {
        Screen {
            dom,
            mount: self.view.mount(),
            state: &self.state,
            property: self.view.property(),
            vault_name: &self.vault_name,
        }
    }

    /// Column elements in on-screen order.
    pub fn columns(&self) -> Vec<NodeId> {
        let dom = self.dom.borrow();
        match self.view.board_node() {
            Some(board) => dom.children_with_class(board, css::COLUMN),
            None => Vec::new(),
        }
    }

    fn cards(&self, column: NodeId) -> Vec<NodeId> {
        self.dom.borrow().query_all(column, css::CARD)
    }

    fn selected_card_node(&self) -> Option<NodeId> {
        let column = *self.columns().get(self.state.focused_column)?;
        self.cards(column).get(self.state.selected_card).copied()
    }

    fn clamp_selection(&mut self) {
        let columns = self.columns();
        if columns.is_empty() {
            self.state.focused_column = 0;
            self.state.selected_card = 0;
            return;
        }
        self.state.focused_column = self.state.focused_column.min(columns.len() - 1);
        let cards = self.cards(columns[self.state.focused_column]).len();
        self.state.selected_card = self.state.selected_card.min(cards.saturating_sub(1));
    }

    /// Focus the card with `path`, wherever it is now.
    fn focus_path(&mut self, path: &str) -> bool {
        for (col_idx, column) in self.columns().into_iter().enumerate() {
            let found = {
                let dom = self.dom.borrow();
                dom.query_all(column, css::CARD)
                    .into_iter()
                    .position(|c| dom.attr(c, css::ATTR_ENTRY_PATH) == Some(path))
            };
            if let Some(card_idx) = found {
                self.state.focused_column = col_idx;
                self.state.selected_card = card_idx;
                return true;
            }
        }
        false
    }

    fn column_key(&self, column: NodeId) -> Option<String> {
        self.dom
            .borrow()
            .attr(column, css::ATTR_COLUMN_VALUE)
            .map(str::to_string)
    }

    /// Rescan the vault and notify the view, like a host file watcher would.
    pub fn refresh(&mut self) {
        if let Err(e) = self.vault.reload() {
            tracing::error!("vault reload failed: {e}");
            self.state.notify_error(format!("Reload failed: {e}"));
        }
        self.view.on_data_updated();
        self.clamp_selection();
    }

    pub fn take_pending_open(&self) -> Option<PathBuf> {
        self.navigator.take_pending()
    }

    pub fn close(&mut self) {
        self.view.on_close();
    }

    pub fn handle(&mut self, action: Action) -> color_eyre::Result<()> {
        match action {
            Action::None => {}
            Action::FocusPrevColumn => {
                self.state.focused_column = self.state.focused_column.saturating_sub(1);
                self.clamp_selection();
            }
            Action::FocusNextColumn => {
                self.state.focused_column += 1;
                self.clamp_selection();
            }
            Action::SelectPrevCard => {
                self.state.selected_card = self.state.selected_card.saturating_sub(1);
            }
            Action::SelectNextCard => {
                self.state.selected_card += 1;
                self.clamp_selection();
            }
            Action::DragCardPrev => self.drag_card(false)?,
            Action::DragCardNext => self.drag_card(true)?,
            Action::DragColumnLeft => self.drag_column(false)?,
            Action::DragColumnRight => self.drag_column(true)?,
            Action::OpenCard => {
                if let Some(card) = self.selected_card_node() {
                    self.view.on_click(card);
                }
            }
            Action::PickProperty => self.open_picker(),
            Action::PickerUp => {
                if let Mode::Picker { selected, .. } = &mut self.state.mode {
                    *selected = selected.saturating_sub(1);
                }
            }
            Action::PickerDown => {
                if let Mode::Picker { items, selected } = &mut self.state.mode {
                    if *selected + 1 < items.len() {
                        *selected += 1;
                    }
                }
            }
            Action::PickerConfirm => self.confirm_picker(),
            Action::Reload => self.reload(),
            Action::ShowHelp => self.state.mode = Mode::Help,
            Action::ClosePanel => self.state.mode = Mode::Normal,
            Action::Quit => self.state.should_quit = true,
        }
        Ok(())
    }

    /// Move the selected card to the neighbouring column through the drag
    /// engine, then let the view write it back.
    fn drag_card(&mut self, forward: bool) -> color_eyre::Result<()> {
        let columns = self.columns();
        let from = self.state.focused_column;
        let to = if forward { from + 1 } else { from.wrapping_sub(1) };
        let (Some(card), Some(&target)) = (self.selected_card_node(), columns.get(to)) else {
            return Ok(());
        };
        let path = self.dom.borrow().attr(card, css::ATTR_ENTRY_PATH).map(str::to_string);
        let target_key = self.column_key(target).unwrap_or_default();
        let Some(body) = self.dom.borrow().query(target, css::COLUMN_BODY) else {
            return Ok(());
        };

        let end = self
            .engine
            .borrow()
            .drag(&mut self.dom.borrow_mut(), card, body, usize::MAX)?;
        let Some(end) = end else {
            return Ok(());
        };
        self.runtime.block_on(self.view.on_drag_end(end));
        self.refresh();

        let Some(path) = path else {
            return Ok(());
        };
        self.focus_path(&path);
        let landed = self
            .columns()
            .get(self.state.focused_column)
            .and_then(|&c| self.column_key(c));
        if landed.as_deref() == Some(target_key.as_str()) {
            self.state.notify(format!("Moved to {target_key}"));
        } else {
            self.state.notify_error("Move failed, see log");
        }
        Ok(())
    }

    fn drag_column(&mut self, forward: bool) -> color_eyre::Result<()> {
        let columns = self.columns();
        let from = self.state.focused_column;
        let to = if forward { from + 1 } else { from.wrapping_sub(1) };
        if to >= columns.len() {
            return Ok(());
        }
        let (Some(board), Some(&column)) = (self.view.board_node(), columns.get(from)) else {
            return Ok(());
        };
        let key = self.column_key(column);

        let end = self
            .engine
            .borrow()
            .drag(&mut self.dom.borrow_mut(), column, board, to)?;
        let Some(end) = end else {
            return Ok(());
        };
        self.runtime.block_on(self.view.on_drag_end(end));
        self.refresh();

        self.state.focused_column = to;
        self.clamp_selection();
        if let Some(key) = key {
            self.state.notify(format!("Moved column {key}"));
        }
        Ok(())
    }

    fn open_picker(&mut self) {
        let Some(option) = KanbanView::describe_configuration_options().into_iter().next() else {
            return;
        };
        let items: Vec<PropertyKey> = self
            .vault
            .property_keys()
            .into_iter()
            .filter(|k| option.accepts(k))
            .collect();
        if items.is_empty() {
            self.state.notify_error("No properties to group by");
            return;
        }
        let selected = self
            .view
            .property()
            .and_then(|p| items.iter().position(|k| k == p))
            .unwrap_or(0);
        self.state.mode = Mode::Picker { items, selected };
    }

    fn confirm_picker(&mut self) {
        let Mode::Picker { items, selected } = std::mem::replace(&mut self.state.mode, Mode::Normal) else {
            return;
        };
        let Some(property) = items.get(selected) else {
            return;
        };
        let saved = self.runtime.block_on(self.settings.set_property(property));
        self.state.focused_column = 0;
        self.state.selected_card = 0;
        self.refresh();
        match saved {
            Ok(()) => self.state.notify(format!("Grouped by {property}")),
            Err(e) => {
                tracing::error!("could not save group-by property: {e}");
                self.state.notify_error(format!("Could not save setting: {e}"));
            }
        }
    }

    /// Retry from the error panel, otherwise rescan the vault.
    fn reload(&mut self) {
        if matches!(self.view.state(), ViewState::Error(_)) {
            if let Err(e) = self.vault.reload() {
                tracing::error!("vault reload failed: {e}");
            }
            let retry = self.dom.borrow().query(self.view.mount(), css::ERROR_RETRY);
            if let Some(retry) = retry {
                self.view.on_click(retry);
                self.clamp_selection();
                return;
            }
        }
        self.refresh();
        self.state.notify("Reloaded");
    }
}

/// Main TUI application loop.
pub fn run(terminal: &mut DefaultTerminal, app: &mut App) -> color_eyre::Result<()> {
    loop {
        app.state.tick_notification();

        {
            let dom = app.dom().borrow();
            let screen = app.screen(&dom);
            terminal.draw(|f| crate::ui::render(f, &screen))?;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = map_key(key, &app.state.mode);
                app.handle(action)?;

                if let Some(path) = app.take_pending_open() {
                    open_in_editor(terminal, &path)?;
                    app.refresh();
                }
                if app.state.should_quit {
                    break;
                }
            }
        }
    }
    app.close();
    Ok(())
}

fn open_in_editor(terminal: &mut DefaultTerminal, path: &Path) -> color_eyre::Result<()> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;

    let status = std::process::Command::new(&editor).arg(path).status();

    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    crossterm::terminal::enable_raw_mode()?;
    terminal.clear()?;

    if let Err(e) = status {
        tracing::warn!(editor = %editor, "could not launch editor: {e}");
    }
    Ok(())
}
