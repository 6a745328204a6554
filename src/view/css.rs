//! Class names and attributes of the rendered board.

pub const CONTAINER: &str = "kanban-view-container";
pub const BOARD: &str = "kanban-board";
pub const COLUMN: &str = "kanban-column";
pub const COLUMN_HEADER: &str = "kanban-column-header";
pub const COLUMN_HANDLE: &str = "kanban-column-drag-handle";
pub const COLUMN_TITLE: &str = "kanban-column-title";
pub const COLUMN_COUNT: &str = "kanban-column-count";
pub const COLUMN_BODY: &str = "kanban-column-body";
pub const CARD: &str = "kanban-card";
pub const CARD_TITLE: &str = "kanban-card-title";
pub const EMPTY_STATE: &str = "kanban-empty-state";

pub const CARD_DRAGGING: &str = "kanban-card-dragging";
pub const CARD_GHOST: &str = "kanban-card-ghost";
pub const CARD_CHOSEN: &str = "kanban-card-chosen";
pub const COLUMN_DRAGGING: &str = "kanban-column-dragging";
pub const COLUMN_GHOST: &str = "kanban-column-ghost";

pub const ERROR_PANEL: &str = "kanban-error";
pub const ERROR_MESSAGE: &str = "kanban-error-message";
pub const ERROR_RETRY: &str = "kanban-error-retry";
pub const ERROR_DETAILS: &str = "kanban-error-details";

pub const ATTR_COLUMN_VALUE: &str = "data-column-value";
pub const ATTR_COLUMN_POSITION: &str = "data-column-position";
pub const ATTR_SORTABLE: &str = "data-sortable-container";
pub const ATTR_ENTRY_PATH: &str = "data-entry-path";
pub const ATTR_ACTION: &str = "data-action";

pub const ACTION_RETRY: &str = "retry";
