//! Element construction for boards, empty states and the error panel.

use crate::board::Board;
use crate::dom::{Dom, DomError, NodeId};

use super::css;

pub const NO_ENTRIES: &str = "No entries found. Add some notes to your base.";
pub const NO_PROPERTIES: &str = "No properties found in entries.";

const HANDLE_GLYPH: &str = "⋮⋮";

pub fn empty_state(dom: &mut Dom, mount: NodeId, message: &str) -> Result<NodeId, DomError> {
    let node = dom.create_child(mount, "div", css::EMPTY_STATE)?;
    dom.set_text(node, message)?;
    Ok(node)
}

/// Render every group as a column under a fresh board element.
pub fn board(dom: &mut Dom, mount: NodeId, board: &Board) -> Result<NodeId, DomError> {
    let root = dom.create_child(mount, "div", css::BOARD)?;
    for (position, group) in board.groups.iter().enumerate() {
        let column = dom.create_child(root, "div", css::COLUMN)?;
        dom.set_attr(column, css::ATTR_COLUMN_VALUE, group.key.as_str())?;
        dom.set_attr(column, css::ATTR_COLUMN_POSITION, position.to_string())?;

        let header = dom.create_child(column, "div", css::COLUMN_HEADER)?;
        let handle = dom.create_child(header, "div", css::COLUMN_HANDLE)?;
        dom.set_text(handle, HANDLE_GLYPH)?;
        let title = dom.create_child(header, "span", css::COLUMN_TITLE)?;
        dom.set_text(title, group.key.as_str())?;
        let count = dom.create_child(header, "span", css::COLUMN_COUNT)?;
        dom.set_text(count, format!("({})", group.entries.len()))?;

        let body = dom.create_child(column, "div", css::COLUMN_BODY)?;
        dom.set_attr(body, css::ATTR_SORTABLE, "true")?;
        for entry in &group.entries {
            let card = dom.create_child(body, "div", css::CARD)?;
            dom.set_attr(card, css::ATTR_ENTRY_PATH, entry.path())?;
            let title = dom.create_child(card, "div", css::CARD_TITLE)?;
            dom.set_text(title, entry.display_name())?;
        }
    }
    Ok(root)
}

/// Message, retry button and a collapsible block with the full details.
pub fn error_panel(dom: &mut Dom, mount: NodeId, message: &str, details: &str) -> Result<NodeId, DomError> {
    let panel = dom.create_child(mount, "div", css::ERROR_PANEL)?;
    let text = dom.create_child(panel, "p", css::ERROR_MESSAGE)?;
    dom.set_text(text, message)?;
    let retry = dom.create_child(panel, "button", css::ERROR_RETRY)?;
    dom.set_attr(retry, css::ATTR_ACTION, css::ACTION_RETRY)?;
    dom.set_text(retry, "Retry")?;
    let block = dom.create_child(panel, "details", css::ERROR_DETAILS)?;
    let summary = dom.create_child(block, "summary", "")?;
    dom.set_text(summary, "Error details")?;
    let pre = dom.create_child(block, "pre", "")?;
    dom.set_text(pre, details)?;
    Ok(panel)
}
