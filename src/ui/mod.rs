pub mod board_view;
pub mod help;
pub mod input_modal;
pub mod status_bar;
pub mod theme;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use bases_kanban::dom::{Dom, NodeId};
use bases_kanban::host::PropertyKey;

use crate::app::{AppState, Mode};

/// Everything a frame needs: the element tree the view rendered plus
/// terminal-side state.
pub struct Screen<'a> {
    pub dom: &'a Dom,
    pub mount: NodeId,
    pub state: &'a AppState,
    pub property: Option<&'a PropertyKey>,
    pub vault_name: &'a str,
}

/// Create a centered rect within `area` using percentage-based sizing with minimums.
pub fn centered_rect(area: Rect, w_pct: u16, h_pct: u16, min_w: u16, min_h: u16) -> Rect {
    let width = (area.width * w_pct / 100).max(min_w).min(area.width);
    let height = (area.height * h_pct / 100).max(min_h).min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

pub fn render(f: &mut Frame, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    board_view::render_mount(f, chunks[0], screen);
    status_bar::render_status_bar(f, chunks[1], screen);

    // Overlays
    match &screen.state.mode {
        Mode::Picker { items, selected } => {
            let labels: Vec<String> = items.iter().map(|k| k.to_string()).collect();
            input_modal::render_picker(f, chunks[0], "Group by", &labels, *selected);
        }
        Mode::Help => help::render_help(f, f.area()),
        Mode::Normal => {}
    }
}
