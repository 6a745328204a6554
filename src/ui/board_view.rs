use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Padding, Paragraph, Scrollbar, ScrollbarOrientation,
    ScrollbarState, Wrap,
};
use ratatui::Frame;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use bases_kanban::board::UNCATEGORIZED;
use bases_kanban::dom::{Dom, NodeId};
use bases_kanban::view::css;

use super::theme::Theme;
use super::Screen;

/// 1 title line + 2 border lines
const CARD_HEIGHT: u16 = 3;

/// Truncate `text` to `max_width` display columns, ending in `…` when cut.
pub(crate) fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for g in text.graphemes(true) {
        let w = g.width();
        if used + w + 1 > max_width {
            break;
        }
        out.push_str(g);
        used += w;
    }
    out.push('…');
    out
}

/// Render whatever the view mounted: the board, an empty state or the error panel.
pub fn render_mount(f: &mut Frame, area: Rect, screen: &Screen) {
    let dom = screen.dom;
    if let Some(board) = dom.query(screen.mount, css::BOARD) {
        render_board(f, area, dom, board, screen);
    } else if let Some(panel) = dom.query(screen.mount, css::ERROR_PANEL) {
        render_error(f, area, dom, panel);
    } else if let Some(empty) = dom.query(screen.mount, css::EMPTY_STATE) {
        let msg = Paragraph::new(dom.text_content(empty))
            .style(Theme::dim_style())
            .alignment(Alignment::Center);
        let y = area.y + area.height / 2;
        f.render_widget(msg, Rect::new(area.x, y.min(area.bottom().saturating_sub(1)), area.width, 1));
    }
}

fn render_board(f: &mut Frame, area: Rect, dom: &Dom, board: NodeId, screen: &Screen) {
    let columns = dom.children_with_class(board, css::COLUMN);
    if columns.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = columns
        .iter()
        .map(|_| Constraint::Ratio(1, columns.len() as u32))
        .collect();
    let col_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (idx, &column) in columns.iter().enumerate() {
        let is_focused = screen.state.focused_column == idx;
        render_column(f, col_areas[idx], dom, column, is_focused, screen.state.selected_card);
    }
}

fn render_column(f: &mut Frame, area: Rect, dom: &Dom, column: NodeId, is_focused: bool, selected: usize) {
    let title = dom
        .query(column, css::COLUMN_TITLE)
        .map(|n| dom.text_content(n))
        .unwrap_or_default();
    let count = dom
        .query(column, css::COLUMN_COUNT)
        .map(|n| dom.text_content(n))
        .unwrap_or_default();
    let cards = dom.query_all(column, css::CARD);

    let title_color = if dom.attr(column, css::ATTR_COLUMN_VALUE) == Some(UNCATEGORIZED) {
        Theme::UNCATEGORIZED
    } else {
        Theme::COLUMN_HEADER
    };
    let header_line = Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default().fg(title_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(count, Theme::dim_style()),
    ]);

    let focused_mod = if is_focused { Modifier::BOLD } else { Modifier::empty() };
    let border_color = if is_focused {
        Theme::COLUMN_FOCUSED_BORDER
    } else {
        Theme::COLUMN_BORDER
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color).add_modifier(focused_mod))
        .border_type(BorderType::Rounded)
        .title(header_line)
        .padding(Padding::new(1, 1, 0, 0));

    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let max_visible = (inner.height / CARD_HEIGHT) as usize;
    let selected_in_col = if is_focused { selected } else { 0 };
    let scroll_offset = if cards.len() > max_visible && selected_in_col >= max_visible {
        selected_in_col - max_visible + 1
    } else {
        0
    };

    for (idx, &card) in cards.iter().enumerate().skip(scroll_offset).take(max_visible) {
        let y = inner.y + ((idx - scroll_offset) as u16 * CARD_HEIGHT);
        let card_area = Rect::new(inner.x, y, inner.width, CARD_HEIGHT);
        let is_selected = is_focused && idx == selected;
        render_card(f, card_area, dom, card, is_selected, is_focused);
    }

    if cards.len() > max_visible {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        let mut scrollbar_state = ScrollbarState::new(cards.len()).position(scroll_offset);
        f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

fn render_card(f: &mut Frame, area: Rect, dom: &Dom, card: NodeId, is_selected: bool, is_col_focused: bool) {
    // Selection is thick + bold, never a color
    let (border_type, border_mod) = if is_selected {
        (BorderType::Thick, Modifier::BOLD)
    } else {
        (BorderType::Rounded, Modifier::empty())
    };
    let border_color = if is_col_focused { Theme::CARD_BORDER } else { Theme::DIM };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color).add_modifier(border_mod));

    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let title = dom
        .query(card, css::CARD_TITLE)
        .map(|n| dom.text_content(n))
        .unwrap_or_default();
    let title = truncate_to_width(&format!(" {title}"), inner.width as usize);
    let title_mod = if is_selected { Modifier::BOLD } else { Modifier::empty() };
    f.render_widget(
        Paragraph::new(Span::styled(title, Style::default().fg(Theme::CARD_TITLE).add_modifier(title_mod))),
        inner,
    );
}

fn render_error(f: &mut Frame, area: Rect, dom: &Dom, panel: NodeId) {
    let message = dom
        .query(panel, css::ERROR_MESSAGE)
        .map(|n| dom.text_content(n))
        .unwrap_or_default();
    let details = dom
        .query(panel, css::ERROR_DETAILS)
        .and_then(|d| dom.children(d).last().copied())
        .map(|n| dom.text_content(n))
        .unwrap_or_default();

    let panel_area = super::centered_rect(area, 70, 50, 40, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Theme::STATUS_ERROR))
        .title(Span::styled(
            " Error ",
            Style::default().fg(Theme::STATUS_ERROR).add_modifier(Modifier::BOLD),
        ))
        .padding(Padding::new(2, 2, 1, 1));

    let mut lines = vec![
        Line::from(Span::styled(message, Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![
            Span::styled("r", Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD)),
            Span::styled(": Retry", Theme::dim_style()),
        ]),
    ];
    if !details.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Error details", Theme::dim_style())));
        lines.extend(details.lines().map(|l| Line::from(Span::styled(l.to_string(), Theme::dim_style()))));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, panel_area);
}

#[cfg(test)]
mod tests {
    use bases_kanban::board::{Board, GroupKey};
    use bases_kanban::dom::Dom;
    use bases_kanban::view::render;

    use super::*;
    use crate::app::AppState;
    use crate::ui::test_support::{draw, text};

    #[test]
    fn truncate_short_text_is_unchanged() {
        assert_eq!(truncate_to_width("abc", 5), "abc");
        assert_eq!(truncate_to_width("abcde", 5), "abcde");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("abcdef", 0), "");
    }

    #[test]
    fn truncate_counts_wide_graphemes() {
        // each CJK char is two columns wide
        assert_eq!(truncate_to_width("日本語", 5), "日本…");
    }

    fn screen_for<'a>(dom: &'a Dom, mount: NodeId, state: &'a AppState) -> Screen<'a> {
        Screen {
            dom,
            mount,
            state,
            property: None,
            vault_name: "notes",
        }
    }

    #[test]
    fn renders_empty_state_message() {
        let mut dom = Dom::new();
        let mount = dom.create_element("div");
        render::empty_state(&mut dom, mount, "No entries found.").unwrap();
        let state = AppState::new();
        let out = text(&draw(&screen_for(&dom, mount, &state), 60, 10));
        assert!(out.contains("No entries found."));
    }

    #[test]
    fn renders_error_panel_with_retry_hint() {
        let mut dom = Dom::new();
        let mount = dom.create_element("div");
        render::error_panel(&mut dom, mount, "Could not load", "EntrySourceError: boom").unwrap();
        let state = AppState::new();
        let out = text(&draw(&screen_for(&dom, mount, &state), 80, 30));
        assert!(out.contains("Could not load"));
        assert!(out.contains("r: Retry"));
        assert!(out.contains("EntrySourceError: boom"));
    }

    #[test]
    fn renders_columns_with_counts_and_cards() {
        let mut dom = Dom::new();
        let mount = dom.create_element("div");
        let board = Board {
            property: "note.status".into(),
            groups: vec![
                bases_kanban::board::Group {
                    key: GroupKey::from_text("Doing"),
                    entries: Vec::new(),
                },
                bases_kanban::board::Group {
                    key: GroupKey::uncategorized(),
                    entries: Vec::new(),
                },
            ],
        };
        render::board(&mut dom, mount, &board).unwrap();
        let state = AppState::new();
        let out = text(&draw(&screen_for(&dom, mount, &state), 60, 10));
        assert!(out.contains("Doing"));
        assert!(out.contains("Uncategorized"));
        assert!(out.contains("(0)"));
    }
}
