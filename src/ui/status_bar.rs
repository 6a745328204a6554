use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use bases_kanban::view::css;

use super::theme::Theme;
use super::Screen;
use crate::app::{AppState, Mode, NotificationLevel};

pub fn render_status_bar(f: &mut Frame, area: Rect, screen: &Screen) {
    let left = build_left_zone(screen);
    let right = build_right_zone(screen);

    let left_width: usize = left.iter().map(|s| s.content.width()).sum();
    let right_width: usize = right.iter().map(|s| s.content.width()).sum();
    let total_width = area.width as usize;

    // Center zone: notification (fills remaining space)
    let center_avail = total_width.saturating_sub(left_width + right_width);
    let center = build_center_zone(screen.state, center_avail);

    let mut spans = left;
    spans.extend(center);
    spans.extend(right);

    let paragraph = Paragraph::new(Line::from(spans)).style(Theme::status_style());
    f.render_widget(paragraph, area);
}

/// Mode badge, vault name and grouping property.
fn build_left_zone<'a>(screen: &Screen<'a>) -> Vec<Span<'a>> {
    let mode_str = match &screen.state.mode {
        Mode::Normal => "NORMAL",
        Mode::Help => "HELP",
        Mode::Picker { .. } => "PICKER",
    };

    let mut spans = vec![
        Span::styled(
            format!(" {mode_str} "),
            Style::default()
                .fg(Theme::FG)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        ),
        Span::raw(" "),
        Span::styled(format!("{} ", screen.vault_name), Style::default().fg(Theme::DIM)),
    ];
    if let Some(property) = screen.property {
        spans.push(Span::styled(
            format!("group by {property} "),
            Style::default().fg(Theme::FG),
        ));
    }
    spans
}

/// Focused column position and the help hint.
fn build_right_zone<'a>(screen: &Screen<'a>) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    let dom = screen.dom;
    let column = dom
        .query(screen.mount, css::BOARD)
        .and_then(|board| dom.children_with_class(board, css::COLUMN).get(screen.state.focused_column).copied());

    if let Some(column) = column {
        let name = dom.attr(column, css::ATTR_COLUMN_VALUE).unwrap_or_default();
        let card_count = dom.query_all(column, css::CARD).len();
        let pos = if card_count > 0 {
            format!(" {}/{}", screen.state.selected_card + 1, card_count)
        } else {
            " 0".to_string()
        };
        spans.push(Span::styled(
            format!("{name}[{card_count}]"),
            Style::default().fg(Theme::DIM),
        ));
        spans.push(Span::styled(pos, Style::default().fg(Theme::FG)));
    }

    spans.push(Span::styled("  ? help ", Theme::dim_style()));
    spans
}

/// Build the center zone: notification text padded to fill available width.
fn build_center_zone<'a>(state: &'a AppState, avail_width: usize) -> Vec<Span<'a>> {
    if let Some(ref notif) = state.notification {
        let notif_width = notif.width();
        let color = match state.notification_level {
            NotificationLevel::Info => Theme::FG,
            NotificationLevel::Error => Theme::STATUS_ERROR,
        };

        if notif_width >= avail_width {
            let truncated = super::board_view::truncate_to_width(notif, avail_width);
            return vec![Span::styled(truncated, Style::default().fg(color))];
        }

        let pad_total = avail_width - notif_width;
        let pad_left = pad_total / 2;
        let pad_right = pad_total - pad_left;

        vec![
            Span::raw(" ".repeat(pad_left)),
            Span::styled(notif.as_str(), Style::default().fg(color)),
            Span::raw(" ".repeat(pad_right)),
        ]
    } else {
        vec![Span::raw(" ".repeat(avail_width))]
    }
}

#[cfg(test)]
mod tests {
    use bases_kanban::dom::Dom;
    use bases_kanban::host::PropertyKey;

    use super::*;
    use crate::ui::test_support::{draw, text};

    #[test]
    fn shows_mode_vault_and_property() {
        let mut dom = Dom::new();
        let mount = dom.create_element("div");
        let state = AppState::new();
        let property = PropertyKey::from("note.status");
        let screen = Screen {
            dom: &dom,
            mount,
            state: &state,
            property: Some(&property),
            vault_name: "notes",
        };
        let buffer = draw(&screen, 80, 3);
        let out = text(&buffer);
        let last = out.lines().last().unwrap();
        assert!(last.contains("NORMAL"));
        assert!(last.contains("notes"));
        assert!(last.contains("group by note.status"));
        assert!(last.contains("? help"));
    }

    #[test]
    fn shows_notification() {
        let mut dom = Dom::new();
        let mount = dom.create_element("div");
        let mut state = AppState::new();
        state.notify_error("Move failed");
        let screen = Screen {
            dom: &dom,
            mount,
            state: &state,
            property: None,
            vault_name: "notes",
        };
        let out = text(&draw(&screen, 80, 3));
        assert!(out.contains("Move failed"));
    }
}
