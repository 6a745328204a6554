use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;

/// Bottom-right popup listing `items`, with `selected` highlighted.
pub fn render_picker(f: &mut Frame, area: Rect, title: &str, items: &[String], selected: usize) {
    let max_label_len = items.iter().map(|l| l.width()).max().unwrap_or(0).max(title.width());
    let popup_width = ((max_label_len + 6) as u16).max(20).min(area.width.saturating_sub(4));
    let popup_height = (items.len() as u16 + 2).min(area.height.saturating_sub(4)).max(3);
    let x = area.x + area.width.saturating_sub(popup_width);
    let y = area.y + area.height.saturating_sub(popup_height);
    let popup_area = Rect::new(x, y, popup_width, popup_height).intersection(area);

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(Theme::FG))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(Theme::FG)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    // keep the selection visible in long lists
    let rows = inner.height as usize;
    let offset = if rows > 0 && selected >= rows { selected + 1 - rows } else { 0 };

    for (row, (i, label)) in items.iter().enumerate().skip(offset).take(rows).enumerate() {
        let sel_mod = if i == selected {
            Modifier::BOLD | Modifier::REVERSED
        } else {
            Modifier::empty()
        };
        let line = Line::from(vec![
            Span::raw("  "),
            Span::styled(label.clone(), Style::default().fg(Theme::FG).add_modifier(sel_mod)),
        ]);
        f.render_widget(
            Paragraph::new(line),
            Rect::new(inner.x, inner.y + row as u16, inner.width, 1),
        );
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::ui::test_support::text;

    #[test]
    fn shows_title_and_items() {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let items = vec!["note.owner".to_string(), "note.status".to_string()];
        terminal
            .draw(|f| render_picker(f, f.area(), "Group by", &items, 1))
            .unwrap();
        let out = text(terminal.backend().buffer());
        assert!(out.contains("Group by"));
        assert!(out.contains("note.owner"));
        assert!(out.contains("note.status"));
    }

    #[test]
    fn scrolls_to_selection() {
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        let items: Vec<String> = (0..20).map(|i| format!("note.p{i:02}")).collect();
        terminal
            .draw(|f| render_picker(f, f.area(), "Group by", &items, 15))
            .unwrap();
        let out = text(terminal.backend().buffer());
        assert!(out.contains("note.p15"));
        assert!(!out.contains("note.p00"));
    }
}
