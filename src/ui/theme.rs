use ratatui::style::{Color, Style};

/// Color theme for the board.
///
/// All text and UI chrome uses the terminal's default foreground color (Color::Reset).
/// Only the uncategorized column and errors get color.
pub struct Theme;

impl Theme {
    // Base: the terminal's own foreground
    pub const FG: Color = Color::Reset;
    pub const DIM: Color = Color::DarkGray;

    // Column
    pub const COLUMN_HEADER: Color = Color::Reset;
    pub const COLUMN_BORDER: Color = Color::Reset;
    pub const COLUMN_FOCUSED_BORDER: Color = Color::Reset;
    pub const UNCATEGORIZED: Color = Color::Yellow;

    // Card
    pub const CARD_BORDER: Color = Color::Reset;
    pub const CARD_TITLE: Color = Color::Reset;

    // Errors
    pub const STATUS_ERROR: Color = Color::Red;

    pub fn dim_style() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn status_style() -> Style {
        Style::default().fg(Self::FG)
    }
}
