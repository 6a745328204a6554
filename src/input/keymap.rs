use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::action::Action;
use crate::app::Mode;

/// Map a key event to a semantic action based on current mode.
pub fn map_key(key: KeyEvent, mode: &Mode) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    match mode {
        Mode::Normal => map_normal(key),
        Mode::Picker { .. } => map_picker(key),
        Mode::Help => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Action::ClosePanel,
            _ => Action::None,
        },
    }
}

fn map_normal(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => Action::FocusPrevColumn,
        KeyCode::Char('l') | KeyCode::Right => Action::FocusNextColumn,
        KeyCode::Char('k') | KeyCode::Up => Action::SelectPrevCard,
        KeyCode::Char('j') | KeyCode::Down => Action::SelectNextCard,
        KeyCode::Char('H') => Action::DragCardPrev,
        KeyCode::Char('L') => Action::DragCardNext,
        KeyCode::Char('<') => Action::DragColumnLeft,
        KeyCode::Char('>') => Action::DragColumnRight,
        KeyCode::Enter => Action::OpenCard,
        KeyCode::Char('g') => Action::PickProperty,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Char('?') => Action::ShowHelp,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::None,
    }
}

fn map_picker(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('k') | KeyCode::Up => Action::PickerUp,
        KeyCode::Char('j') | KeyCode::Down => Action::PickerDown,
        KeyCode::Enter => Action::PickerConfirm,
        KeyCode::Esc | KeyCode::Char('q') => Action::ClosePanel,
        _ => Action::None,
    }
}

// ---------------------------------------------------------------------------
// Keybinding registry, the source for help text
// Used by the help overlay.
// ---------------------------------------------------------------------------

/// A documented keybinding for display in help.
pub struct Binding {
    pub key: &'static str,
    pub description: &'static str,
}

/// A group of related bindings (one section in help).
pub struct BindingGroup {
    pub name: &'static str,
    pub bindings: &'static [Binding],
}

pub const NAVIGATION_BINDINGS: &[Binding] = &[
    Binding { key: "h / l", description: "Switch columns" },
    Binding { key: "j / k", description: "Move between cards" },
    Binding { key: "Enter", description: "Open note in $EDITOR" },
];

pub const DRAG_BINDINGS: &[Binding] = &[
    Binding { key: "H / L", description: "Drag card to previous/next column" },
    Binding { key: "< / >", description: "Drag column left/right" },
];

pub const BOARD_BINDINGS: &[Binding] = &[
    Binding { key: "g", description: "Pick group-by property" },
    Binding { key: "r", description: "Retry / reload notes" },
    Binding { key: "?", description: "Help" },
    Binding { key: "q", description: "Quit" },
];

pub const PICKER_BINDINGS: &[Binding] = &[
    Binding { key: "j / k", description: "Move selection" },
    Binding { key: "Enter", description: "Group by selected property" },
    Binding { key: "Esc", description: "Cancel" },
];

/// All binding groups for the help overlay.
pub const HELP_GROUPS: &[BindingGroup] = &[
    BindingGroup { name: "Navigation", bindings: NAVIGATION_BINDINGS },
    BindingGroup { name: "Drag", bindings: DRAG_BINDINGS },
    BindingGroup { name: "Board", bindings: BOARD_BINDINGS },
    BindingGroup { name: "Property Picker (g)", bindings: PICKER_BINDINGS },
];
