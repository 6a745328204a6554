/// All possible semantic actions on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Navigation
    FocusPrevColumn,
    FocusNextColumn,
    SelectPrevCard,
    SelectNextCard,

    // Drag gestures
    DragCardPrev,
    DragCardNext,
    DragColumnLeft,
    DragColumnRight,

    // Card actions
    OpenCard,

    // Board
    PickProperty,
    Reload,
    ShowHelp,
    Quit,

    // Picker / overlays
    PickerUp,
    PickerDown,
    PickerConfirm,
    ClosePanel,

    // No-op
    None,
}
