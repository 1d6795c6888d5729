/// Something the user asked the shell to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Panel
    TogglePanel,
    ToggleResizable,
    /// Grow (positive) or shrink (negative) the panel by this many columns
    ResizePanel(i16),
    BackdropClick,

    // Pointer, in viewport columns
    PointerDown(u16),
    PointerMove(u16),
    PointerUp(u16),

    // Host simulation
    FlipDarkPreference,
    FlipOnline,
    ViewportResized(u16),

    // App control
    Quit,
    None,
}
