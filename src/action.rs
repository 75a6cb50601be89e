use crate::types::{PageRequest, PageResult};

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    Resize(u16),

    // Loading
    LoadInitial,
    Refresh,
    NextPage,
    PreviousPage,
    PageLoaded {
        request: PageRequest,
        result: PageResult,
        load_id: u64,
    },

    // Autoscroll
    ToggleAutoscroll,
    AutoscrollTick,

    // Jump to item number
    EnterGotoMode,
    ExitGotoMode,
    GotoInput(char),
    GotoBackspace,
    GotoConfirm,

    OpenInBrowser,
    YankUrl,

    None,
}
