#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    ScrollLogUp,
    ScrollLogDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagersAction {
    Toggle,
    Select,
    Refresh,
    RefreshAll,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagesAction {
    Toggle,
    Back,
    Update,
    UpdateAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Confirm,
    Cancel,
}
