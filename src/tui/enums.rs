//! Enumerations for TUI state management.

/// Which screen or modal is in front.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Loading,
    TaskList,
    CategoryPicker,
    Confirm,
    Alert,
    Help,
}

/// Which part of the task list screen receives keys.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Input,
    List,
}

/// Bulk action waiting for confirmation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConfirmAction {
    ClearCompleted,
    ClearAll,
}

impl ConfirmAction {
    pub fn title(self) -> &'static str {
        match self {
            ConfirmAction::ClearCompleted => "Clear Completed",
            ConfirmAction::ClearAll => "Clear All",
        }
    }

    pub fn question(self) -> &'static str {
        match self {
            ConfirmAction::ClearCompleted => "Are you sure you want to remove all completed tasks?",
            ConfirmAction::ClearAll => "Are you sure you want to remove all tasks?",
        }
    }
}
