/// Lifecycle of a receive dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl DispatcherState {
    pub fn is_active(self) -> bool {
        matches!(self, DispatcherState::Running | DispatcherState::Stopping)
    }
}
