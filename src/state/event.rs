use super::model::PermissionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionEvent {
    /// A prompt was issued to the host.
    Request,
    /// The user accepted the pending prompt.
    Grant,
    /// The user declined (or abandoned) the pending prompt.
    Deny,
    /// A host query reported the permission as already held.
    Confirm,
    /// A host query reported a previously held permission as gone.
    Revoke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: Option<PermissionState>,
    pub event: PermissionEvent,
    pub to: PermissionState,
}

impl StateTransition {
    pub const fn new(
        from: Option<PermissionState>,
        event: PermissionEvent,
        to: PermissionState,
    ) -> Self {
        Self { from, event, to }
    }
}
