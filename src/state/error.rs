use super::event::PermissionEvent;
use super::model::PermissionState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid permission transition: from {from:?} using event {event:?}")]
    InvalidStateTransition {
        from: PermissionState,
        event: PermissionEvent,
    },
}
