mod host;

pub use host::{
    first_result_granted, Capability, DeviceNodeHost, GrantResult, PermissionHost,
    PermissionResponder, PermissionTicket, TicketStatus,
};

use crate::journal::Logger;
use crate::notification::{Notice, Notifier};
use crate::state::{PermissionEvent, PermissionState, StateMachine, StateResult};

/// Camera permission gate in front of every session launch.
///
/// Single-threaded: host answers must be routed back on the loop thread that
/// owns the gate.
#[derive(Debug, Default)]
pub struct PermissionGate {
    machine: StateMachine,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PermissionState {
        self.machine.state()
    }

    /// Asks the host without prompting and mirrors its answer.
    pub fn check(&mut self, host: &dyn PermissionHost, logger: &Logger) -> bool {
        let granted = host.query(Capability::Camera);
        logger.record(format!("[CAMERA] Permission granted? {granted}"));

        let event = match (granted, self.state()) {
            (true, PermissionState::Unknown | PermissionState::Denied) => {
                Some(PermissionEvent::Confirm)
            }
            (false, PermissionState::Granted) => Some(PermissionEvent::Revoke),
            _ => None,
        };
        if let Some(event) = event {
            if let Err(err) = self.machine.transition(event) {
                tracing::warn!(%err, "permission check could not be mirrored");
            }
        }
        granted
    }

    /// Prompts the user. Returns `None` when a prompt is already in flight (or
    /// the permission is already held), so the host is never asked twice.
    pub fn request(
        &mut self,
        host: &dyn PermissionHost,
        logger: &Logger,
    ) -> Option<PermissionTicket> {
        if self.state().is_pending() {
            tracing::debug!("camera permission prompt already pending");
            return None;
        }
        if let Err(err) = self.machine.transition(PermissionEvent::Request) {
            tracing::warn!(%err, "camera permission request ignored");
            return None;
        }

        logger.record("[CAMERA] Requesting camera permission...");
        Some(host.request(Capability::Camera))
    }

    /// Applies the user's answer. The caller starts the session when this
    /// returns `Granted`.
    pub fn on_result(
        &mut self,
        granted: bool,
        logger: &Logger,
        notifier: &dyn Notifier,
    ) -> StateResult<PermissionState> {
        if granted {
            let state = self.machine.transition(PermissionEvent::Grant)?;
            logger.record("[CAMERA] Permission granted by user");
            notifier.notify(Notice::short("Camera permission granted"));
            Ok(state)
        } else {
            let state = self.machine.transition(PermissionEvent::Deny)?;
            logger.record("[CAMERA ERROR] Permission denied by user");
            notifier.notify(Notice::long("Camera permission is required for SLAM"));
            Ok(state)
        }
    }
}
