use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Camera,
}

/// One entry of the host's answer to a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantResult {
    Granted,
    Denied,
}

/// Only the first entry counts, and only an explicit grant is a success.
pub fn first_result_granted(results: &[GrantResult]) -> bool {
    matches!(results.first(), Some(GrantResult::Granted))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Pending,
    Resolved { granted: bool },
}

/// Host side of a pending prompt.
#[derive(Debug)]
pub struct PermissionResponder {
    sender: Sender<Vec<GrantResult>>,
}

impl PermissionResponder {
    pub fn respond(self, results: Vec<GrantResult>) {
        if self.sender.send(results).is_err() {
            tracing::debug!("permission answer arrived after the ticket was dropped");
        }
    }
}

/// Launcher side of a pending prompt. A responder dropped without answering
/// resolves the ticket as denied.
#[derive(Debug)]
pub struct PermissionTicket {
    receiver: Receiver<Vec<GrantResult>>,
}

impl PermissionTicket {
    pub fn channel() -> (PermissionResponder, Self) {
        let (sender, receiver) = mpsc::channel();
        (PermissionResponder { sender }, Self { receiver })
    }

    pub fn try_resolve(&self) -> TicketStatus {
        match self.receiver.try_recv() {
            Ok(results) => resolved(&results),
            Err(TryRecvError::Empty) => TicketStatus::Pending,
            Err(TryRecvError::Disconnected) => abandoned(),
        }
    }

    pub fn resolve_within(&self, timeout: Duration) -> TicketStatus {
        match self.receiver.recv_timeout(timeout) {
            Ok(results) => resolved(&results),
            Err(RecvTimeoutError::Timeout) => TicketStatus::Pending,
            Err(RecvTimeoutError::Disconnected) => abandoned(),
        }
    }
}

fn resolved(results: &[GrantResult]) -> TicketStatus {
    TicketStatus::Resolved {
        granted: first_result_granted(results),
    }
}

fn abandoned() -> TicketStatus {
    tracing::warn!("permission prompt abandoned by host; treating as denied");
    TicketStatus::Resolved { granted: false }
}

pub trait PermissionHost {
    /// Current grant status, without prompting.
    fn query(&self, capability: Capability) -> bool;
    /// Issues a prompt; the answer arrives later through the ticket.
    fn request(&self, capability: Capability) -> PermissionTicket;
}

/// Desktop host: the camera is granted when its device node can be opened.
#[derive(Debug, Clone)]
pub struct DeviceNodeHost {
    camera_device: PathBuf,
}

impl DeviceNodeHost {
    pub fn new(camera_device: impl Into<PathBuf>) -> Self {
        Self {
            camera_device: camera_device.into(),
        }
    }
}

impl PermissionHost for DeviceNodeHost {
    fn query(&self, capability: Capability) -> bool {
        match capability {
            Capability::Camera => probe_device_node(&self.camera_device),
        }
    }

    fn request(&self, capability: Capability) -> PermissionTicket {
        let (responder, ticket) = PermissionTicket::channel();
        let device = self.camera_device.clone();
        let spawned = thread::Builder::new()
            .name("camera-permission-probe".to_string())
            .spawn(move || {
                let granted = match capability {
                    Capability::Camera => probe_device_node(&device),
                };
                let answer = if granted {
                    GrantResult::Granted
                } else {
                    GrantResult::Denied
                };
                responder.respond(vec![answer]);
            });
        if let Err(err) = spawned {
            tracing::warn!(?err, "failed to start permission probe");
        }
        ticket
    }
}

fn probe_device_node(device: &Path) -> bool {
    match File::open(device) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(?err, device = %device.display(), "camera device not accessible");
            false
        }
    }
}
