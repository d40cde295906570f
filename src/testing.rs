//! Test doubles for the launcher's collaborators.

use std::cell::{Cell, RefCell};

use crate::journal::Logger;
use crate::notification::{Notice, Notifier};
use crate::permission::{
    Capability, GrantResult, PermissionHost, PermissionResponder, PermissionTicket,
};
use crate::session::{EngineHandoff, HandoffError, SessionRequest};

pub(crate) fn messages(logger: &Logger) -> Vec<String> {
    logger
        .entries()
        .iter()
        .map(|entry| entry.message().to_string())
        .collect()
}

#[derive(Debug, Default)]
pub(crate) struct RecordingEngine {
    requests: RefCell<Vec<SessionRequest>>,
    failure: Option<String>,
}

impl RecordingEngine {
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<SessionRequest> {
        self.requests.borrow().clone()
    }
}

impl EngineHandoff for RecordingEngine {
    fn hand_off(&self, request: &SessionRequest) -> Result<(), HandoffError> {
        self.requests.borrow_mut().push(request.clone());
        match &self.failure {
            Some(message) => Err(HandoffError::Rejected {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

/// Host whose query answer is fixed by the test and whose prompts are
/// answered by hand through [`ScriptedHost::answer`].
#[derive(Debug, Default)]
pub(crate) struct ScriptedHost {
    granted: Cell<bool>,
    prompts: Cell<usize>,
    responders: RefCell<Vec<PermissionResponder>>,
}

impl ScriptedHost {
    pub(crate) fn granted() -> Self {
        let host = Self::default();
        host.granted.set(true);
        host
    }

    pub(crate) fn set_granted(&self, granted: bool) {
        self.granted.set(granted);
    }

    pub(crate) fn prompts(&self) -> usize {
        self.prompts.get()
    }

    pub(crate) fn answer(&self, results: Vec<GrantResult>) {
        let responder = self.responders.borrow_mut().remove(0);
        responder.respond(results);
    }

    pub(crate) fn abandon(&self) {
        self.responders.borrow_mut().clear();
    }
}

impl PermissionHost for ScriptedHost {
    fn query(&self, _capability: Capability) -> bool {
        self.granted.get()
    }

    fn request(&self, _capability: Capability) -> PermissionTicket {
        self.prompts.set(self.prompts.get() + 1);
        let (responder, ticket) = PermissionTicket::channel();
        self.responders.borrow_mut().push(responder);
        ticket
    }
}
