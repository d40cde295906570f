use super::error::{StateError, StateResult};
use super::{PermissionEvent, PermissionState, StateTransition};

#[derive(Debug)]
pub struct StateMachine {
    state: PermissionState,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: PermissionState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    pub fn can_transition(&self, event: PermissionEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: PermissionEvent) -> Option<PermissionState> {
        use PermissionEvent::*;
        match (self.state, event) {
            (PermissionState::Unknown, Request) => Some(PermissionState::Requesting),
            (PermissionState::Denied, Request) => Some(PermissionState::Requesting),
            (PermissionState::Requesting, Grant) => Some(PermissionState::Granted),
            (PermissionState::Requesting, Deny) => Some(PermissionState::Denied),
            (PermissionState::Unknown, Confirm) => Some(PermissionState::Granted),
            (PermissionState::Denied, Confirm) => Some(PermissionState::Granted),
            (PermissionState::Granted, Revoke) => Some(PermissionState::Denied),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: PermissionEvent) -> StateResult<PermissionState> {
        tracing::debug!(from = ?self.state, event = ?event, "request permission transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid permission transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        self.transition_history.push(record);

        Ok(self.state)
    }
}

#[cfg(test)]
impl StateMachine {
    fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PermissionState::{:?}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EVENTS: [PermissionEvent; 5] = [
        PermissionEvent::Request,
        PermissionEvent::Grant,
        PermissionEvent::Deny,
        PermissionEvent::Confirm,
        PermissionEvent::Revoke,
    ];

    #[test]
    fn request_then_grant_reaches_granted() {
        let mut machine = StateMachine::new();
        assert_eq!(machine.state(), PermissionState::Unknown);

        machine
            .transition(PermissionEvent::Request)
            .expect("unknown -> requesting should transition");
        machine
            .transition(PermissionEvent::Grant)
            .expect("requesting -> granted should transition");

        assert_eq!(machine.state(), PermissionState::Granted);
        assert_eq!(
            machine.history(),
            &[
                StateTransition::new(
                    Some(PermissionState::Unknown),
                    PermissionEvent::Request,
                    PermissionState::Requesting
                ),
                StateTransition::new(
                    Some(PermissionState::Requesting),
                    PermissionEvent::Grant,
                    PermissionState::Granted
                ),
            ]
        );
    }

    #[test]
    fn denied_can_be_requested_again() {
        let mut machine = StateMachine::new();
        machine.transition(PermissionEvent::Request).unwrap();
        machine.transition(PermissionEvent::Deny).unwrap();
        assert_eq!(machine.state(), PermissionState::Denied);

        machine
            .transition(PermissionEvent::Request)
            .expect("denied -> requesting should transition");
        assert_eq!(machine.state(), PermissionState::Requesting);
    }

    #[test]
    fn requesting_only_accepts_a_user_answer() {
        let mut machine = StateMachine::new();
        machine.transition(PermissionEvent::Request).unwrap();

        let accepted: Vec<_> = ALL_EVENTS
            .into_iter()
            .filter(|event| machine.can_transition(*event))
            .collect();
        assert_eq!(accepted, vec![PermissionEvent::Grant, PermissionEvent::Deny]);
    }

    #[test]
    fn granted_only_leaves_through_revoke() {
        let mut machine = StateMachine::new();
        machine.transition(PermissionEvent::Confirm).unwrap();

        let accepted: Vec<_> = ALL_EVENTS
            .into_iter()
            .filter(|event| machine.can_transition(*event))
            .collect();
        assert_eq!(accepted, vec![PermissionEvent::Revoke]);
    }

    #[test]
    fn revoked_grant_is_treated_as_denied() {
        let mut machine = StateMachine::new();
        machine.transition(PermissionEvent::Confirm).unwrap();
        machine
            .transition(PermissionEvent::Revoke)
            .expect("granted -> denied should transition");

        assert_eq!(machine.state(), PermissionState::Denied);
        assert!(machine.can_transition(PermissionEvent::Request));
        assert!(machine.can_transition(PermissionEvent::Confirm));
        assert!(!machine.can_transition(PermissionEvent::Revoke));
    }

    #[test]
    fn invalid_transition_returns_error_without_mutating_history() {
        let mut machine = StateMachine::new();

        let err = machine
            .transition(PermissionEvent::Grant)
            .expect_err("unknown -> grant should fail");
        assert!(matches!(
            err,
            StateError::InvalidStateTransition {
                from: PermissionState::Unknown,
                event: PermissionEvent::Grant
            }
        ));
        assert_eq!(machine.state(), PermissionState::Unknown);
        assert!(machine.history().is_empty());
    }
}
