//! The launcher's session context and its action dispatch.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::input::{GestureRouter, ViewState};
use crate::journal::Logger;
use crate::notification::Notifier;
use crate::permission::{
    DeviceNodeHost, PermissionGate, PermissionHost, PermissionTicket, TicketStatus,
};
use crate::session::{
    ConfigStore, Configuration, EngineHandoff, LaunchReport, ProcessEngineHandoff,
    SessionLauncher,
};
use crate::state::PermissionState;
use crate::storage::{session_log_path, ExternalStorage, PathSelection, PathTarget};

pub mod console;
#[cfg(feature = "gui")]
pub mod gui;

/// What a front-end can ask the launcher to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchpadAction {
    StartSession,
    ChooseCalibration,
    ChooseVocabulary,
}

impl LaunchpadAction {
    pub const fn for_target(target: PathTarget) -> Self {
        match target {
            PathTarget::Calibration => Self::ChooseCalibration,
            PathTarget::Vocabulary => Self::ChooseVocabulary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Launched(LaunchReport),
    /// A permission prompt is in flight; poll until it resolves.
    PermissionPending,
    /// The front-end should show its file chooser for `target`.
    PickPath { target: PathTarget, start_dir: PathBuf },
    /// The action was refused and journaled; nothing else to do.
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionPoll {
    Idle,
    Pending,
    Resolved {
        state: PermissionState,
        launch: Option<LaunchReport>,
    },
}

/// Host-facing services the launcher talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub host: Rc<dyn PermissionHost>,
    pub engine: Rc<dyn EngineHandoff>,
    pub notifier: Rc<dyn Notifier>,
}

impl Collaborators {
    pub fn from_config(config: &AppConfig, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            host: Rc::new(DeviceNodeHost::new(config.camera_device())),
            engine: Rc::new(ProcessEngineHandoff::new(
                config.engine_command(),
                config.engine_args.clone(),
            )),
            notifier,
        }
    }
}

/// Session context owned by the UI loop: configuration, permission state,
/// panel state and the journal they all write to.
pub struct Launchpad {
    logger: Logger,
    config: ConfigStore,
    permission: PermissionGate,
    gestures: GestureRouter,
    storage: ExternalStorage,
    collaborators: Collaborators,
    pending_permission: Option<PermissionTicket>,
}

impl Launchpad {
    pub fn new(logger: Logger, storage: ExternalStorage, collaborators: Collaborators) -> Self {
        Self {
            logger,
            config: ConfigStore::new(Configuration::default()),
            permission: PermissionGate::new(),
            gestures: GestureRouter::new(),
            storage,
            collaborators,
            pending_permission: None,
        }
    }

    pub fn from_config(config: &AppConfig, notifier: Rc<dyn Notifier>) -> Self {
        let logger = match session_log_path(config) {
            Ok(path) => Logger::open(&path),
            Err(err) => {
                tracing::warn!(?err, "no app data directory for the session log");
                let logger = Logger::display_only();
                logger.record(format!("[LOG ERROR] Failed to create log file: {err}"));
                logger
            }
        };
        let launchpad = Self::new(
            logger,
            ExternalStorage::new(config.storage_root()),
            Collaborators::from_config(config, notifier),
        );
        launchpad.logger.record("Launcher started");
        launchpad
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn configuration(&self) -> Configuration {
        self.config.get()
    }

    pub fn permission_state(&self) -> PermissionState {
        self.permission.state()
    }

    pub fn view(&self) -> ViewState {
        self.gestures.view()
    }

    pub fn dispatch(&mut self, action: LaunchpadAction) -> ActionOutcome {
        tracing::debug!(?action, "dispatch launcher action");
        match action {
            LaunchpadAction::StartSession => self.start_session(),
            LaunchpadAction::ChooseCalibration => {
                self.begin_path_selection(PathTarget::Calibration)
            }
            LaunchpadAction::ChooseVocabulary => {
                self.begin_path_selection(PathTarget::Vocabulary)
            }
        }
    }

    fn start_session(&mut self) -> ActionOutcome {
        let host = Rc::clone(&self.collaborators.host);
        if self.pending_permission.is_some() {
            // The open prompt stays the only one; its answer decides the launch.
            return ActionOutcome::PermissionPending;
        }

        if self.permission.check(host.as_ref(), &self.logger) {
            return ActionOutcome::Launched(self.launch());
        }

        match self.permission.request(host.as_ref(), &self.logger) {
            Some(ticket) => {
                self.pending_permission = Some(ticket);
                ActionOutcome::PermissionPending
            }
            None => ActionOutcome::Aborted,
        }
    }

    fn begin_path_selection(&mut self, target: PathTarget) -> ActionOutcome {
        match self.storage.ensure_available() {
            Ok(root) => ActionOutcome::PickPath {
                target,
                start_dir: root.to_path_buf(),
            },
            Err(err) => {
                tracing::warn!(%err, ?target, "path selection refused");
                self.logger.record("[ERROR] SD card not available");
                ActionOutcome::Aborted
            }
        }
    }

    /// Consumes a chooser answer given as a filesystem path. Paths that are
    /// not valid UTF-8 are journaled and leave the configuration unchanged.
    pub fn on_file_chosen(&mut self, target: PathTarget, chosen: Option<PathBuf>) {
        let selection = match chosen.map(PathBuf::into_os_string) {
            None => PathSelection::Cancelled,
            Some(raw) => match raw.into_string() {
                Ok(path) => PathSelection::Selected(path),
                Err(raw) => {
                    tracing::warn!(?raw, ?target, "chosen path is not valid UTF-8");
                    self.logger.record(format!(
                        "[ERROR] Selected path is not valid UTF-8: {}",
                        raw.to_string_lossy()
                    ));
                    return;
                }
            },
        };
        self.on_path_selected(target, selection);
    }

    /// Consumes the file chooser's answer for `target`.
    pub fn on_path_selected(&mut self, target: PathTarget, selection: PathSelection) {
        match selection {
            PathSelection::Cancelled => self.logger.record("[INFO] File chooser canceled"),
            PathSelection::Selected(path) => match target {
                PathTarget::Calibration => self.config.set_calibration_path(path, &self.logger),
                PathTarget::Vocabulary => self.config.set_vocabulary_path(path, &self.logger),
            },
        }
    }

    pub fn on_fling(&mut self, start_x: f64, end_x: f64, velocity_x: f64) -> Option<ViewState> {
        self.gestures.on_fling(start_x, end_x, velocity_x)
    }

    /// Checks the open permission prompt, if any, waiting up to `wait` for
    /// the answer. A zero `wait` never blocks.
    pub fn poll_permission(&mut self, wait: Duration) -> PermissionPoll {
        let status = match &self.pending_permission {
            Some(ticket) if wait.is_zero() => ticket.try_resolve(),
            Some(ticket) => ticket.resolve_within(wait),
            None => return PermissionPoll::Idle,
        };
        match status {
            TicketStatus::Pending => PermissionPoll::Pending,
            TicketStatus::Resolved { granted } => {
                self.pending_permission = None;
                match self.on_permission_result(granted) {
                    Ok((state, launch)) => PermissionPoll::Resolved { state, launch },
                    Err(err) => {
                        tracing::warn!(%err, "stale permission answer dropped");
                        PermissionPoll::Idle
                    }
                }
            }
        }
    }

    /// Applies a permission answer and starts the session once granted.
    pub fn on_permission_result(
        &mut self,
        granted: bool,
    ) -> AppResult<(PermissionState, Option<LaunchReport>)> {
        let notifier = Rc::clone(&self.collaborators.notifier);
        let state = self
            .permission
            .on_result(granted, &self.logger, notifier.as_ref())?;
        let launch = state.is_granted().then(|| self.launch());
        Ok((state, launch))
    }

    fn launch(&self) -> LaunchReport {
        SessionLauncher::new(
            &self.logger,
            self.collaborators.engine.as_ref(),
            self.collaborators.notifier.as_ref(),
        )
        .launch(&self.config.get())
    }

    /// Flushes the durable journal and drops any open prompt.
    pub fn shutdown(&mut self) {
        self.pending_permission = None;
        tracing::info!(entries = self.logger.len(), "launcher shutting down");
        self.logger.close();
    }
}
