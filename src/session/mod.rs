//! Configuration paths and the launch sequence that hands them to the engine.

use std::path::Path;

use serde::Serialize;

use crate::journal::Logger;
use crate::notification::{Notice, Notifier};

mod engine;

pub use engine::{EngineHandoff, HandoffError, ProcessEngineHandoff, SESSION_REQUEST_ENV};

pub const DEFAULT_VOCABULARY_PATH: &str = "/storage/emulated/0/SLAM/VOC/ORBvoc.txt";
pub const DEFAULT_CALIBRATION_PATH: &str = "/storage/emulated/0/SLAM/Calibration/List.yaml";

pub const SESSION_START_MARKER: &str = "===== SLAM Initialization Started =====";
pub const SESSION_TRIGGERED_MARKER: &str = "===== SLAM Initialization Triggered Successfully =====";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub vocabulary_path: String,
    pub calibration_path: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            vocabulary_path: DEFAULT_VOCABULARY_PATH.to_string(),
            calibration_path: DEFAULT_CALIBRATION_PATH.to_string(),
        }
    }
}

/// Holds the two model paths. Values are stored exactly as given; whether
/// they point anywhere is only looked at when a session launches.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    config: Configuration,
}

impl ConfigStore {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    pub fn get(&self) -> Configuration {
        self.config.clone()
    }

    pub fn set_vocabulary_path(&mut self, path: impl Into<String>, logger: &Logger) {
        self.config.vocabulary_path = path.into();
        logger.record(format!(
            "[UPDATE] VOC path set to: {}",
            self.config.vocabulary_path
        ));
    }

    pub fn set_calibration_path(&mut self, path: impl Into<String>, logger: &Logger) {
        self.config.calibration_path = path.into();
        logger.record(format!(
            "[UPDATE] Calibration path set to: {}",
            self.config.calibration_path
        ));
    }
}

/// Snapshot of the configuration handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRequest {
    #[serde(rename = "voc")]
    pub vocabulary_path: String,
    #[serde(rename = "calibration")]
    pub calibration_path: String,
}

impl SessionRequest {
    pub fn snapshot(config: &Configuration) -> Self {
        Self {
            vocabulary_path: config.vocabulary_path.clone(),
            calibration_path: config.calibration_path.clone(),
        }
    }

    pub fn to_payload_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Triggered,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub calibration_found: bool,
    pub vocabulary_found: bool,
    pub request: SessionRequest,
    pub outcome: LaunchOutcome,
}

impl LaunchReport {
    pub fn is_triggered(&self) -> bool {
        self.outcome == LaunchOutcome::Triggered
    }
}

pub struct SessionLauncher<'a> {
    logger: &'a Logger,
    engine: &'a dyn EngineHandoff,
    notifier: &'a dyn Notifier,
}

impl<'a> SessionLauncher<'a> {
    pub fn new(
        logger: &'a Logger,
        engine: &'a dyn EngineHandoff,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            logger,
            engine,
            notifier,
        }
    }

    /// Runs one launch attempt. Missing files are logged and tolerated; the
    /// engine gets the request regardless and fails on its own terms.
    pub fn launch(&self, config: &Configuration) -> LaunchReport {
        self.logger.record(SESSION_START_MARKER);

        let calibration_found = self.check_path("Calibration", &config.calibration_path);
        let vocabulary_found = self.check_path("Vocabulary", &config.vocabulary_path);
        let request = SessionRequest::snapshot(config);

        self.logger.record("Launching SLAM engine...");
        let outcome = match self.engine.hand_off(&request) {
            Ok(()) => {
                self.logger.record(SESSION_TRIGGERED_MARKER);
                LaunchOutcome::Triggered
            }
            Err(err) => {
                tracing::warn!(?err, "engine hand-off failed");
                self.logger
                    .record(format!("[SLAM ERROR] Failed to launch SLAM engine: {err}"));
                self.notifier
                    .notify(Notice::long(format!("Error launching SLAM engine: {err}")));
                LaunchOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        LaunchReport {
            calibration_found,
            vocabulary_found,
            request,
            outcome,
        }
    }

    fn check_path(&self, kind: &str, path: &str) -> bool {
        let found = Path::new(path).exists();
        if found {
            self.logger.record(format!("[OK] {kind} file found: {path}"));
        } else {
            self.logger
                .record(format!("[ERROR] {kind} file NOT found: {path}"));
        }
        found
    }
}
