use std::io;
use std::process::{Command, Stdio};
use std::thread;

use thiserror::Error;

use super::SessionRequest;

/// Environment variable carrying the JSON payload for the engine process.
pub const SESSION_REQUEST_ENV: &str = "SLAM_SESSION_REQUEST";

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("failed to encode session request: {source}")]
    Payload {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to start engine command {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    /// For hand-offs that deliver to an already running engine, which may
    /// refuse the request. A spawned process cannot reject.
    #[error("engine rejected hand-off: {message}")]
    Rejected { message: String },
}

/// One-way hand-off to the vision engine. Nothing is awaited after it
/// returns; only a failure of the hand-off mechanism itself is reported.
pub trait EngineHandoff {
    fn hand_off(&self, request: &SessionRequest) -> Result<(), HandoffError>;
}

/// Starts the engine as a detached child process.
///
/// The engine receives the vocabulary and calibration paths as its last two
/// arguments, after any configured arguments, and the full payload as JSON in
/// [`SESSION_REQUEST_ENV`].
#[derive(Debug, Clone)]
pub struct ProcessEngineHandoff {
    command: String,
    args: Vec<String>,
}

impl ProcessEngineHandoff {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

impl EngineHandoff for ProcessEngineHandoff {
    fn hand_off(&self, request: &SessionRequest) -> Result<(), HandoffError> {
        let payload = request
            .to_payload_json()
            .map_err(|source| HandoffError::Payload { source })?;

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg(&request.vocabulary_path)
            .arg(&request.calibration_path)
            .env(SESSION_REQUEST_ENV, payload)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| HandoffError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let pid = child.id();
        tracing::info!(pid, command = %self.command, "engine process started");
        let reaper = thread::Builder::new()
            .name("slam-engine-reaper".to_string())
            .spawn(move || match child.wait() {
                Ok(status) => tracing::info!(pid, %status, "engine process exited"),
                Err(err) => tracing::warn!(pid, ?err, "failed to wait for engine process"),
            });
        if let Err(err) = reaper {
            tracing::warn!(pid, ?err, "engine process left unreaped");
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::journal::scratch_dir;
    use std::time::{Duration, Instant};

    fn request() -> SessionRequest {
        SessionRequest {
            vocabulary_path: "/data/voc/ORBvoc.txt".to_string(),
            calibration_path: "/data/cal/List.yaml".to_string(),
        }
    }

    #[test]
    fn missing_command_is_a_spawn_error() {
        let handoff = ProcessEngineHandoff::new("/nonexistent/slam-engine-binary", Vec::new());
        let err = handoff.hand_off(&request()).unwrap_err();
        assert!(matches!(err, HandoffError::Spawn { .. }));
        assert!(err
            .to_string()
            .starts_with("failed to start engine command /nonexistent/slam-engine-binary"));
    }

    #[test]
    fn engine_receives_paths_and_payload() {
        let dir = scratch_dir("engine-handoff");
        let output = dir.join("engine-args.txt");
        let script = format!(
            "printf '%s\\n%s\\n%s\\n' \"$1\" \"$2\" \"${SESSION_REQUEST_ENV}\" > '{}'",
            output.display()
        );
        let handoff = ProcessEngineHandoff::new(
            "sh",
            vec!["-c".to_string(), script, "engine".to_string()],
        );

        handoff.hand_off(&request()).expect("sh should start");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut contents = String::new();
        while Instant::now() < deadline {
            contents = std::fs::read_to_string(&output).unwrap_or_default();
            if contents.lines().count() == 3 {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }

        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "/data/voc/ORBvoc.txt");
        assert_eq!(lines[1], "/data/cal/List.yaml");
        let payload: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(payload["voc"], "/data/voc/ORBvoc.txt");
        assert_eq!(payload["calibration"], "/data/cal/List.yaml");
    }
}
