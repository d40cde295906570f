use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::notification::session_notifier;
use crate::storage::{PathSelection, PathTarget};

use super::{ActionOutcome, Launchpad, LaunchpadAction, PermissionPoll};

const PERMISSION_WAIT: Duration = Duration::from_millis(500);

const HELP: &str = "\
commands:
  launch                          start a SLAM session
  calibration <path>|cancel       choose the calibration file
  voc <path>|cancel               choose the vocabulary file
  fling <start_x> <end_x> <vx>    swipe between panels
  config                          show the configured paths
  status                          show permission and panel state
  log                             print the session journal
  help                            show this text
  quit                            exit";

#[derive(Debug, Clone, PartialEq)]
enum ConsoleCommand {
    Launch,
    Choose {
        target: PathTarget,
        selection: PathSelection,
    },
    Fling {
        start_x: f64,
        end_x: f64,
        velocity_x: f64,
    },
    ShowConfig,
    Status,
    ShowLog,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word {
        "" => return Ok(None),
        "launch" | "start" => ConsoleCommand::Launch,
        "calibration" | "cal" => choose(PathTarget::Calibration, rest),
        "voc" | "vocabulary" => choose(PathTarget::Vocabulary, rest),
        "fling" => {
            let numbers = rest
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| format!("fling expects numbers: {err}"))?;
            match numbers.as_slice() {
                &[start_x, end_x, velocity_x] => ConsoleCommand::Fling {
                    start_x,
                    end_x,
                    velocity_x,
                },
                _ => return Err("fling expects <start_x> <end_x> <velocity_x>".to_string()),
            }
        }
        "config" => ConsoleCommand::ShowConfig,
        "status" => ConsoleCommand::Status,
        "log" => ConsoleCommand::ShowLog,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(command))
}

fn choose(target: PathTarget, rest: &str) -> ConsoleCommand {
    let selection = if rest.is_empty() || rest == "cancel" {
        PathSelection::Cancelled
    } else {
        PathSelection::Selected(rest.to_string())
    };
    ConsoleCommand::Choose { target, selection }
}

/// Line-driven front-end: the terminal is the display sink and the command
/// argument stands in for the file chooser.
pub fn run(config: &AppConfig) -> AppResult<()> {
    let mut launchpad = Launchpad::from_config(config, session_notifier());
    for entry in launchpad.logger().entries() {
        println!("{entry}");
    }
    launchpad
        .logger()
        .set_display_listener(|entry| println!("{entry}"));
    println!("{HELP}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_command(&line) {
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(command)) => execute(&mut launchpad, command, &mut stdout)?,
            Ok(None) => {}
            Err(message) => writeln!(stdout, "{message}")?,
        }
        settle_permission(&mut launchpad, &mut stdout)?;
        stdout.flush()?;
    }

    launchpad.shutdown();
    Ok(())
}

fn execute(
    launchpad: &mut Launchpad,
    command: ConsoleCommand,
    out: &mut impl Write,
) -> io::Result<()> {
    match command {
        ConsoleCommand::Launch => {
            if let ActionOutcome::PermissionPending =
                launchpad.dispatch(LaunchpadAction::StartSession)
            {
                writeln!(out, "waiting for camera permission...")?;
            }
        }
        ConsoleCommand::Choose { target, selection } => {
            if let ActionOutcome::PickPath { target, .. } =
                launchpad.dispatch(LaunchpadAction::for_target(target))
            {
                launchpad.on_path_selected(target, selection);
            }
        }
        ConsoleCommand::Fling {
            start_x,
            end_x,
            velocity_x,
        } => {
            let view = launchpad
                .on_fling(start_x, end_x, velocity_x)
                .unwrap_or_else(|| launchpad.view());
            writeln!(out, "view: {view:?}")?;
        }
        ConsoleCommand::ShowConfig => {
            let config = launchpad.configuration();
            writeln!(out, "calibration path is {}", config.calibration_path)?;
            writeln!(out, "VOC path is {}", config.vocabulary_path)?;
        }
        ConsoleCommand::Status => {
            writeln!(
                out,
                "camera permission: {:?}, view: {:?}",
                launchpad.permission_state(),
                launchpad.view()
            )?;
        }
        ConsoleCommand::ShowLog => {
            for entry in launchpad.logger().entries() {
                writeln!(out, "{entry}")?;
            }
        }
        ConsoleCommand::Help => writeln!(out, "{HELP}")?,
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

fn settle_permission(launchpad: &mut Launchpad, out: &mut impl Write) -> io::Result<()> {
    if let PermissionPoll::Pending = launchpad.poll_permission(PERMISSION_WAIT) {
        writeln!(out, "camera permission still pending")?;
    }
    Ok(())
}
