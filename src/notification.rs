use std::rc::Rc;

const APP_NAME: &str = "SLAM Launcher";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeDuration {
    Short,
    Long,
}

impl NoticeDuration {
    pub const fn millis(self) -> u32 {
        match self {
            Self::Short => 2_000,
            Self::Long => 3_500,
        }
    }
}

/// Transient, user-visible message; never a substitute for a journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub duration: NoticeDuration,
}

impl Notice {
    pub fn short(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            duration: NoticeDuration::Short,
        }
    }

    pub fn long(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            duration: NoticeDuration::Long,
        }
    }
}

pub trait Notifier {
    fn notify(&self, notice: Notice);
}

#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: Notice) {
        if let Err(err) = notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(APP_NAME)
            .body(&notice.message)
            .timeout(notify_rust::Timeout::Milliseconds(notice.duration.millis()))
            .show()
        {
            tracing::warn!("system notification failed: {err}");
        }
    }
}

/// Desktop notifications inside a graphical session, stderr otherwise.
pub fn session_notifier() -> Rc<dyn Notifier> {
    let graphical = ["WAYLAND_DISPLAY", "DISPLAY"]
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|value| !value.is_empty()));
    if graphical {
        Rc::new(DesktopNotifier)
    } else {
        Rc::new(ConsoleNotifier)
    }
}

/// Prints notices to stderr for terminal sessions.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("** {} **", notice.message);
    }
}
