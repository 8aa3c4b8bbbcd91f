use crate::error::{DrawError, ErrorKind};
use crate::stroke::session::Outcome;
use std::sync::Mutex;

/// Terminal state of an operator action that must be acknowledged.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Completed,
    Cancelled,
    Failed { reason: String },
    Error { kind: ErrorKind, message: String },
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Completed => "Done",
            Notice::Cancelled => "Cancelled",
            Notice::Failed { .. } => "Drawing failed",
            Notice::Error { .. } => "Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::Completed => "Drawing complete!".to_string(),
            Notice::Cancelled => "Drawing was cancelled!".to_string(),
            Notice::Failed { reason } => format!("Drawing stopped: {reason}"),
            Notice::Error { message, .. } => message.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Failed { .. } | Notice::Error { .. })
    }
}

impl From<&Outcome> for Notice {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Completed => Notice::Completed,
            Outcome::Cancelled => Notice::Cancelled,
            Outcome::Failed { reason } => Notice::Failed {
                reason: reason.clone(),
            },
        }
    }
}

impl From<&DrawError> for Notice {
    fn from(err: &DrawError) -> Self {
        Notice::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Delivers a notice to the operator. Implementations may block until the
/// operator has seen it.
pub trait Notifier: Send + Sync {
    fn acknowledge(&self, notice: &Notice);
}

/// Message box on Windows, log line plus stderr elsewhere.
#[derive(Debug, Default)]
pub struct DialogNotifier;

impl Notifier for DialogNotifier {
    fn acknowledge(&self, notice: &Notice) {
        if notice.is_error() {
            tracing::error!(title = notice.title(), message = %notice.message(), "notify");
        } else {
            tracing::info!(title = notice.title(), message = %notice.message(), "notify");
        }

        #[cfg(windows)]
        {
            let level = if notice.is_error() {
                rfd::MessageLevel::Error
            } else {
                rfd::MessageLevel::Info
            };
            let _ = rfd::MessageDialog::new()
                .set_level(level)
                .set_title(notice.title())
                .set_description(notice.message())
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
        }
        #[cfg(not(windows))]
        {
            eprintln!("{}: {}", notice.title(), notice.message());
        }
    }
}

/// Keeps every notice, for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn acknowledge(&self, notice: &Notice) {
        if let Ok(mut guard) = self.notices.lock() {
            guard.push(notice.clone());
        }
    }
}
