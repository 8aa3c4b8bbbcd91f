use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Speed {
    pub fn step_delay(self) -> Duration {
        match self {
            Speed::Slow => Duration::from_millis(50),
            Speed::Normal => Duration::from_millis(10),
            Speed::Fast => Duration::from_millis(1),
        }
    }
}

impl std::fmt::Display for Speed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speed::Slow => write!(f, "Slow"),
            Speed::Normal => write!(f, "Normal"),
            Speed::Fast => write!(f, "Fast"),
        }
    }
}

impl std::str::FromStr for Speed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(Speed::Slow),
            "normal" => Ok(Speed::Normal),
            "fast" => Ok(Speed::Fast),
            other => Err(format!("unknown speed '{other}' (expected slow, normal or fast)")),
        }
    }
}

/// Set-once cancellation latch shared between the caller and the worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Cancelled,
    Failed { reason: String },
}

#[derive(Debug)]
pub struct DrawSession {
    cancel: CancelToken,
    step_delay: Duration,
    outcome: Mutex<Option<Outcome>>,
}

impl DrawSession {
    pub fn new(step_delay: Duration) -> Self {
        Self {
            cancel: CancelToken::default(),
            step_delay,
            outcome: Mutex::new(None),
        }
    }

    pub fn with_speed(speed: Speed) -> Self {
        Self::new(speed.step_delay())
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome.lock().ok().and_then(|o| o.clone())
    }

    pub(crate) fn set_outcome(&self, outcome: Outcome) {
        if let Ok(mut guard) = self.outcome.lock() {
            *guard = Some(outcome);
        }
    }
}
