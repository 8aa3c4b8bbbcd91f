pub mod engine;
pub mod kill_switch;
pub mod messages;
pub mod pointer;
pub mod service;
pub mod session;
pub mod state;

pub use engine::StrokeEngine;
pub use service::{DrawRequest, StartOutcome, StrokeRuntime};
pub use session::{CancelToken, DrawSession, Outcome, Speed};
pub use state::DrawLifecycle;
