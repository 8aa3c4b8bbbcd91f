use crate::error::DrawError;
use crate::notify::{DialogNotifier, Notice, Notifier};
use crate::settings::Settings;
use crate::stroke::engine::{StrokeEngine, DEFAULT_WARMUP};
use crate::stroke::kill_switch::{KeyKillSwitch, KillSwitch};
use crate::stroke::messages::EngineToMain;
use crate::stroke::pointer::{PointerDevice, SystemPointer};
use crate::stroke::session::{DrawSession, Outcome, Speed};
use crate::stroke::state::{can_transition, DrawLifecycle};
use crate::trace::raster::DEFAULT_THRESHOLD;
use crate::trace::{self, Path, RegionCorners};
use anyhow::{anyhow, Context, Result};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const WORKER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyActive,
}

/// Everything needed to run one drawing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRequest {
    pub image_path: Option<PathBuf>,
    pub threshold: u8,
    pub corners: RegionCorners,
    pub speed: Speed,
}

impl Default for DrawRequest {
    fn default() -> Self {
        Self {
            image_path: None,
            threshold: DEFAULT_THRESHOLD,
            corners: RegionCorners::default(),
            speed: Speed::default(),
        }
    }
}

struct StrokeRuntimeState {
    lifecycle: DrawLifecycle,
    session: Option<Arc<DrawSession>>,
    worker_handle: Option<JoinHandle<()>>,
    engine_to_main_rx: Option<Receiver<EngineToMain>>,
}

impl Default for StrokeRuntimeState {
    fn default() -> Self {
        Self {
            lifecycle: DrawLifecycle::Idle,
            session: None,
            worker_handle: None,
            engine_to_main_rx: None,
        }
    }
}

/// Owns at most one drawing session at a time and reports its outcome.
pub struct StrokeRuntime {
    state: Mutex<StrokeRuntimeState>,
    pointer: Arc<dyn PointerDevice>,
    kill_switch: Arc<dyn KillSwitch>,
    notifier: Arc<dyn Notifier>,
    warmup: Duration,
}

impl Default for StrokeRuntime {
    fn default() -> Self {
        Self::new(
            Arc::new(SystemPointer),
            Arc::new(KeyKillSwitch::default()),
            Arc::new(DialogNotifier),
            DEFAULT_WARMUP,
        )
    }
}

impl StrokeRuntime {
    pub fn new(
        pointer: Arc<dyn PointerDevice>,
        kill_switch: Arc<dyn KillSwitch>,
        notifier: Arc<dyn Notifier>,
        warmup: Duration,
    ) -> Self {
        Self {
            state: Mutex::new(StrokeRuntimeState::default()),
            pointer,
            kill_switch,
            notifier,
            warmup,
        }
    }

    /// Platform backends with the kill key and warm-up taken from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(SystemPointer),
            Arc::new(KeyKillSwitch::new(settings.kill_key())),
            Arc::new(DialogNotifier),
            settings.warmup(),
        )
    }

    pub fn lifecycle(&self) -> DrawLifecycle {
        self.state
            .lock()
            .map(|s| s.lifecycle)
            .unwrap_or(DrawLifecycle::Idle)
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle().is_active()
    }

    /// The session currently in flight, if any.
    pub fn session(&self) -> Option<Arc<DrawSession>> {
        self.state.lock().ok().and_then(|s| s.session.clone())
    }

    /// Validates the request, prepares the strokes and hands them to a worker.
    ///
    /// Configuration and load errors are acknowledged through the notifier
    /// and returned; the runtime stays idle and the pointer is untouched.
    pub fn start(&self, request: &DrawRequest) -> Result<StartOutcome> {
        // Published while preparing so a cancel during preparation is latched.
        let session = Arc::new(DrawSession::with_speed(request.speed));
        {
            let mut state = self
                .state
                .lock()
                .map_err(|_| anyhow!("stroke runtime lock poisoned"))?;
            if state.lifecycle != DrawLifecycle::Idle {
                return Ok(StartOutcome::AlreadyActive);
            }
            self.transition_locked(&mut state, DrawLifecycle::Preparing)?;
            state.session = Some(Arc::clone(&session));
        }

        let paths = match prepare(request) {
            Ok(paths) => paths,
            Err(err) => {
                tracing::warn!(error = %err, kind = ?err.kind(), "draw request rejected");
                self.notifier.acknowledge(&Notice::from(&err));
                self.rollback_after_start_failure();
                return Err(err.into());
            }
        };

        let (tx, rx) = mpsc::channel();
        let handle = match self.spawn_worker(paths, session, tx) {
            Ok(handle) => handle,
            Err(err) => {
                self.rollback_after_start_failure();
                return Err(err);
            }
        };

        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("stroke runtime lock poisoned"))?;
        state.worker_handle = Some(handle);
        state.engine_to_main_rx = Some(rx);
        self.transition_locked(&mut state, DrawLifecycle::Drawing)?;
        tracing::info!(speed = %request.speed, "draw session started");
        Ok(StartOutcome::Started)
    }

    /// Latches cancellation on the active session, including one still being
    /// prepared. No-op when idle.
    pub fn cancel(&self) {
        if let Some(session) = self.session() {
            tracing::info!("draw session cancellation requested");
            session.cancel();
        }
    }

    /// Drains the worker channel without blocking. Returns the outcome once,
    /// after it has been acknowledged and the runtime is idle again.
    pub fn tick(&self) -> Result<Option<Outcome>> {
        let outcome = {
            let state = self
                .state
                .lock()
                .map_err(|_| anyhow!("stroke runtime lock poisoned"))?;
            if state.lifecycle != DrawLifecycle::Drawing {
                return Ok(None);
            }
            let Some(rx) = &state.engine_to_main_rx else {
                return Ok(None);
            };
            match rx.try_recv() {
                Ok(EngineToMain::Finished { outcome }) => outcome,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => Outcome::Failed {
                    reason: "stroke worker exited without reporting".to_string(),
                },
            }
        };

        self.finish(&outcome)?;
        Ok(Some(outcome))
    }

    fn finish(&self, outcome: &Outcome) -> Result<()> {
        let handle = {
            let mut state = self
                .state
                .lock()
                .map_err(|_| anyhow!("stroke runtime lock poisoned"))?;
            self.transition_locked(&mut state, DrawLifecycle::Finishing)?;
            state.engine_to_main_rx = None;
            state.worker_handle.take()
        };

        tracing::info!(?outcome, "draw session finished");
        self.notifier.acknowledge(&Notice::from(outcome));
        join_worker_with_timeout(handle);

        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("stroke runtime lock poisoned"))?;
        state.session = None;
        self.transition_locked(&mut state, DrawLifecycle::Idle)
    }

    fn spawn_worker(
        &self,
        paths: Vec<Path>,
        session: Arc<DrawSession>,
        tx: Sender<EngineToMain>,
    ) -> Result<JoinHandle<()>> {
        let engine = StrokeEngine::new(
            Arc::clone(&self.pointer),
            Arc::clone(&self.kill_switch),
            self.warmup,
        );
        let pointer = Arc::clone(&self.pointer);
        thread::Builder::new()
            .name("stroke-engine".to_string())
            .spawn(move || {
                let outcome = run_engine(&engine, pointer.as_ref(), &paths, &session);
                let _ = tx.send(EngineToMain::Finished { outcome });
            })
            .context("failed to spawn stroke worker")
    }

    fn rollback_after_start_failure(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = StrokeRuntimeState::default();
        }
    }

    fn transition_locked(&self, state: &mut StrokeRuntimeState, next: DrawLifecycle) -> Result<()> {
        if !can_transition(state.lifecycle, next) {
            return Err(anyhow!(
                "invalid draw lifecycle transition: {:?} -> {:?}",
                state.lifecycle,
                next
            ));
        }
        state.lifecycle = next;
        Ok(())
    }
}

/// Checks run in a fixed order: image, region set, region size, then load.
fn prepare(request: &DrawRequest) -> Result<Vec<Path>, DrawError> {
    let image_path = request
        .image_path
        .as_deref()
        .ok_or(DrawError::NoImageSelected)?;
    let region = request.corners.resolve()?;
    region.validate()?;
    trace::prepare_paths(image_path, request.threshold, &region)
}

fn run_engine(
    engine: &StrokeEngine,
    pointer: &dyn PointerDevice,
    paths: &[Path],
    session: &DrawSession,
) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(|| engine.replay(paths, session))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let panic_message = if let Some(message) = payload.downcast_ref::<&str>() {
                (*message).to_string()
            } else if let Some(message) = payload.downcast_ref::<String>() {
                message.clone()
            } else {
                "unknown panic payload".to_string()
            };
            tracing::error!(panic_message, "stroke worker panicked");
            if let Err(err) = pointer.release() {
                tracing::warn!(?err, "pointer release after worker panic failed");
            }
            let outcome = Outcome::Failed {
                reason: format!("stroke worker panicked: {panic_message}"),
            };
            session.set_outcome(outcome.clone());
            outcome
        }
    }
}

fn join_worker_with_timeout(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else {
        return;
    };

    let (done_tx, done_rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = done_tx.send(handle.join());
    });

    match done_rx.recv_timeout(WORKER_JOIN_TIMEOUT) {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::error!("stroke worker panicked while joining"),
        Err(mpsc::RecvTimeoutError::Timeout) => tracing::error!("stroke worker join timed out"),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            tracing::error!("stroke worker join channel disconnected")
        }
    }
}
