use crate::stroke::kill_switch::KillSwitch;
use crate::stroke::pointer::PointerDevice;
use crate::stroke::session::{DrawSession, Outcome};
use crate::trace::model::{Path, Point};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const DEFAULT_WARMUP: Duration = Duration::from_secs(5);

/// Replays screen-space paths as press, move*, release sequences.
pub struct StrokeEngine {
    pointer: Arc<dyn PointerDevice>,
    kill_switch: Arc<dyn KillSwitch>,
    warmup: Duration,
}

impl StrokeEngine {
    pub fn new(
        pointer: Arc<dyn PointerDevice>,
        kill_switch: Arc<dyn KillSwitch>,
        warmup: Duration,
    ) -> Self {
        Self {
            pointer,
            kill_switch,
            warmup,
        }
    }

    /// Blocks the calling thread for the whole replay. The warm-up sleep runs
    /// first and ignores cancellation.
    pub fn replay(&self, paths: &[Path], session: &DrawSession) -> Outcome {
        tracing::info!(
            paths = paths.len(),
            warmup_ms = self.warmup.as_millis() as u64,
            step_delay_ms = session.step_delay().as_millis() as u64,
            "stroke replay starting"
        );
        if !self.warmup.is_zero() {
            thread::sleep(self.warmup);
        }

        let outcome = match self.draw_paths(paths, session) {
            Ok(true) => Outcome::Cancelled,
            Ok(false) => Outcome::Completed,
            Err(err) => Outcome::Failed {
                reason: format!("{err:#}"),
            },
        };

        match &outcome {
            Outcome::Completed => tracing::info!("stroke replay completed"),
            Outcome::Cancelled => tracing::warn!("stroke replay cancelled"),
            Outcome::Failed { reason } => tracing::error!(reason = %reason, "stroke replay failed"),
        }
        session.set_outcome(outcome.clone());
        outcome
    }

    /// Returns whether cancellation was observed.
    fn draw_paths(&self, paths: &[Path], session: &DrawSession) -> Result<bool> {
        for (index, path) in paths.iter().enumerate() {
            if session.is_cancelled() {
                return Ok(true);
            }
            if !path.is_drawable() {
                tracing::debug!(index, points = path.len(), "skipping undrawable path");
                continue;
            }
            tracing::debug!(index, points = path.len(), "drawing stroke");
            if self
                .draw_stroke(path.points(), session)
                .with_context(|| format!("stroke {index}"))?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn draw_stroke(&self, points: &[Point], session: &DrawSession) -> Result<bool> {
        let Some((start, rest)) = points.split_first() else {
            return Ok(false);
        };

        self.act(session, || self.pointer.move_to(*start))
            .context("move to stroke start")?;
        // A failed press leaves the button up, so there is nothing to release.
        self.act(session, || self.pointer.press())
            .context("press pointer")?;
        let stroke = self.follow(rest, session);

        // Once pressed, the button must not stay held.
        let release = self
            .act(session, || self.pointer.release())
            .context("release pointer");
        if let (Err(_), Err(err)) = (&stroke, &release) {
            tracing::warn!(?err, "pointer release after failed stroke also failed");
        }

        let interrupted = stroke?;
        release?;
        Ok(interrupted)
    }

    fn follow(&self, points: &[Point], session: &DrawSession) -> Result<bool> {
        for point in points {
            if session.is_cancelled() {
                return Ok(true);
            }
            if self.kill_switch.is_triggered() {
                tracing::warn!("kill key pressed during replay");
                session.cancel();
                return Ok(true);
            }
            self.act(session, || self.pointer.move_to(*point))
                .context("move pointer")?;
        }
        Ok(false)
    }

    fn act(&self, session: &DrawSession, action: impl FnOnce() -> Result<()>) -> Result<()> {
        action()?;
        let delay = session.step_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::kill_switch::ManualKillSwitch;
    use crate::stroke::pointer::{PointerAction, RecordingPointer};
    use std::time::Instant;

    fn path(points: &[(f64, f64)]) -> Path {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn engine(pointer: Arc<RecordingPointer>) -> StrokeEngine {
        StrokeEngine::new(pointer, Arc::new(ManualKillSwitch::default()), Duration::ZERO)
    }

    fn move_to(x: f64, y: f64) -> PointerAction {
        PointerAction::MoveTo(Point::new(x, y))
    }

    #[test]
    fn draws_every_path_in_order() {
        let pointer = Arc::new(RecordingPointer::default());
        let session = DrawSession::new(Duration::ZERO);
        let paths = vec![
            path(&[(0.0, 0.0), (1.0, 0.0)]),
            path(&[(5.0, 5.0), (6.0, 6.0), (7.0, 7.0)]),
        ];

        let outcome = engine(Arc::clone(&pointer)).replay(&paths, &session);

        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(session.outcome(), Some(Outcome::Completed));
        assert_eq!(
            pointer.actions(),
            vec![
                move_to(0.0, 0.0),
                PointerAction::Press,
                move_to(1.0, 0.0),
                PointerAction::Release,
                move_to(5.0, 5.0),
                PointerAction::Press,
                move_to(6.0, 6.0),
                move_to(7.0, 7.0),
                PointerAction::Release,
            ]
        );
    }

    #[test]
    fn skips_paths_with_fewer_than_two_points() {
        let pointer = Arc::new(RecordingPointer::default());
        let session = DrawSession::new(Duration::ZERO);
        let paths = vec![Path::default(), path(&[(3.0, 3.0)])];

        let outcome = engine(Arc::clone(&pointer)).replay(&paths, &session);

        assert_eq!(outcome, Outcome::Completed);
        assert!(pointer.actions().is_empty());
    }

    #[test]
    fn empty_path_list_completes() {
        let pointer = Arc::new(RecordingPointer::default());
        let session = DrawSession::new(Duration::ZERO);
        assert_eq!(engine(pointer).replay(&[], &session), Outcome::Completed);
    }

    #[test]
    fn cancel_after_second_paths_third_point() {
        let session = DrawSession::new(Duration::ZERO);
        let token = session.cancel_token();
        // First path: 3 moves. Second path: start, point 2, point 3.
        let pointer =
            Arc::new(RecordingPointer::default().after_moves(6, move || token.cancel()));
        let paths = vec![
            path(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            path(&[(10.0, 0.0), (11.0, 0.0), (12.0, 0.0), (13.0, 0.0), (14.0, 0.0)]),
            path(&[(20.0, 0.0), (21.0, 0.0)]),
        ];

        let outcome = engine(Arc::clone(&pointer)).replay(&paths, &session);

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(
            pointer.actions(),
            vec![
                move_to(0.0, 0.0),
                PointerAction::Press,
                move_to(1.0, 0.0),
                move_to(2.0, 0.0),
                PointerAction::Release,
                move_to(10.0, 0.0),
                PointerAction::Press,
                move_to(11.0, 0.0),
                move_to(12.0, 0.0),
                PointerAction::Release,
            ]
        );
    }

    #[test]
    fn cancellation_at_any_point_releases_exactly_once() {
        let paths = vec![
            path(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]),
            path(&[(4.0, 4.0), (5.0, 5.0), (6.0, 6.0)]),
        ];
        let total_moves = 7;

        for cancel_after in 1..=total_moves {
            let session = DrawSession::new(Duration::ZERO);
            let token = session.cancel_token();
            let pointer = Arc::new(
                RecordingPointer::default().after_moves(cancel_after, move || token.cancel()),
            );

            let outcome = engine(Arc::clone(&pointer)).replay(&paths, &session);
            let actions = pointer.actions();

            assert_eq!(pointer.moves().len(), cancel_after);
            assert_eq!(
                actions.iter().filter(|a| **a == PointerAction::Press).count(),
                actions
                    .iter()
                    .filter(|a| **a == PointerAction::Release)
                    .count()
            );
            assert_eq!(actions.last(), Some(&PointerAction::Release));
            if cancel_after == total_moves {
                // The last move of the last path leaves nothing to observe.
                assert_eq!(outcome, Outcome::Completed);
            } else {
                assert_eq!(outcome, Outcome::Cancelled, "cancel_after={cancel_after}");
            }
        }
    }

    #[test]
    fn kill_key_cancels_the_session() {
        let kill_switch = Arc::new(ManualKillSwitch::default());
        let trigger = Arc::clone(&kill_switch);
        let pointer =
            Arc::new(RecordingPointer::default().after_moves(2, move || trigger.trigger()));
        let engine = StrokeEngine::new(pointer.clone(), kill_switch, Duration::ZERO);
        let session = DrawSession::new(Duration::ZERO);
        let paths = vec![
            path(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            path(&[(5.0, 0.0), (6.0, 0.0)]),
        ];

        let outcome = engine.replay(&paths, &session);

        assert_eq!(outcome, Outcome::Cancelled);
        assert!(session.is_cancelled());
        assert_eq!(
            pointer.actions(),
            vec![
                move_to(0.0, 0.0),
                PointerAction::Press,
                move_to(1.0, 0.0),
                PointerAction::Release,
            ]
        );
    }

    #[test]
    fn cancelled_before_start_draws_nothing() {
        let pointer = Arc::new(RecordingPointer::default());
        let session = DrawSession::new(Duration::ZERO);
        session.cancel();

        let paths = vec![path(&[(0.0, 0.0), (1.0, 1.0)])];
        let outcome = engine(Arc::clone(&pointer)).replay(&paths, &session);

        assert_eq!(outcome, Outcome::Cancelled);
        assert!(pointer.actions().is_empty());
    }

    #[test]
    fn failed_move_releases_and_stops() {
        // Calls: 0 move, 1 press, 2 move (fails), 3 release.
        let pointer = Arc::new(RecordingPointer::failing_at(2));
        let session = DrawSession::new(Duration::ZERO);
        let paths = vec![
            path(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            path(&[(5.0, 0.0), (6.0, 0.0)]),
        ];

        let outcome = engine(Arc::clone(&pointer)).replay(&paths, &session);

        match outcome {
            Outcome::Failed { reason } => {
                assert!(reason.contains("stroke 0"), "{reason}");
                assert!(reason.contains("simulated pointer failure"), "{reason}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(
            pointer.actions(),
            vec![move_to(0.0, 0.0), PointerAction::Press, PointerAction::Release]
        );
    }

    #[test]
    fn failed_press_is_not_followed_by_release() {
        // Calls: 0 move, 1 press (fails).
        let pointer = Arc::new(RecordingPointer::failing_at(1));
        let session = DrawSession::new(Duration::ZERO);
        let paths = vec![path(&[(0.0, 0.0), (1.0, 0.0)])];

        let outcome = engine(Arc::clone(&pointer)).replay(&paths, &session);

        match outcome {
            Outcome::Failed { reason } => assert!(reason.contains("press pointer"), "{reason}"),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(pointer.actions(), vec![move_to(0.0, 0.0)]);
    }

    #[test]
    fn warmup_runs_before_any_action() {
        let pointer = Arc::new(RecordingPointer::default());
        let engine = StrokeEngine::new(
            pointer.clone(),
            Arc::new(ManualKillSwitch::default()),
            Duration::from_millis(30),
        );
        let session = DrawSession::new(Duration::ZERO);
        session.cancel();

        let started = Instant::now();
        let outcome = engine.replay(&[path(&[(0.0, 0.0), (1.0, 1.0)])], &session);

        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(outcome, Outcome::Cancelled);
    }
}
