use crate::trace::model::Point;
use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// The physical pointer driven during replay.
pub trait PointerDevice: Send + Sync {
    fn move_to(&self, point: Point) -> Result<()>;
    fn press(&self) -> Result<()>;
    fn release(&self) -> Result<()>;
}

fn to_screen_pixel(point: Point) -> (i32, i32) {
    (point.x.round() as i32, point.y.round() as i32)
}

/// Injects real left-button input on the host.
#[derive(Debug, Default)]
pub struct SystemPointer;

impl PointerDevice for SystemPointer {
    fn move_to(&self, point: Point) -> Result<()> {
        let (x, y) = to_screen_pixel(point);
        platform::set_cursor(x, y)
    }

    fn press(&self) -> Result<()> {
        platform::left_button(true)
    }

    fn release(&self) -> Result<()> {
        platform::left_button(false)
    }
}

#[cfg(windows)]
mod platform {
    use anyhow::{anyhow, bail, Result};
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
        MOUSEINPUT,
    };
    use windows::Win32::UI::WindowsAndMessaging::SetCursorPos;

    const TRACE_INJECT_TAG: usize = 0x5452_4345; // "TRCE"

    pub fn set_cursor(x: i32, y: i32) -> Result<()> {
        unsafe { SetCursorPos(x, y) }.map_err(|err| anyhow!("SetCursorPos failed: {err}"))
    }

    pub fn left_button(down: bool) -> Result<()> {
        let input = INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: 0,
                    dy: 0,
                    mouseData: 0,
                    dwFlags: if down {
                        MOUSEEVENTF_LEFTDOWN
                    } else {
                        MOUSEEVENTF_LEFTUP
                    },
                    time: 0,
                    dwExtraInfo: TRACE_INJECT_TAG,
                },
            },
        };
        let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if sent == 0 {
            bail!("SendInput returned 0");
        }
        Ok(())
    }
}

#[cfg(not(windows))]
mod platform {
    use anyhow::{bail, Result};

    pub fn set_cursor(_x: i32, _y: i32) -> Result<()> {
        bail!("pointer injection is only supported on Windows");
    }

    pub fn left_button(_down: bool) -> Result<()> {
        bail!("pointer injection is only supported on Windows");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerAction {
    MoveTo(Point),
    Press,
    Release,
}

type MoveHook = Box<dyn Fn() + Send + Sync>;

/// Records every action instead of touching the real pointer.
#[derive(Default)]
pub struct RecordingPointer {
    actions: Mutex<Vec<PointerAction>>,
    calls: AtomicUsize,
    fail_at: Option<usize>,
    move_hook: Option<(usize, MoveHook)>,
}

impl RecordingPointer {
    /// Fails the call with the given zero-based index; later calls succeed.
    pub fn failing_at(call_index: usize) -> Self {
        Self {
            fail_at: Some(call_index),
            ..Self::default()
        }
    }

    /// Runs `hook` right after the `moves`-th recorded move.
    pub fn after_moves(mut self, moves: usize, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.move_hook = Some((moves, Box::new(hook)));
        self
    }

    pub fn actions(&self) -> Vec<PointerAction> {
        self.actions.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn moves(&self) -> Vec<Point> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                PointerAction::MoveTo(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn record(&self, action: PointerAction) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(call) {
            anyhow::bail!("simulated pointer failure at call {call}");
        }

        let is_move = matches!(action, PointerAction::MoveTo(_));
        let moves = {
            let mut guard = self
                .actions
                .lock()
                .map_err(|_| anyhow::anyhow!("recording pointer lock poisoned"))?;
            guard.push(action);
            guard
                .iter()
                .filter(|a| matches!(a, PointerAction::MoveTo(_)))
                .count()
        };

        if let Some((after, hook)) = &self.move_hook {
            if is_move && moves == *after {
                hook();
            }
        }
        Ok(())
    }
}

impl PointerDevice for RecordingPointer {
    fn move_to(&self, point: Point) -> Result<()> {
        self.record(PointerAction::MoveTo(point))
    }

    fn press(&self) -> Result<()> {
        self.record(PointerAction::Press)
    }

    fn release(&self) -> Result<()> {
        self.record(PointerAction::Release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[test]
    fn rounds_to_nearest_screen_pixel() {
        assert_eq!(to_screen_pixel(Point::new(10.4, 10.6)), (10, 11));
        assert_eq!(to_screen_pixel(Point::new(-0.6, 0.0)), (-1, 0));
    }

    #[test]
    fn recording_pointer_keeps_order() {
        let pointer = RecordingPointer::default();
        pointer.move_to(Point::new(1.0, 2.0)).expect("move");
        pointer.press().expect("press");
        pointer.release().expect("release");
        assert_eq!(
            pointer.actions(),
            vec![
                PointerAction::MoveTo(Point::new(1.0, 2.0)),
                PointerAction::Press,
                PointerAction::Release,
            ]
        );
    }

    #[test]
    fn recording_pointer_fails_only_the_chosen_call() {
        let pointer = RecordingPointer::failing_at(1);
        assert!(pointer.move_to(Point::default()).is_ok());
        assert!(pointer.press().is_err());
        assert!(pointer.release().is_ok());
        assert_eq!(
            pointer.actions(),
            vec![PointerAction::MoveTo(Point::default()), PointerAction::Release]
        );
    }

    #[test]
    fn move_hook_fires_once_at_threshold() {
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = Arc::clone(&fired);
        let pointer = RecordingPointer::default()
            .after_moves(2, move || fired_clone.store(true, Ordering::SeqCst));

        pointer.move_to(Point::default()).expect("move");
        assert!(!fired.load(Ordering::SeqCst));
        pointer.press().expect("press");
        pointer.move_to(Point::default()).expect("move");
        assert!(fired.load(Ordering::SeqCst));
    }

    #[cfg(not(windows))]
    #[test]
    fn system_pointer_reports_unsupported_platform() {
        let err = SystemPointer.press().expect_err("no injection off Windows");
        assert!(err.to_string().contains("only supported on Windows"));
    }
}
