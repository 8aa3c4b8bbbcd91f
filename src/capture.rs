use crate::error::{Corner, DrawError};
use std::time::Duration;

pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// Reports the screen position of the next operator click.
pub trait CoordinateCapture: Send + Sync {
    fn capture_click(&self) -> Option<(i32, i32)>;
}

/// Captures one corner of the drawing region.
pub fn capture_corner(
    capture: &dyn CoordinateCapture,
    corner: Corner,
) -> Result<(i32, i32), DrawError> {
    tracing::info!(%corner, "waiting for a click");
    match capture.capture_click() {
        Some(position) => {
            tracing::info!(%corner, x = position.0, y = position.1, "corner captured");
            Ok(position)
        }
        None => Err(DrawError::Capture { corner }),
    }
}

/// Polls the left mouse button and reads the cursor on the press.
#[derive(Debug, Clone, Copy)]
pub struct ClickCapture {
    timeout: Duration,
}

impl Default for ClickCapture {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTURE_TIMEOUT)
    }
}

impl ClickCapture {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CoordinateCapture for ClickCapture {
    fn capture_click(&self) -> Option<(i32, i32)> {
        platform::wait_for_click(self.timeout)
    }
}

#[cfg(windows)]
mod platform {
    use std::thread;
    use std::time::{Duration, Instant};
    use windows::Win32::Foundation::POINT;
    use windows::Win32::UI::Input::KeyboardAndMouse::{GetAsyncKeyState, VK_LBUTTON};
    use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

    const POLL_INTERVAL: Duration = Duration::from_millis(10);

    fn left_button_down() -> bool {
        unsafe { GetAsyncKeyState(VK_LBUTTON.0 as i32) < 0 }
    }

    pub fn wait_for_click(timeout: Duration) -> Option<(i32, i32)> {
        let deadline = Instant::now() + timeout;
        // A button already held (the click that started the capture) does not count.
        while left_button_down() {
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
        while !left_button_down() {
            if Instant::now() >= deadline {
                tracing::warn!("timed out waiting for a click");
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
        let mut point = POINT::default();
        match unsafe { GetCursorPos(&mut point) } {
            Ok(()) => Some((point.x, point.y)),
            Err(err) => {
                tracing::error!(?err, "GetCursorPos failed");
                None
            }
        }
    }
}

#[cfg(not(windows))]
mod platform {
    use std::time::Duration;

    pub fn wait_for_click(_timeout: Duration) -> Option<(i32, i32)> {
        tracing::warn!("click capture is only supported on Windows");
        None
    }
}

/// Returns a preset answer, for tests and scripted corners.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCapture(pub Option<(i32, i32)>);

impl CoordinateCapture for FixedCapture {
    fn capture_click(&self) -> Option<(i32, i32)> {
        self.0
    }
}
