use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KillKey {
    #[default]
    Escape,
    Pause,
    End,
    Delete,
    Space,
    F(u8),
}

/// Parse a key name like "Esc" or "F8".
pub fn parse_kill_key(s: &str) -> Option<KillKey> {
    let upper = s.trim().to_ascii_uppercase();
    match upper.as_str() {
        "ESC" | "ESCAPE" => Some(KillKey::Escape),
        "PAUSE" | "BREAK" => Some(KillKey::Pause),
        "END" => Some(KillKey::End),
        "DEL" | "DELETE" => Some(KillKey::Delete),
        "SPACE" => Some(KillKey::Space),
        _ if upper.starts_with('F') => match upper[1..].parse::<u8>().ok() {
            Some(n @ 1..=12) => Some(KillKey::F(n)),
            _ => None,
        },
        _ => None,
    }
}

/// Global interrupt polled between pointer moves.
pub trait KillSwitch: Send + Sync {
    fn is_triggered(&self) -> bool;
}

/// Watches the physical keyboard for the configured key.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyKillSwitch {
    key: KillKey,
}

impl KeyKillSwitch {
    pub fn new(key: KillKey) -> Self {
        Self { key }
    }
}

impl KillSwitch for KeyKillSwitch {
    fn is_triggered(&self) -> bool {
        platform::is_key_down(self.key)
    }
}

#[cfg(windows)]
mod platform {
    use super::KillKey;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        GetAsyncKeyState, VIRTUAL_KEY, VK_DELETE, VK_END, VK_ESCAPE, VK_F1, VK_PAUSE, VK_SPACE,
    };

    fn virtual_key(key: KillKey) -> VIRTUAL_KEY {
        match key {
            KillKey::Escape => VK_ESCAPE,
            KillKey::Pause => VK_PAUSE,
            KillKey::End => VK_END,
            KillKey::Delete => VK_DELETE,
            KillKey::Space => VK_SPACE,
            // VK_F1..VK_F12 are contiguous.
            KillKey::F(n) => VIRTUAL_KEY(VK_F1.0 + u16::from(n.saturating_sub(1))),
        }
    }

    pub fn is_key_down(key: KillKey) -> bool {
        unsafe { GetAsyncKeyState(virtual_key(key).0 as i32) < 0 }
    }
}

#[cfg(not(windows))]
mod platform {
    use super::KillKey;

    pub fn is_key_down(_key: KillKey) -> bool {
        false
    }
}

/// Kill switch flipped by hand, for tests and embedding callers.
#[derive(Debug, Default)]
pub struct ManualKillSwitch {
    triggered: AtomicBool,
}

impl ManualKillSwitch {
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.triggered.store(false, Ordering::SeqCst);
    }
}

impl KillSwitch for ManualKillSwitch {
    fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}
