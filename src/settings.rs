use crate::stroke::engine::DEFAULT_WARMUP;
use crate::stroke::kill_switch::{parse_kill_key, KillKey};
use crate::stroke::service::DrawRequest;
use crate::stroke::session::Speed;
use crate::trace::raster::DEFAULT_THRESHOLD;
use crate::trace::RegionCorners;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE_NAME: &str = "trace_draw_settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Image traced by the next drawing session.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Grayscale values strictly above this become foreground.
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default)]
    pub top_left: Option<(i32, i32)>,
    #[serde(default)]
    pub bottom_right: Option<(i32, i32)>,
    #[serde(default)]
    pub speed: Speed,
    /// Key that aborts a running session, e.g. `"Esc"` or `"F8"`.
    #[serde(default = "default_kill_key")]
    pub kill_key: String,
    /// Pause before the first stroke so the operator can focus the target.
    #[serde(default = "default_warmup_seconds")]
    pub warmup_seconds: u64,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<String>,
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

fn default_kill_key() -> String {
    "Esc".into()
}

fn default_warmup_seconds() -> u64 {
    DEFAULT_WARMUP.as_secs()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_path: None,
            threshold: default_threshold(),
            top_left: None,
            bottom_right: None,
            speed: Speed::default(),
            kill_key: default_kill_key(),
            warmup_seconds: default_warmup_seconds(),
            debug_logging: false,
            log_file: None,
        }
    }
}

/// Settings file living next to the executable at `exe_path`.
pub fn settings_path_from_exe_path(exe_path: &Path) -> PathBuf {
    exe_path
        .parent()
        .map(|dir| dir.join(SETTINGS_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
}

impl Settings {
    /// Missing or empty files yield the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }

    pub fn kill_key(&self) -> KillKey {
        match parse_kill_key(&self.kill_key) {
            Some(key) => key,
            None => {
                tracing::warn!(
                    "provided kill_key string '{}' is invalid; using default Esc",
                    self.kill_key
                );
                KillKey::Escape
            }
        }
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_secs(self.warmup_seconds)
    }

    pub fn corners(&self) -> RegionCorners {
        RegionCorners {
            top_left: self.top_left,
            bottom_right: self.bottom_right,
        }
    }

    pub fn to_request(&self) -> DrawRequest {
        DrawRequest {
            image_path: self
                .image_path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            threshold: self.threshold,
            corners: self.corners(),
            speed: self.speed,
        }
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }
}
