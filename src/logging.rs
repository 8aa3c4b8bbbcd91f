use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialise logging at `info`, or at `debug` when `debug` is set. In debug
/// mode `RUST_LOG` may override the level.
///
/// With `log_file` the output goes to that file instead of stderr. Calling
/// this again after a subscriber is installed does nothing.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // Without debug logging a stray `RUST_LOG` must not make the output noisy.
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file.as_deref().and_then(split_log_path) {
        Some((dir, file_name)) => {
            if let Err(err) = std::fs::create_dir_all(&dir) {
                eprintln!("cannot create log directory {}: {err}", dir.display());
            }
            let appender = tracing_appender::rolling::never(dir, file_name);
            let _ = builder.with_ansi(false).with_writer(appender).try_init();
        }
        None => {
            let _ = builder.try_init();
        }
    }
}

fn split_log_path(path: &std::path::Path) -> Option<(PathBuf, std::ffi::OsString)> {
    let file_name = path.file_name()?.to_os_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some((dir, file_name))
}
