use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use trace_draw::capture::{capture_corner, ClickCapture, DEFAULT_CAPTURE_TIMEOUT};
use trace_draw::error::Corner;
use trace_draw::notify::{DialogNotifier, Notice, Notifier};
use trace_draw::settings::{settings_path_from_exe_path, Settings, SETTINGS_FILE_NAME};
use trace_draw::stroke::{Outcome, Speed, StartOutcome, StrokeRuntime};
use trace_draw::trace::preview::{default_preview_filename, preview_edges, save_preview};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Trace the outline of an image and redraw it with the mouse
#[derive(Parser, Debug)]
#[command(name = "trace_draw")]
#[command(about = "Trace image outlines and replay them as pen strokes", long_about = None)]
struct Args {
    /// Settings file (defaults to trace_draw_settings.json next to the executable)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the detected edges to a PNG without drawing
    Preview {
        #[arg(short, long)]
        image: Option<PathBuf>,
        #[arg(short, long)]
        threshold: Option<u8>,
        /// Output PNG (defaults to preview_<timestamp>.png)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Capture one corner of the drawing region with a mouse click
    SetCorner {
        #[arg(value_enum)]
        corner: CornerArg,
        #[arg(long, default_value_t = DEFAULT_CAPTURE_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },
    /// Trace the image and draw it inside the region
    Draw {
        #[arg(short, long)]
        image: Option<PathBuf>,
        #[arg(short, long)]
        threshold: Option<u8>,
        #[arg(long, value_enum)]
        speed: Option<SpeedArg>,
    },
    /// Print the effective settings
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CornerArg {
    TopLeft,
    BottomRight,
}

impl From<CornerArg> for Corner {
    fn from(arg: CornerArg) -> Self {
        match arg {
            CornerArg::TopLeft => Corner::TopLeft,
            CornerArg::BottomRight => Corner::BottomRight,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SpeedArg {
    Slow,
    Normal,
    Fast,
}

impl From<SpeedArg> for Speed {
    fn from(arg: SpeedArg) -> Self {
        match arg {
            SpeedArg::Slow => Speed::Slow,
            SpeedArg::Normal => Speed::Normal,
            SpeedArg::Fast => Speed::Fast,
        }
    }
}

fn resolve_settings_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        std::env::current_exe()
            .map(|exe| settings_path_from_exe_path(&exe))
            .unwrap_or_else(|_| PathBuf::from(SETTINGS_FILE_NAME))
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings_path = resolve_settings_path(args.settings);
    let mut settings = Settings::load(&settings_path)?;
    trace_draw::logging::init(settings.debug_logging, settings.log_file());
    tracing::debug!(path = %settings_path.display(), "settings loaded");

    match args.command {
        Command::Preview {
            image,
            threshold,
            out,
        } => {
            let image = image
                .or_else(|| settings.to_request().image_path)
                .ok_or(trace_draw::DrawError::NoImageSelected)?;
            let edges = preview_edges(&image, threshold.unwrap_or(settings.threshold))?;
            let out = out.unwrap_or_else(|| {
                PathBuf::from(default_preview_filename(chrono::Local::now()))
            });
            let written = save_preview(&edges, &out)?;
            println!("Preview written to {}", written.display());
        }
        Command::SetCorner {
            corner,
            timeout_secs,
        } => {
            let corner = Corner::from(corner);
            println!("Click the {corner} corner of the drawing region...");
            let capture = ClickCapture::new(Duration::from_secs(timeout_secs));
            match capture_corner(&capture, corner) {
                Ok(position) => {
                    match corner {
                        Corner::TopLeft => settings.top_left = Some(position),
                        Corner::BottomRight => settings.bottom_right = Some(position),
                    }
                    settings.save(&settings_path)?;
                    println!("{corner} set to ({}, {})", position.0, position.1);
                }
                Err(err) => {
                    DialogNotifier.acknowledge(&Notice::from(&err));
                    return Err(err.into());
                }
            }
        }
        Command::Draw {
            image,
            threshold,
            speed,
        } => {
            let mut request = settings.to_request();
            if let Some(image) = image {
                request.image_path = Some(image);
            }
            if let Some(threshold) = threshold {
                request.threshold = threshold;
            }
            if let Some(speed) = speed {
                request.speed = speed.into();
            }

            let runtime = StrokeRuntime::from_settings(&settings);
            if runtime.start(&request)? == StartOutcome::AlreadyActive {
                bail!("a drawing session is already running");
            }
            println!(
                "Drawing starts in {} s. Press {} to stop.",
                settings.warmup_seconds, settings.kill_key
            );
            let outcome = loop {
                if let Some(outcome) = runtime.tick()? {
                    break outcome;
                }
                std::thread::sleep(POLL_INTERVAL);
            };
            if let Outcome::Failed { reason } = outcome {
                bail!("drawing failed: {reason}");
            }
        }
        Command::Show => {
            println!("Settings file: {}", settings_path.display());
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}
