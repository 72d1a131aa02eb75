//! Motion Watch CLI
//!
//! Opens the default camera (or a synthetic scene with `--mock`), shows
//! the four pipeline views and boxes moving regions until `q` or Ctrl-C.

use clap::Parser;
use motion_watch::{
    capture::{Camera, MockCamera},
    display::{Display, HeadlessDisplay},
    metrics::MetricsRegistry,
    FileConfig, MotionDetector, Session,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Real-time motion detection by background subtraction.
#[derive(Debug, Parser)]
#[command(name = "motion-watch", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera device index.
    #[arg(short, long)]
    device: Option<u32>,

    /// Use a synthetic scene instead of a camera.
    #[arg(long)]
    mock: bool,

    /// Run without windows.
    #[arg(long)]
    headless: bool,

    /// Stop after this many frames.
    #[arg(short = 'n', long)]
    frames: Option<u64>,

    /// Difference threshold (0-255).
    #[arg(long)]
    threshold: Option<u8>,

    /// Minimum region area in px².
    #[arg(long)]
    min_area: Option<f64>,

    /// Serve Prometheus metrics on this port.
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl Cli {
    fn load_config(&self) -> Result<FileConfig, motion_watch::ConfigError> {
        let mut config = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        if let Some(device) = self.device {
            config.capture.device_id = device;
        }
        if self.headless {
            config.display.headless = true;
        }
        if let Some(frames) = self.frames {
            config.session.max_frames = Some(frames);
        }
        if let Some(threshold) = self.threshold {
            config.detection.diff_threshold = threshold;
        }
        if let Some(min_area) = self.min_area {
            config.detection.min_area = min_area;
        }
        if let Some(port) = self.metrics_port {
            config.session.metrics_port = port;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Motion Watch v{}", motion_watch::VERSION);

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let metrics = match MetricsRegistry::new() {
        Ok(registry) => Some(registry),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };
    if let Some(registry) = &metrics {
        start_exporter(config.session.metrics_port, registry);
    }

    let result = if cli.mock {
        info!("Using synthetic camera input");
        with_display(MockCamera::new(), config, stop, metrics)
    } else {
        open_device(config, stop, metrics)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "camera")]
fn open_device(
    config: FileConfig,
    stop: Arc<AtomicBool>,
    metrics: Option<MetricsRegistry>,
) -> Result<(), String> {
    with_display(motion_watch::capture::NativeCamera::new(), config, stop, metrics)
}

#[cfg(not(feature = "camera"))]
fn open_device(
    _config: FileConfig,
    _stop: Arc<AtomicBool>,
    _metrics: Option<MetricsRegistry>,
) -> Result<(), String> {
    Err("built without camera support; rebuild with --features camera or pass --mock".into())
}

fn with_display<C: Camera>(
    camera: C,
    config: FileConfig,
    stop: Arc<AtomicBool>,
    metrics: Option<MetricsRegistry>,
) -> Result<(), String> {
    if config.display.headless {
        return run_session(camera, HeadlessDisplay::new(), config, stop, metrics);
    }

    #[cfg(feature = "gui")]
    {
        run_session(
            camera,
            motion_watch::display::WindowDisplay::new(),
            config,
            stop,
            metrics,
        )
    }

    #[cfg(not(feature = "gui"))]
    {
        warn!("Built without window support; running headless");
        run_session(camera, HeadlessDisplay::new(), config, stop, metrics)
    }
}

fn run_session<C: Camera, D: Display>(
    camera: C,
    display: D,
    config: FileConfig,
    stop: Arc<AtomicBool>,
    metrics: Option<MetricsRegistry>,
) -> Result<(), String> {
    let mut session = Session::new(camera, display, MotionDetector::new(config.detection))
        .with_capture_config(config.capture)
        .with_display_config(config.display)
        .with_session_config(config.session)
        .with_stop_signal(stop);
    if let Some(registry) = metrics {
        session = session.with_metrics(registry);
    }

    let summary = session.run().map_err(|e| e.to_string())?;

    println!(
        "Frames: {}  analyzed: {}  with motion: {}  regions: {}  capture failures: {}",
        summary.stats.frames_acquired,
        summary.stats.frames_analyzed,
        summary.stats.motion_frames,
        summary.stats.regions_total,
        summary.stats.capture_failures,
    );
    Ok(())
}

#[cfg(feature = "metrics")]
fn start_exporter(port: u16, registry: &MetricsRegistry) {
    use motion_watch::metrics::{MetricsServer, MetricsServerConfig};

    if port != 0 {
        MetricsServer::new(MetricsServerConfig::with_port(port), registry.clone()).spawn();
    }
}

#[cfg(not(feature = "metrics"))]
fn start_exporter(port: u16, _registry: &MetricsRegistry) {
    if port != 0 {
        warn!("Built without the metrics exporter; ignoring port {}", port);
    }
}
