//! The capture → detect → display loop.
//!
//! A [`Session`] owns the camera, the display and the detector for the
//! length of one run. The loop is an explicit [`RunState`] machine: it
//! stays `Running` until the quit key, the stop signal or the frame limit
//! moves it to `Stopping`, after which no further frame is acquired.
//! Camera and display are released on every exit path.

mod config;

pub use config::SessionConfig;

use crate::capture::{Camera, CameraError, CaptureConfig};
use crate::detection::{DetectionError, FrameAnalysis, MotionDetector, StepOutcome};
use crate::display::{Display, DisplayConfig, DisplayError, Views};
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Opening or reading the camera failed.
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
    /// A frame could not be analyzed.
    #[error("detection error: {0}")]
    Detection(#[from] DetectionError),
    /// Showing views or polling keys failed.
    #[error("display error: {0}")]
    Display(#[from] DisplayError),
    /// Consecutive failed acquisitions exceeded the configured limit.
    #[error("{count} consecutive capture failures, last: {last}")]
    TooManyCaptureFailures {
        /// Failures in a row when the run aborted.
        count: u32,
        /// Error from the last attempt.
        last: CameraError,
    },
}

/// Whether the loop should keep acquiring frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Frames are being acquired.
    Running,
    /// The loop has been asked to end.
    Stopping,
}

/// Why a session ended cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The quit key was pressed.
    QuitKey,
    /// The external stop signal was raised.
    Signal,
    /// The configured number of frames was acquired.
    FrameLimit,
}

/// Counters accumulated over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Frames acquired from the camera.
    pub frames_acquired: u64,
    /// Frames compared against the reference.
    pub frames_analyzed: u64,
    /// Analyzed frames with at least one region.
    pub motion_frames: u64,
    /// Regions reported over the whole session.
    pub regions_total: u64,
    /// Failed acquisitions.
    pub capture_failures: u64,
}

impl RunStats {
    fn record(&mut self, analysis: &FrameAnalysis) {
        self.frames_analyzed += 1;
        if analysis.has_motion() {
            self.motion_frames += 1;
        }
        self.regions_total += analysis.regions.len() as u64;
    }
}

/// Outcome of a session that ended cleanly.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Counters for the whole run.
    pub stats: RunStats,
    /// What ended the loop.
    pub stop_reason: StopReason,
    /// Wall-clock time the camera was opened.
    pub started_at: DateTime<Local>,
}

/// One run of the motion detection loop.
pub struct Session<C: Camera, D: Display> {
    camera: C,
    display: D,
    detector: MotionDetector,
    capture_config: CaptureConfig,
    display_config: DisplayConfig,
    config: SessionConfig,
    state: RunState,
    stats: RunStats,
    stop_signal: Option<Arc<AtomicBool>>,
    metrics: Option<MetricsRegistry>,
}

impl<C: Camera, D: Display> Session<C, D> {
    /// Creates a session with default capture, display and loop settings.
    pub fn new(camera: C, display: D, detector: MotionDetector) -> Self {
        Self {
            camera,
            display,
            detector,
            capture_config: CaptureConfig::default(),
            display_config: DisplayConfig::default(),
            config: SessionConfig::default(),
            state: RunState::Stopping,
            stats: RunStats::default(),
            stop_signal: None,
            metrics: None,
        }
    }

    /// Sets the configuration passed to the camera on open.
    pub fn with_capture_config(mut self, config: CaptureConfig) -> Self {
        self.capture_config = config;
        self
    }

    /// Sets quit key and key poll timeout.
    pub fn with_display_config(mut self, config: DisplayConfig) -> Self {
        self.display_config = config;
        self
    }

    /// Sets failure tolerance and frame limit.
    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Stops the loop once `signal` becomes true.
    pub fn with_stop_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.stop_signal = Some(signal);
        self
    }

    /// Publishes session counters to `registry` after every frame.
    pub fn with_metrics(mut self, registry: MetricsRegistry) -> Self {
        self.metrics = Some(registry);
        self
    }

    /// Runs the loop until it stops, then releases camera and display.
    pub fn run(&mut self) -> Result<RunSummary, SessionError> {
        let started_at = Local::now();

        let result = match self.camera.open(&self.capture_config) {
            Ok(()) => {
                info!(started = %started_at.format("%Y-%m-%d %H:%M:%S"), "Motion detection started");
                self.state = RunState::Running;
                self.run_loop()
            }
            Err(e) => Err(SessionError::Camera(e)),
        };

        self.state = RunState::Stopping;
        self.release();

        let stop_reason = result?;
        info!(
            reason = ?stop_reason,
            frames = self.stats.frames_acquired,
            motion_frames = self.stats.motion_frames,
            regions = self.stats.regions_total,
            "Motion detection stopped"
        );
        Ok(RunSummary {
            stats: self.stats,
            stop_reason,
            started_at,
        })
    }

    fn run_loop(&mut self) -> Result<StopReason, SessionError> {
        let mut consecutive_failures: u32 = 0;
        let key_wait = self.display_config.key_wait();

        while self.state == RunState::Running {
            if self.stop_requested() {
                info!("Stop signal received");
                return self.stop(StopReason::Signal);
            }
            if let Some(limit) = self.config.max_frames {
                if self.stats.frames_acquired >= limit {
                    return self.stop(StopReason::FrameLimit);
                }
            }

            let frame = match self.camera.capture() {
                Ok(frame) => {
                    consecutive_failures = 0;
                    frame
                }
                Err(e) => {
                    self.stats.capture_failures += 1;
                    consecutive_failures += 1;
                    self.publish(None);
                    if consecutive_failures > self.config.max_consecutive_failures {
                        return Err(SessionError::TooManyCaptureFailures {
                            count: consecutive_failures,
                            last: e,
                        });
                    }
                    warn!(consecutive = consecutive_failures, "Skipping frame: {}", e);
                    continue;
                }
            };
            self.stats.frames_acquired += 1;

            let analysis = match self.detector.process(&frame)? {
                StepOutcome::Baseline => {
                    self.publish(None);
                    continue;
                }
                StepOutcome::Analyzed(analysis) => analysis,
            };

            trace!(
                sequence = analysis.sequence,
                latency_us = frame.timestamp().elapsed().as_micros() as u64,
                regions = analysis.regions.len(),
                "Frame analyzed"
            );
            self.stats.record(&analysis);
            self.publish(Some(&analysis));
            if analysis.has_motion() {
                debug!(
                    sequence = analysis.sequence,
                    regions = analysis.regions.len(),
                    largest = analysis.largest_area().unwrap_or(0.0),
                    "Motion detected"
                );
            }

            self.display.show(&Views::from(&analysis))?;

            if let Some(key) = self.display.poll_key(key_wait)? {
                if key == self.display_config.quit_key {
                    return self.stop(StopReason::QuitKey);
                }
            }
        }

        // The state only changes through `stop`, which returns directly.
        Ok(StopReason::Signal)
    }

    fn stop(&mut self, reason: StopReason) -> Result<StopReason, SessionError> {
        self.state = RunState::Stopping;
        Ok(reason)
    }

    fn stop_requested(&self) -> bool {
        self.stop_signal
            .as_ref()
            .is_some_and(|signal| signal.load(Ordering::SeqCst))
    }

    fn publish(&self, latest: Option<&FrameAnalysis>) {
        if let Some(metrics) = &self.metrics {
            metrics.update(&MetricsSnapshot::from_session(&self.stats, latest));
        }
    }

    fn release(&mut self) {
        self.camera.close();
        self.display.close();
        debug!("Camera and display released");
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Counters accumulated so far, also after a failed run.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// The camera driven by this session.
    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// The display driven by this session.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// The detector and its reference frame.
    pub fn detector(&self) -> &MotionDetector {
        &self.detector
    }
}
