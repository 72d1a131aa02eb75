//! Motion Watch Library
//!
//! Real-time motion detection by background subtraction. The first
//! camera frame becomes the reference; every later frame is compared
//! against it and regions of significant change are boxed.
//!
//! # Architecture
//!
//! ```text
//! capture → detection → display
//!     ↓          ↓          ↓
//!            session (run loop)  → metrics
//! ```
//!
//! Per analyzed frame the detector computes:
//!
//! 1. grayscale + 21×21 Gaussian blur
//! 2. absolute difference against the reference
//! 3. binary threshold (strictly above 30)
//! 4. two passes of 3×3 dilation
//! 5. outer contours, filtered to an area of at least 15 000 px²
//! 6. bounding boxes drawn onto the color frame
//!
//! # Example
//!
//! ```no_run
//! use motion_watch::{
//!     capture::MockCamera,
//!     detection::{DetectionParams, MotionDetector},
//!     display::HeadlessDisplay,
//!     session::{Session, SessionConfig},
//! };
//!
//! let detector = MotionDetector::new(DetectionParams::sensitive());
//! let mut session = Session::new(MockCamera::new(), HeadlessDisplay::new(), detector)
//!     .with_session_config(SessionConfig {
//!         max_frames: Some(30),
//!         ..Default::default()
//!     });
//!
//! let summary = session.run().unwrap();
//! println!("{} frames with motion", summary.stats.motion_frames);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
pub mod detection;
pub mod display;
pub mod metrics;
pub mod session;

// Re-export commonly used types at crate root
pub use capture::{Camera, CaptureConfig, Frame, MockCamera};
pub use config::{ConfigError, FileConfig};
pub use detection::{DetectionParams, FrameAnalysis, MotionDetector, MotionRegion, StepOutcome};
pub use display::{Display, DisplayConfig, HeadlessDisplay, Views};
pub use metrics::MetricsRegistry;
pub use session::{RunState, RunSummary, Session, SessionConfig, SessionError, StopReason};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
