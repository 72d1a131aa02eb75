//! Prometheus metrics exporter for motion monitoring.
//!
//! # Metrics Exposed
//!
//! ## Frame Counters
//! - `motion_watch_frames_total` - Frames acquired from the camera
//! - `motion_watch_frames_analyzed_total` - Frames compared against the reference
//! - `motion_watch_motion_frames_total` - Analyzed frames containing motion
//! - `motion_watch_regions_total` - Motion regions reported
//! - `motion_watch_capture_failures_total` - Failed acquisitions
//!
//! ## Latest Frame
//! - `motion_watch_last_region_count` - Regions in the most recent analyzed frame
//! - `motion_watch_largest_region_area` - Largest region area in that frame
//!
//! # Example
//!
//! ```no_run
//! use motion_watch::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     frames_acquired: 120,
//!     frames_analyzed: 119,
//!     motion_frames: 7,
//!     regions_total: 9,
//!     capture_failures: 0,
//!     last_region_count: Some(1),
//!     largest_region_area: Some(21_400.0),
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
