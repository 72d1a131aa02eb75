//! Metrics collection and registry.

use crate::detection::FrameAnalysis;
use crate::session::RunStats;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of session state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
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
    /// Regions in the most recent analyzed frame.
    pub last_region_count: Option<usize>,
    /// Largest region area in the most recent analyzed frame.
    pub largest_region_area: Option<f64>,
}

impl MetricsSnapshot {
    /// Creates a snapshot from the session counters and the latest analysis.
    pub fn from_session(stats: &RunStats, latest: Option<&FrameAnalysis>) -> Self {
        Self {
            frames_acquired: stats.frames_acquired,
            frames_analyzed: stats.frames_analyzed,
            motion_frames: stats.motion_frames,
            regions_total: stats.regions_total,
            capture_failures: stats.capture_failures,
            last_region_count: latest.map(|a| a.regions.len()),
            largest_region_area: latest.map(|a| a.largest_area().unwrap_or(0.0)),
        }
    }
}

/// Prometheus metrics registry for motion monitoring.
///
/// Cloning shares the underlying metrics, so a clone can be handed to
/// the exporter while the session keeps updating its own handle.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,

    // Frame counters
    frames_total: IntCounter,
    frames_analyzed_total: IntCounter,
    motion_frames_total: IntCounter,
    regions_total: IntCounter,
    capture_failures_total: IntCounter,

    // Latest frame
    last_region_count: IntGauge,
    largest_region_area: Gauge,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all motion metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_total = IntCounter::new(
            "motion_watch_frames_total",
            "Total number of frames acquired from the camera",
        )?;
        let frames_analyzed_total = IntCounter::new(
            "motion_watch_frames_analyzed_total",
            "Total number of frames compared against the reference",
        )?;
        let motion_frames_total = IntCounter::new(
            "motion_watch_motion_frames_total",
            "Total number of analyzed frames containing motion",
        )?;
        let regions_total = IntCounter::new(
            "motion_watch_regions_total",
            "Total number of motion regions reported",
        )?;
        let capture_failures_total = IntCounter::new(
            "motion_watch_capture_failures_total",
            "Total number of failed frame acquisitions",
        )?;

        let last_region_count = IntGauge::new(
            "motion_watch_last_region_count",
            "Motion regions in the most recent analyzed frame",
        )?;
        let largest_region_area = Gauge::new(
            "motion_watch_largest_region_area",
            "Largest region area in the most recent analyzed frame (px^2)",
        )?;

        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(frames_analyzed_total.clone()))?;
        registry.register(Box::new(motion_frames_total.clone()))?;
        registry.register(Box::new(regions_total.clone()))?;
        registry.register(Box::new(capture_failures_total.clone()))?;
        registry.register(Box::new(last_region_count.clone()))?;
        registry.register(Box::new(largest_region_area.clone()))?;

        Ok(Self {
            registry,
            frames_total,
            frames_analyzed_total,
            motion_frames_total,
            regions_total,
            capture_failures_total,
            last_region_count,
            largest_region_area,
        })
    }

    /// Updates all metrics from a snapshot of session state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters only move forward by the difference
        advance(&self.frames_total, snapshot.frames_acquired);
        advance(&self.frames_analyzed_total, snapshot.frames_analyzed);
        advance(&self.motion_frames_total, snapshot.motion_frames);
        advance(&self.regions_total, snapshot.regions_total);
        advance(&self.capture_failures_total, snapshot.capture_failures);

        if let Some(count) = snapshot.last_region_count {
            self.last_region_count.set(count as i64);
        }
        if let Some(area) = snapshot.largest_region_area {
            self.largest_region_area.set(area);
        }
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            frames_acquired: 12,
            frames_analyzed: 11,
            motion_frames: 4,
            regions_total: 6,
            capture_failures: 1,
            last_region_count: Some(2),
            largest_region_area: Some(18_500.0),
        };

        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("motion_watch_frames_total 12"));
        assert!(output.contains("motion_watch_motion_frames_total 4"));
        assert!(output.contains("motion_watch_last_region_count 2"));
        assert!(output.contains("motion_watch_largest_region_area 18500"));
    }

    #[test]
    fn test_counters_never_go_backwards() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            frames_acquired: 10,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            frames_acquired: 3,
            ..Default::default()
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("motion_watch_frames_total 10"));
    }

    #[test]
    fn test_clone_shares_metrics() {
        let registry = MetricsRegistry::new().unwrap();
        let exporter_view = registry.clone();
        registry.update(&MetricsSnapshot {
            regions_total: 5,
            ..Default::default()
        });

        let output = exporter_view.encode().unwrap();
        assert!(output.contains("motion_watch_regions_total 5"));
    }
}
