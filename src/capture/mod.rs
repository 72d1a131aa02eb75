//! Camera input and frame handling.
//!
//! This module provides abstractions for capturing color frames from a
//! camera and managing camera configuration.

mod camera;
mod config;
mod frame;
#[cfg(feature = "camera")]
mod native;

pub use camera::{Camera, CameraError, MockCamera, ScriptedCamera};
pub use config::CaptureConfig;
pub use frame::Frame;
#[cfg(feature = "camera")]
pub use native::NativeCamera;
