//! Fingertip capture: color adjustment, convolution and crop extraction for
//! hand-landmark frames.
//!
//! The detector lives elsewhere. This crate takes a decoded [`Frame`] and the
//! [`HandLandmarks`] found on it, runs the configured whole-frame
//! [`filters::Adjustment`] chain, cuts one rescaled crop per fingertip with
//! [`region::extract_region`] and stores each one as a PNG.

pub mod config;
pub mod error;
pub mod filters;
pub mod overlay;
pub mod pipeline;
pub mod region;
pub mod types;

pub use config::{CaptureConfig, StorageConfig, load_config};
pub use error::{Error, Result};
pub use region::{CropPolicy, CropRegion, extract_region};
pub use types::{Finger, Frame, HandLandmarks, Handedness, NormalizedLandmark};
