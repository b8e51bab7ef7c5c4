use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::filters::Adjustment;
use crate::pipeline::orientation::Orientation;
use crate::region::CropPolicy;
use crate::types::Finger;

pub const DEFAULT_STORAGE_ROOT: &str = "/storage/emulated/0/DCIM/Kwik Capture";
pub const DEFAULT_FILE_PREFIX: &str = "kwikCapture";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub crop: CropPolicy,
    /// Whole-frame passes, run in order before any crop.
    pub adjustments: Vec<Adjustment>,
    pub fingers: Vec<Finger>,
    pub orientation: Orientation,
    pub storage: StorageConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            crop: CropPolicy::default(),
            adjustments: vec![
                Adjustment::Grayscale,
                Adjustment::HueRotate { degrees: 180 },
            ],
            fingers: vec![Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky],
            orientation: Orientation::Identity,
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub file_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<CaptureConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&data).with_context(|| format!("failed to parse config {}", path.display()))
}

pub fn parse_config(data: &str) -> Result<CaptureConfig> {
    let config = serde_json::from_str(data)?;
    Ok(config)
}
