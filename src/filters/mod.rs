pub mod color;
pub mod convolution;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Frame;

pub use color::{Hsv, Rgb, contrast_brightness, grayscale, hue_rotate};
pub use convolution::{BorderPolicy, Kernel, compute_convolution, compute_convolution_with};

/// One whole-frame pass of the capture chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    Grayscale,
    HueRotate {
        degrees: i32,
    },
    ContrastBrightness {
        contrast: f32,
        brightness: f32,
    },
    Sharpen {
        weight: f64,
        #[serde(default)]
        border: BorderPolicy,
    },
    Convolve {
        weights: Vec<Vec<f64>>,
        factor: f64,
        #[serde(default)]
        offset: f64,
        #[serde(default)]
        border: BorderPolicy,
    },
}

impl Adjustment {
    pub fn apply(&self, frame: &Frame) -> Result<Frame> {
        match self {
            Adjustment::Grayscale => Ok(grayscale(frame)),
            Adjustment::HueRotate { degrees } => Ok(hue_rotate(frame, *degrees)),
            Adjustment::ContrastBrightness {
                contrast,
                brightness,
            } => Ok(contrast_brightness(frame, *contrast, *brightness)),
            Adjustment::Sharpen { weight, border } => {
                compute_convolution_with(frame, &Kernel::sharpen(*weight)?, *border)
            }
            Adjustment::Convolve {
                weights,
                factor,
                offset,
                border,
            } => {
                let kernel = Kernel::from_rows(weights.as_slice(), *factor, *offset)?;
                compute_convolution_with(frame, &kernel, *border)
            }
        }
    }
}

/// Runs `adjustments` in order, each pass reading the previous output.
pub fn apply_chain(frame: &Frame, adjustments: &[Adjustment]) -> Result<Frame> {
    let mut current = frame.clone();
    for adjustment in adjustments {
        log::debug!("applying {adjustment:?}");
        current = adjustment.apply(&current)?;
    }
    Ok(current)
}
