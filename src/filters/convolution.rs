//! N x N convolution over RGBA frames.
//!
//! The window never leaves the frame: for a kernel of radius `r` only pixels
//! with `r <= x < width - r` and `r <= y < height - r` are written, the outer
//! ring keeps whatever [`BorderPolicy`] initialised it with.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Frame;

pub const DEFAULT_KERNEL_SIZE: usize = 3;

/// Square kernel with a normalising divisor and an additive bias.
///
/// Weights are row-major: `weight(row, col)` multiplies the source pixel at
/// `(x + col, y + row)` of the window.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f64>,
    factor: f64,
    offset: f64,
}

impl Kernel {
    pub fn new(size: usize, weights: Vec<f64>, factor: f64, offset: f64) -> Result<Self> {
        let kernel = Self {
            size,
            weights,
            factor,
            offset,
        };
        kernel.validate()?;
        Ok(kernel)
    }

    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R], factor: f64, offset: f64) -> Result<Self> {
        let size = rows.len();
        let mut weights = Vec::with_capacity(size * size);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != size {
                return Err(Error::InvalidKernel(format!(
                    "row {i} has {} weights, expected {size}",
                    row.len()
                )));
            }
            weights.extend_from_slice(row);
        }
        Self::new(size, weights, factor, offset)
    }

    /// Every weight set to `value`.
    pub fn uniform(size: usize, value: f64, factor: f64, offset: f64) -> Result<Self> {
        Self::new(size, vec![value; size * size], factor, offset)
    }

    pub fn identity() -> Self {
        let mut weights = vec![0.0; DEFAULT_KERNEL_SIZE * DEFAULT_KERNEL_SIZE];
        weights[4] = 1.0;
        Self {
            size: DEFAULT_KERNEL_SIZE,
            weights,
            factor: 1.0,
            offset: 0.0,
        }
    }

    /// Cross-shaped sharpen used by the capture app: centre `weight`, the four
    /// direct neighbours `-2`, divided by `weight - 8` with a bias of 1.
    ///
    /// Fails for `weight <= 8`, where the divisor is not positive.
    pub fn sharpen(weight: f64) -> Result<Self> {
        Self::from_rows(
            &[[0.0, -2.0, 0.0], [-2.0, weight, -2.0], [0.0, -2.0, 0.0]],
            weight - 8.0,
            1.0,
        )
    }

    pub fn box_blur() -> Self {
        Self {
            size: DEFAULT_KERNEL_SIZE,
            weights: vec![1.0; DEFAULT_KERNEL_SIZE * DEFAULT_KERNEL_SIZE],
            factor: 9.0,
            offset: 0.0,
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn radius(&self) -> usize {
        self.size / 2
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights[row * self.size + col]
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 || self.size % 2 == 0 {
            return Err(Error::InvalidKernel(format!(
                "size must be odd and positive, got {}",
                self.size
            )));
        }
        if self.weights.len() != self.size * self.size {
            return Err(Error::InvalidKernel(format!(
                "expected {} weights, got {}",
                self.size * self.size,
                self.weights.len()
            )));
        }
        if !(self.factor.is_finite() && self.factor > 0.0) {
            return Err(Error::InvalidKernel(format!(
                "factor must be positive and finite, got {}",
                self.factor
            )));
        }
        if !self.offset.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::InvalidKernel("non-finite weight or offset".into()));
        }
        Ok(())
    }

    #[inline]
    fn finish(&self, sum: f64) -> u8 {
        (sum / self.factor + self.offset).trunc().clamp(0.0, 255.0) as u8
    }
}

/// Initial contents of the pixels the kernel cannot reach.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderPolicy {
    /// All channels zero, like a freshly allocated bitmap.
    #[default]
    Transparent,
    CopySource,
}

pub fn compute_convolution(src: &Frame, kernel: &Kernel) -> Result<Frame> {
    compute_convolution_with(src, kernel, BorderPolicy::default())
}

pub fn compute_convolution_with(
    src: &Frame,
    kernel: &Kernel,
    border: BorderPolicy,
) -> Result<Frame> {
    src.validate()?;
    kernel.validate()?;

    let mut dst = match border {
        BorderPolicy::Transparent => Frame {
            rgba: vec![0; src.rgba.len()],
            width: src.width,
            height: src.height,
        },
        BorderPolicy::CopySource => src.clone(),
    };

    let n = kernel.size();
    let r = kernel.radius();
    let width = src.width as usize;
    let height = src.height as usize;
    if width < n || height < n {
        return Ok(dst);
    }

    let stride = src.stride();
    dst.rgba
        .par_chunks_exact_mut(stride)
        .enumerate()
        .skip(r)
        .take(height - n + 1)
        .for_each(|(dst_y, dst_row)| {
            let top = dst_y - r;
            for left in 0..=(width - n) {
                let centre = dst_y * stride + (left + r) * 4;
                let alpha = src.rgba[centre + 3];

                let mut sum = [0.0f64; 3];
                for row in 0..n {
                    let row_start = (top + row) * stride;
                    for col in 0..n {
                        let w = kernel.weight(row, col);
                        let idx = row_start + (left + col) * 4;
                        sum[0] += w * src.rgba[idx] as f64;
                        sum[1] += w * src.rgba[idx + 1] as f64;
                        sum[2] += w * src.rgba[idx + 2] as f64;
                    }
                }

                let out = (left + r) * 4;
                dst_row[out] = kernel.finish(sum[0]);
                dst_row[out + 1] = kernel.finish(sum[1]);
                dst_row[out + 2] = kernel.finish(sum[2]);
                dst_row[out + 3] = alpha;
            }
        });

    Ok(dst)
}
