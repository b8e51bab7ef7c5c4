//! Fingertip crop rectangles: landmark -> rectangle -> clamp -> crop -> rescale.
//!
//! Only the right edge is clamped. A rectangle that starts left of or above
//! the frame, or runs past its bottom, is rejected with `InvalidRegion`
//! rather than shifted, so callers can tell a hand at the frame edge apart
//! from a good capture.

use fast_image_resize as fir;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Frame, NormalizedLandmark};

pub const DEFAULT_OFFSET_LEFT: i64 = 70;
pub const DEFAULT_OFFSET_TOP: i64 = 60;
pub const DEFAULT_CROP_WIDTH: i64 = 120;
pub const DEFAULT_CROP_HEIGHT: i64 = 170;
pub const DEFAULT_OUTPUT_WIDTH: u32 = 350;
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 500;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CropRegion {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl CropRegion {
    /// Saturates instead of overflowing for rectangles far outside any frame.
    pub fn right(&self) -> i64 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i64 {
        self.top.saturating_add(self.height)
    }

    /// Shrinks a right-edge overflow, rejects every other escape.
    pub fn clamp_to(mut self, frame_width: u32, frame_height: u32) -> Result<Self> {
        let frame_width = frame_width as i64;
        let frame_height = frame_height as i64;

        if self.right() > frame_width {
            self.width = frame_width.saturating_sub(self.left);
        }

        if self.left < 0 || self.top < 0 {
            return Err(Error::InvalidRegion(format!(
                "rectangle starts outside the frame at ({}, {})",
                self.left, self.top
            )));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidRegion(format!(
                "empty rectangle {}x{} at ({}, {})",
                self.width, self.height, self.left, self.top
            )));
        }
        if self.bottom() > frame_height {
            return Err(Error::InvalidRegion(format!(
                "rectangle bottom {} exceeds frame height {frame_height}",
                self.bottom()
            )));
        }
        Ok(self)
    }
}

/// Where the crop sits relative to the fingertip and how big the output is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropPolicy {
    pub offset_left: i64,
    pub offset_top: i64,
    pub crop_width: i64,
    pub crop_height: i64,
    pub output_width: u32,
    pub output_height: u32,
}

impl Default for CropPolicy {
    fn default() -> Self {
        Self {
            offset_left: DEFAULT_OFFSET_LEFT,
            offset_top: DEFAULT_OFFSET_TOP,
            crop_width: DEFAULT_CROP_WIDTH,
            crop_height: DEFAULT_CROP_HEIGHT,
            output_width: DEFAULT_OUTPUT_WIDTH,
            output_height: DEFAULT_OUTPUT_HEIGHT,
        }
    }
}

impl CropPolicy {
    /// Rectangle around `landmark` before any clamping.
    pub fn raw_region(
        &self,
        landmark: NormalizedLandmark,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<CropRegion> {
        landmark.validate()?;
        let px = (landmark.x as f64 * frame_width as f64).trunc() as i64;
        let py = (landmark.y as f64 * frame_height as f64).trunc() as i64;
        let (Some(left), Some(top)) = (
            px.checked_sub(self.offset_left),
            py.checked_sub(self.offset_top),
        ) else {
            return Err(Error::InvalidRegion(format!(
                "landmark ({}, {}) is too far outside the frame",
                landmark.x, landmark.y
            )));
        };
        Ok(CropRegion {
            left,
            top,
            width: self.crop_width,
            height: self.crop_height,
        })
    }

    pub fn region_for(
        &self,
        landmark: NormalizedLandmark,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<CropRegion> {
        self.raw_region(landmark, frame_width, frame_height)?
            .clamp_to(frame_width, frame_height)
    }
}

/// Crops the fingertip region around `landmark` and rescales it to the
/// policy's output size with nearest-neighbour sampling.
pub fn extract_region(
    frame: &Frame,
    landmark: NormalizedLandmark,
    policy: &CropPolicy,
) -> Result<Frame> {
    let region = policy.region_for(landmark, frame.width, frame.height)?;
    let cropped = crop(frame, &region)?;
    resize_nearest(&cropped, policy.output_width, policy.output_height)
}

#[allow(clippy::too_many_arguments)]
pub fn extract_region_with(
    frame: &Frame,
    landmark: NormalizedLandmark,
    output_width: u32,
    output_height: u32,
    offset_left: i64,
    offset_top: i64,
    crop_width: i64,
    crop_height: i64,
) -> Result<Frame> {
    let policy = CropPolicy {
        offset_left,
        offset_top,
        crop_width,
        crop_height,
        output_width,
        output_height,
    };
    extract_region(frame, landmark, &policy)
}

/// Copies `region` out of `frame`. The region must already lie inside it.
pub fn crop(frame: &Frame, region: &CropRegion) -> Result<Frame> {
    frame.validate()?;
    let inside = region.left >= 0
        && region.top >= 0
        && region.width > 0
        && region.height > 0
        && region.right() <= frame.width as i64
        && region.bottom() <= frame.height as i64;
    if !inside {
        return Err(Error::InvalidRegion(format!(
            "{region:?} is not inside a {}x{} frame",
            frame.width, frame.height
        )));
    }

    let left = region.left as usize;
    let width = region.width as usize;
    let stride = frame.stride();
    let row_len = width * 4;
    let mut rgba = Vec::with_capacity(row_len * region.height as usize);
    for y in region.top as usize..region.bottom() as usize {
        let start = y * stride + left * 4;
        rgba.extend_from_slice(&frame.rgba[start..start + row_len]);
    }

    Frame::new(region.width as u32, region.height as u32, rgba)
}

/// Non-uniform rescale to exactly `width` x `height`.
pub fn resize_nearest(frame: &Frame, width: u32, height: u32) -> Result<Frame> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidRegion(format!(
            "output size {width}x{height} is empty"
        )));
    }
    if frame.width == width && frame.height == height {
        return Ok(frame.clone());
    }

    let src_image = fir::images::Image::from_vec_u8(
        frame.width,
        frame.height,
        frame.rgba.clone(),
        fir::PixelType::U8x4,
    )
    .map_err(|err| Error::Resize(err.to_string()))?;
    let mut dst_image = fir::images::Image::new(width, height, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let resize_options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Nearest)
        .use_alpha(false);
    resizer
        .resize(&src_image, &mut dst_image, Some(&resize_options))
        .map_err(|err| Error::Resize(err.to_string()))?;

    Frame::new(width, height, dst_image.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CropPolicy {
        CropPolicy::default()
    }

    #[test]
    fn centred_landmark_gives_full_rectangle() {
        let region = policy()
            .region_for(NormalizedLandmark::new(0.5, 0.5), 1000, 800)
            .unwrap();
        assert_eq!(
            region,
            CropRegion {
                left: 430,
                top: 340,
                width: 120,
                height: 170
            }
        );
    }

    #[test]
    fn right_overflow_shrinks_width() {
        let lm = NormalizedLandmark::new(0.99, 0.5);
        let raw = policy().raw_region(lm, 1000, 800).unwrap();
        let overflow = raw.right() - 1000;
        assert_eq!(overflow, 40);

        let region = policy().region_for(lm, 1000, 800).unwrap();
        assert_eq!(region.width, raw.width - overflow);
        assert_eq!(region.right(), 1000);
        assert_eq!(region.height, raw.height);
    }

    #[test]
    fn negative_left_is_rejected() {
        let err = policy()
            .region_for(NormalizedLandmark::new(0.05, 0.5), 1000, 800)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRegion(_)));
    }

    #[test]
    fn negative_top_is_rejected() {
        assert!(matches!(
            policy().region_for(NormalizedLandmark::new(0.5, 0.01), 1000, 800),
            Err(Error::InvalidRegion(_))
        ));
    }

    #[test]
    fn bottom_overflow_is_rejected_not_clamped() {
        // bottom lands near 870, past the 800 px frame
        assert!(matches!(
            policy().region_for(NormalizedLandmark::new(0.5, 0.95), 1000, 800),
            Err(Error::InvalidRegion(_))
        ));
    }

    #[test]
    fn landmark_past_right_edge_collapses_region() {
        assert!(matches!(
            policy().region_for(NormalizedLandmark::new(1.2, 0.5), 1000, 800),
            Err(Error::InvalidRegion(_))
        ));
    }

    #[test]
    fn non_finite_landmark_is_rejected() {
        assert!(matches!(
            policy().region_for(NormalizedLandmark::new(f32::INFINITY, 0.5), 1000, 800),
            Err(Error::InvalidLandmark(_))
        ));
    }

    #[test]
    fn crop_copies_the_selected_pixels() {
        let mut frame = Frame::filled(5, 4, [0, 0, 0, 255]).unwrap();
        frame.put_pixel(2, 1, [1, 2, 3, 4]);
        frame.put_pixel(3, 2, [5, 6, 7, 8]);
        let region = CropRegion {
            left: 2,
            top: 1,
            width: 2,
            height: 2,
        };
        let out = crop(&frame, &region).unwrap();
        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.pixel(0, 0), [1, 2, 3, 4]);
        assert_eq!(out.pixel(1, 1), [5, 6, 7, 8]);
        assert_eq!(out.pixel(1, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn crop_rejects_region_outside_frame() {
        let frame = Frame::filled(5, 4, [0; 4]).unwrap();
        let region = CropRegion {
            left: 3,
            top: 0,
            width: 3,
            height: 1,
        };
        assert!(crop(&frame, &region).is_err());
    }

    #[test]
    fn extraction_always_hits_output_size() {
        for (w, h, x, y) in [(1000, 800, 0.5, 0.5), (640, 480, 0.99, 0.3), (300, 1200, 0.4, 0.1)] {
            let frame = Frame::filled(w, h, [10, 20, 30, 255]).unwrap();
            let out = extract_region(&frame, NormalizedLandmark::new(x, y), &policy()).unwrap();
            assert_eq!((out.width, out.height), (350, 500));
            assert!(out.rgba.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
        }
    }

    #[test]
    fn flat_arguments_match_policy() {
        let frame = Frame::filled(200, 200, [9, 9, 9, 255]).unwrap();
        let out = extract_region_with(
            &frame,
            NormalizedLandmark::new(0.5, 0.5),
            64,
            32,
            10,
            10,
            20,
            20,
        )
        .unwrap();
        assert_eq!((out.width, out.height), (64, 32));
    }

    #[test]
    fn zero_output_size_is_rejected() {
        let frame = Frame::filled(10, 10, [0; 4]).unwrap();
        assert!(resize_nearest(&frame, 0, 5).is_err());
    }

    #[test]
    fn far_out_landmarks_are_rejected_not_panicking() {
        let frame = Frame::filled(1000, 800, [0, 0, 0, 255]).unwrap();
        for (x, y) in [(1e20, 0.5), (-1e20, 0.5), (0.5, 1e20), (0.5, -1e20)] {
            let result = extract_region(&frame, NormalizedLandmark::new(x, y), &policy());
            assert!(matches!(result, Err(Error::InvalidRegion(_))), "({x}, {y})");
        }
    }

    #[test]
    fn extreme_policy_values_are_rejected() {
        let lm = NormalizedLandmark::new(0.5, 0.5);
        let wide = CropPolicy {
            crop_width: i64::MAX,
            ..policy()
        };
        // right edge clamps to the frame, whatever the requested width
        let region = wide.region_for(lm, 1000, 800).unwrap();
        assert_eq!((region.left, region.right()), (430, 1000));

        let tall = CropPolicy {
            crop_height: i64::MAX,
            ..policy()
        };
        assert!(matches!(
            tall.region_for(lm, 1000, 800),
            Err(Error::InvalidRegion(_))
        ));

        let shifted = CropPolicy {
            offset_left: i64::MIN,
            ..policy()
        };
        assert!(matches!(
            shifted.region_for(lm, 1000, 800),
            Err(Error::InvalidRegion(_))
        ));
    }

    #[test]
    fn crop_checks_hand_built_frames() {
        let frame = Frame {
            rgba: vec![0; 10],
            width: 4,
            height: 4,
        };
        let region = CropRegion {
            left: 0,
            top: 0,
            width: 2,
            height: 2,
        };
        assert!(matches!(
            crop(&frame, &region),
            Err(Error::BufferSizeMismatch {
                got: 10,
                expected: 64
            })
        ));
    }
}
