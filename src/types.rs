use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const NUM_LANDMARKS: usize = 21;

/// Owned RGBA8 frame, row-major, 4 bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = expected_len(width, height)?;
        if rgba.len() != expected {
            return Err(Error::BufferSizeMismatch {
                got: rgba.len(),
                expected,
            });
        }
        Ok(Self {
            rgba,
            width,
            height,
        })
    }

    /// Frame with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Result<Self> {
        let expected = expected_len(width, height)?;
        let rgba = color.iter().copied().cycle().take(expected).collect();
        Ok(Self {
            rgba,
            width,
            height,
        })
    }

    /// Checks the buffer still matches the dimensions. The fields are public,
    /// so a hand-built frame can disagree with itself.
    pub fn validate(&self) -> Result<()> {
        let expected = expected_len(self.width, self.height)?;
        if self.rgba.len() != expected {
            return Err(Error::BufferSizeMismatch {
                got: self.rgba.len(),
                expected,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// RGBA value at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = self.index(x, y);
        [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        let idx = self.index(x, y);
        self.rgba[idx..idx + 4].copy_from_slice(&color);
    }

    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
    }
}

impl TryFrom<RgbaImage> for Frame {
    type Error = Error;

    fn try_from(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Frame::new(width, height, image.into_raw())
    }
}

fn expected_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok((width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4))
}

/// Hand keypoint relative to the frame it was detected on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
}

impl NormalizedLandmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(Error::InvalidLandmark(format!(
                "non-finite coordinates ({}, {})",
                self.x, self.y
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn label(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// Landmark index of the fingertip in the 21-point hand model.
    pub fn tip_index(&self) -> usize {
        match self {
            Finger::Thumb => 4,
            Finger::Index => 8,
            Finger::Middle => 12,
            Finger::Ring => 16,
            Finger::Pinky => 20,
        }
    }

    /// 1..=5 for the left hand, 6..=10 for the right, thumb first.
    pub fn number(&self, handedness: Handedness) -> u8 {
        let base = match self {
            Finger::Thumb => 1,
            Finger::Index => 2,
            Finger::Middle => 3,
            Finger::Ring => 4,
            Finger::Pinky => 5,
        };
        match handedness {
            Handedness::Left => base,
            Handedness::Right => base + 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub handedness: Handedness,
    pub landmarks: Vec<NormalizedLandmark>,
}

impl HandLandmarks {
    pub fn new(handedness: Handedness, landmarks: Vec<NormalizedLandmark>) -> Result<Self> {
        let hand = Self {
            handedness,
            landmarks,
        };
        hand.validate()?;
        Ok(hand)
    }

    pub fn validate(&self) -> Result<()> {
        if self.landmarks.len() < NUM_LANDMARKS {
            return Err(Error::InvalidLandmark(format!(
                "expected {NUM_LANDMARKS} hand landmarks, got {}",
                self.landmarks.len()
            )));
        }
        self.landmarks.iter().try_for_each(|lm| lm.validate())
    }

    pub fn fingertip(&self, finger: Finger) -> Option<NormalizedLandmark> {
        self.landmarks.get(finger.tip_index()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_short_buffer() {
        let err = Frame::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferSizeMismatch {
                got: 15,
                expected: 16
            }
        ));
    }

    #[test]
    fn frame_rejects_zero_dimensions() {
        assert!(matches!(
            Frame::filled(0, 4, [0; 4]),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn put_and_read_pixel() {
        let mut frame = Frame::filled(3, 2, [1, 2, 3, 4]).unwrap();
        frame.put_pixel(2, 1, [9, 8, 7, 6]);
        assert_eq!(frame.pixel(2, 1), [9, 8, 7, 6]);
        assert_eq!(frame.pixel(0, 0), [1, 2, 3, 4]);
    }

    #[test]
    fn finger_numbers_follow_handedness() {
        assert_eq!(Finger::Index.number(Handedness::Left), 2);
        assert_eq!(Finger::Pinky.number(Handedness::Left), 5);
        assert_eq!(Finger::Index.number(Handedness::Right), 7);
        assert_eq!(Finger::Pinky.number(Handedness::Right), 10);
    }

    #[test]
    fn hand_needs_full_landmark_set() {
        let points = vec![NormalizedLandmark::new(0.5, 0.5); 5];
        assert!(matches!(
            HandLandmarks::new(Handedness::Left, points),
            Err(Error::InvalidLandmark(_))
        ));
    }

    #[test]
    fn non_finite_landmark_is_rejected() {
        let mut points = vec![NormalizedLandmark::new(0.5, 0.5); NUM_LANDMARKS];
        points[8] = NormalizedLandmark::new(f32::NAN, 0.2);
        assert!(HandLandmarks::new(Handedness::Right, points).is_err());
    }

    #[test]
    fn validate_catches_edited_fields() {
        let mut frame = Frame::filled(3, 2, [0; 4]).unwrap();
        assert!(frame.validate().is_ok());
        frame.width = 4;
        assert!(matches!(
            frame.validate(),
            Err(Error::BufferSizeMismatch {
                got: 24,
                expected: 32
            })
        ));
    }
}
