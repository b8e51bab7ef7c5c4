use image::imageops;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Frame, HandLandmarks, NormalizedLandmark};

/// Rigid re-orientation applied to a frame before cropping. Rotations are
/// clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    FlipHorizontal,
    FlipVertical,
    /// Rotate 180 then mirror left-right, which is the preview's vertical flip.
    Mirror,
}

impl Orientation {
    /// EXIF orientation tag. Transposing tags (5, 7) have no counterpart.
    pub fn from_exif(tag: u16) -> Option<Self> {
        match tag {
            1 => Some(Orientation::Identity),
            2 => Some(Orientation::FlipHorizontal),
            3 => Some(Orientation::Rotate180),
            4 => Some(Orientation::FlipVertical),
            6 => Some(Orientation::Rotate90),
            8 => Some(Orientation::Rotate270),
            _ => None,
        }
    }

    pub fn apply(&self, frame: &Frame) -> Result<Frame> {
        if *self == Orientation::Identity {
            return Ok(frame.clone());
        }
        let image = frame.to_rgba_image().ok_or(Error::BufferSizeMismatch {
            got: frame.rgba.len(),
            expected: frame.stride() * frame.height as usize,
        })?;
        let oriented = match self {
            Orientation::Identity => image,
            Orientation::Rotate90 => imageops::rotate90(&image),
            Orientation::Rotate180 => imageops::rotate180(&image),
            Orientation::Rotate270 => imageops::rotate270(&image),
            Orientation::FlipHorizontal => imageops::flip_horizontal(&image),
            Orientation::FlipVertical | Orientation::Mirror => imageops::flip_vertical(&image),
        };
        Frame::try_from(oriented)
    }

    /// Moves a landmark so it keeps pointing at the same content after
    /// [`Orientation::apply`].
    pub fn map_landmark(&self, lm: NormalizedLandmark) -> NormalizedLandmark {
        let (x, y) = (lm.x, lm.y);
        let (x, y) = match self {
            Orientation::Identity => (x, y),
            Orientation::Rotate90 => (1.0 - y, x),
            Orientation::Rotate180 => (1.0 - x, 1.0 - y),
            Orientation::Rotate270 => (y, 1.0 - x),
            Orientation::FlipHorizontal => (1.0 - x, y),
            Orientation::FlipVertical | Orientation::Mirror => (x, 1.0 - y),
        };
        NormalizedLandmark::new(x, y)
    }

    pub fn map_hand(&self, hand: &HandLandmarks) -> HandLandmarks {
        HandLandmarks {
            handedness: hand.handedness,
            landmarks: hand
                .landmarks
                .iter()
                .map(|lm| self.map_landmark(*lm))
                .collect(),
        }
    }
}
