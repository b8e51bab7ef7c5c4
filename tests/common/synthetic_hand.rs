use std::path::PathBuf;

use fingertip_capture::{Finger, Frame, HandLandmarks, Handedness, NormalizedLandmark};

/// Horizontal gradient with an opaque alpha channel.
pub fn gradient_frame(width: u32, height: u32) -> Frame {
    assert!(width > 0 && height > 0, "frame dimensions must be positive");
    let mut frame = Frame::filled(width, height, [0, 0, 0, 255]).unwrap();
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width) as u8;
            let g = (y * 255 / height) as u8;
            frame.put_pixel(x, y, [r, g, 128, 255]);
        }
    }
    frame
}

/// 21 landmarks with the four long fingertips spread across the upper half.
pub fn open_hand(handedness: Handedness) -> HandLandmarks {
    let mut points = vec![NormalizedLandmark::new(0.5, 0.7); 21];
    points[Finger::Thumb.tip_index()] = NormalizedLandmark::new(0.15, 0.5);
    points[Finger::Index.tip_index()] = NormalizedLandmark::new(0.3, 0.25);
    points[Finger::Middle.tip_index()] = NormalizedLandmark::new(0.45, 0.2);
    points[Finger::Ring.tip_index()] = NormalizedLandmark::new(0.6, 0.25);
    points[Finger::Pinky.tip_index()] = NormalizedLandmark::new(0.75, 0.35);
    HandLandmarks::new(handedness, points).unwrap()
}

/// Fresh, empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "fingertip-capture-{name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}
