//! Debug drawing: crop rectangles and landmark dots on top of a frame.

use crate::region::CropRegion;
use crate::types::{Frame, NormalizedLandmark};

pub const REGION_COLOR: [u8; 4] = [48, 255, 48, 255];
pub const LANDMARK_COLOR: [u8; 4] = [255, 48, 48, 255];
pub const REGION_THICKNESS: i32 = 5;
pub const LANDMARK_RADIUS: i32 = 10;

pub fn draw_crop_regions(frame: &mut Frame, regions: &[CropRegion], color: [u8; 4], thickness: i32) {
    for region in regions {
        let (x1, y1) = (region.left, region.top);
        let (x2, y2) = (region.right().saturating_sub(1), region.bottom().saturating_sub(1));
        let corners = [(x1, y1), (x2, y1), (x2, y2), (x1, y2)];
        for i in 0..corners.len() {
            let p0 = corners[i];
            let p1 = corners[(i + 1) % corners.len()];
            draw_line(frame, to_i32(p0), to_i32(p1), color, thickness);
        }
    }
}

pub fn draw_landmarks(frame: &mut Frame, landmarks: &[NormalizedLandmark], color: [u8; 4], radius: i32) {
    for lm in landmarks {
        if !(lm.x.is_finite() && lm.y.is_finite()) {
            continue;
        }
        let cx = (lm.x * frame.width as f32) as i32;
        let cy = (lm.y * frame.height as f32) as i32;
        draw_circle(frame, (cx, cy), radius, color);
    }
}

fn to_i32((x, y): (i64, i64)) -> (i32, i32) {
    (
        x.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        y.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
    )
}

fn draw_line(frame: &mut Frame, p0: (i32, i32), p1: (i32, i32), color: [u8; 4], thickness: i32) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let radius = (thickness.max(1) - 1) / 2;

    loop {
        for ox in -radius..=radius {
            for oy in -radius..=radius {
                if ox.abs() + oy.abs() <= radius {
                    put_pixel_safe(frame, x0 + ox, y0 + oy, color);
                }
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_circle(frame: &mut Frame, center: (i32, i32), radius: i32, color: [u8; 4]) {
    let (cx, cy) = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_safe(frame, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel_safe(frame: &mut Frame, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as u32 >= frame.width || y as u32 >= frame.height {
        return;
    }
    frame.put_pixel(x as u32, y as u32, color);
}
