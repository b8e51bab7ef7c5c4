use rayon::prelude::*;

use crate::types::Frame;

/// Luminance weights of a zero-saturation color matrix.
const LUMA_R: f32 = 0.213;
const LUMA_G: f32 = 0.715;
const LUMA_B: f32 = 0.072;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// `h` in degrees `[0, 360)`, `s` and `v` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hsv(&self) -> Hsv {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * (((b - r) / delta) + 2.0)
        } else {
            60.0 * (((r - g) / delta) + 4.0)
        };

        let s = if max == 0.0 { 0.0 } else { delta / max };

        Hsv {
            h: h.rem_euclid(360.0),
            s,
            v: max,
        }
    }
}

impl Hsv {
    pub fn to_rgb(&self) -> Rgb {
        let h = self.h.rem_euclid(360.0);
        let s = self.s.clamp(0.0, 1.0);
        let v = self.v.clamp(0.0, 1.0);

        let c = v * s;
        let sector = h / 60.0;
        let x = c * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match sector as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Rgb {
            r: to_channel(r + m),
            g: to_channel(g + m),
            b: to_channel(b + m),
        }
    }
}

#[inline]
fn to_channel(unit: f32) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}

fn map_pixels<F>(src: &Frame, op: F) -> Frame
where
    F: Fn([u8; 4]) -> [u8; 4] + Sync,
{
    let mut rgba = vec![0u8; src.rgba.len()];
    rgba.par_chunks_exact_mut(4)
        .zip(src.rgba.par_chunks_exact(4))
        .for_each(|(dst, px)| {
            dst.copy_from_slice(&op([px[0], px[1], px[2], px[3]]));
        });
    Frame {
        rgba,
        width: src.width,
        height: src.height,
    }
}

/// Desaturates every pixel, keeping perceived luminance and alpha.
pub fn grayscale(src: &Frame) -> Frame {
    map_pixels(src, |[r, g, b, a]| {
        let luma = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
        let y = luma.round().clamp(0.0, 255.0) as u8;
        [y, y, y, a]
    })
}

/// `channel * contrast + brightness` on R, G and B.
///
/// `contrast` is meant for `[0, 10]` (1 is identity) and `brightness` for
/// `[-255, 255]` (0 is identity); anything else just clamps harder.
pub fn contrast_brightness(src: &Frame, contrast: f32, brightness: f32) -> Frame {
    let remap = |c: u8| (c as f32 * contrast + brightness).round().clamp(0.0, 255.0) as u8;
    map_pixels(src, |[r, g, b, a]| [remap(r), remap(g), remap(b), a])
}

/// Shifts the hue of every pixel by `degrees`, wrapping into `[0, 360)`.
pub fn hue_rotate(src: &Frame, degrees: i32) -> Frame {
    let shift = degrees.rem_euclid(360) as f32;
    map_pixels(src, |[r, g, b, a]| {
        let mut hsv = Rgb::new(r, g, b).to_hsv();
        hsv.h = (hsv.h + shift).rem_euclid(360.0);
        let rgb = hsv.to_rgb();
        [rgb.r, rgb.g, rgb.b, a]
    })
}
