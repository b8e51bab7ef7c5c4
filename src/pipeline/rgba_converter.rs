//! Raw camera buffers to RGBA frames.

use std::path::Path;

use rayon::prelude::*;
use yuv::{
    YuvBiPlanarImage, YuvConversionMode, YuvPackedImage, YuvRange, YuvStandardMatrix,
    yuv_nv12_to_rgba, yuyv422_to_rgba,
};
use zune_jpeg::{
    JpegDecoder,
    zune_core::{bytestream::ZCursor, colorspace::ColorSpace, options::DecoderOptions},
};

use crate::error::{Error, Result};
use crate::types::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Nv12,
    Yuyv,
    Mjpeg,
    RawRgb,
    RawBgr,
    Gray,
    /// Little-endian 5-6-5 packed RGB.
    Rgb565,
    Rgba,
}

impl PixelFormat {
    /// Maps a V4L2-style FourCC code to a known layout.
    pub fn from_fourcc(code: &str) -> Result<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "NV12" => Ok(PixelFormat::Nv12),
            "YUYV" | "YUY2" => Ok(PixelFormat::Yuyv),
            "MJPG" | "JPEG" => Ok(PixelFormat::Mjpeg),
            "RGB3" | "RGB" => Ok(PixelFormat::RawRgb),
            "BGR3" | "BGR" => Ok(PixelFormat::RawBgr),
            "GREY" | "Y800" | "GRAY" => Ok(PixelFormat::Gray),
            "RGBP" => Ok(PixelFormat::Rgb565),
            "AB24" | "RGBA" => Ok(PixelFormat::Rgba),
            other => Err(Error::UnsupportedImageFormat(format!(
                "unknown pixel format {other:?}"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RawFrame {
    pub format: PixelFormat,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn convert_raw_frame(frame: &RawFrame) -> Result<Frame> {
    let (width, height) = (frame.width, frame.height);
    let data = frame.data.as_slice();

    let rgba = match frame.format {
        PixelFormat::Mjpeg => return mjpeg_to_frame(data),
        PixelFormat::Nv12 => nv12_to_rgba(data, width, height)?,
        PixelFormat::Yuyv => yuyv_to_rgba(data, width, height)?,
        PixelFormat::RawRgb => rgb_like_to_rgba(data, width, height, false)?,
        PixelFormat::RawBgr => rgb_like_to_rgba(data, width, height, true)?,
        PixelFormat::Gray => gray_to_rgba(data, width, height)?,
        PixelFormat::Rgb565 => rgb565_to_rgba(data, width, height)?,
        PixelFormat::Rgba => {
            check_len(data, pixel_count(width, height) * 4)?;
            data[..pixel_count(width, height) * 4].to_vec()
        }
    };

    Frame::new(width, height, rgba)
}

/// Decodes a PNG/JPEG file into a frame.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path)
        .map_err(|err| Error::Decode(format!("failed to open image {}: {err}", path.display())))?
        .to_rgba8();
    Frame::try_from(image)
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

fn check_len(data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(Error::BufferSizeMismatch {
            got: data.len(),
            expected,
        });
    }
    Ok(())
}

fn nv12_to_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let y_plane_len = pixel_count(width, height);
    let uv_plane_len = y_plane_len / 2;
    check_len(data, y_plane_len + uv_plane_len)?;

    let y_plane = &data[..y_plane_len];
    let uv_plane = &data[y_plane_len..y_plane_len + uv_plane_len];
    let mut rgba = vec![0u8; y_plane_len * 4];

    let image = YuvBiPlanarImage {
        y_plane,
        y_stride: width,
        uv_plane,
        uv_stride: width,
        width,
        height,
    };

    yuv_nv12_to_rgba(
        &image,
        &mut rgba,
        width * 4,
        YuvRange::Full,
        YuvStandardMatrix::Bt709,
        YuvConversionMode::Balanced,
    )
    .map_err(|err| Error::Decode(format!("NV12 to RGBA failed: {err:?}")))?;

    Ok(rgba)
}

fn yuyv_to_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    check_len(data, pixel_count(width, height) * 2)?;

    let mut rgba = vec![0u8; pixel_count(width, height) * 4];
    let packed = YuvPackedImage {
        yuy: data,
        yuy_stride: width * 2,
        width,
        height,
    };

    yuyv422_to_rgba(
        &packed,
        &mut rgba,
        width * 4,
        YuvRange::Full,
        YuvStandardMatrix::Bt709,
    )
    .map_err(|err| Error::Decode(format!("YUYV422 to RGBA failed: {err:?}")))?;

    Ok(rgba)
}

fn mjpeg_to_frame(data: &[u8]) -> Result<Frame> {
    let options = DecoderOptions::default().jpeg_set_out_colorspace(ColorSpace::RGBA);
    let mut decoder = JpegDecoder::new_with_options(ZCursor::new(data), options);
    let rgba = decoder
        .decode()
        .map_err(|err| Error::Decode(format!("MJPEG decode failed: {err:?}")))?;

    let info = decoder
        .info()
        .ok_or_else(|| Error::Decode("MJPEG decoder reported no image info".into()))?;
    let width = u32::try_from(info.width)
        .map_err(|_| Error::Decode("MJPEG width does not fit u32".into()))?;
    let height = u32::try_from(info.height)
        .map_err(|_| Error::Decode("MJPEG height does not fit u32".into()))?;

    Frame::new(width, height, rgba)
}

fn rgb_like_to_rgba(data: &[u8], width: u32, height: u32, swap_rb: bool) -> Result<Vec<u8>> {
    check_len(data, pixel_count(width, height) * 3)?;

    let mut rgba = vec![0u8; pixel_count(width, height) * 4];
    rgba.par_chunks_mut(4)
        .zip(data.par_chunks_exact(3))
        .for_each(|(dst, src)| {
            if swap_rb {
                dst[0] = src[2];
                dst[1] = src[1];
                dst[2] = src[0];
            } else {
                dst[0] = src[0];
                dst[1] = src[1];
                dst[2] = src[2];
            }
            dst[3] = 255;
        });

    Ok(rgba)
}

fn gray_to_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected_len = pixel_count(width, height);
    check_len(data, expected_len)?;

    let mut rgba = vec![0u8; expected_len * 4];
    rgba.par_chunks_mut(4)
        .zip(data[..expected_len].par_iter().copied())
        .for_each(|(dst, value)| {
            dst[0] = value;
            dst[1] = value;
            dst[2] = value;
            dst[3] = 255;
        });

    Ok(rgba)
}

fn rgb565_to_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    check_len(data, pixel_count(width, height) * 2)?;

    let mut rgba = vec![0u8; pixel_count(width, height) * 4];
    rgba.par_chunks_mut(4)
        .zip(data.par_chunks_exact(2))
        .for_each(|(dst, src)| {
            let v = u16::from_le_bytes([src[0], src[1]]);
            let r = ((v >> 11) & 0x1f) as u8;
            let g = ((v >> 5) & 0x3f) as u8;
            let b = (v & 0x1f) as u8;
            dst[0] = (r << 3) | (r >> 2);
            dst[1] = (g << 2) | (g >> 4);
            dst[2] = (b << 3) | (b >> 2);
            dst[3] = 255;
        });

    Ok(rgba)
}
