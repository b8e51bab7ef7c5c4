use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use fingertip_capture::{
    CaptureConfig, HandLandmarks, load_config, overlay,
    pipeline::{CaptureRequest, CaptureSession, load_frame, select_single_hand, write_png_atomic},
};

const USAGE: &str =
    "usage: fingertip-capture <image> <landmarks.json> <user-id> <set-no> [config.json] [overlay.png]";

#[derive(Debug, Deserialize)]
struct LandmarkFile {
    hands: Vec<HandLandmarks>,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input_image = args.next().map(PathBuf::from).ok_or_else(|| anyhow!(USAGE))?;
    let landmarks_path = args.next().map(PathBuf::from).ok_or_else(|| anyhow!(USAGE))?;
    let user_id = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let set_no = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let config = match args.next() {
        Some(path) => load_config(&PathBuf::from(path))?,
        None => CaptureConfig::default(),
    };
    let overlay_path = args.next().map(PathBuf::from);

    let frame = load_frame(&input_image).context("failed to read input image")?;
    let landmarks: LandmarkFile = serde_json::from_str(
        &fs::read_to_string(&landmarks_path)
            .with_context(|| format!("failed to read {}", landmarks_path.display()))?,
    )
    .with_context(|| format!("failed to parse {}", landmarks_path.display()))?;

    if let Some(path) = &overlay_path {
        write_overlay(&config, &frame, &landmarks.hands, path)?;
    }

    let session = CaptureSession::new(config);
    let request = CaptureRequest {
        frame,
        hands: landmarks.hands,
        user_id,
        set_no,
    };
    let report = session
        .capture(&request)
        .with_context(|| format!("capture of {} failed", input_image.display()))?;

    println!(
        "Saved {} fingertip crops of the {} hand",
        report.crops.len(),
        report.handedness.label()
    );
    for crop in &report.crops {
        println!("  finger {:>2}: {}", crop.finger_no, crop.path.display());
    }

    Ok(())
}

fn write_overlay(
    config: &CaptureConfig,
    frame: &fingertip_capture::Frame,
    hands: &[HandLandmarks],
    path: &Path,
) -> Result<()> {
    let hand = config.orientation.map_hand(select_single_hand(hands)?);
    let mut canvas = config.orientation.apply(frame)?;

    let regions: Vec<_> = config
        .fingers
        .iter()
        .filter_map(|finger| hand.fingertip(*finger))
        .filter_map(|lm| config.crop.raw_region(lm, canvas.width, canvas.height).ok())
        .collect();
    overlay::draw_crop_regions(
        &mut canvas,
        &regions,
        overlay::REGION_COLOR,
        overlay::REGION_THICKNESS,
    );
    overlay::draw_landmarks(
        &mut canvas,
        &hand.landmarks,
        overlay::LANDMARK_COLOR,
        overlay::LANDMARK_RADIUS,
    );

    write_png_atomic(&canvas, path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
