use std::{fs, path::PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use super::storage::{CaptureStore, validate_component};
use crate::config::CaptureConfig;
use crate::error::{Error, Result};
use crate::filters::apply_chain;
use crate::region::{CropRegion, crop, resize_nearest};
use crate::types::{Finger, Frame, HandLandmarks, Handedness};

/// One user-initiated capture: a frame, whatever the detector found on it
/// and who the crops belong to.
#[derive(Clone, Debug)]
pub struct CaptureRequest {
    pub frame: Frame,
    pub hands: Vec<HandLandmarks>,
    pub user_id: String,
    pub set_no: String,
}

#[derive(Clone, Debug)]
pub struct FingertipCrop {
    pub finger: Finger,
    pub finger_no: u8,
    pub region: CropRegion,
    pub image: Frame,
}

#[derive(Clone, Debug, Serialize)]
pub struct SavedCrop {
    pub finger: Finger,
    pub finger_no: u8,
    pub region: CropRegion,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Serialize)]
pub struct CaptureReport {
    pub user_id: String,
    pub set_no: String,
    pub handedness: Handedness,
    pub crops: Vec<SavedCrop>,
}

pub struct CaptureSession {
    config: CaptureConfig,
    store: CaptureStore,
}

impl CaptureSession {
    pub fn new(config: CaptureConfig) -> Self {
        let store = CaptureStore::new(&config.storage);
        Self { config, store }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn store(&self) -> &CaptureStore {
        &self.store
    }

    /// Runs the configured adjustment chain over the whole frame.
    pub fn prepare_frame(&self, frame: &Frame) -> Result<Frame> {
        apply_chain(frame, &self.config.adjustments)
    }

    /// Crops every configured fingertip out of an already prepared frame.
    /// Fails as a whole if any single fingertip cannot be cropped.
    pub fn extract_fingertips(&self, frame: &Frame, hand: &HandLandmarks) -> Result<Vec<FingertipCrop>> {
        let policy = &self.config.crop;
        self.config
            .fingers
            .par_iter()
            .map(|&finger| -> Result<FingertipCrop> {
                let landmark = hand.fingertip(finger).ok_or_else(|| {
                    Error::InvalidLandmark(format!("no landmark for {finger:?} tip"))
                })?;
                let region = policy.region_for(landmark, frame.width, frame.height)?;
                let cropped = crop(frame, &region)?;
                let image = resize_nearest(&cropped, policy.output_width, policy.output_height)?;
                log::debug!("{finger:?} tip at ({:.3}, {:.3}) -> {region:?}", landmark.x, landmark.y);
                Ok(FingertipCrop {
                    finger,
                    finger_no: finger.number(hand.handedness),
                    region,
                    image,
                })
            })
            .collect()
    }

    /// Saves every crop of one set. If any save fails, the files already
    /// written for this set are removed again.
    pub fn save_crops(
        &self,
        fingertips: Vec<FingertipCrop>,
        user_id: &str,
        set_no: &str,
    ) -> Result<Vec<SavedCrop>> {
        let mut crops: Vec<SavedCrop> = Vec::with_capacity(fingertips.len());
        for tip in fingertips {
            match self.store.save(&tip.image, user_id, set_no, tip.finger_no) {
                Ok(path) => crops.push(SavedCrop {
                    finger: tip.finger,
                    finger_no: tip.finger_no,
                    region: tip.region,
                    path,
                }),
                Err(err) => {
                    for saved in &crops {
                        if let Err(remove_err) = fs::remove_file(&saved.path) {
                            log::warn!(
                                "could not remove {} after failed capture: {remove_err}",
                                saved.path.display()
                            );
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(crops)
    }

    pub fn capture(&self, request: &CaptureRequest) -> Result<CaptureReport> {
        validate_component("user id", &request.user_id)?;
        validate_component("set number", &request.set_no)?;

        let hand = select_single_hand(&request.hands)?;
        hand.validate()?;
        log::info!(
            "capturing {} hand for user {} set {}",
            hand.handedness.label(),
            request.user_id,
            request.set_no
        );

        let orientation = self.config.orientation;
        let oriented = orientation.apply(&request.frame)?;
        let hand = orientation.map_hand(hand);

        let prepared = self.prepare_frame(&oriented)?;
        let fingertips = self.extract_fingertips(&prepared, &hand)?;

        let crops = self.save_crops(fingertips, &request.user_id, &request.set_no)?;

        log::info!(
            "saved {} crops under {}",
            crops.len(),
            self.store.user_dir(&request.user_id).display()
        );

        Ok(CaptureReport {
            user_id: request.user_id.clone(),
            set_no: request.set_no.clone(),
            handedness: hand.handedness,
            crops,
        })
    }
}

/// Capturing needs exactly one hand in view.
pub fn select_single_hand(hands: &[HandLandmarks]) -> Result<&HandLandmarks> {
    match hands {
        [] => Err(Error::NoHandDetected),
        [hand] => Ok(hand),
        many => Err(Error::MultipleHandsDetected(many.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::filters::Adjustment;
    use crate::types::{NUM_LANDMARKS, NormalizedLandmark};

    fn hand(handedness: Handedness) -> HandLandmarks {
        let mut points = vec![NormalizedLandmark::new(0.5, 0.6); NUM_LANDMARKS];
        points[Finger::Index.tip_index()] = NormalizedLandmark::new(0.2, 0.2);
        points[Finger::Middle.tip_index()] = NormalizedLandmark::new(0.4, 0.15);
        points[Finger::Ring.tip_index()] = NormalizedLandmark::new(0.6, 0.2);
        points[Finger::Pinky.tip_index()] = NormalizedLandmark::new(0.8, 0.3);
        HandLandmarks::new(handedness, points).unwrap()
    }

    fn session() -> CaptureSession {
        CaptureSession::new(CaptureConfig::default())
    }

    #[test]
    fn hand_count_is_checked() {
        assert!(matches!(select_single_hand(&[]), Err(Error::NoHandDetected)));
        let two = [hand(Handedness::Left), hand(Handedness::Right)];
        assert!(matches!(
            select_single_hand(&two),
            Err(Error::MultipleHandsDetected(2))
        ));
        assert!(select_single_hand(&two[..1]).is_ok());
    }

    #[test]
    fn fingertips_numbered_by_hand() {
        let frame = Frame::filled(1000, 800, [50, 60, 70, 255]).unwrap();
        let left: Vec<u8> = session()
            .extract_fingertips(&frame, &hand(Handedness::Left))
            .unwrap()
            .iter()
            .map(|c| c.finger_no)
            .collect();
        assert_eq!(left, vec![2, 3, 4, 5]);

        let right = session()
            .extract_fingertips(&frame, &hand(Handedness::Right))
            .unwrap();
        assert_eq!(
            right.iter().map(|c| c.finger_no).collect::<Vec<_>>(),
            vec![7, 8, 9, 10]
        );
        assert!(
            right
                .iter()
                .all(|c| (c.image.width, c.image.height) == (350, 500))
        );
    }

    #[test]
    fn one_bad_fingertip_fails_the_set() {
        let frame = Frame::filled(1000, 800, [0, 0, 0, 255]).unwrap();
        let mut h = hand(Handedness::Left);
        h.landmarks[Finger::Index.tip_index()] = NormalizedLandmark::new(0.01, 0.5);
        assert!(matches!(
            session().extract_fingertips(&frame, &h),
            Err(Error::InvalidRegion(_))
        ));
    }

    #[test]
    fn prepare_runs_reference_chain() {
        let frame = Frame::filled(4, 4, [200, 40, 40, 255]).unwrap();
        let prepared = session().prepare_frame(&frame).unwrap();
        let expected = apply_chain(
            &frame,
            &[Adjustment::Grayscale, Adjustment::HueRotate { degrees: 180 }],
        )
        .unwrap();
        assert_eq!(prepared, expected);
        let px = prepared.pixel(0, 0);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn capture_rejects_bad_request_before_work() {
        let request = CaptureRequest {
            frame: Frame::filled(10, 10, [0; 4]).unwrap(),
            hands: vec![hand(Handedness::Left)],
            user_id: "../x".into(),
            set_no: "1".into(),
        };
        assert!(matches!(
            session().capture(&request),
            Err(Error::InvalidCaptureRequest(_))
        ));
    }

    #[test]
    fn failed_save_removes_the_rest_of_the_set() {
        let root = std::env::temp_dir().join(format!(
            "fingertip-capture-rollback-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        let session = CaptureSession::new(CaptureConfig {
            storage: StorageConfig {
                root: root.clone(),
                ..StorageConfig::default()
            },
            ..CaptureConfig::default()
        });
        let frame = Frame::filled(1000, 800, [50, 60, 70, 255]).unwrap();
        let mut tips = session
            .extract_fingertips(&frame, &hand(Handedness::Right))
            .unwrap();
        // third crop cannot be encoded
        tips[2].image.rgba.truncate(8);

        let result = session.save_crops(tips, "subject", "1");
        assert!(matches!(result, Err(Error::BufferSizeMismatch { .. })));
        let remaining = fs::read_dir(root.join("subject")).unwrap().count();
        assert_eq!(remaining, 0);

        fs::remove_dir_all(&root).unwrap();
    }
}
