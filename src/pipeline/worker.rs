use std::thread;

use crossbeam_channel::{Receiver, Sender};

use super::capture::{CaptureReport, CaptureRequest, CaptureSession};
use crate::config::CaptureConfig;

/// Outcome of one request, the error flattened to its message so it can
/// cross the channel and be shown as-is.
pub type CaptureOutcome = std::result::Result<CaptureReport, String>;

/// Processes capture requests in arrival order until the request channel
/// closes. Every request gets exactly one outcome.
pub fn start_capture_worker(
    config: CaptureConfig,
    request_rx: Receiver<CaptureRequest>,
    outcome_tx: Sender<CaptureOutcome>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let session = CaptureSession::new(config);
        log::info!(
            "capture worker ready, saving under {}",
            session.store().root().display()
        );

        for request in request_rx.iter() {
            let outcome = match session.capture(&request) {
                Ok(report) => Ok(report),
                Err(err) => {
                    log::warn!("capture for user {} failed: {err}", request.user_id);
                    Err(err.to_string())
                }
            };
            if outcome_tx.send(outcome).is_err() {
                log::debug!("outcome receiver dropped, stopping capture worker");
                break;
            }
        }
    })
}
