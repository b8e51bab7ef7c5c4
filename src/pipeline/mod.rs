pub mod capture;
pub mod orientation;
pub mod rgba_converter;
pub mod storage;
pub mod worker;

// Re-exports for convenience
pub use capture::{CaptureReport, CaptureRequest, CaptureSession, SavedCrop, select_single_hand};
pub use orientation::Orientation;
pub use rgba_converter::{PixelFormat, RawFrame, convert_raw_frame, load_frame};
pub use storage::{CaptureStore, write_png_atomic};
pub use worker::{CaptureOutcome, start_capture_worker};
