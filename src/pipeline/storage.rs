use std::{
    fs::{self, File},
    io::{Cursor, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use image::ImageFormat;

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::types::Frame;

/// Lays out saved crops as `<root>/<user_id>/<prefix>_<user>_Set-<set>_Finger-<n>_<millis>.png`.
#[derive(Clone, Debug)]
pub struct CaptureStore {
    root: PathBuf,
    file_prefix: String,
}

impl CaptureStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.root.clone(),
            file_prefix: config.file_prefix.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join(user_id)
    }

    pub fn file_name(&self, user_id: &str, set_no: &str, finger_no: u8, millis: u128) -> String {
        format!(
            "{}_{user_id}_Set-{set_no}_Finger-{finger_no}_{millis}.png",
            self.file_prefix
        )
    }

    pub fn save(&self, frame: &Frame, user_id: &str, set_no: &str, finger_no: u8) -> Result<PathBuf> {
        validate_component("user id", user_id)?;
        validate_component("set number", set_no)?;

        let dir = self.user_dir(user_id);
        fs::create_dir_all(&dir).map_err(|err| Error::io(&dir, err))?;

        let path = dir.join(self.file_name(user_id, set_no, finger_no, timestamp_millis()));
        write_png_atomic(frame, &path)?;
        log::debug!("saved finger {finger_no} to {}", path.display());
        Ok(path)
    }
}

/// Rejects values that would escape or break the directory layout.
pub fn validate_component(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidCaptureRequest(format!("{label} is empty")));
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(Error::InvalidCaptureRequest(format!(
            "{label} {value:?} is not a plain name"
        )));
    }
    Ok(())
}

pub fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Encodes `frame` as PNG and moves it into place only once fully written.
pub fn write_png_atomic(frame: &Frame, path: &Path) -> Result<()> {
    let image = frame.to_rgba_image().ok_or(Error::BufferSizeMismatch {
        got: frame.rgba.len(),
        expected: frame.stride() * frame.height as usize,
    })?;
    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .map_err(|source| Error::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let written = File::create(&partial)
        .and_then(|mut file| {
            file.write_all(&encoded)?;
            file.sync_all()
        })
        .map_err(|err| Error::io(&partial, err))
        .and_then(|_| fs::rename(&partial, path).map_err(|err| Error::io(path, err)));
    if written.is_err() {
        let _ = fs::remove_file(&partial);
    }
    written
}
