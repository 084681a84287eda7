//! Camera backed by a snapshot file.
//!
//! A capture daemon (v4l2, fswebcam, a phone streaming app) keeps
//! overwriting one image file with the latest frame. Each capture reads the
//! file if it changed since the previous read.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tracing::debug;

use super::{AcquisitionError, CameraDevice, Frame, FrameSource};

/// Snapshot-file camera device.
#[derive(Debug, Clone)]
pub struct SnapshotCamera {
    path: PathBuf,
}

impl SnapshotCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CameraDevice for SnapshotCamera {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn open(&self) -> Result<Box<dyn FrameSource>, AcquisitionError> {
        // the file itself may not exist until the daemon writes its first frame
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !dir.is_dir() {
            return Err(AcquisitionError::CameraUnavailable(format!(
                "snapshot directory {} does not exist",
                dir.display()
            )));
        }

        Ok(Box::new(SnapshotFrameSource {
            path: self.path.clone(),
            last_modified: None,
            released: false,
        }))
    }
}

struct SnapshotFrameSource {
    path: PathBuf,
    last_modified: Option<SystemTime>,
    released: bool,
}

#[async_trait]
impl FrameSource for SnapshotFrameSource {
    async fn capture(&mut self) -> Result<Option<Frame>, AcquisitionError> {
        if self.released {
            return Err(AcquisitionError::CaptureFailed(
                "snapshot camera released".to_string(),
            ));
        }

        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AcquisitionError::CaptureFailed(e.to_string())),
        };

        let modified = metadata.modified().ok();
        if modified.is_some() && modified == self.last_modified {
            return Ok(None);
        }

        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => {
                self.last_modified = modified;
                Ok(Some(bytes))
            }
            // daemon may be mid-rename
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AcquisitionError::CaptureFailed(e.to_string())),
        }
    }

    fn release(&mut self) {
        self.released = true;
        debug!("Snapshot source {} closed", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_directory_fails() {
        let camera = SnapshotCamera::new("/nonexistent/dir/frame.png");
        assert!(matches!(
            camera.open(),
            Err(AcquisitionError::CameraUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_capture_waits_for_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let camera = SnapshotCamera::new(&path);
        let mut source = camera.open().unwrap();

        assert!(source.capture().await.unwrap().is_none());

        std::fs::write(&path, b"frame-1").unwrap();
        assert_eq!(source.capture().await.unwrap(), Some(b"frame-1".to_vec()));

        // unchanged file yields no new frame
        assert!(source.capture().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_capture_after_release_fails() {
        let dir = tempfile::tempdir().unwrap();
        let camera = SnapshotCamera::new(dir.path().join("frame.png"));
        let mut source = camera.open().unwrap();

        source.release();
        assert!(matches!(
            source.capture().await,
            Err(AcquisitionError::CaptureFailed(_))
        ));
    }
}
