use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use livi_media_application::{ApplicationError, CameraDevice, CameraStream, Frame};
use livi_media_domain::VideoConstraints;
use tracing::{debug, info};
use walkdir::WalkDir;

/// A camera that replays still images from a folder, one per grab.
///
/// A `user` or `environment` subfolder, when present, is used for the
/// matching facing mode.
#[derive(Debug, Clone)]
pub struct FolderCamera {
    root: PathBuf,
}

impl FolderCamera {
    pub fn new(root: String) -> Self {
        Self {
            root: PathBuf::from(root),
        }
    }

    fn frames_for(&self, constraints: &VideoConstraints) -> Result<Vec<PathBuf>, ApplicationError> {
        if !self.root.is_dir() {
            return Err(ApplicationError::Device(format!(
                "camera folder does not exist or is not a directory: {}",
                self.root.display()
            )));
        }
        let facing_dir = self.root.join(constraints.facing_mode.as_str());
        let folder = if facing_dir.is_dir() {
            facing_dir
        } else {
            self.root.clone()
        };

        let mut frames: Vec<PathBuf> = WalkDir::new(&folder)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_supported_frame(path))
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(ApplicationError::Device(format!(
                "no camera frames found in {}",
                folder.display()
            )));
        }
        Ok(frames)
    }
}

fn is_supported_frame(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref(),
        Some("jpg" | "jpeg" | "png")
    )
}

#[async_trait]
impl CameraDevice for FolderCamera {
    async fn open_stream(
        &self,
        constraints: VideoConstraints,
    ) -> Result<Arc<dyn CameraStream>, ApplicationError> {
        let frames = self.frames_for(&constraints)?;
        info!(
            facing_mode = constraints.facing_mode.as_str(),
            frames = frames.len(),
            "camera stream opened"
        );
        Ok(Arc::new(FolderStream {
            frames,
            next: AtomicUsize::new(0),
            live: AtomicBool::new(true),
        }))
    }
}

struct FolderStream {
    frames: Vec<PathBuf>,
    next: AtomicUsize,
    live: AtomicBool,
}

impl CameraStream for FolderStream {
    fn grab_frame(&self) -> Result<Frame, ApplicationError> {
        if !self.is_live() {
            return Err(ApplicationError::Device("camera stream is stopped".to_string()));
        }
        let index = self.next.fetch_add(1, Ordering::SeqCst) % self.frames.len();
        let path = &self.frames[index];
        let image = image::io::Reader::open(path)
            .map_err(|error| ApplicationError::Io(error.to_string()))?
            .with_guessed_format()
            .map_err(|error| ApplicationError::Device(error.to_string()))?
            .decode()
            .map_err(|error| ApplicationError::Device(error.to_string()))?
            .to_rgb8();
        debug!(frame = %path.display(), "frame grabbed");

        Ok(Frame {
            width: image.width(),
            height: image.height(),
            rgb: image.into_raw(),
        })
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            debug!("camera stream stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use livi_media_domain::FacingMode;
    use tempfile::TempDir;

    fn write_frame(path: &Path, shade: u8) {
        let img = ImageBuffer::from_fn(4, 3, |_x, _y| Rgb([shade, shade, shade]));
        img.save(path).expect("save");
    }

    #[tokio::test]
    async fn replays_frames_in_name_order() {
        let dir = TempDir::new().expect("tempdir");
        write_frame(&dir.path().join("b.png"), 200);
        write_frame(&dir.path().join("a.png"), 10);
        std::fs::write(dir.path().join("notes.txt"), "skip").expect("write");

        let camera = FolderCamera::new(dir.path().to_string_lossy().to_string());
        let stream = camera
            .open_stream(VideoConstraints::for_facing(FacingMode::Environment))
            .await
            .expect("open");

        let first = stream.grab_frame().expect("frame");
        assert_eq!((first.width, first.height), (4, 3));
        assert_eq!(first.rgb.len(), 4 * 3 * 3);
        assert_eq!(first.rgb[0], 10);
        assert_eq!(stream.grab_frame().expect("frame").rgb[0], 200);
        assert_eq!(stream.grab_frame().expect("frame").rgb[0], 10);
    }

    #[tokio::test]
    async fn prefers_the_facing_mode_subfolder() {
        let dir = TempDir::new().expect("tempdir");
        write_frame(&dir.path().join("rear.png"), 10);
        std::fs::create_dir(dir.path().join("user")).expect("mkdir");
        write_frame(&dir.path().join("user/selfie.png"), 99);

        let camera = FolderCamera::new(dir.path().to_string_lossy().to_string());
        let stream = camera
            .open_stream(VideoConstraints::for_facing(FacingMode::User))
            .await
            .expect("open");

        assert_eq!(stream.grab_frame().expect("frame").rgb[0], 99);
    }

    #[tokio::test]
    async fn empty_folder_is_a_device_error() {
        let dir = TempDir::new().expect("tempdir");
        let camera = FolderCamera::new(dir.path().to_string_lossy().to_string());

        let error = camera
            .open_stream(VideoConstraints::for_facing(FacingMode::Environment))
            .await
            .err()
            .expect("no frames");

        assert!(matches!(error, ApplicationError::Device(_)));
    }

    #[tokio::test]
    async fn stopped_stream_refuses_frames() {
        let dir = TempDir::new().expect("tempdir");
        write_frame(&dir.path().join("a.png"), 10);
        let camera = FolderCamera::new(dir.path().to_string_lossy().to_string());
        let stream = camera
            .open_stream(VideoConstraints::for_facing(FacingMode::Environment))
            .await
            .expect("open");

        stream.stop();
        stream.stop();

        assert!(!stream.is_live());
        assert!(stream.grab_frame().is_err());
    }
}
