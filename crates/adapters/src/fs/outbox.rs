use std::fs;
use std::path::Path;

use livi_media_application::{ApplicationError, StoredLocalImage, SubmissionOutbox};
use livi_media_domain::{GeoPoint, RemoteImage};
use serde_json::json;
use tracing::info;

/// Writes submitted images into a folder, next to a `manifest.json` that
/// lists every image in slot order: remote references first, then the
/// written files, each with its capture location.
#[derive(Debug, Default)]
pub struct FsSubmissionOutbox;

impl SubmissionOutbox for FsSubmissionOutbox {
    fn write_files(
        &self,
        outbox_dir: &str,
        existing_remote: &[(RemoteImage, Option<GeoPoint>)],
        files: &[StoredLocalImage],
    ) -> Result<Vec<String>, ApplicationError> {
        let outbox = Path::new(outbox_dir);
        fs::create_dir_all(outbox).map_err(|error| ApplicationError::Io(error.to_string()))?;

        let mut manifest = Vec::with_capacity(existing_remote.len() + files.len());
        for (image, location) in existing_remote {
            let position = manifest.len();
            manifest.push(json!({
                "position": position,
                "kind": "remote",
                "url": image.as_str(),
                "location": location,
            }));
        }

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let path = outbox.join(&file.file_name);
            fs::write(&path, &file.bytes)
                .map_err(|error| ApplicationError::Io(format!("{}: {error}", path.display())))?;
            let position = manifest.len();
            manifest.push(json!({
                "position": position,
                "kind": "local",
                "file_name": file.file_name,
                "bytes": file.bytes.len(),
                "location": file.location,
            }));
            written.push(path.to_string_lossy().to_string());
        }

        let manifest = serde_json::to_vec_pretty(&json!({ "images": manifest }))
            .map_err(|error| ApplicationError::Encode(error.to_string()))?;
        fs::write(outbox.join("manifest.json"), manifest)
            .map_err(|error| ApplicationError::Io(error.to_string()))?;

        info!(
            outbox = outbox_dir,
            remote = existing_remote.len(),
            files = written.len(),
            "submission written"
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_files_and_manifest() {
        let dir = TempDir::new().expect("tempdir");
        let outbox_dir = dir.path().join("outbox");
        let files = vec![StoredLocalImage {
            file_name: "property-photo-1.jpg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            location: Some(GeoPoint {
                latitude: 1.5,
                longitude: -2.5,
            }),
        }];

        let written = FsSubmissionOutbox
            .write_files(
                &outbox_dir.to_string_lossy(),
                &[
                    (RemoteImage::new("https://cdn/b.jpg"), None),
                    (
                        RemoteImage::new("https://cdn/a.jpg"),
                        Some(GeoPoint {
                            latitude: 3.0,
                            longitude: 4.0,
                        }),
                    ),
                ],
                &files,
            )
            .expect("write");

        assert_eq!(written.len(), 1);
        assert_eq!(
            fs::read(outbox_dir.join("property-photo-1.jpg")).expect("read"),
            vec![0xFF, 0xD8, 0xFF, 0xD9]
        );
        let manifest: serde_json::Value = serde_json::from_slice(
            &fs::read(outbox_dir.join("manifest.json")).expect("manifest"),
        )
        .expect("json");
        let images = manifest["images"].as_array().expect("images");
        assert_eq!(images.len(), 3);
        assert_eq!(images[0]["kind"], "remote");
        assert_eq!(images[0]["url"], "https://cdn/b.jpg");
        assert_eq!(images[0]["location"], serde_json::Value::Null);
        assert_eq!(images[1]["url"], "https://cdn/a.jpg");
        assert_eq!(images[1]["location"]["longitude"], 4.0);
        assert_eq!(images[2]["position"], 2);
        assert_eq!(images[2]["kind"], "local");
        assert_eq!(images[2]["file_name"], "property-photo-1.jpg");
        assert_eq!(images[2]["location"]["latitude"], 1.5);
        assert_eq!(images[2]["bytes"], 4);
    }
}
