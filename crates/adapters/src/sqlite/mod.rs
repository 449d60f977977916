mod queries;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use livi_media_application::{
    ApplicationError, Clock, DraftRepository, StoredDraft, StoredLocalImage,
};
use livi_media_domain::{GeoPoint, RemoteImage};
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::migrations::MIGRATIONS;
use queries::{LocalRow, RemoteRow};

/// Keeps the single in-progress listing draft in SQLite. Local image bytes
/// live as files under `image_dir`; the database records their order and
/// locations.
#[derive(Clone)]
pub struct SqliteDraftRepository {
    path: PathBuf,
    image_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl SqliteDraftRepository {
    pub fn new(path: String, image_dir: String, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: PathBuf::from(path),
            image_dir: PathBuf::from(image_dir),
            clock,
        }
    }

    fn open_connection(&self) -> Result<Connection, ApplicationError> {
        Connection::open(&self.path)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))
    }

    fn image_path(&self, file_name: &str) -> Result<PathBuf, ApplicationError> {
        let is_plain_name = Path::new(file_name)
            .file_name()
            .is_some_and(|name| name == file_name);
        if !is_plain_name {
            return Err(ApplicationError::InvalidInput(format!(
                "image file name must not contain a path: {file_name}"
            )));
        }
        Ok(self.image_dir.join(file_name))
    }

    fn remove_files<'a>(&self, paths: impl IntoIterator<Item = &'a str>) {
        for path in paths {
            if let Err(error) = fs::remove_file(path) {
                warn!(%error, path, "could not remove draft image");
            }
        }
    }
}

fn location_to_json(location: Option<GeoPoint>) -> Result<Option<String>, ApplicationError> {
    location
        .map(|point| serde_json::to_string(&point))
        .transpose()
        .map_err(|error| ApplicationError::Persistence(error.to_string()))
}

fn location_from_json(json: Option<&str>) -> Result<Option<GeoPoint>, ApplicationError> {
    json.map(serde_json::from_str::<GeoPoint>)
        .transpose()
        .map_err(|error| ApplicationError::Persistence(error.to_string()))
}

impl DraftRepository for SqliteDraftRepository {
    fn initialize(&self) -> Result<(), ApplicationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "draft path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Io(error.to_string()))?;
            }
        }
        fs::create_dir_all(&self.image_dir)
            .map_err(|error| ApplicationError::Io(error.to_string()))?;

        let conn = self.open_connection()?;
        conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        for migration in MIGRATIONS {
            conn.execute_batch(migration)
                .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        }

        Ok(())
    }

    fn load_draft(&self) -> Result<Option<StoredDraft>, ApplicationError> {
        let conn = self.open_connection()?;
        let Some(property_location_json) = queries::find_draft(&conn)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?
        else {
            return Ok(None);
        };

        let remote_rows = queries::list_remote_images(&conn)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        let local_rows = queries::list_local_images(&conn)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        let existing_remote = remote_rows
            .into_iter()
            .map(|row| {
                let location = location_from_json(row.location_json.as_deref())?;
                Ok((RemoteImage::new(row.url), location))
            })
            .collect::<Result<Vec<_>, ApplicationError>>()?;

        let new_images = local_rows
            .into_iter()
            .map(|row| {
                let bytes = fs::read(&row.file_path).map_err(|error| {
                    ApplicationError::Io(format!("{}: {error}", row.file_path))
                })?;
                Ok(StoredLocalImage {
                    file_name: row.file_name,
                    bytes,
                    location: location_from_json(row.location_json.as_deref())?,
                })
            })
            .collect::<Result<Vec<_>, ApplicationError>>()?;

        Ok(Some(StoredDraft {
            property_location: location_from_json(property_location_json.as_deref())?,
            existing_remote,
            new_images,
        }))
    }

    fn save_draft(&self, draft: &StoredDraft) -> Result<(), ApplicationError> {
        let mut conn = self.open_connection()?;
        let previous: Vec<String> = queries::list_local_images(&conn)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?
            .into_iter()
            .map(|row| row.file_path)
            .collect();

        fs::create_dir_all(&self.image_dir)
            .map_err(|error| ApplicationError::Io(error.to_string()))?;
        let mut local_rows = Vec::with_capacity(draft.new_images.len());
        for image in &draft.new_images {
            let path = self.image_path(&image.file_name)?;
            fs::write(&path, &image.bytes)
                .map_err(|error| ApplicationError::Io(error.to_string()))?;
            local_rows.push(LocalRow {
                file_name: image.file_name.clone(),
                file_path: path.to_string_lossy().to_string(),
                location_json: location_to_json(image.location)?,
            });
        }
        let remote_rows = draft
            .existing_remote
            .iter()
            .map(|(image, location)| {
                Ok(RemoteRow {
                    url: image.as_str().to_string(),
                    location_json: location_to_json(*location)?,
                })
            })
            .collect::<Result<Vec<_>, ApplicationError>>()?;

        let property_location_json = location_to_json(draft.property_location)?;
        let updated_at = self.clock.now_unix_millis().to_string();
        let tx = conn
            .transaction()
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        queries::upsert_draft(&tx, property_location_json.as_deref(), &updated_at)
            .and_then(|()| queries::replace_remote_images(&tx, &remote_rows))
            .and_then(|()| queries::replace_local_images(&tx, &local_rows))
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        tx.commit()
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        let kept: HashSet<&str> = local_rows.iter().map(|row| row.file_path.as_str()).collect();
        self.remove_files(
            previous
                .iter()
                .map(String::as_str)
                .filter(|path| !kept.contains(path)),
        );
        debug!(
            remote = remote_rows.len(),
            local = local_rows.len(),
            "draft saved"
        );
        Ok(())
    }

    fn clear_draft(&self) -> Result<(), ApplicationError> {
        let conn = self.open_connection()?;
        let paths: Vec<String> = queries::list_local_images(&conn)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?
            .into_iter()
            .map(|row| row.file_path)
            .collect();
        queries::delete_draft(&conn)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        self.remove_files(paths.iter().map(String::as_str));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedClock(u128);

    impl Clock for FixedClock {
        fn now_unix_millis(&self) -> u128 {
            self.0
        }
    }

    fn repository(dir: &TempDir) -> SqliteDraftRepository {
        let repo = SqliteDraftRepository::new(
            dir.path().join("draft.sqlite3").to_string_lossy().to_string(),
            dir.path().join("images").to_string_lossy().to_string(),
            Arc::new(FixedClock(1_700_000_000_000)),
        );
        repo.initialize().expect("initialize");
        repo
    }

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    fn local(name: &str, location: Option<GeoPoint>) -> StoredLocalImage {
        StoredLocalImage {
            file_name: name.to_string(),
            bytes: name.as_bytes().to_vec(),
            location,
        }
    }

    #[test]
    fn initialize_creates_schema() {
        let dir = TempDir::new().expect("tempdir");
        repository(&dir);

        let conn = Connection::open(dir.path().join("draft.sqlite3")).expect("open");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name LIKE 'draft%'",
                [],
                |row| row.get(0),
            )
            .expect("query");
        assert_eq!(count, 3);
    }

    #[test]
    fn save_stamps_the_draft_with_the_injected_clock() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);
        repo.save_draft(&StoredDraft::default()).expect("save");

        let conn = Connection::open(dir.path().join("draft.sqlite3")).expect("open");
        let updated_at: String = conn
            .query_row("SELECT updated_at FROM drafts WHERE id = 1", [], |row| {
                row.get(0)
            })
            .expect("query");
        assert_eq!(updated_at, "1700000000000");
    }

    #[test]
    fn missing_draft_loads_as_none() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);
        assert_eq!(repo.load_draft().expect("load"), None);
    }

    #[test]
    fn save_and_load_keeps_order_and_locations() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);
        let draft = StoredDraft {
            property_location: Some(point(-33.92, 18.42)),
            existing_remote: vec![
                (RemoteImage::new("https://cdn/b.jpg"), Some(point(1.0, 2.0))),
                (RemoteImage::new("https://cdn/a.jpg"), None),
            ],
            new_images: vec![
                local("property-photo-2.jpg", None),
                local("property-photo-1.jpg", Some(point(3.0, 4.0))),
            ],
        };

        repo.save_draft(&draft).expect("save");

        assert_eq!(repo.load_draft().expect("load"), Some(draft));
    }

    #[test]
    fn saving_a_smaller_draft_removes_dropped_files() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);
        let mut draft = StoredDraft {
            new_images: vec![local("one.jpg", None), local("two.jpg", None)],
            ..StoredDraft::default()
        };
        repo.save_draft(&draft).expect("save");

        draft.new_images.remove(0);
        repo.save_draft(&draft).expect("save again");

        assert!(!dir.path().join("images/one.jpg").exists());
        assert!(dir.path().join("images/two.jpg").exists());
    }

    #[test]
    fn clear_removes_rows_and_files() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);
        repo.save_draft(&StoredDraft {
            new_images: vec![local("one.jpg", None)],
            ..StoredDraft::default()
        })
        .expect("save");

        repo.clear_draft().expect("clear");

        assert_eq!(repo.load_draft().expect("load"), None);
        assert!(!dir.path().join("images/one.jpg").exists());
    }

    #[test]
    fn file_names_with_paths_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir);
        let error = repo
            .save_draft(&StoredDraft {
                new_images: vec![local("../escape.jpg", None)],
                ..StoredDraft::default()
            })
            .expect_err("path");
        assert!(matches!(error, ApplicationError::InvalidInput(_)));
    }
}
