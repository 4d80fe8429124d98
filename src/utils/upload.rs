//! Photo blobs on local disk, addressed by a public relative path such as
//! `/images/<uuid>_<name>`.

use std::path::{Component, Path, PathBuf};

use actix_web::web::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// An uploaded file, fully buffered from the multipart body.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct UploadManager {
    public_root: PathBuf,
    images_dir: String,
}

/// Keeps only the final component of a client-supplied filename.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        "photo".to_string()
    } else {
        base.to_string()
    }
}

impl UploadManager {
    pub fn new(public_root: impl Into<PathBuf>, images_dir: impl Into<String>) -> Self {
        Self {
            public_root: public_root.into(),
            images_dir: images_dir.into().trim_matches('/').to_string(),
        }
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.public_root.join(&self.images_dir)
    }

    /// Writes the upload under a fresh unique name and returns its public path.
    ///
    /// A name collision would overwrite the earlier blob; v4 UUIDs make that negligible.
    pub async fn save(&self, upload: &PhotoUpload) -> AppResult<String> {
        let dir = self.upload_dir();
        fs::create_dir_all(&dir).await.map_err(|e| {
            log::error!("Failed to create upload directory {}: {:?}", dir.display(), e);
            AppError::StorageError(format!("Failed to create upload directory: {}", e))
        })?;

        let unique_name = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(&upload.file_name));
        let file_path = dir.join(&unique_name);

        let mut file = fs::File::create(&file_path).await.map_err(|e| {
            log::error!("Failed to create {}: {:?}", file_path.display(), e);
            AppError::StorageError(format!("Failed to create file: {}", e))
        })?;
        let written = async {
            file.write_all(&upload.bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            log::error!("Failed to write {}: {:?}", file_path.display(), e);
            drop(file);
            let _ = fs::remove_file(&file_path).await;
            return Err(AppError::StorageError(format!("Failed to write file: {}", e)));
        }

        log::info!("Stored photo {} ({} bytes)", file_path.display(), upload.bytes.len());
        Ok(format!("/{}/{}", self.images_dir, unique_name))
    }

    /// Maps a stored public path onto the filesystem.
    ///
    /// Only a single file directly inside the images directory resolves.
    pub fn resolve(&self, relative_path: &str) -> Option<PathBuf> {
        let relative = Path::new(relative_path.trim_start_matches(['/', '\\']));
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        let [dir, file] = parts.as_slice() else {
            return None;
        };
        if *dir != self.images_dir.as_str() {
            return None;
        }
        Some(self.upload_dir().join(file))
    }

    /// Removes the blob behind a stored path. Returns whether a file was deleted.
    ///
    /// Never fails: a missing or unremovable blob must not block deleting its record.
    pub async fn delete(&self, relative_path: &str) -> bool {
        let Some(path) = self.resolve(relative_path) else {
            log::warn!("Refusing to delete photo outside the images directory: {:?}", relative_path);
            return false;
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                log::info!("Deleted photo {}", path.display());
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Photo {} already missing, nothing to delete", path.display());
                false
            }
            Err(e) => {
                log::error!("Failed to delete photo {}: {:?}", path.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, body: &'static [u8]) -> PhotoUpload {
        PhotoUpload {
            file_name: name.to_string(),
            bytes: Bytes::from_static(body),
        }
    }

    #[test]
    fn sanitizes_client_paths() {
        assert_eq!(sanitize_file_name("me.png"), "me.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\ann\\me.jpg"), "me.jpg");
        assert_eq!(sanitize_file_name(".."), "photo");
        assert_eq!(sanitize_file_name("dir/"), "photo");
    }

    #[tokio::test]
    async fn save_creates_directory_and_returns_public_path() {
        let root = tempfile::tempdir().unwrap();
        let manager = UploadManager::new(root.path(), "images");

        let path = manager.save(&upload("me.png", b"png")).await.unwrap();
        assert!(path.starts_with("/images/"));
        assert!(path.ends_with("_me.png"));

        let on_disk = manager.resolve(&path).unwrap();
        assert_eq!(fs::read(&on_disk).await.unwrap(), b"png");
    }

    #[tokio::test]
    async fn identical_names_get_distinct_blobs() {
        let root = tempfile::tempdir().unwrap();
        let manager = UploadManager::new(root.path(), "images");

        let first = manager.save(&upload("same.jpg", b"one")).await.unwrap();
        let second = manager.save(&upload("same.jpg", b"two")).await.unwrap();
        assert_ne!(first, second);

        assert_eq!(fs::read(manager.resolve(&first).unwrap()).await.unwrap(), b"one");
        assert_eq!(fs::read(manager.resolve(&second).unwrap()).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn delete_removes_file_and_tolerates_missing() {
        let root = tempfile::tempdir().unwrap();
        let manager = UploadManager::new(root.path(), "images");

        let path = manager.save(&upload("me.png", b"png")).await.unwrap();
        assert!(manager.delete(&path).await);
        assert!(!manager.resolve(&path).unwrap().exists());
        assert!(!manager.delete(&path).await);
    }

    #[tokio::test]
    async fn save_fails_when_root_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocked");
        std::fs::write(&blocker, b"x").unwrap();
        let manager = UploadManager::new(&blocker, "images");

        let err = manager.save(&upload("me.png", b"png")).await.unwrap_err();
        assert!(matches!(err, AppError::StorageError(_)));
    }

    #[test]
    fn resolve_rejects_traversal() {
        let manager = UploadManager::new("/srv/public", "images");
        assert_eq!(
            manager.resolve("/images/a.png"),
            Some(PathBuf::from("/srv/public/images/a.png"))
        );
        assert_eq!(manager.resolve("/images/../../secret"), None);
        assert_eq!(manager.resolve("/"), None);
        assert_eq!(manager.resolve("/images"), None);
    }

    #[test]
    fn resolve_stays_inside_images_dir() {
        let manager = UploadManager::new("/srv/public", "images");
        assert_eq!(manager.resolve("/index.html"), None);
        assert_eq!(manager.resolve("/css/site.css"), None);
        assert_eq!(manager.resolve("/images/sub/a.png"), None);
        assert_eq!(
            manager.resolve("images/./a.png"),
            Some(PathBuf::from("/srv/public/images/a.png"))
        );
    }

    #[tokio::test]
    async fn delete_leaves_files_outside_images_dir() {
        let root = tempfile::tempdir().unwrap();
        let manager = UploadManager::new(root.path(), "images");
        let page = root.path().join("index.html");
        std::fs::write(&page, b"<html>").unwrap();

        assert!(!manager.delete("/index.html").await);
        assert!(page.exists());
    }
}
