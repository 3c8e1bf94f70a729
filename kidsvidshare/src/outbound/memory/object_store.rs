//! In-memory [`ObjectStore`] keyed by object path.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{MediaUpload, ObjectStore, ObjectStoreError, StoredObject};

#[derive(Debug, Default)]
struct Buckets {
    videos: HashMap<String, Vec<u8>>,
    thumbnails: HashMap<String, Vec<u8>>,
}

fn object_path(prefix: &str, upload: &MediaUpload, owner: &UserId) -> String {
    let id = Uuid::new_v4();
    match upload.extension() {
        Some(ext) => format!("{prefix}/{owner}/{id}.{}", ext.to_ascii_lowercase()),
        None => format!("{prefix}/{owner}/{id}"),
    }
}

/// Object store kept in process memory.
///
/// Video URLs carry an opaque token and the requested lifetime as query
/// parameters; nothing enforces the expiry.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    base_url: Url,
    buckets: Mutex<Buckets>,
}

impl InMemoryObjectStore {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            buckets: Mutex::new(Buckets::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Buckets>, ObjectStoreError> {
        self.buckets
            .lock()
            .map_err(|_| ObjectStoreError::connection("object buckets lock poisoned"))
    }

    fn resolve(&self, path: &str) -> Result<Url, ObjectStoreError> {
        self.base_url
            .join(path)
            .map_err(|err| ObjectStoreError::signing(err.to_string()))
    }

    /// Whether a video is stored at `path`.
    pub fn has_video(&self, path: &str) -> Result<bool, ObjectStoreError> {
        Ok(self.lock()?.videos.contains_key(path))
    }

    /// Whether a thumbnail is stored at `path`.
    pub fn has_thumbnail(&self, path: &str) -> Result<bool, ObjectStoreError> {
        Ok(self.lock()?.thumbnails.contains_key(path))
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload_video(
        &self,
        upload: &MediaUpload,
        owner: &UserId,
    ) -> Result<StoredObject, ObjectStoreError> {
        let path = object_path("videos", upload, owner);
        self.lock()?
            .videos
            .insert(path.clone(), upload.bytes.clone());
        Ok(StoredObject {
            path,
            size_bytes: upload.size_bytes(),
        })
    }

    async fn upload_thumbnail(
        &self,
        upload: &MediaUpload,
        owner: &UserId,
    ) -> Result<StoredObject, ObjectStoreError> {
        let path = object_path("thumbnails", upload, owner);
        self.lock()?
            .thumbnails
            .insert(path.clone(), upload.bytes.clone());
        Ok(StoredObject {
            path,
            size_bytes: upload.size_bytes(),
        })
    }

    async fn signed_video_url(&self, path: &str, ttl: Duration) -> Result<Url, ObjectStoreError> {
        if !self.has_video(path)? {
            return Err(ObjectStoreError::not_found(path));
        }
        let mut url = self.resolve(path)?;
        url.query_pairs_mut()
            .append_pair("token", &Uuid::new_v4().simple().to_string())
            .append_pair("expires_in", &ttl.as_secs().to_string());
        Ok(url)
    }

    async fn public_thumbnail_url(&self, path: &str) -> Result<Url, ObjectStoreError> {
        if !self.has_thumbnail(path)? {
            return Err(ObjectStoreError::not_found(path));
        }
        self.resolve(path)
    }

    async fn delete_video(&self, path: &str) -> Result<(), ObjectStoreError> {
        self.lock()?
            .videos
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| ObjectStoreError::not_found(path))
    }

    async fn delete_thumbnail(&self, path: &str) -> Result<(), ObjectStoreError> {
        self.lock()?
            .thumbnails
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| ObjectStoreError::not_found(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryObjectStore {
        InMemoryObjectStore::new(Url::parse("https://media.test/").expect("valid base"))
    }

    #[rstest]
    #[tokio::test]
    async fn uploads_land_under_the_owner(store: InMemoryObjectStore) {
        let owner = UserId::random();
        let stored = store
            .upload_video(&MediaUpload::new("Clip.MP4", "video/mp4", vec![1; 32]), &owner)
            .await
            .expect("upload");
        assert!(stored.path.starts_with(&format!("videos/{owner}/")));
        assert!(stored.path.ends_with(".mp4"));
        assert_eq!(stored.size_bytes, 32);
        assert!(store.has_video(&stored.path).expect("lookup"));
    }

    #[rstest]
    #[tokio::test]
    async fn signed_urls_carry_the_lifetime(store: InMemoryObjectStore) {
        let stored = store
            .upload_video(
                &MediaUpload::new("clip.webm", "video/webm", vec![1; 4]),
                &UserId::random(),
            )
            .await
            .expect("upload");
        let url = store
            .signed_video_url(&stored.path, Duration::from_secs(90))
            .await
            .expect("signed");
        assert_eq!(url.host_str(), Some("media.test"));
        assert!(
            url.query_pairs()
                .any(|(key, value)| key == "expires_in" && value == "90")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn missing_objects_are_reported(store: InMemoryObjectStore) {
        let err = store
            .signed_video_url("videos/nobody/none.mp4", Duration::from_secs(1))
            .await
            .expect_err("nothing stored");
        assert!(matches!(err, ObjectStoreError::NotFound { .. }));
        let err = store
            .delete_thumbnail("thumbnails/nobody/none.jpg")
            .await
            .expect_err("nothing stored");
        assert!(matches!(err, ObjectStoreError::NotFound { .. }));
    }
}
