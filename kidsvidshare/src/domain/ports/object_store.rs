//! Port for video and thumbnail object storage.
//!
//! Videos are private and served through short-lived signed URLs;
//! thumbnails are public.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by object storage adapters.
    pub enum ObjectStoreError {
        /// Storage service could not be reached.
        Connection { message: String } =>
            "object store connection failed: {message}",
        /// Upload was refused or interrupted.
        Upload { message: String } =>
            "object upload failed: {message}",
        /// No object exists at the path.
        NotFound { path: String } =>
            "no stored object at {path}",
        /// A URL could not be produced for the object.
        Signing { message: String } =>
            "object url could not be created: {message}",
    }
}

/// A file handed over by the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    /// MIME type as declared by the client.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Extension of the original file name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// Where an upload landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: String,
    pub size_bytes: u64,
}

/// Port for storing and addressing media files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a video under the owner's namespace.
    async fn upload_video(
        &self,
        upload: &MediaUpload,
        owner: &UserId,
    ) -> Result<StoredObject, ObjectStoreError>;

    async fn upload_thumbnail(
        &self,
        upload: &MediaUpload,
        owner: &UserId,
    ) -> Result<StoredObject, ObjectStoreError>;

    /// Time-limited URL granting playback of a private video.
    async fn signed_video_url(&self, path: &str, ttl: Duration) -> Result<Url, ObjectStoreError>;

    /// Public URL of a thumbnail.
    async fn public_thumbnail_url(&self, path: &str) -> Result<Url, ObjectStoreError>;

    async fn delete_video(&self, path: &str) -> Result<(), ObjectStoreError>;

    async fn delete_thumbnail(&self, path: &str) -> Result<(), ObjectStoreError>;
}

const FIXTURE_BASE_URL: &str = "https://media.fixture.invalid/";

/// Fixture store that accepts every upload and forgets it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureObjectStore;

impl FixtureObjectStore {
    fn url(path: &str) -> Result<Url, ObjectStoreError> {
        Url::parse(FIXTURE_BASE_URL)
            .and_then(|base| base.join(path))
            .map_err(|err| ObjectStoreError::signing(err.to_string()))
    }
}

#[async_trait]
impl ObjectStore for FixtureObjectStore {
    async fn upload_video(
        &self,
        upload: &MediaUpload,
        owner: &UserId,
    ) -> Result<StoredObject, ObjectStoreError> {
        Ok(StoredObject {
            path: format!("videos/{owner}/{}", upload.file_name),
            size_bytes: upload.size_bytes(),
        })
    }

    async fn upload_thumbnail(
        &self,
        upload: &MediaUpload,
        owner: &UserId,
    ) -> Result<StoredObject, ObjectStoreError> {
        Ok(StoredObject {
            path: format!("thumbnails/{owner}/{}", upload.file_name),
            size_bytes: upload.size_bytes(),
        })
    }

    async fn signed_video_url(&self, path: &str, _ttl: Duration) -> Result<Url, ObjectStoreError> {
        Self::url(path)
    }

    async fn public_thumbnail_url(&self, path: &str) -> Result<Url, ObjectStoreError> {
        Self::url(path)
    }

    async fn delete_video(&self, _path: &str) -> Result<(), ObjectStoreError> {
        Ok(())
    }

    async fn delete_thumbnail(&self, _path: &str) -> Result<(), ObjectStoreError> {
        Ok(())
    }
}
