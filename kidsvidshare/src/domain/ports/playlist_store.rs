//! Port for playlist persistence.
//!
//! Entry changes go through dedicated methods so adapters can assign
//! positions and enforce uniqueness in a single write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ContentId, Playlist, PlaylistEntry, PlaylistId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by playlist store adapters.
    pub enum PlaylistStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "playlist store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "playlist store query failed: {message}",
        /// No playlist, or no such entry in it.
        NotFound { id: String } =>
            "no playlist record for {id}",
        /// The playlist or entry already exists.
        Duplicate { id: String } =>
            "playlist record {id} already exists",
    }
}

/// Port for playlists and their entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn create(&self, playlist: &Playlist) -> Result<(), PlaylistStoreError>;

    async fn find_by_id(&self, id: &PlaylistId) -> Result<Option<Playlist>, PlaylistStoreError>;

    /// Playlists owned by `owner`, newest first.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Playlist>, PlaylistStoreError>;

    /// Add a video after the last entry.
    ///
    /// Fails with `Duplicate` when the video is already in the playlist.
    async fn append_video(
        &self,
        id: &PlaylistId,
        content_id: &ContentId,
        added_at: DateTime<Utc>,
    ) -> Result<PlaylistEntry, PlaylistStoreError>;

    /// Drop a video. Fails with `NotFound` when it was not in the playlist.
    async fn remove_video(
        &self,
        id: &PlaylistId,
        content_id: &ContentId,
    ) -> Result<(), PlaylistStoreError>;
}

/// Fixture store that holds no playlists.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePlaylistStore;

#[async_trait]
impl PlaylistStore for FixturePlaylistStore {
    async fn create(&self, _playlist: &Playlist) -> Result<(), PlaylistStoreError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &PlaylistId) -> Result<Option<Playlist>, PlaylistStoreError> {
        Ok(None)
    }

    async fn list_by_owner(&self, _owner: &UserId) -> Result<Vec<Playlist>, PlaylistStoreError> {
        Ok(Vec::new())
    }

    async fn append_video(
        &self,
        id: &PlaylistId,
        _content_id: &ContentId,
        _added_at: DateTime<Utc>,
    ) -> Result<PlaylistEntry, PlaylistStoreError> {
        Err(PlaylistStoreError::not_found(id.to_string()))
    }

    async fn remove_video(
        &self,
        id: &PlaylistId,
        _content_id: &ContentId,
    ) -> Result<(), PlaylistStoreError> {
        Err(PlaylistStoreError::not_found(id.to_string()))
    }
}
