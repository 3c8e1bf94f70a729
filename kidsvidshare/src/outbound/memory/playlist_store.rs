//! In-memory [`PlaylistStore`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{PlaylistStore, PlaylistStoreError};
use crate::domain::{ContentId, Playlist, PlaylistEntry, PlaylistId, UserId};

/// Playlist store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPlaylistStore {
    playlists: Mutex<HashMap<PlaylistId, Playlist>>,
}

impl InMemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<PlaylistId, Playlist>>, PlaylistStoreError> {
        self.playlists
            .lock()
            .map_err(|_| PlaylistStoreError::query("playlist table lock poisoned"))
    }
}

#[async_trait]
impl PlaylistStore for InMemoryPlaylistStore {
    async fn create(&self, playlist: &Playlist) -> Result<(), PlaylistStoreError> {
        let mut playlists = self.lock()?;
        if playlists.contains_key(&playlist.id()) {
            return Err(PlaylistStoreError::duplicate(playlist.id().to_string()));
        }
        playlists.insert(playlist.id(), playlist.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PlaylistId) -> Result<Option<Playlist>, PlaylistStoreError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Playlist>, PlaylistStoreError> {
        let playlists = self.lock()?;
        let mut owned: Vec<Playlist> = playlists
            .values()
            .filter(|playlist| playlist.owner_id() == owner)
            .cloned()
            .collect();
        owned.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(owned)
    }

    async fn append_video(
        &self,
        id: &PlaylistId,
        content_id: &ContentId,
        added_at: DateTime<Utc>,
    ) -> Result<PlaylistEntry, PlaylistStoreError> {
        let mut playlists = self.lock()?;
        let playlist = playlists
            .get_mut(id)
            .ok_or_else(|| PlaylistStoreError::not_found(format!("playlist {id}")))?;
        playlist
            .append(*content_id, added_at)
            .cloned()
            .ok_or_else(|| PlaylistStoreError::duplicate(format!("video {content_id}")))
    }

    async fn remove_video(
        &self,
        id: &PlaylistId,
        content_id: &ContentId,
    ) -> Result<(), PlaylistStoreError> {
        let mut playlists = self.lock()?;
        let playlist = playlists
            .get_mut(id)
            .ok_or_else(|| PlaylistStoreError::not_found(format!("playlist {id}")))?;
        if playlist.remove(content_id) {
            Ok(())
        } else {
            Err(PlaylistStoreError::not_found(format!(
                "video {content_id} in playlist {id}"
            )))
        }
    }
}
