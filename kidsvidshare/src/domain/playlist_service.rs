//! Playlist domain service.
//!
//! Playlists are owned by one signed-in user. Only published videos the
//! owner may watch can be added, and listing a playlist filters its videos
//! again for whoever is looking.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use crate::domain::access_policy::can_view_content;
use crate::domain::content_service::map_store_error;
use crate::domain::ports::{ContentStore, PlaylistStore, PlaylistStoreError};
use crate::domain::{
    ContentId, ContentItem, Error, Playlist, PlaylistEntry, PlaylistId, PlaylistName, UserId,
    Viewer,
};

/// Fields accepted when creating a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub name: String,
    pub description: Option<String>,
    /// Private unless set.
    pub is_public: bool,
}

fn map_playlist_error(error: PlaylistStoreError) -> Error {
    match error {
        PlaylistStoreError::Connection { message } => {
            Error::service_unavailable(format!("playlist store unavailable: {message}"))
        }
        PlaylistStoreError::Query { message } => {
            Error::internal(format!("playlist store error: {message}"))
        }
        PlaylistStoreError::NotFound { id } => Error::not_found(format!("{id} not found")),
        PlaylistStoreError::Duplicate { id } => {
            Error::conflict(format!("{id} is already in the playlist"))
        }
    }
}

fn require_user(viewer: &Viewer) -> Result<&UserId, Error> {
    viewer
        .user_id()
        .ok_or_else(|| Error::unauthorized("sign in to use playlists"))
}

fn playlist_not_found(id: &PlaylistId) -> Error {
    Error::not_found(format!("playlist {id} not found"))
}

/// Playlist management over the playlist and content stores.
#[derive(Clone)]
pub struct PlaylistService<P, S> {
    playlists: Arc<P>,
    content: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<P, S> PlaylistService<P, S> {
    pub fn new(playlists: Arc<P>, content: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            playlists,
            content,
            clock,
        }
    }
}

impl<P, S> PlaylistService<P, S>
where
    P: PlaylistStore,
    S: ContentStore,
{
    /// Load a playlist the viewer may see: their own, or any public one.
    async fn visible_playlist(&self, viewer: &Viewer, id: &PlaylistId) -> Result<Playlist, Error> {
        let playlist = self
            .playlists
            .find_by_id(id)
            .await
            .map_err(map_playlist_error)?
            .ok_or_else(|| playlist_not_found(id))?;
        if playlist.is_public() || viewer.is_user(playlist.owner_id()) {
            Ok(playlist)
        } else {
            Err(playlist_not_found(id))
        }
    }

    async fn owned_playlist(&self, viewer: &Viewer, id: &PlaylistId) -> Result<Playlist, Error> {
        require_user(viewer)?;
        let playlist = self.visible_playlist(viewer, id).await?;
        if viewer.is_user(playlist.owner_id()) {
            Ok(playlist)
        } else {
            Err(Error::forbidden("only the owner may change this playlist"))
        }
    }

    /// Start an empty playlist for the viewer.
    pub async fn create_playlist(
        &self,
        viewer: &Viewer,
        request: NewPlaylist,
    ) -> Result<Playlist, Error> {
        let owner = require_user(viewer)?.clone();
        let name = PlaylistName::new(&request.name)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let playlist = Playlist::new(
            owner,
            name,
            request.description.as_deref(),
            request.is_public,
            self.clock.utc(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.playlists
            .create(&playlist)
            .await
            .map_err(map_playlist_error)?;
        info!(
            playlist_id = %playlist.id(),
            owner_id = %playlist.owner_id(),
            is_public = playlist.is_public(),
            "playlist created"
        );
        Ok(playlist)
    }

    /// The viewer's own playlists, newest first.
    pub async fn playlists_for(&self, viewer: &Viewer) -> Result<Vec<Playlist>, Error> {
        let owner = require_user(viewer)?;
        self.playlists
            .list_by_owner(owner)
            .await
            .map_err(map_playlist_error)
    }

    /// Append a video the owner may watch.
    pub async fn add_video(
        &self,
        viewer: &Viewer,
        id: &PlaylistId,
        content_id: &ContentId,
    ) -> Result<PlaylistEntry, Error> {
        self.owned_playlist(viewer, id).await?;
        let video = self
            .content
            .find_by_id(content_id)
            .await
            .map_err(map_store_error)?
            .filter(|item| can_view_content(viewer, item))
            .ok_or_else(|| Error::not_found(format!("video {content_id} not found")))?;
        let entry = self
            .playlists
            .append_video(id, &video.id(), self.clock.utc())
            .await
            .map_err(map_playlist_error)?;
        debug!(
            playlist_id = %id,
            content_id = %content_id,
            position = entry.position,
            "video added to playlist"
        );
        Ok(entry)
    }

    pub async fn remove_video(
        &self,
        viewer: &Viewer,
        id: &PlaylistId,
        content_id: &ContentId,
    ) -> Result<(), Error> {
        self.owned_playlist(viewer, id).await?;
        self.playlists
            .remove_video(id, content_id)
            .await
            .map_err(map_playlist_error)?;
        debug!(playlist_id = %id, content_id = %content_id, "video removed from playlist");
        Ok(())
    }

    /// Videos in play order, skipping any the viewer may not see or that
    /// no longer exist.
    pub async fn playlist_videos(
        &self,
        viewer: &Viewer,
        id: &PlaylistId,
    ) -> Result<Vec<ContentItem>, Error> {
        let playlist = self.visible_playlist(viewer, id).await?;
        let mut videos = Vec::with_capacity(playlist.entries().len());
        for entry in playlist.entries() {
            let found = self
                .content
                .find_by_id(&entry.content_id)
                .await
                .map_err(map_store_error)?;
            match found {
                Some(item) if can_view_content(viewer, &item) => videos.push(item),
                _ => debug!(
                    playlist_id = %id,
                    content_id = %entry.content_id,
                    "skipping playlist entry hidden from viewer"
                ),
            }
        }
        Ok(videos)
    }
}

#[cfg(test)]
#[path = "playlist_service_tests.rs"]
mod tests;
