//! Content domain service.
//!
//! Orchestrates the object store and the content store around the access
//! policy and the upload gating workflow. Every method takes the acting
//! [`Viewer`] explicitly; nothing is cached between calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::access_policy::{
    Action, can_access, can_perform_action, can_review_content, can_view_content,
    can_view_own_upload,
};
use crate::domain::ports::{
    ContentStore, ContentStoreError, MediaUpload, ObjectStore, ObjectStoreError, StoredObject,
};
use crate::domain::upload_gating::{self, WorkflowError};
use crate::domain::{
    ContentId, ContentItem, Error, ErrorCode, GalleryFilter, GalleryQuery, GallerySort,
    ModerationReport, Reaction, ReactionChange, ReactionType, ReportId, ReportOutcome,
    ReportReason, ReviewState, ReviewStateKind, SortOrder, StoredMedia, UserId, VideoMetadata,
    VideoMetadataDraft, VideoMimeType, ViewProgress, ViewRecord, Viewer,
};
use crate::settings::ContentSettings;

/// Everything the upload form submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub video: MediaUpload,
    pub thumbnail: Option<MediaUpload>,
    pub metadata: VideoMetadataDraft,
    pub duration_seconds: u32,
}

pub(crate) fn map_store_error(error: ContentStoreError) -> Error {
    match error {
        ContentStoreError::Connection { message } => {
            Error::service_unavailable(format!("content store unavailable: {message}"))
        }
        ContentStoreError::Query { message } => {
            Error::internal(format!("content store error: {message}"))
        }
        ContentStoreError::NotFound { id } => Error::not_found(format!("video {id} not found")),
        ContentStoreError::Duplicate { id } => {
            Error::conflict(format!("video {id} already exists"))
        }
        ContentStoreError::RevisionMismatch { expected, actual } => {
            revision_conflict(expected, actual)
        }
    }
}

fn map_object_error(error: ObjectStoreError) -> Error {
    match error {
        ObjectStoreError::Connection { message } => {
            Error::service_unavailable(format!("object store unavailable: {message}"))
        }
        ObjectStoreError::NotFound { path } => {
            Error::not_found(format!("stored media missing at {path}"))
        }
        ObjectStoreError::Upload { message } | ObjectStoreError::Signing { message } => {
            Error::internal(format!("object store error: {message}"))
        }
    }
}

fn revision_conflict(expected: u32, actual: u32) -> Error {
    Error::conflict("revision mismatch").with_details(json!({
        "expectedRevision": expected,
        "actualRevision": actual,
        "code": "revision_mismatch",
    }))
}

fn not_found(id: &ContentId) -> Error {
    Error::not_found(format!("video {id} not found"))
}

fn require_user(viewer: &Viewer) -> Result<&UserId, Error> {
    viewer
        .user_id()
        .ok_or_else(|| Error::unauthorized("sign in to continue"))
}

/// Video lifecycle service.
#[derive(Clone)]
pub struct ContentService<O, S> {
    objects: Arc<O>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    settings: ContentSettings,
}

impl<O, S> ContentService<O, S> {
    pub fn new(
        objects: Arc<O>,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        settings: ContentSettings,
    ) -> Self {
        Self {
            objects,
            store,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &ContentSettings {
        &self.settings
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

impl<O, S> ContentService<O, S>
where
    O: ObjectStore,
    S: ContentStore,
{
    fn validate_upload(&self, request: &UploadRequest) -> Result<VideoMimeType, Error> {
        let size = request.video.size_bytes();
        if size == 0 {
            return Err(Error::invalid_request("video file is empty"));
        }
        let max = self.settings.max_upload_bytes();
        if size > max {
            return Err(
                Error::invalid_request("video file is too large").with_details(json!({
                    "maxBytes": max,
                    "actualBytes": size,
                })),
            );
        }
        request
            .video
            .content_type
            .parse::<VideoMimeType>()
            .map_err(|err| Error::invalid_request(err.to_string()))
    }

    async fn discard_objects(&self, video: &StoredObject, thumbnail: Option<&StoredObject>) {
        if let Err(err) = self.objects.delete_video(&video.path).await {
            warn!(path = %video.path, error = %err, "failed to clean up uploaded video");
        }
        let Some(thumbnail) = thumbnail else {
            return;
        };
        if let Err(err) = self.objects.delete_thumbnail(&thumbnail.path).await {
            warn!(path = %thumbnail.path, error = %err, "failed to clean up uploaded thumbnail");
        }
    }

    /// Store an upload and place it in the review queue.
    ///
    /// The file and metadata are validated before anything is stored. If
    /// persisting the record fails, the stored objects are removed again.
    pub async fn upload_video(
        &self,
        viewer: &Viewer,
        request: UploadRequest,
    ) -> Result<ContentItem, Error> {
        let uploader = require_user(viewer)?.clone();
        if !can_perform_action(viewer, &Action::Upload) {
            return Err(Error::forbidden("uploads are not enabled for this account"));
        }
        let mime_type = self.validate_upload(&request)?;
        let metadata = VideoMetadata::try_from(request.metadata)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let video = self
            .objects
            .upload_video(&request.video, &uploader)
            .await
            .map_err(map_object_error)?;
        let thumbnail = match &request.thumbnail {
            Some(upload) => match self.objects.upload_thumbnail(upload, &uploader).await {
                Ok(stored) => Some(stored),
                Err(err) => {
                    self.discard_objects(&video, None).await;
                    return Err(map_object_error(err));
                }
            },
            None => None,
        };

        let media = StoredMedia {
            video_path: video.path.clone(),
            thumbnail_path: thumbnail.as_ref().map(|stored| stored.path.clone()),
            duration_seconds: request.duration_seconds,
            file_size_bytes: video.size_bytes,
            mime_type,
        };
        let now = self.now();
        let submitted = ContentItem::draft(ContentId::random(), uploader, metadata, media, now)
            .map_err(|err| Error::invalid_request(err.to_string()))
            .and_then(|draft| upload_gating::submit(&draft, now).map_err(Error::from));
        let item = match submitted {
            Ok(item) => item,
            Err(err) => {
                self.discard_objects(&video, thumbnail.as_ref()).await;
                return Err(err);
            }
        };

        if let Err(err) = self.store.create(&item).await {
            self.discard_objects(&video, thumbnail.as_ref()).await;
            return Err(map_store_error(err));
        }
        info!(
            content_id = %item.id(),
            uploader_id = %item.uploader_id(),
            size_bytes = item.media().file_size_bytes,
            "video uploaded and awaiting review"
        );
        Ok(item)
    }

    async fn load(&self, id: &ContentId) -> Result<ContentItem, Error> {
        self.store
            .find_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn review<F>(
        &self,
        viewer: &Viewer,
        id: &ContentId,
        expected_revision: u32,
        transition: F,
    ) -> Result<ContentItem, Error>
    where
        F: FnOnce(&ContentItem, DateTime<Utc>) -> Result<ContentItem, WorkflowError>,
    {
        upload_gating::require_reviewer(viewer)?;
        let current = self.load(id).await?;
        if current.revision() != expected_revision {
            return Err(revision_conflict(expected_revision, current.revision()));
        }
        let next = transition(&current, self.now())?;
        if next == current {
            debug!(content_id = %id, "review action left item unchanged");
            return Ok(current);
        }
        self.store
            .save_review(&next, expected_revision)
            .await
            .map_err(map_store_error)?;
        Ok(next)
    }

    /// Publish an item waiting for review.
    pub async fn approve(
        &self,
        viewer: &Viewer,
        id: &ContentId,
        expected_revision: u32,
    ) -> Result<ContentItem, Error> {
        self.review(viewer, id, expected_revision, |item, now| {
            upload_gating::approve(item, viewer, now)
        })
        .await
    }

    /// Decline an item waiting for review, with an optional note.
    pub async fn reject(
        &self,
        viewer: &Viewer,
        id: &ContentId,
        expected_revision: u32,
        reason: Option<&str>,
    ) -> Result<ContentItem, Error> {
        self.review(viewer, id, expected_revision, |item, now| {
            upload_gating::reject(item, viewer, reason, now)
        })
        .await
    }

    /// Return a decided item to the review queue.
    pub async fn reopen(
        &self,
        viewer: &Viewer,
        id: &ContentId,
        expected_revision: u32,
    ) -> Result<ContentItem, Error> {
        self.review(viewer, id, expected_revision, |item, now| {
            upload_gating::mark_pending_again(item, viewer, now)
        })
        .await
    }

    /// One gallery page, without items the viewer may not see.
    ///
    /// `total_count` reflects the store's count before policy filtering.
    pub async fn gallery(
        &self,
        viewer: &Viewer,
        mut query: GalleryQuery,
    ) -> Result<Page<ContentItem>, Error> {
        query.page = self.settings.clamp_page(query.page);
        let page = self
            .store
            .list_published(&query)
            .await
            .map_err(map_store_error)?;
        let fetched = page.items().len();
        let page = page.retain(|item| can_view_content(viewer, item));
        debug!(
            fetched,
            visible = page.items().len(),
            role = ?viewer.role(),
            "gallery page filtered"
        );
        Ok(page)
    }

    /// Newest featured items visible to the viewer.
    pub async fn featured(
        &self,
        viewer: &Viewer,
        limit: Option<u32>,
    ) -> Result<Vec<ContentItem>, Error> {
        let limit = limit
            .unwrap_or_else(|| self.settings.featured_limit())
            .clamp(1, self.settings.max_page_size());
        let query = GalleryQuery::new(PageRequest::first(limit))
            .with_filter(GalleryFilter {
                featured_only: true,
                ..GalleryFilter::default()
            })
            .sorted_by(GallerySort::Newest, SortOrder::Desc);
        let page = self
            .store
            .list_published(&query)
            .await
            .map_err(map_store_error)?;
        Ok(page
            .into_items()
            .into_iter()
            .filter(|item| can_view_content(viewer, item))
            .collect())
    }

    /// Items waiting for a decision, oldest first.
    pub async fn review_queue(&self, viewer: &Viewer) -> Result<Vec<ContentItem>, Error> {
        if !viewer.is_privileged() {
            return Err(Error::forbidden("only parents and admins may review videos"));
        }
        let mut items = self
            .store
            .list_by_state(ReviewStateKind::AwaitingReview)
            .await
            .map_err(map_store_error)?;
        items.retain(|item| can_review_content(viewer, item));
        items.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(items)
    }

    /// The viewer's own uploads in every state, newest first.
    pub async fn own_uploads(
        &self,
        viewer: &Viewer,
        state: Option<ReviewStateKind>,
    ) -> Result<Vec<ContentItem>, Error> {
        let user_id = require_user(viewer)?;
        let mut items = self
            .store
            .list_by_uploader(user_id, state)
            .await
            .map_err(map_store_error)?;
        items.retain(|item| can_view_own_upload(viewer, item));
        Ok(items)
    }

    /// Load an item the viewer may see through some entry point.
    ///
    /// Items the viewer may not see are reported as missing.
    pub async fn get_video(&self, viewer: &Viewer, id: &ContentId) -> Result<ContentItem, Error> {
        let item = self.load(id).await?;
        if can_access(viewer, &item) {
            Ok(item)
        } else {
            debug!(content_id = %id, role = ?viewer.role(), "hiding inaccessible video");
            Err(not_found(id))
        }
    }

    /// Signed playback URL valid for the configured lifetime.
    pub async fn playback_url(&self, viewer: &Viewer, id: &ContentId) -> Result<Url, Error> {
        let item = self.get_video(viewer, id).await?;
        self.objects
            .signed_video_url(&item.media().video_path, self.settings.signed_url_ttl())
            .await
            .map_err(map_object_error)
    }

    /// Public thumbnail URL, if the upload came with a thumbnail.
    pub async fn thumbnail_url(
        &self,
        viewer: &Viewer,
        id: &ContentId,
    ) -> Result<Option<Url>, Error> {
        let item = self.get_video(viewer, id).await?;
        let Some(path) = item.media().thumbnail_path.as_deref() else {
            return Ok(None);
        };
        self.objects
            .public_thumbnail_url(path)
            .await
            .map(Some)
            .map_err(map_object_error)
    }

    /// Look up an item for view tracking, logging instead of failing.
    async fn trackable(&self, viewer: &Viewer, id: &ContentId) -> Option<ContentItem> {
        match self.get_video(viewer, id).await {
            Ok(item) => Some(item),
            Err(err) if err.code() == ErrorCode::NotFound => {
                debug!(content_id = %id, role = ?viewer.role(), "not tracking hidden video");
                None
            }
            Err(err) => {
                warn!(content_id = %id, error = %err, "failed to load video for tracking");
                None
            }
        }
    }

    /// Count a playback start on a video the viewer may watch.
    ///
    /// Hidden or missing videos are ignored. Store failures are logged,
    /// never returned.
    pub async fn record_view(&self, viewer: &Viewer, id: &ContentId) {
        if self.trackable(viewer, id).await.is_none() {
            return;
        }
        let view = ViewRecord {
            content_id: *id,
            viewer_id: viewer.user_id().cloned(),
            viewed_at: self.now(),
        };
        if let Err(err) = self.store.record_view(&view).await {
            warn!(content_id = %id, error = %err, "failed to record view");
        }
    }

    /// Save watch progress for signed-in viewers. Failures are logged.
    pub async fn record_view_progress(
        &self,
        viewer: &Viewer,
        id: &ContentId,
        watch_duration_seconds: u32,
        completed: bool,
    ) {
        let Some(user_id) = viewer.user_id() else {
            return;
        };
        if self.trackable(viewer, id).await.is_none() {
            return;
        }
        let progress = ViewProgress {
            content_id: *id,
            viewer_id: user_id.clone(),
            watch_duration_seconds,
            completed,
            recorded_at: self.now(),
        };
        if let Err(err) = self.store.record_view_progress(&progress).await {
            warn!(content_id = %id, error = %err, "failed to record view progress");
        }
    }

    /// The viewer's current reaction on an item.
    pub async fn reaction(
        &self,
        viewer: &Viewer,
        id: &ContentId,
    ) -> Result<Option<ReactionType>, Error> {
        let Some(user_id) = viewer.user_id() else {
            return Ok(None);
        };
        self.store
            .find_reaction(id, user_id)
            .await
            .map_err(map_store_error)
    }

    /// Add, switch or remove the viewer's reaction.
    pub async fn toggle_reaction(
        &self,
        viewer: &Viewer,
        id: &ContentId,
        reaction_type: ReactionType,
    ) -> Result<ReactionChange, Error> {
        let user_id = require_user(viewer)?.clone();
        self.get_video(viewer, id).await?;
        let existing = self
            .store
            .find_reaction(id, &user_id)
            .await
            .map_err(map_store_error)?;
        let change = ReactionChange::resolve(existing, reaction_type);
        let written = match change {
            ReactionChange::Added(_) | ReactionChange::Updated(_) => {
                let reaction = Reaction {
                    content_id: *id,
                    user_id,
                    reaction_type,
                };
                self.store.put_reaction(&reaction).await
            }
            ReactionChange::Removed(_) => self.store.delete_reaction(id, &user_id).await,
        };
        written.map_err(map_store_error)?;
        debug!(content_id = %id, ?change, "reaction toggled");
        Ok(change)
    }

    /// Flag a video the viewer can see for a parent or admin to look at.
    pub async fn report_video(
        &self,
        viewer: &Viewer,
        id: &ContentId,
        reason: ReportReason,
        description: Option<&str>,
    ) -> Result<ModerationReport, Error> {
        let reporter_id = require_user(viewer)?.clone();
        self.get_video(viewer, id).await?;
        let report = ModerationReport::open(*id, reporter_id, reason, description, self.now())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.store
            .create_report(&report)
            .await
            .map_err(map_store_error)?;
        info!(
            report_id = %report.id(),
            content_id = %id,
            reason = %reason,
            "video reported"
        );
        Ok(report)
    }

    /// Unresolved reports, oldest first.
    pub async fn open_reports(&self, viewer: &Viewer) -> Result<Vec<ModerationReport>, Error> {
        if !viewer.is_privileged() {
            return Err(Error::forbidden("only parents and admins may read reports"));
        }
        self.store
            .list_open_reports()
            .await
            .map_err(map_store_error)
    }

    /// Close a report.
    ///
    /// Upholding a report on a published video sends the video back to the
    /// review queue before the report is marked resolved.
    pub async fn resolve_report(
        &self,
        viewer: &Viewer,
        report_id: &ReportId,
        outcome: ReportOutcome,
    ) -> Result<ModerationReport, Error> {
        let reviewer_id = require_user(viewer)?.clone();
        upload_gating::require_reviewer(viewer)?;
        let report = self
            .store
            .find_report(report_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("report {report_id} not found")))?;
        if !report.is_open() {
            return Err(Error::conflict(format!("report {report_id} is already resolved")));
        }

        if outcome == ReportOutcome::Upheld {
            let item = self.load(&report.content_id()).await?;
            if item.is_published() {
                let next = upload_gating::mark_pending_again(&item, viewer, self.now())?;
                self.store
                    .save_review(&next, item.revision())
                    .await
                    .map_err(map_store_error)?;
                info!(content_id = %item.id(), "reported video returned to review queue");
            }
        }

        let resolved = report.resolve(reviewer_id, outcome, self.now());
        self.store
            .save_report(&resolved)
            .await
            .map_err(map_store_error)?;
        info!(report_id = %report_id, ?outcome, "report resolved");
        Ok(resolved)
    }

    fn require_editor(viewer: &Viewer, item: &ContentItem) -> Result<(), Error> {
        if viewer.is_user(item.uploader_id()) || viewer.is_privileged() {
            Ok(())
        } else {
            Err(Error::forbidden("only the uploader or a parent may change this video"))
        }
    }

    /// Replace an item's metadata.
    ///
    /// An edit by a non-privileged uploader to a published item sends it
    /// back to the review queue.
    pub async fn update_metadata(
        &self,
        viewer: &Viewer,
        id: &ContentId,
        expected_revision: u32,
        metadata: VideoMetadataDraft,
    ) -> Result<ContentItem, Error> {
        let current = self.get_video(viewer, id).await?;
        Self::require_editor(viewer, &current)?;
        let metadata = VideoMetadata::try_from(metadata)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if current.revision() != expected_revision {
            return Err(revision_conflict(expected_revision, current.revision()));
        }

        let needs_review = current.is_published() && !viewer.is_privileged();
        let review = if needs_review {
            ReviewState::AwaitingReview
        } else {
            current.review().clone()
        };
        let mut next = current;
        next.revise(metadata, review, self.now());
        self.store
            .update_metadata(&next, expected_revision)
            .await
            .map_err(map_store_error)?;
        if needs_review {
            info!(content_id = %id, "edited video returned to review queue");
        }
        Ok(next)
    }

    /// Remove an item and its stored media.
    pub async fn delete_video(&self, viewer: &Viewer, id: &ContentId) -> Result<(), Error> {
        let item = self.get_video(viewer, id).await?;
        Self::require_editor(viewer, &item)?;
        self.store.delete(id).await.map_err(map_store_error)?;
        let media = item.media();
        if let Err(err) = self.objects.delete_video(&media.video_path).await {
            warn!(path = %media.video_path, error = %err, "failed to delete stored video");
        }
        if let Some(path) = media.thumbnail_path.as_deref() {
            if let Err(err) = self.objects.delete_thumbnail(path).await {
                warn!(path, error = %err, "failed to delete stored thumbnail");
            }
        }
        info!(content_id = %id, "video deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "content_service_tests.rs"]
mod tests;
