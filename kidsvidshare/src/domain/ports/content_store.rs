//! Port for video record persistence.
//!
//! The [`ContentStore`] keeps video rows, view events, reactions and viewer
//! reports. Writes
//! that change an existing row use optimistic concurrency: callers pass the
//! revision they read and adapters refuse the write when the stored row has
//! moved on.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::{
    ContentId, ContentItem, GalleryQuery, ModerationReport, Reaction, ReactionType, ReportId,
    ReviewStateKind, UserId, ViewProgress, ViewRecord,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by content store adapters.
    pub enum ContentStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "content store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "content store query failed: {message}",
        /// No row exists for the id.
        NotFound { id: String } =>
            "no record with id {id}",
        /// A row with the id already exists.
        Duplicate { id: String } =>
            "video {id} already exists",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
    }
}

/// Port for video records, views and reactions.
///
/// # Revision Semantics
///
/// - New items are created at revision 1.
/// - The caller bumps the revision before saving; the store does not.
/// - [`save_review`](Self::save_review) and
///   [`update_metadata`](Self::update_metadata) succeed only when the stored
///   revision equals `expected_revision`, otherwise they fail with
///   [`ContentStoreError::RevisionMismatch`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create(&self, item: &ContentItem) -> Result<(), ContentStoreError>;

    async fn find_by_id(&self, id: &ContentId) -> Result<Option<ContentItem>, ContentStoreError>;

    /// Persist a review transition with a compare-and-set on the revision.
    async fn save_review(
        &self,
        item: &ContentItem,
        expected_revision: u32,
    ) -> Result<(), ContentStoreError>;

    /// Persist edited metadata with a compare-and-set on the revision.
    async fn update_metadata(
        &self,
        item: &ContentItem,
        expected_revision: u32,
    ) -> Result<(), ContentStoreError>;

    /// Remove the row together with its views, reactions and reports.
    async fn delete(&self, id: &ContentId) -> Result<(), ContentStoreError>;

    /// Published items matching the query's filters, in the requested order.
    async fn list_published(
        &self,
        query: &GalleryQuery,
    ) -> Result<Page<ContentItem>, ContentStoreError>;

    /// Items in `state`, oldest first.
    async fn list_by_state(
        &self,
        state: ReviewStateKind,
    ) -> Result<Vec<ContentItem>, ContentStoreError>;

    /// Items uploaded by `uploader`, newest first.
    async fn list_by_uploader(
        &self,
        uploader: &UserId,
        state: Option<ReviewStateKind>,
    ) -> Result<Vec<ContentItem>, ContentStoreError>;

    /// Store a view event and bump the item's view count.
    async fn record_view(&self, view: &ViewRecord) -> Result<(), ContentStoreError>;

    /// Upsert watch progress for a viewer and item.
    async fn record_view_progress(&self, progress: &ViewProgress)
    -> Result<(), ContentStoreError>;

    async fn find_reaction(
        &self,
        content_id: &ContentId,
        user_id: &UserId,
    ) -> Result<Option<ReactionType>, ContentStoreError>;

    /// Insert or replace the viewer's reaction.
    async fn put_reaction(&self, reaction: &Reaction) -> Result<(), ContentStoreError>;

    async fn delete_reaction(
        &self,
        content_id: &ContentId,
        user_id: &UserId,
    ) -> Result<(), ContentStoreError>;

    /// Store a new viewer report. Fails with `NotFound` for unknown videos.
    async fn create_report(&self, report: &ModerationReport) -> Result<(), ContentStoreError>;

    async fn find_report(
        &self,
        id: &ReportId,
    ) -> Result<Option<ModerationReport>, ContentStoreError>;

    /// Unresolved reports, oldest first.
    async fn list_open_reports(&self) -> Result<Vec<ModerationReport>, ContentStoreError>;

    /// Replace a stored report, typically to record its resolution.
    async fn save_report(&self, report: &ModerationReport) -> Result<(), ContentStoreError>;
}

/// Fixture store that holds nothing and accepts every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureContentStore;

#[async_trait]
impl ContentStore for FixtureContentStore {
    async fn create(&self, _item: &ContentItem) -> Result<(), ContentStoreError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &ContentId) -> Result<Option<ContentItem>, ContentStoreError> {
        Ok(None)
    }

    async fn save_review(
        &self,
        _item: &ContentItem,
        _expected_revision: u32,
    ) -> Result<(), ContentStoreError> {
        Ok(())
    }

    async fn update_metadata(
        &self,
        _item: &ContentItem,
        _expected_revision: u32,
    ) -> Result<(), ContentStoreError> {
        Ok(())
    }

    async fn delete(&self, id: &ContentId) -> Result<(), ContentStoreError> {
        Err(ContentStoreError::not_found(id.to_string()))
    }

    async fn list_published(
        &self,
        query: &GalleryQuery,
    ) -> Result<Page<ContentItem>, ContentStoreError> {
        Ok(Page::empty(query.page))
    }

    async fn list_by_state(
        &self,
        _state: ReviewStateKind,
    ) -> Result<Vec<ContentItem>, ContentStoreError> {
        Ok(Vec::new())
    }

    async fn list_by_uploader(
        &self,
        _uploader: &UserId,
        _state: Option<ReviewStateKind>,
    ) -> Result<Vec<ContentItem>, ContentStoreError> {
        Ok(Vec::new())
    }

    async fn record_view(&self, _view: &ViewRecord) -> Result<(), ContentStoreError> {
        Ok(())
    }

    async fn record_view_progress(
        &self,
        _progress: &ViewProgress,
    ) -> Result<(), ContentStoreError> {
        Ok(())
    }

    async fn find_reaction(
        &self,
        _content_id: &ContentId,
        _user_id: &UserId,
    ) -> Result<Option<ReactionType>, ContentStoreError> {
        Ok(None)
    }

    async fn put_reaction(&self, _reaction: &Reaction) -> Result<(), ContentStoreError> {
        Ok(())
    }

    async fn delete_reaction(
        &self,
        _content_id: &ContentId,
        _user_id: &UserId,
    ) -> Result<(), ContentStoreError> {
        Ok(())
    }

    async fn create_report(&self, _report: &ModerationReport) -> Result<(), ContentStoreError> {
        Ok(())
    }

    async fn find_report(
        &self,
        _id: &ReportId,
    ) -> Result<Option<ModerationReport>, ContentStoreError> {
        Ok(None)
    }

    async fn list_open_reports(&self) -> Result<Vec<ModerationReport>, ContentStoreError> {
        Ok(Vec::new())
    }

    async fn save_report(&self, report: &ModerationReport) -> Result<(), ContentStoreError> {
        Err(ContentStoreError::not_found(report.id().to_string()))
    }
}
