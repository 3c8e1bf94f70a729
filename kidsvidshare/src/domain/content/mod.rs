//! Video records and their review lifecycle.
//!
//! The content store keeps two independent columns, `status` and
//! `approval_status`. Inside the core both collapse into a single
//! [`ReviewState`]; the pair is only a projection used on the wire, and
//! inconsistent pairs are rejected when a record is decoded.

mod enums;
mod validation;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

pub use self::enums::{
    ApprovalStatus, Category, ContentRating, ParseVideoMimeTypeError, PublicationStatus,
    VideoMimeType,
};
pub use self::validation::{
    DESCRIPTION_MAX, TAG_MAX, TAGS_MAX, TITLE_MAX, VideoMetadata, VideoMetadataDraft,
};

/// Validation errors raised while building content records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentValidationError {
    InvalidId,
    EmptyTitle,
    TitleTooLong { max: usize },
    DescriptionTooLong { max: usize },
    TooManyTags { max: usize },
    EmptyTag,
    TagTooLong { max: usize },
    DuplicateTag { tag: String },
    EmptyVideoPath,
    InconsistentReviewState {
        status: PublicationStatus,
        approval: ApprovalStatus,
    },
}

impl fmt::Display for ContentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "content id must be a valid UUID"),
            Self::EmptyTitle => write!(f, "please give your video a title"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::TooManyTags { max } => write!(f, "a video may have at most {max} tags"),
            Self::EmptyTag => write!(f, "tags must not be blank"),
            Self::TagTooLong { max } => write!(f, "tags must be at most {max} characters"),
            Self::DuplicateTag { tag } => write!(f, "duplicate tag: {tag}"),
            Self::EmptyVideoPath => write!(f, "stored video path must not be empty"),
            Self::InconsistentReviewState { status, approval } => write!(
                f,
                "status {status} cannot be combined with approval status {approval}"
            ),
        }
    }
}

impl std::error::Error for ContentValidationError {}

/// Stable identifier of a video record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(Uuid);

impl ContentId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ContentValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ContentValidationError::InvalidId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ContentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where an item sits in the upload gating workflow.
///
/// | state | status | approval status |
/// |---|---|---|
/// | `Draft` | pending | pending |
/// | `AwaitingReview` | processing | pending |
/// | `Published` | published | approved |
/// | `Rejected` | rejected | rejected |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    /// Created, not yet submitted for review.
    Draft,
    /// Submitted and waiting for a parent or admin.
    AwaitingReview,
    /// Approved and generally visible, subject to the rating rule.
    Published,
    /// Declined by a reviewer, optionally with a note for the uploader.
    Rejected { reason: Option<String> },
}

impl ReviewState {
    pub fn kind(&self) -> ReviewStateKind {
        match self {
            Self::Draft => ReviewStateKind::Draft,
            Self::AwaitingReview => ReviewStateKind::AwaitingReview,
            Self::Published => ReviewStateKind::Published,
            Self::Rejected { .. } => ReviewStateKind::Rejected,
        }
    }

    pub fn publication_status(&self) -> PublicationStatus {
        match self {
            Self::Draft => PublicationStatus::Pending,
            Self::AwaitingReview => PublicationStatus::Processing,
            Self::Published => PublicationStatus::Published,
            Self::Rejected { .. } => PublicationStatus::Rejected,
        }
    }

    pub fn approval_status(&self) -> ApprovalStatus {
        match self {
            Self::Draft | Self::AwaitingReview => ApprovalStatus::Pending,
            Self::Published => ApprovalStatus::Approved,
            Self::Rejected { .. } => ApprovalStatus::Rejected,
        }
    }

    /// Reviewer note, for rejected items.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason } => reason.as_deref(),
            _ => None,
        }
    }

    /// Rebuild the state from the stored column pair.
    ///
    /// `rejected` on either axis wins. Any other pair outside the projection
    /// table is reported as inconsistent.
    pub fn from_legacy(
        status: PublicationStatus,
        approval: ApprovalStatus,
        reason: Option<String>,
    ) -> Result<Self, ContentValidationError> {
        match (status, approval) {
            (PublicationStatus::Rejected, _) | (_, ApprovalStatus::Rejected) => {
                Ok(Self::Rejected { reason })
            }
            (PublicationStatus::Pending, ApprovalStatus::Pending) => Ok(Self::Draft),
            (PublicationStatus::Processing, ApprovalStatus::Pending) => Ok(Self::AwaitingReview),
            (PublicationStatus::Published, ApprovalStatus::Approved) => Ok(Self::Published),
            (status, approval) => {
                Err(ContentValidationError::InconsistentReviewState { status, approval })
            }
        }
    }
}

/// Fieldless view of [`ReviewState`] used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStateKind {
    Draft,
    AwaitingReview,
    Published,
    Rejected,
}

impl ReviewStateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::AwaitingReview => "awaiting_review",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location and technical details of the uploaded files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMedia {
    pub video_path: String,
    pub thumbnail_path: Option<String>,
    pub duration_seconds: u32,
    pub file_size_bytes: u64,
    pub mime_type: VideoMimeType,
}

/// A video record.
///
/// ## Invariants
/// - `metadata` satisfies the [`VideoMetadata`] rules.
/// - `revision` increases by one on every effective review or metadata
///   change and is the compare-and-set token for the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContentItemDto", into = "ContentItemDto")]
pub struct ContentItem {
    id: ContentId,
    uploader_id: UserId,
    metadata: VideoMetadata,
    media: StoredMedia,
    review: ReviewState,
    revision: u32,
    view_count: u64,
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// New, unsubmitted record at revision 1.
    pub fn draft(
        id: ContentId,
        uploader_id: UserId,
        metadata: VideoMetadata,
        media: StoredMedia,
        now: DateTime<Utc>,
    ) -> Result<Self, ContentValidationError> {
        if media.video_path.trim().is_empty() {
            return Err(ContentValidationError::EmptyVideoPath);
        }
        Ok(Self {
            id,
            uploader_id,
            metadata,
            media,
            review: ReviewState::Draft,
            revision: 1,
            view_count: 0,
            is_featured: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Override the review state, for records rebuilt by adapters and tests.
    pub fn with_review(mut self, review: ReviewState) -> Self {
        self.review = review;
        self
    }

    /// Override the view counter, for records rebuilt by adapters and tests.
    pub fn with_view_count(mut self, view_count: u64) -> Self {
        self.view_count = view_count;
        self
    }

    /// Mark the item as picked for the featured shelf.
    pub fn with_featured(mut self, is_featured: bool) -> Self {
        self.is_featured = is_featured;
        self
    }

    /// Stable record identifier.
    pub fn id(&self) -> ContentId {
        self.id
    }

    /// Account that uploaded the video.
    pub fn uploader_id(&self) -> &UserId {
        &self.uploader_id
    }

    /// Title, description, category, rating and tags.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Gallery category.
    pub fn category(&self) -> &Category {
        self.metadata.category()
    }

    /// Age rating checked by the access policy.
    pub fn content_rating(&self) -> &ContentRating {
        self.metadata.content_rating()
    }

    /// Object store paths and file details.
    pub fn media(&self) -> &StoredMedia {
        &self.media
    }

    /// Current position in the upload gating workflow.
    pub fn review(&self) -> &ReviewState {
        &self.review
    }

    /// Whether the item cleared review and is generally visible.
    pub fn is_published(&self) -> bool {
        matches!(self.review, ReviewState::Published)
    }

    /// Compare-and-set token for review and metadata writes.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use kidsvidshare::domain::{
    ///     Category, ContentId, ContentItem, ContentRating, StoredMedia, UserId, VideoMetadata,
    ///     VideoMimeType,
    /// };
    ///
    /// let metadata =
    ///     VideoMetadata::new("Kites", Category::Nature, ContentRating::AllAges).unwrap();
    /// let media = StoredMedia {
    ///     video_path: "videos/kites.mp4".to_owned(),
    ///     thumbnail_path: None,
    ///     duration_seconds: 30,
    ///     file_size_bytes: 1_024,
    ///     mime_type: VideoMimeType::Mp4,
    /// };
    /// let item =
    ///     ContentItem::draft(ContentId::random(), UserId::random(), metadata, media, Utc::now())
    ///         .unwrap();
    /// assert_eq!(item.revision(), 1);
    /// ```
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Playback starts recorded so far.
    pub fn view_count(&self) -> u64 {
        self.view_count
    }

    /// Whether the item appears on the featured shelf.
    pub fn is_featured(&self) -> bool {
        self.is_featured
    }

    /// Upload time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last effective review or metadata change.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn transition(&mut self, review: ReviewState, now: DateTime<Utc>) {
        self.review = review;
        self.touch(now);
    }

    /// Replace metadata and review state as a single revision.
    pub(crate) fn revise(
        &mut self,
        metadata: VideoMetadata,
        review: ReviewState,
        now: DateTime<Utc>,
    ) {
        self.metadata = metadata;
        self.review = review;
        self.touch(now);
    }

    /// Take the reviewable fields of `newer`: metadata, review state,
    /// revision and update time.
    ///
    /// Counters and curation flags stay as stored, since they change
    /// without a revision bump.
    pub(crate) fn adopt_revision(&mut self, newer: &ContentItem) {
        self.metadata = newer.metadata.clone();
        self.review = newer.review.clone();
        self.revision = newer.revision;
        self.updated_at = newer.updated_at;
    }

    pub(crate) fn record_view(&mut self) {
        self.view_count = self.view_count.saturating_add(1);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.revision = self.revision.saturating_add(1);
        self.updated_at = now;
    }
}

/// Wire shape of a video row, using the store's two status columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentItemDto {
    id: ContentId,
    uploader_id: UserId,
    #[serde(flatten)]
    metadata: VideoMetadataDraft,
    #[serde(flatten)]
    media: StoredMedia,
    status: PublicationStatus,
    approval_status: ApprovalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<String>,
    revision: u32,
    #[serde(default)]
    view_count: u64,
    #[serde(default)]
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ContentItem> for ContentItemDto {
    fn from(value: ContentItem) -> Self {
        let status = value.review.publication_status();
        let approval_status = value.review.approval_status();
        let rejection_reason = match value.review {
            ReviewState::Rejected { reason } => reason,
            _ => None,
        };
        Self {
            id: value.id,
            uploader_id: value.uploader_id,
            metadata: value.metadata.into(),
            media: value.media,
            status,
            approval_status,
            rejection_reason,
            revision: value.revision,
            view_count: value.view_count,
            is_featured: value.is_featured,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl TryFrom<ContentItemDto> for ContentItem {
    type Error = ContentValidationError;

    fn try_from(value: ContentItemDto) -> Result<Self, Self::Error> {
        let review =
            ReviewState::from_legacy(value.status, value.approval_status, value.rejection_reason)?;
        let metadata = VideoMetadata::try_from(value.metadata)?;
        if value.media.video_path.trim().is_empty() {
            return Err(ContentValidationError::EmptyVideoPath);
        }
        Ok(Self {
            id: value.id,
            uploader_id: value.uploader_id,
            metadata,
            media: value.media,
            review,
            revision: value.revision,
            view_count: value.view_count,
            is_featured: value.is_featured,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}
