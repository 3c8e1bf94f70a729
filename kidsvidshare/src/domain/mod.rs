//! Domain primitives, policy and services.
//!
//! Purpose: define strongly typed domain entities for the family video app,
//! the pure access policy and upload gating workflow that govern them, and
//! the services that orchestrate the ports. Nothing here knows about HTTP,
//! SQL or a particular storage SDK.
//!
//! Public surface:
//! - Error (alias to `error::Error`): service error payload.
//! - Viewer (alias to `viewer::Viewer`): the acting party for every call.
//! - ContentItem (alias to `content::ContentItem`): a video and its
//!   review state.
//! - ContentService, AccountService, SupervisionService, PlaylistService:
//!   orchestration over the [`ports`].

pub mod access_policy;
pub mod account_service;
pub mod auth;
pub mod content;
pub mod content_service;
pub mod engagement;
pub mod error;
pub mod gallery;
pub mod moderation;
pub mod playlist;
pub mod playlist_service;
pub mod ports;
pub mod supervision_service;
pub mod upload_gating;
pub mod user;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::access_policy::{AccessDecision, Action, DenialReason, ViewContext};
pub use self::account_service::AccountService;
pub use self::auth::{
    DEFAULT_CHILD_AGE, DEFAULT_SIGN_UP_ROLE, LoginCredentials, LoginValidationError,
    PASSWORD_MIN, Session, SignUpRequest,
};
pub use self::content::{
    ApprovalStatus, Category, ContentId, ContentItem, ContentRating, ContentValidationError,
    DESCRIPTION_MAX, ParseVideoMimeTypeError, PublicationStatus, ReviewState, ReviewStateKind,
    StoredMedia, TAG_MAX, TAGS_MAX, TITLE_MAX, VideoMetadata, VideoMetadataDraft, VideoMimeType,
};
pub use self::content_service::{ContentService, UploadRequest};
pub use self::engagement::{
    ParseReactionTypeError, Reaction, ReactionChange, ReactionType, ViewProgress, ViewRecord,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::gallery::{GalleryFilter, GalleryQuery, GallerySort, SortOrder};
pub use self::moderation::{
    ModerationReport, ParseReportReasonError, REPORT_DESCRIPTION_MAX, ReportId, ReportOutcome,
    ReportReason, ReportResolution, ReportValidationError,
};
pub use self::playlist::{
    PLAYLIST_DESCRIPTION_MAX, PLAYLIST_NAME_MAX, Playlist, PlaylistEntry, PlaylistId,
    PlaylistName, PlaylistValidationError,
};
pub use self::playlist_service::{NewPlaylist, PlaylistService};
pub use self::supervision_service::SupervisionService;
pub use self::upload_gating::{ReviewAction, WorkflowError};
pub use self::user::{DISPLAY_NAME_MAX, DisplayName, UserId, UserProfile, UserValidationError};
pub use self::viewer::{
    AGE_MAX, Age, Capability, ParentalControls, ParseRoleError, Role, Viewer,
    ViewerValidationError,
};

/// Convenient service result alias.
///
/// # Examples
/// ```
/// use kidsvidshare::domain::{DomainResult, Error};
///
/// fn load() -> DomainResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(load().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
