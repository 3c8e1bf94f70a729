//! Content access policy.
//!
//! Pure decision functions over a [`Viewer`] and a [`ContentItem`] or
//! [`Action`]. Nothing here performs I/O and nothing here fails: absent or
//! malformed inputs (missing age, unknown rating, unknown role) resolve to
//! the most restrictive answer. Denials are ordinary return values.

use std::fmt;

use tracing::{debug, warn};

use super::content::{ContentItem, ContentRating};
use super::user::UserProfile;
use super::viewer::{Capability, Role, Viewer};

/// Something a viewer may try to do besides watching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Post a comment under a video.
    Comment,
    /// Send a link to someone outside the family.
    Share,
    /// Save the video file for offline viewing.
    Download,
    /// Add a new video. Opt-in for children.
    Upload,
    /// An action name the policy does not know. Always denied.
    Unrecognised(String),
}

impl Action {
    /// Wire name of the action; unrecognised actions keep the raw input.
    ///
    /// # Examples
    /// ```
    /// use kidsvidshare::domain::Action;
    ///
    /// assert_eq!(Action::from("upload").as_str(), "upload");
    /// assert_eq!(Action::from("livestream").as_str(), "livestream");
    /// ```
    pub fn as_str(&self) -> &str {
        match self {
            Self::Comment => "comment",
            Self::Share => "share",
            Self::Download => "download",
            Self::Upload => "upload",
            Self::Unrecognised(raw) => raw.as_str(),
        }
    }

    /// Parental control consulted for children.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Self::Comment => Some(Capability::Comments),
            Self::Share => Some(Capability::Sharing),
            Self::Download => Some(Capability::Download),
            Self::Upload => Some(Capability::Upload),
            Self::Unrecognised(_) => None,
        }
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        match value {
            "comment" => Self::Comment,
            "share" => Self::Share,
            "download" => Self::Download,
            "upload" => Self::Upload,
            other => Self::Unrecognised(other.to_owned()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry point through which an item is being looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewContext {
    /// General browsing. Gated on publication for everyone.
    Gallery,
    /// The parent/admin review queue. Ignores publication and rating.
    ReviewQueue,
    /// The uploader's own list of uploads.
    OwnUploads,
}

/// Why a view was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    NotPublished,
    RatingAboveAge { required: u8, age: Option<u8> },
    ParentalGuidance,
    UnrecognisedRating,
    NotReviewer,
    NotOwner,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPublished => write!(f, "video has not been approved yet"),
            Self::RatingAboveAge {
                required,
                age: Some(age),
            } => write!(f, "video is rated {required}+ and viewer is {age}"),
            Self::RatingAboveAge { required, age: None } => {
                write!(f, "video is rated {required}+ and viewer age is unknown")
            }
            Self::ParentalGuidance => write!(f, "video requires parental guidance"),
            Self::UnrecognisedRating => write!(f, "video rating is not recognised"),
            Self::NotReviewer => write!(f, "only parents and admins may review videos"),
            Self::NotOwner => write!(f, "video belongs to another user"),
        }
    }
}

/// Outcome of [`evaluate_view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenialReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn denial_reason(&self) -> Option<&DenialReason> {
        match self {
            Self::Allow => None,
            Self::Deny(reason) => Some(reason),
        }
    }
}

/// Check a rating against the age ladder for a non-privileged viewer.
fn rating_decision(rating: &ContentRating, age: Option<u8>) -> AccessDecision {
    match rating.minimum_age() {
        Some(0) => AccessDecision::Allow,
        Some(required) => match age {
            Some(years) if years >= required => AccessDecision::Allow,
            _ => AccessDecision::Deny(DenialReason::RatingAboveAge { required, age }),
        },
        None if matches!(rating, ContentRating::ParentalGuidance) => {
            AccessDecision::Deny(DenialReason::ParentalGuidance)
        }
        None => AccessDecision::Deny(DenialReason::UnrecognisedRating),
    }
}

/// Decide whether `viewer` may see `item` through `context`.
pub fn evaluate_view(viewer: &Viewer, item: &ContentItem, context: ViewContext) -> AccessDecision {
    let decision = match context {
        ViewContext::Gallery if !item.is_published() => {
            AccessDecision::Deny(DenialReason::NotPublished)
        }
        ViewContext::Gallery if viewer.is_privileged() => AccessDecision::Allow,
        ViewContext::Gallery => rating_decision(
            item.content_rating(),
            viewer.age().map(|age| age.years()),
        ),
        ViewContext::ReviewQueue if viewer.is_privileged() => AccessDecision::Allow,
        ViewContext::ReviewQueue => AccessDecision::Deny(DenialReason::NotReviewer),
        ViewContext::OwnUploads
            if viewer.is_user(item.uploader_id()) || viewer.is_privileged() =>
        {
            AccessDecision::Allow
        }
        ViewContext::OwnUploads => AccessDecision::Deny(DenialReason::NotOwner),
    };
    if let AccessDecision::Deny(reason) = &decision {
        debug!(content_id = %item.id(), ?context, %reason, "view denied");
    }
    decision
}

/// Gallery entry point: published items only, rating ladder for children.
pub fn can_view_content(viewer: &Viewer, item: &ContentItem) -> bool {
    evaluate_view(viewer, item, ViewContext::Gallery).is_allowed()
}

/// Reviewer queue entry point: parents and admins see every item.
pub fn can_review_content(viewer: &Viewer, item: &ContentItem) -> bool {
    evaluate_view(viewer, item, ViewContext::ReviewQueue).is_allowed()
}

/// Uploaders always see their own items; parents and admins see all.
pub fn can_view_own_upload(viewer: &Viewer, item: &ContentItem) -> bool {
    evaluate_view(viewer, item, ViewContext::OwnUploads).is_allowed()
}

/// Whether `viewer` may see `item` through any entry point.
pub fn can_access(viewer: &Viewer, item: &ContentItem) -> bool {
    can_view_content(viewer, item) || can_view_own_upload(viewer, item)
}

/// Decide whether `viewer` may perform `action`.
///
/// Comments, sharing and downloads are opt-out for children; uploads are
/// opt-in and need `upload_enabled == Some(true)`.
pub fn can_perform_action(viewer: &Viewer, action: &Action) -> bool {
    let Some(capability) = action.capability() else {
        warn!(action = %action, "denying unrecognised action");
        return false;
    };
    let allowed = match viewer.role() {
        Some(Role::Parent | Role::Admin) => true,
        Some(Role::Child) => {
            let flag = viewer.parental_controls().flag(capability);
            match capability {
                Capability::Upload => flag == Some(true),
                Capability::Comments | Capability::Sharing | Capability::Download => {
                    flag != Some(false)
                }
            }
        }
        None => false,
    };
    debug!(action = %action, role = ?viewer.role(), allowed, "action evaluated");
    allowed
}

/// Whether `actor` may change the supervision settings of `child`.
///
/// Admins manage every child; parents manage the children linked to them.
pub fn can_manage_child(actor: &Viewer, child: &UserProfile) -> bool {
    match actor.role() {
        Some(Role::Admin) => true,
        Some(Role::Parent) => child
            .parent_id()
            .is_some_and(|parent_id| actor.is_user(parent_id)),
        Some(Role::Child) | None => false,
    }
}
