//! Viewer reports about videos that slipped through review.
//!
//! Any signed-in viewer who can see a video may report it. Open reports sit
//! in the parental review panel until a parent or admin resolves them. An
//! upheld report pulls a published video back into the review queue; a
//! dismissed one leaves it alone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::ContentId;
use super::user::UserId;

/// Longest accepted free-text note on a report, in characters.
pub const REPORT_DESCRIPTION_MAX: usize = 500;

/// Stable identifier of a moderation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for ReportId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a viewer flagged a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    /// Not suitable for the rating it carries.
    Inappropriate,
    /// Frightening for young viewers.
    Scary,
    /// Unkind to another child.
    Bullying,
    /// Shows a name, address, school or face that should stay private.
    PersonalInfo,
    Spam,
    Other,
}

impl ReportReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inappropriate => "inappropriate",
            Self::Scary => "scary",
            Self::Bullying => "bullying",
            Self::PersonalInfo => "personal_info",
            Self::Spam => "spam",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ReportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`ReportReason`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReportReasonError {
    pub input: String,
}

impl fmt::Display for ParseReportReasonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown report reason: {}", self.input)
    }
}

impl std::error::Error for ParseReportReasonError {}

impl FromStr for ReportReason {
    type Err = ParseReportReasonError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "inappropriate" => Ok(Self::Inappropriate),
            "scary" => Ok(Self::Scary),
            "bullying" => Ok(Self::Bullying),
            "personal_info" => Ok(Self::PersonalInfo),
            "spam" => Ok(Self::Spam),
            "other" => Ok(Self::Other),
            _ => Err(ParseReportReasonError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Decision a reviewer records on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOutcome {
    /// The video is fine as it is.
    Dismissed,
    /// The report is valid; the video goes back to review.
    Upheld,
}

/// Who closed a report, how, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResolution {
    pub reviewer_id: UserId,
    pub outcome: ReportOutcome,
    pub resolved_at: DateTime<Utc>,
}

/// Validation errors for new reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportValidationError {
    DescriptionTooLong { max: usize },
}

impl fmt::Display for ReportValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DescriptionTooLong { max } => {
                write!(f, "report notes must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for ReportValidationError {}

/// A viewer's report on one video.
///
/// ## Invariants
/// - `description` is trimmed, never blank, and at most
///   [`REPORT_DESCRIPTION_MAX`] characters.
/// - A report is open until it carries a [`ReportResolution`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationReport {
    id: ReportId,
    content_id: ContentId,
    reporter_id: UserId,
    reason: ReportReason,
    description: Option<String>,
    created_at: DateTime<Utc>,
    resolution: Option<ReportResolution>,
}

impl ModerationReport {
    /// Open a new report. Blank notes are stored as `None`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use kidsvidshare::domain::{ContentId, ModerationReport, ReportReason, UserId};
    ///
    /// let report = ModerationReport::open(
    ///     ContentId::random(),
    ///     UserId::random(),
    ///     ReportReason::Scary,
    ///     Some("   "),
    ///     Utc::now(),
    /// )
    /// .unwrap();
    /// assert!(report.is_open());
    /// assert_eq!(report.description(), None);
    /// ```
    pub fn open(
        content_id: ContentId,
        reporter_id: UserId,
        reason: ReportReason,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ReportValidationError> {
        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);
        if description
            .as_deref()
            .is_some_and(|text| text.chars().count() > REPORT_DESCRIPTION_MAX)
        {
            return Err(ReportValidationError::DescriptionTooLong {
                max: REPORT_DESCRIPTION_MAX,
            });
        }
        Ok(Self {
            id: ReportId::random(),
            content_id,
            reporter_id,
            reason,
            description,
            created_at: now,
            resolution: None,
        })
    }

    pub fn id(&self) -> ReportId {
        self.id
    }

    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    pub fn reporter_id(&self) -> &UserId {
        &self.reporter_id
    }

    pub fn reason(&self) -> ReportReason {
        self.reason
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn resolution(&self) -> Option<&ReportResolution> {
        self.resolution.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.resolution.is_none()
    }

    /// Close the report. Callers check [`is_open`](Self::is_open) first.
    pub(crate) fn resolve(
        &self,
        reviewer_id: UserId,
        outcome: ReportOutcome,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            resolution: Some(ReportResolution {
                reviewer_id,
                outcome,
                resolved_at: now,
            }),
            ..self.clone()
        }
    }
}
