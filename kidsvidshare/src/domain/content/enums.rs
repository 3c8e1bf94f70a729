//! Content classification enums and parsers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Topic a video is filed under.
///
/// The set is open on the wire: values the core does not know parse to
/// [`Category::Other`] and receive no special treatment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Educational,
    Creative,
    Music,
    Stories,
    Games,
    Family,
    Sports,
    Cooking,
    Science,
    Nature,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Educational => "educational",
            Self::Creative => "creative",
            Self::Music => "music",
            Self::Stories => "stories",
            Self::Games => "games",
            Self::Family => "family",
            Self::Sports => "sports",
            Self::Cooking => "cooking",
            Self::Science => "science",
            Self::Nature => "nature",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Whether the category is one the product ships with.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        match value {
            "educational" => Self::Educational,
            "creative" => Self::Creative,
            "music" => Self::Music,
            "stories" => Self::Stories,
            "games" => Self::Games,
            "family" => Self::Family,
            "sports" => Self::Sports,
            "cooking" => Self::Cooking,
            "science" => Self::Science,
            "nature" => Self::Nature,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum-age classification attached to a video.
///
/// Ratings the core does not recognise are kept as
/// [`ContentRating::Unrecognised`] so they can be stored again unchanged, but
/// the access policy never lets a non-privileged viewer see them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentRating {
    AllAges,
    Ages3Plus,
    Ages6Plus,
    Ages12Plus,
    ParentalGuidance,
    Unrecognised(String),
}

impl ContentRating {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AllAges => "all_ages",
            Self::Ages3Plus => "ages_3_plus",
            Self::Ages6Plus => "ages_6_plus",
            Self::Ages12Plus => "ages_12_plus",
            Self::ParentalGuidance => "parental_guidance",
            Self::Unrecognised(raw) => raw.as_str(),
        }
    }

    /// Minimum age on the monotonic ladder.
    ///
    /// `None` for parental guidance (no child age satisfies it) and for
    /// unrecognised ratings.
    pub fn minimum_age(&self) -> Option<u8> {
        match self {
            Self::AllAges => Some(0),
            Self::Ages3Plus => Some(3),
            Self::Ages6Plus => Some(6),
            Self::Ages12Plus => Some(12),
            Self::ParentalGuidance | Self::Unrecognised(_) => None,
        }
    }

    /// Ratings on the ladder, most permissive first.
    pub fn ladder() -> [Self; 5] {
        [
            Self::AllAges,
            Self::Ages3Plus,
            Self::Ages6Plus,
            Self::Ages12Plus,
            Self::ParentalGuidance,
        ]
    }
}

impl From<&str> for ContentRating {
    fn from(value: &str) -> Self {
        match value {
            "all_ages" => Self::AllAges,
            "ages_3_plus" => Self::Ages3Plus,
            "ages_6_plus" => Self::Ages6Plus,
            "ages_12_plus" => Self::Ages12Plus,
            "parental_guidance" => Self::ParentalGuidance,
            other => Self::Unrecognised(other.to_owned()),
        }
    }
}

impl From<String> for ContentRating {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ContentRating> for String {
    fn from(value: ContentRating) -> Self {
        match value {
            ContentRating::Unrecognised(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ContentRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload pipeline status as stored by the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    Pending,
    Processing,
    Published,
    Rejected,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer decision as stored by the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container formats accepted for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VideoMimeType {
    Mp4,
    Webm,
    QuickTime,
    Ogg,
}

impl VideoMimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
            Self::QuickTime => "video/quicktime",
            Self::Ogg => "video/ogg",
        }
    }

    /// File extension used when naming stored objects.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::QuickTime => "mov",
            Self::Ogg => "ogv",
        }
    }
}

impl fmt::Display for VideoMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`VideoMimeType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVideoMimeTypeError {
    pub input: String,
}

impl fmt::Display for ParseVideoMimeTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported video type {}: only MP4, WebM, QuickTime and OGG are allowed",
            self.input
        )
    }
}

impl std::error::Error for ParseVideoMimeTypeError {}

impl FromStr for VideoMimeType {
    type Err = ParseVideoMimeTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "video/mp4" => Ok(Self::Mp4),
            "video/webm" => Ok(Self::Webm),
            "video/quicktime" => Ok(Self::QuickTime),
            "video/ogg" => Ok(Self::Ogg),
            _ => Err(ParseVideoMimeTypeError {
                input: value.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for VideoMimeType {
    type Error = ParseVideoMimeTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VideoMimeType> for String {
    fn from(value: VideoMimeType) -> Self {
        value.as_str().to_owned()
    }
}
