//! Viewer playlists.
//!
//! A playlist belongs to one signed-in user and holds video ids in a fixed
//! order. Private playlists are visible to their owner only; public ones to
//! anyone, though the videos inside are still filtered by the access policy
//! for whoever is looking.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::ContentId;
use super::user::UserId;

/// Longest accepted playlist name, in characters.
pub const PLAYLIST_NAME_MAX: usize = 100;
/// Longest accepted playlist description, in characters.
pub const PLAYLIST_DESCRIPTION_MAX: usize = 500;

/// Validation errors for playlist fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistValidationError {
    EmptyName,
    NameTooLong { max: usize },
    DescriptionTooLong { max: usize },
}

impl fmt::Display for PlaylistValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "playlist name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "playlist name must be at most {max} characters")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "playlist description must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for PlaylistValidationError {}

/// Stable identifier of a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(Uuid);

impl PlaylistId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for PlaylistId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed, non-empty playlist name.
///
/// # Examples
/// ```
/// use kidsvidshare::domain::PlaylistName;
///
/// let name = PlaylistName::new("  Bedtime  ").unwrap();
/// assert_eq!(name.as_ref(), "Bedtime");
/// assert!(PlaylistName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaylistName(String);

impl PlaylistName {
    pub fn new(name: impl AsRef<str>) -> Result<Self, PlaylistValidationError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(PlaylistValidationError::EmptyName);
        }
        if name.chars().count() > PLAYLIST_NAME_MAX {
            return Err(PlaylistValidationError::NameTooLong {
                max: PLAYLIST_NAME_MAX,
            });
        }
        Ok(Self(name.to_owned()))
    }
}

impl AsRef<str> for PlaylistName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlaylistName {
    type Error = PlaylistValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlaylistName> for String {
    fn from(value: PlaylistName) -> Self {
        value.0
    }
}

/// One video in a playlist. Positions start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub content_id: ContentId,
    pub position: u32,
    pub added_at: DateTime<Utc>,
}

/// A named, ordered list of videos.
///
/// ## Invariants
/// - `entries` are sorted by `position` and hold each video at most once.
/// - `description` is trimmed and never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    id: PlaylistId,
    owner_id: UserId,
    name: PlaylistName,
    description: Option<String>,
    is_public: bool,
    entries: Vec<PlaylistEntry>,
    created_at: DateTime<Utc>,
}

impl Playlist {
    /// Start an empty playlist.
    pub fn new(
        owner_id: UserId,
        name: PlaylistName,
        description: Option<&str>,
        is_public: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, PlaylistValidationError> {
        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);
        if description
            .as_deref()
            .is_some_and(|text| text.chars().count() > PLAYLIST_DESCRIPTION_MAX)
        {
            return Err(PlaylistValidationError::DescriptionTooLong {
                max: PLAYLIST_DESCRIPTION_MAX,
            });
        }
        Ok(Self {
            id: PlaylistId::random(),
            owner_id,
            name,
            description,
            is_public,
            entries: Vec::new(),
            created_at: now,
        })
    }

    pub fn id(&self) -> PlaylistId {
        self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn name(&self) -> &PlaylistName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// Entries in play order.
    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn contains(&self, content_id: &ContentId) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.content_id == *content_id)
    }

    /// Append a video after the current last position.
    ///
    /// Returns `None` when the video is already in the playlist.
    pub fn append(&mut self, content_id: ContentId, now: DateTime<Utc>) -> Option<&PlaylistEntry> {
        if self.contains(&content_id) {
            return None;
        }
        let position = self
            .entries
            .last()
            .map_or(1, |entry| entry.position.saturating_add(1));
        self.entries.push(PlaylistEntry {
            content_id,
            position,
            added_at: now,
        });
        self.entries.last()
    }

    /// Drop a video. Remaining positions are left as they were.
    pub fn remove(&mut self, content_id: &ContentId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.content_id != *content_id);
        self.entries.len() != before
    }
}
