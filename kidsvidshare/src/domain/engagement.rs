//! View tracking and reactions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::ContentId;
use super::user::UserId;

/// One playback start, optionally attributed to a signed-in viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub content_id: ContentId,
    pub viewer_id: Option<UserId>,
    pub viewed_at: DateTime<Utc>,
}

/// How far a signed-in viewer got through a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewProgress {
    pub content_id: ContentId,
    pub viewer_id: UserId,
    pub watch_duration_seconds: u32,
    pub completed: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Emoji-style reaction a viewer can leave on a video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionType {
    #[default]
    Like,
    Love,
    Laugh,
    Wow,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Laugh => "laugh",
            Self::Wow => "wow",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`ReactionType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReactionTypeError {
    pub input: String,
}

impl fmt::Display for ParseReactionTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown reaction: {}", self.input)
    }
}

impl std::error::Error for ParseReactionTypeError {}

impl FromStr for ReactionType {
    type Err = ParseReactionTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "like" => Ok(Self::Like),
            "love" => Ok(Self::Love),
            "laugh" => Ok(Self::Laugh),
            "wow" => Ok(Self::Wow),
            _ => Err(ParseReactionTypeError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Stored reaction of one viewer on one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub content_id: ContentId,
    pub user_id: UserId,
    pub reaction_type: ReactionType,
}

/// What a toggle did to the stored reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "reactionType", rename_all = "snake_case")]
pub enum ReactionChange {
    Added(ReactionType),
    Updated(ReactionType),
    Removed(ReactionType),
}

impl ReactionChange {
    /// Decide the effect of toggling `requested` over `existing`.
    ///
    /// The same reaction twice removes it, a different one replaces it.
    pub fn resolve(existing: Option<ReactionType>, requested: ReactionType) -> Self {
        match existing {
            None => Self::Added(requested),
            Some(current) if current == requested => Self::Removed(requested),
            Some(_) => Self::Updated(requested),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for reaction toggling.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(None, ReactionType::Like, ReactionChange::Added(ReactionType::Like))]
    #[case(Some(ReactionType::Like), ReactionType::Like, ReactionChange::Removed(ReactionType::Like))]
    #[case(Some(ReactionType::Like), ReactionType::Wow, ReactionChange::Updated(ReactionType::Wow))]
    fn toggling_resolves_against_existing(
        #[case] existing: Option<ReactionType>,
        #[case] requested: ReactionType,
        #[case] expected: ReactionChange,
    ) {
        assert_eq!(ReactionChange::resolve(existing, requested), expected);
    }

    #[rstest]
    fn change_serialises_with_action_tag() {
        let value = serde_json::to_value(ReactionChange::Removed(ReactionType::Love))
            .expect("serialises");
        assert_eq!(value, json!({"action": "removed", "reactionType": "love"}));
    }

    #[rstest]
    fn unknown_reactions_fail_to_parse() {
        assert_eq!("like".parse::<ReactionType>(), Ok(ReactionType::Like));
        assert!("thumbs_down".parse::<ReactionType>().is_err());
    }
}
