//! Upload form metadata and its validation rules.

use serde::{Deserialize, Serialize};

use super::ContentValidationError;
use super::enums::{Category, ContentRating};

/// Longest accepted title, in characters.
pub const TITLE_MAX: usize = 100;
/// Longest accepted description, in characters.
pub const DESCRIPTION_MAX: usize = 500;
/// Most tags a video may carry.
pub const TAGS_MAX: usize = 10;
/// Longest accepted tag, in characters.
pub const TAG_MAX: usize = 30;

/// Unvalidated metadata as submitted by the upload form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadataDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub content_rating: ContentRating,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validated descriptive metadata of a video.
///
/// ## Invariants
/// - `title` is trimmed and holds 1..=[`TITLE_MAX`] characters.
/// - `description` is trimmed and holds at most [`DESCRIPTION_MAX`]
///   characters.
/// - `tags` are trimmed, lower-cased, unique and at most [`TAGS_MAX`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VideoMetadataDraft", into = "VideoMetadataDraft")]
pub struct VideoMetadata {
    title: String,
    description: String,
    category: Category,
    content_rating: ContentRating,
    tags: Vec<String>,
}

impl VideoMetadata {
    pub fn new(
        title: impl Into<String>,
        category: Category,
        content_rating: ContentRating,
    ) -> Result<Self, ContentValidationError> {
        Self::try_from(VideoMetadataDraft {
            title: title.into(),
            description: String::new(),
            category,
            content_rating,
            tags: Vec::new(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn content_rating(&self) -> &ContentRating {
        &self.content_rating
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

fn validate_title(raw: &str) -> Result<String, ContentValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ContentValidationError::EmptyTitle);
    }
    if title.chars().count() > TITLE_MAX {
        return Err(ContentValidationError::TitleTooLong { max: TITLE_MAX });
    }
    Ok(title.to_owned())
}

fn validate_description(raw: &str) -> Result<String, ContentValidationError> {
    let description = raw.trim();
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(ContentValidationError::DescriptionTooLong {
            max: DESCRIPTION_MAX,
        });
    }
    Ok(description.to_owned())
}

fn validate_tags(raw: Vec<String>) -> Result<Vec<String>, ContentValidationError> {
    if raw.len() > TAGS_MAX {
        return Err(ContentValidationError::TooManyTags { max: TAGS_MAX });
    }
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return Err(ContentValidationError::EmptyTag);
        }
        if tag.chars().count() > TAG_MAX {
            return Err(ContentValidationError::TagTooLong { max: TAG_MAX });
        }
        if tags.contains(&tag) {
            return Err(ContentValidationError::DuplicateTag { tag });
        }
        tags.push(tag);
    }
    Ok(tags)
}

impl TryFrom<VideoMetadataDraft> for VideoMetadata {
    type Error = ContentValidationError;

    fn try_from(value: VideoMetadataDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            title: validate_title(&value.title)?,
            description: validate_description(&value.description)?,
            category: value.category,
            content_rating: value.content_rating,
            tags: validate_tags(value.tags)?,
        })
    }
}

impl From<VideoMetadata> for VideoMetadataDraft {
    fn from(value: VideoMetadata) -> Self {
        Self {
            title: value.title,
            description: value.description,
            category: value.category,
            content_rating: value.content_rating,
            tags: value.tags,
        }
    }
}
