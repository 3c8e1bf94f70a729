//! Builders shared by domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::content::{
    Category, ContentId, ContentItem, ContentRating, ReviewState, StoredMedia, VideoMetadata,
    VideoMimeType,
};
use super::user::UserId;
use super::viewer::{Age, Viewer};

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26)
        .single()
        .expect("valid fixture time")
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(fixed_now()))
}

pub(crate) fn media() -> StoredMedia {
    StoredMedia {
        video_path: "uploads/video.mp4".to_owned(),
        thumbnail_path: Some("uploads/thumb.jpg".to_owned()),
        duration_seconds: 42,
        file_size_bytes: 4_096,
        mime_type: VideoMimeType::Mp4,
    }
}

/// Item owned by `uploader` with the given rating and state.
pub(crate) fn item_for(
    uploader: &UserId,
    rating: ContentRating,
    review: ReviewState,
) -> ContentItem {
    let metadata =
        VideoMetadata::new("Garden snails", Category::Nature, rating).expect("valid metadata");
    ContentItem::draft(
        ContentId::random(),
        uploader.clone(),
        metadata,
        media(),
        fixed_now(),
    )
    .expect("valid draft")
    .with_review(review)
}

pub(crate) fn item(rating: ContentRating, review: ReviewState) -> ContentItem {
    item_for(&UserId::random(), rating, review)
}

pub(crate) fn published(rating: ContentRating) -> ContentItem {
    item(rating, ReviewState::Published)
}

pub(crate) fn child_aged(years: i64) -> Viewer {
    Viewer::child(UserId::random(), Age::new(years).expect("valid age"))
}
