//! Shared wiring for behaviour tests.
//!
//! Builds the services over the in-memory adapters with a real clock so the
//! scenarios exercise the same code paths a host application would.

use std::sync::Arc;

use kidsvidshare::domain::ports::{ContentStore, MediaUpload};
use kidsvidshare::domain::{
    AccountService, Category, ContentId, ContentItem, ContentRating, ContentService, Error,
    ReviewState, StoredMedia, SupervisionService, UploadRequest, UserId, VideoMetadata,
    VideoMetadataDraft, VideoMimeType,
};
use kidsvidshare::outbound::memory::{
    InMemoryAuthProvider, InMemoryContentStore, InMemoryObjectStore,
};
use kidsvidshare::settings::ContentSettings;
use mockable::{Clock, DefaultClock};
use tokio::runtime::Runtime;
use url::Url;

pub type Content = ContentService<InMemoryObjectStore, InMemoryContentStore>;

/// Services and adapters for one scenario.
pub struct Harness {
    pub runtime: Runtime,
    pub clock: Arc<dyn Clock>,
    pub auth: Arc<InMemoryAuthProvider>,
    pub store: Arc<InMemoryContentStore>,
    pub content: Content,
    pub accounts: AccountService<InMemoryAuthProvider>,
    pub supervision: SupervisionService<InMemoryAuthProvider>,
}

impl Harness {
    pub fn new() -> Self {
        let runtime = Runtime::new().expect("create runtime");
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let auth = Arc::new(InMemoryAuthProvider::new(Arc::clone(&clock)));
        let store = Arc::new(InMemoryContentStore::new());
        let objects = Arc::new(InMemoryObjectStore::new(
            Url::parse("https://media.test/").expect("valid base url"),
        ));
        let content = ContentService::new(
            objects,
            Arc::clone(&store),
            Arc::clone(&clock),
            ContentSettings::default(),
        );
        Self {
            runtime,
            accounts: AccountService::new(Arc::clone(&auth), Arc::clone(&clock)),
            supervision: SupervisionService::new(Arc::clone(&auth)),
            clock,
            auth,
            store,
            content,
        }
    }

    /// Store a video directly in the given review state.
    pub fn seed(&self, rating: &str, review: ReviewState) -> ContentId {
        let metadata = VideoMetadata::new("Puddle jumping", Category::Family, ContentRating::from(rating))
            .expect("valid metadata");
        let media = StoredMedia {
            video_path: "videos/seed/puddles.mp4".to_owned(),
            thumbnail_path: None,
            duration_seconds: 30,
            file_size_bytes: 1_024,
            mime_type: VideoMimeType::Mp4,
        };
        let item = ContentItem::draft(
            ContentId::random(),
            UserId::random(),
            metadata,
            media,
            self.clock.utc(),
        )
        .expect("valid draft")
        .with_review(review);
        let id = item.id();
        self.runtime
            .block_on(self.store.create(&item))
            .expect("seed video");
        id
    }

    /// Current stored copy of a video.
    pub fn stored(&self, id: &ContentId) -> ContentItem {
        self.runtime
            .block_on(self.store.find_by_id(id))
            .expect("lookup")
            .expect("video stored")
    }
}

/// A small, valid MP4 upload.
pub fn upload_request() -> UploadRequest {
    UploadRequest {
        video: MediaUpload::new("garden.mp4", "video/mp4", vec![0; 256]),
        thumbnail: Some(MediaUpload::new("garden.jpg", "image/jpeg", vec![0; 16])),
        metadata: VideoMetadataDraft {
            title: "My garden".to_owned(),
            description: "Worms and a very slow snail".to_owned(),
            category: Category::Nature,
            content_rating: ContentRating::AllAges,
            tags: vec!["garden".to_owned()],
        },
        duration_seconds: 48,
    }
}

/// Snake-case error code, as hosts would serialise it.
pub fn code_of(error: &Error) -> String {
    error.code().as_str().to_owned()
}
