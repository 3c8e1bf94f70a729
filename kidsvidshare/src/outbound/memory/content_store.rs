//! In-memory [`ContentStore`] with compare-and-set on revisions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pagination::Page;

use crate::domain::ports::{ContentStore, ContentStoreError};
use crate::domain::{
    ContentId, ContentItem, GalleryQuery, ModerationReport, Reaction, ReactionType, ReportId,
    ReviewStateKind, UserId, ViewProgress, ViewRecord,
};

type ViewerKey = (ContentId, UserId);

#[derive(Debug, Default)]
struct Tables {
    items: HashMap<ContentId, ContentItem>,
    views: Vec<ViewRecord>,
    progress: HashMap<ViewerKey, ViewProgress>,
    reactions: HashMap<ViewerKey, ReactionType>,
    reports: HashMap<ReportId, ModerationReport>,
}

impl Tables {
    fn compare_and_set(
        &mut self,
        item: &ContentItem,
        expected_revision: u32,
    ) -> Result<(), ContentStoreError> {
        let stored = self
            .items
            .get_mut(&item.id())
            .ok_or_else(|| ContentStoreError::not_found(item.id().to_string()))?;
        if stored.revision() != expected_revision {
            return Err(ContentStoreError::revision_mismatch(
                expected_revision,
                stored.revision(),
            ));
        }
        stored.adopt_revision(item);
        Ok(())
    }
}

/// Content store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    tables: Mutex<Tables>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, ContentStoreError> {
        self.tables
            .lock()
            .map_err(|_| ContentStoreError::query("content tables lock poisoned"))
    }

    /// Number of view events recorded for `id`.
    pub fn view_events(&self, id: &ContentId) -> Result<usize, ContentStoreError> {
        Ok(self
            .lock()?
            .views
            .iter()
            .filter(|view| view.content_id == *id)
            .count())
    }

    /// Stored progress for a viewer, if any.
    pub fn progress(
        &self,
        id: &ContentId,
        viewer_id: &UserId,
    ) -> Result<Option<ViewProgress>, ContentStoreError> {
        Ok(self
            .lock()?
            .progress
            .get(&(*id, viewer_id.clone()))
            .cloned())
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn create(&self, item: &ContentItem) -> Result<(), ContentStoreError> {
        let mut tables = self.lock()?;
        if tables.items.contains_key(&item.id()) {
            return Err(ContentStoreError::duplicate(item.id().to_string()));
        }
        tables.items.insert(item.id(), item.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ContentId) -> Result<Option<ContentItem>, ContentStoreError> {
        Ok(self.lock()?.items.get(id).cloned())
    }

    async fn save_review(
        &self,
        item: &ContentItem,
        expected_revision: u32,
    ) -> Result<(), ContentStoreError> {
        self.lock()?.compare_and_set(item, expected_revision)
    }

    async fn update_metadata(
        &self,
        item: &ContentItem,
        expected_revision: u32,
    ) -> Result<(), ContentStoreError> {
        self.lock()?.compare_and_set(item, expected_revision)
    }

    async fn delete(&self, id: &ContentId) -> Result<(), ContentStoreError> {
        let mut tables = self.lock()?;
        if tables.items.remove(id).is_none() {
            return Err(ContentStoreError::not_found(id.to_string()));
        }
        tables.views.retain(|view| view.content_id != *id);
        tables.progress.retain(|(content_id, _), _| content_id != id);
        tables.reactions.retain(|(content_id, _), _| content_id != id);
        tables.reports.retain(|_, report| report.content_id() != *id);
        Ok(())
    }

    async fn list_published(
        &self,
        query: &GalleryQuery,
    ) -> Result<Page<ContentItem>, ContentStoreError> {
        let tables = self.lock()?;
        let mut matching: Vec<ContentItem> = tables
            .items
            .values()
            .filter(|item| item.is_published() && query.filter.matches(item))
            .cloned()
            .collect();
        matching.sort_by(|left, right| query.compare(left, right));
        Ok(Page::from_window(matching, query.page))
    }

    async fn list_by_state(
        &self,
        state: ReviewStateKind,
    ) -> Result<Vec<ContentItem>, ContentStoreError> {
        let tables = self.lock()?;
        let mut items: Vec<ContentItem> = tables
            .items
            .values()
            .filter(|item| item.review().kind() == state)
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.created_at(), item.id()));
        Ok(items)
    }

    async fn list_by_uploader(
        &self,
        uploader: &UserId,
        state: Option<ReviewStateKind>,
    ) -> Result<Vec<ContentItem>, ContentStoreError> {
        let tables = self.lock()?;
        let mut items: Vec<ContentItem> = tables
            .items
            .values()
            .filter(|item| item.uploader_id() == uploader)
            .filter(|item| state.is_none_or(|state| item.review().kind() == state))
            .cloned()
            .collect();
        items.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(items)
    }

    async fn record_view(&self, view: &ViewRecord) -> Result<(), ContentStoreError> {
        let mut tables = self.lock()?;
        let item = tables
            .items
            .get_mut(&view.content_id)
            .ok_or_else(|| ContentStoreError::not_found(view.content_id.to_string()))?;
        item.record_view();
        tables.views.push(view.clone());
        Ok(())
    }

    async fn record_view_progress(
        &self,
        progress: &ViewProgress,
    ) -> Result<(), ContentStoreError> {
        let mut tables = self.lock()?;
        if !tables.items.contains_key(&progress.content_id) {
            return Err(ContentStoreError::not_found(progress.content_id.to_string()));
        }
        tables.progress.insert(
            (progress.content_id, progress.viewer_id.clone()),
            progress.clone(),
        );
        Ok(())
    }

    async fn find_reaction(
        &self,
        content_id: &ContentId,
        user_id: &UserId,
    ) -> Result<Option<ReactionType>, ContentStoreError> {
        Ok(self
            .lock()?
            .reactions
            .get(&(*content_id, user_id.clone()))
            .copied())
    }

    async fn put_reaction(&self, reaction: &Reaction) -> Result<(), ContentStoreError> {
        self.lock()?.reactions.insert(
            (reaction.content_id, reaction.user_id.clone()),
            reaction.reaction_type,
        );
        Ok(())
    }

    async fn delete_reaction(
        &self,
        content_id: &ContentId,
        user_id: &UserId,
    ) -> Result<(), ContentStoreError> {
        self.lock()?
            .reactions
            .remove(&(*content_id, user_id.clone()));
        Ok(())
    }

    async fn create_report(&self, report: &ModerationReport) -> Result<(), ContentStoreError> {
        let mut tables = self.lock()?;
        if !tables.items.contains_key(&report.content_id()) {
            return Err(ContentStoreError::not_found(report.content_id().to_string()));
        }
        if tables.reports.contains_key(&report.id()) {
            return Err(ContentStoreError::duplicate(report.id().to_string()));
        }
        tables.reports.insert(report.id(), report.clone());
        Ok(())
    }

    async fn find_report(
        &self,
        id: &ReportId,
    ) -> Result<Option<ModerationReport>, ContentStoreError> {
        Ok(self.lock()?.reports.get(id).cloned())
    }

    async fn list_open_reports(&self) -> Result<Vec<ModerationReport>, ContentStoreError> {
        let tables = self.lock()?;
        let mut reports: Vec<ModerationReport> = tables
            .reports
            .values()
            .filter(|report| report.is_open())
            .cloned()
            .collect();
        reports.sort_by_key(|report| (report.created_at(), report.id()));
        Ok(reports)
    }

    async fn save_report(&self, report: &ModerationReport) -> Result<(), ContentStoreError> {
        let mut tables = self.lock()?;
        let stored = tables
            .reports
            .get_mut(&report.id())
            .ok_or_else(|| ContentStoreError::not_found(report.id().to_string()))?;
        *stored = report.clone();
        Ok(())
    }
}
