//! Gallery listing queries.
//!
//! [`GalleryQuery`] is handed to the content store as-is. The matching and
//! ordering helpers describe the expected semantics so in-memory adapters
//! and SQL adapters agree.

use std::cmp::Ordering;

use pagination::PageRequest;
use serde::{Deserialize, Serialize};

use super::content::{Category, ContentItem, ContentRating};

/// Field a gallery page is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GallerySort {
    #[default]
    Newest,
    Popular,
    Alphabetical,
    Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Optional narrowing of the gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryFilter {
    pub category: Option<Category>,
    pub content_rating: Option<ContentRating>,
    /// Case-insensitive substring matched against title and description.
    pub search: Option<String>,
    pub featured_only: bool,
}

impl GalleryFilter {
    /// Whether `item` passes every filter that is set.
    pub fn matches(&self, item: &ContentItem) -> bool {
        let category_ok = self
            .category
            .as_ref()
            .is_none_or(|category| item.category() == category);
        let rating_ok = self
            .content_rating
            .as_ref()
            .is_none_or(|rating| item.content_rating() == rating);
        let featured_ok = !self.featured_only || item.is_featured();
        category_ok && rating_ok && featured_ok && self.matches_search(item)
    }

    fn matches_search(&self, item: &ContentItem) -> bool {
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        let metadata = item.metadata();
        metadata.title().to_lowercase().contains(&needle)
            || metadata.description().to_lowercase().contains(&needle)
    }
}

/// Filters, ordering and page of a gallery request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryQuery {
    pub filter: GalleryFilter,
    pub sort: GallerySort,
    pub order: SortOrder,
    pub page: PageRequest,
}

impl GalleryQuery {
    pub fn new(page: PageRequest) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: GalleryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn sorted_by(mut self, sort: GallerySort, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    /// Compare two items by the requested sort key and direction.
    ///
    /// Ties fall back to the item id so pages are stable.
    pub fn compare(&self, left: &ContentItem, right: &ContentItem) -> Ordering {
        let ordering = match self.sort {
            GallerySort::Newest => left.created_at().cmp(&right.created_at()),
            GallerySort::Popular => left.view_count().cmp(&right.view_count()),
            GallerySort::Alphabetical => left
                .metadata()
                .title()
                .to_lowercase()
                .cmp(&right.metadata().title().to_lowercase()),
            GallerySort::Duration => left
                .media()
                .duration_seconds
                .cmp(&right.media().duration_seconds),
        };
        let ordering = match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        ordering.then_with(|| left.id().cmp(&right.id()))
    }
}
