//! In-memory adapters guarded by standard mutexes.
//!
//! A poisoned lock surfaces as the port's query-style error rather than a
//! panic.

mod auth_provider;
mod content_store;
mod object_store;
mod playlist_store;

pub use auth_provider::InMemoryAuthProvider;
pub use content_store::InMemoryContentStore;
pub use object_store::InMemoryObjectStore;
pub use playlist_store::InMemoryPlaylistStore;
