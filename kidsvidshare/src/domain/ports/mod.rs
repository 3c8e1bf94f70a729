//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_provider;
mod content_store;
mod object_store;
mod playlist_store;

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{AuthProvider, AuthProviderError, FixtureAuthProvider};
#[cfg(test)]
pub use content_store::MockContentStore;
pub use content_store::{ContentStore, ContentStoreError, FixtureContentStore};
#[cfg(test)]
pub use object_store::MockObjectStore;
pub use object_store::{FixtureObjectStore, MediaUpload, ObjectStore, ObjectStoreError, StoredObject};
#[cfg(test)]
pub use playlist_store::MockPlaylistStore;
pub use playlist_store::{FixturePlaylistStore, PlaylistStore, PlaylistStoreError};
