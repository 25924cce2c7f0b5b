//! Favorite stations.
//!
//! Favorites are a set of station ids, joined live against each new
//! station list. No station data is stored with them.

mod error;
mod manager;
mod store;

pub use error::PersistError;
pub use manager::{FavoriteIds, FavoriteSetManager};
pub use store::{FavoritesStore, JsonFileStore, MemoryStore};
