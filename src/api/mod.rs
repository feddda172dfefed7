mod media;
mod tmdb;

pub use media::{MediaItem, MediaType, SearchResult, Season};
pub use tmdb::TmdbClient;
