use std::fmt;

use serde::{Deserialize, Serialize};

/// Type of media content. TMDB ids are only unique within one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment used by the TMDB API
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A movie or show as returned by search or trending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: u64,
    pub kind: MediaType,
    pub title: String,
    pub overview: String,
    /// Vote average (0.0-10.0)
    pub rating: f32,
    pub year: Option<i32>,
}

impl MediaItem {
    pub fn is_tv(&self) -> bool {
        self.kind == MediaType::Tv
    }

    /// Identity check: ids are scoped by media type
    pub fn same_as(&self, kind: MediaType, id: u64) -> bool {
        self.kind == kind && self.id == id
    }
}

/// First page of a search or trending call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub items: Vec<MediaItem>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 1-based lookup, as shown to the user
    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        index.checked_sub(1).and_then(|i| self.items.get(i))
    }

    pub fn has_more_pages(&self) -> bool {
        self.total_pages > self.page
    }
}

/// A season with its episode list
#[derive(Debug, Clone, PartialEq)]
pub struct Season {
    pub number: u32,
    pub episodes: Vec<Episode>,
}

impl Season {
    pub fn len(&self) -> u32 {
        self.episodes.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}

/// Episode data structure
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub number: u32,
    pub name: String,
}

/// The subset of show details the shell needs
#[derive(Debug, Clone, PartialEq)]
pub struct ShowDetails {
    pub id: u64,
    pub name: String,
    pub number_of_seasons: u32,
}
