//! The shell's working directory
//!
//! `NavigationState` is an immutable value. Every transition returns a new
//! state, and the interpreter swaps it in only once a command has finished
//! all of its remote calls.

use crate::api::{MediaItem, SearchResult, Season};
use crate::error::ShellError;

/// Where the cursor points
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Location {
    #[default]
    Root,
    /// A movie or show is selected
    Media(MediaItem),
    /// A show and one of its seasons are selected
    Season { show: MediaItem, season: Season },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationState {
    search: Option<SearchResult>,
    location: Location,
    /// Episode cursor inside the current season
    episode: Option<u32>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> Option<&SearchResult> {
        self.search.as_ref()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn episode(&self) -> Option<u32> {
        self.episode
    }

    /// The selected movie or show, also while inside a season
    pub fn media(&self) -> Option<&MediaItem> {
        match &self.location {
            Location::Root => None,
            Location::Media(item) => Some(item),
            Location::Season { show, .. } => Some(show),
        }
    }

    /// Forget selection, search and cursor at once
    pub fn to_root(&self) -> Self {
        Self::default()
    }

    /// Replace the active search, keeping the location
    pub fn with_search(&self, search: SearchResult) -> Self {
        Self {
            search: Some(search),
            ..self.clone()
        }
    }

    /// Select a movie or show
    pub fn select(&self, item: MediaItem) -> Self {
        Self {
            search: self.search.clone(),
            location: Location::Media(item),
            episode: None,
        }
    }

    /// Enter a season of `show`, optionally placing the episode cursor
    pub fn enter_season(
        &self,
        show: MediaItem,
        season: Season,
        episode: Option<u32>,
    ) -> Result<Self, ShellError> {
        if !show.is_tv() {
            return Err(ShellError::invalid_state("Selected media is not a TV show."));
        }

        Ok(Self {
            search: self.search.clone(),
            location: Location::Season { show, season },
            episode,
        })
    }

    /// One level up; a no-op at the root
    pub fn pop(&self) -> Self {
        let location = match &self.location {
            Location::Root => Location::Root,
            Location::Media(_) => Location::Root,
            Location::Season { show, .. } => Location::Media(show.clone()),
        };

        Self {
            search: self.search.clone(),
            location,
            episode: None,
        }
    }

    /// Move the episode cursor
    pub fn with_episode(&self, episode: u32) -> Self {
        Self {
            episode: Some(episode),
            ..self.clone()
        }
    }

    /// Display path, empty at the root
    pub fn path(&self) -> String {
        match &self.location {
            Location::Root => String::new(),
            Location::Media(item) => item.title.clone(),
            Location::Season { show, season } => match self.episode {
                Some(episode) => format!(
                    "{}/Season {}/Episode {}",
                    show.title, season.number, episode
                ),
                None => format!("{}/Season {}", show.title, season.number),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MediaType;

    fn show() -> MediaItem {
        MediaItem {
            id: 1396,
            kind: MediaType::Tv,
            title: "Breaking Bad".to_string(),
            overview: String::new(),
            rating: 8.9,
            year: Some(2008),
        }
    }

    fn movie() -> MediaItem {
        MediaItem {
            id: 603,
            kind: MediaType::Movie,
            title: "The Matrix".to_string(),
            overview: String::new(),
            rating: 8.2,
            year: Some(1999),
        }
    }

    fn season(number: u32) -> Season {
        Season {
            number,
            episodes: Vec::new(),
        }
    }

    #[test]
    fn test_paths() {
        let root = NavigationState::new();
        assert_eq!(root.path(), "");

        let selected = root.select(show());
        assert_eq!(selected.path(), "Breaking Bad");

        let in_season = selected.enter_season(show(), season(2), None).unwrap();
        assert_eq!(in_season.path(), "Breaking Bad/Season 2");
        assert_eq!(
            in_season.with_episode(4).path(),
            "Breaking Bad/Season 2/Episode 4"
        );
    }

    #[test]
    fn test_pop() {
        let search = SearchResult {
            items: vec![show()],
            page: 1,
            total_pages: 1,
            total_results: 1,
        };
        let state = NavigationState::new()
            .with_search(search)
            .enter_season(show(), season(1), Some(3))
            .unwrap();

        let up = state.pop();
        assert_eq!(up.location(), &Location::Media(show()));
        assert_eq!(up.episode(), None);

        let top = up.pop();
        assert_eq!(top.location(), &Location::Root);
        assert!(top.search().is_some());
        assert_eq!(top.pop(), top);
    }

    #[test]
    fn test_to_root_clears_everything() {
        let state = NavigationState::new()
            .with_search(SearchResult::default())
            .enter_season(show(), season(1), Some(1))
            .unwrap();

        assert_eq!(state.to_root(), NavigationState::new());
    }

    #[test]
    fn test_season_requires_show() {
        let err = NavigationState::new()
            .enter_season(movie(), season(1), None)
            .unwrap_err();
        assert!(matches!(err, ShellError::InvalidState(_)));
    }

    #[test]
    fn test_media_accessor() {
        let state = NavigationState::new().select(movie());
        assert_eq!(state.media().unwrap().id, 603);
        assert!(matches!(state.location(), Location::Media(_)));

        let state = state.enter_season(show(), season(1), None).unwrap();
        assert_eq!(state.media().unwrap().id, 1396);
        assert!(matches!(state.location(), Location::Season { season, .. } if season.number == 1));
    }
}
