//! TMDB (The Movie Database) API client
//!
//! Search, trending, season and show details, and external id lookup.
//! API docs: https://developer.themoviedb.org/docs

use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::media::{Episode, MediaItem, MediaType, SearchResult, Season, ShowDetails};
use crate::config::Config;
use crate::error::ApiError;

lazy_static! {
    static ref LOOSE_SEPARATORS: Regex = Regex::new(r"[^\p{Alphabetic}\p{Nd}]+").unwrap();
}

/// Turn user input into a forgiving search query: punctuation becomes
/// whitespace and runs of whitespace collapse.
pub fn loose_query(query: &str) -> String {
    LOOSE_SEPARATORS
        .replace_all(query, " ")
        .trim()
        .to_string()
}

/// TMDB API client
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    /// Applied to every request, not only to the client
    timeout: Duration,
}

impl TmdbClient {
    /// Create a client with a custom base URL and request timeout
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client with a {:?} timeout: {}", timeout, e);
            Client::new()
        });

        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_base_url(
            config.tmdb.api_key.clone(),
            config.tmdb.base_url.clone(),
            Duration::from_secs(config.tmdb.timeout_secs.max(1)),
        )
    }

    /// Authenticated GET returning the decoded JSON body
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let mut query = String::new();
        for (name, value) in params {
            query.push('&');
            query.push_str(name);
            query.push('=');
            query.push_str(&urlencoding::encode(value));
        }

        tracing::debug!("TMDB GET {}?{}", path, query.trim_start_matches('&'));

        let url = format!(
            "{}{}?api_key={}{}",
            self.base_url,
            path,
            urlencoding::encode(&self.api_key),
            query
        );

        let response = self.client.get(&url).timeout(self.timeout).send().await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized),
            StatusCode::NOT_FOUND => return Err(ApiError::NotFound),
            status => return Err(ApiError::Tmdb(format!("HTTP {}", status))),
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::Tmdb(format!("Failed to parse response: {}", e)))
    }

    /// Search movies and TV shows together (people are dropped).
    ///
    /// A loose search cleans punctuation out of the query first.
    pub async fn search_multi(&self, query: &str, loose: bool) -> Result<SearchResult, ApiError> {
        let query = if loose {
            loose_query(query)
        } else {
            query.trim().to_string()
        };

        let response: PagedResponse = self
            .get(
                "/search/multi",
                &[("query", &query), ("include_adult", "false"), ("page", "1")],
            )
            .await?;

        Ok(response.into_search_result())
    }

    /// Trending movies and shows of the week
    pub async fn trending(&self) -> Result<SearchResult, ApiError> {
        let response: PagedResponse = self.get("/trending/all/week", &[]).await?;
        Ok(response.into_search_result())
    }

    /// Episodes of one season
    pub async fn season_details(&self, show_id: u64, season: u32) -> Result<Season, ApiError> {
        let path = format!("/tv/{}/season/{}", show_id, season);
        let response: SeasonResponse = self.get(&path, &[]).await?;
        Ok(response.into_season(season))
    }

    /// Show details (season count)
    pub async fn show_details(&self, show_id: u64) -> Result<ShowDetails, ApiError> {
        let path = format!("/tv/{}", show_id);
        let response: TvDetailsResponse = self.get(&path, &[]).await?;

        Ok(ShowDetails {
            id: response.id,
            name: response.name,
            number_of_seasons: response.number_of_seasons.unwrap_or(0),
        })
    }

    /// IMDb id for a movie or show
    pub async fn external_id(&self, id: u64, kind: MediaType) -> Result<String, ApiError> {
        let path = format!("/{}/{}/external_ids", kind.as_str(), id);
        let response: ExternalIdsResponse = self.get(&path, &[]).await?;

        response
            .imdb_id
            .filter(|imdb| !imdb.is_empty())
            .ok_or_else(|| ApiError::ExternalIdNotFound {
                kind: kind.to_string(),
                id,
            })
    }
}

// Response types for TMDB API

#[derive(Debug, Deserialize)]
struct PagedResponse {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    results: Vec<MediaResult>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u32,
}

impl PagedResponse {
    fn into_search_result(self) -> SearchResult {
        SearchResult {
            items: self
                .results
                .into_iter()
                .filter_map(MediaResult::into_item)
                .collect(),
            page: self.page.max(1),
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MediaResult {
    id: u64,
    #[serde(default)]
    media_type: Option<String>,
    // Movies use "title", TV uses "name"
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    vote_average: Option<f32>,
}

impl MediaResult {
    fn into_item(self) -> Option<MediaItem> {
        let kind = match self.media_type.as_deref() {
            Some("movie") => MediaType::Movie,
            Some("tv") => MediaType::Tv,
            _ => return None,
        };

        let year = self
            .release_date
            .or(self.first_air_date)
            .as_deref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok());

        Some(MediaItem {
            id: self.id,
            kind,
            title: self.title.or(self.name).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            rating: self.vote_average.unwrap_or(0.0),
            year,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SeasonResponse {
    season_number: Option<u32>,
    #[serde(default)]
    episodes: Vec<EpisodeResult>,
}

impl SeasonResponse {
    fn into_season(self, requested: u32) -> Season {
        Season {
            number: self.season_number.unwrap_or(requested),
            episodes: self
                .episodes
                .into_iter()
                .map(|e| Episode {
                    number: e.episode_number,
                    name: e.name.unwrap_or_else(|| format!("Episode {}", e.episode_number)),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EpisodeResult {
    episode_number: u32,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvDetailsResponse {
    id: u64,
    #[serde(default)]
    name: String,
    number_of_seasons: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ExternalIdsResponse {
    imdb_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client(server: &Server) -> TmdbClient {
        TmdbClient::with_base_url("test_key", server.url(), Duration::from_secs(5))
    }

    #[test]
    fn test_from_config_keeps_timeout() {
        let mut config = Config::new("key".to_string());
        config.tmdb.base_url = "http://localhost:1234/3/".to_string();
        config.tmdb.timeout_secs = 3;

        let client = TmdbClient::from_config(&config);
        assert_eq!(client.timeout, Duration::from_secs(3));
        assert_eq!(client.base_url, "http://localhost:1234/3");

        config.tmdb.timeout_secs = 0;
        assert_eq!(TmdbClient::from_config(&config).timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_loose_query() {
        assert_eq!(loose_query("  breaking-bad! "), "breaking bad");
        assert_eq!(loose_query("Mr. Robot"), "Mr Robot");
        assert_eq!(loose_query("Amélie"), "Amélie");
    }

    #[tokio::test]
    async fn test_search_multi_parses_and_drops_people() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search/multi")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "test_key".into()),
                Matcher::UrlEncoded("query".into(), "breaking bad".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "page": 1,
                    "results": [
                        {"id": 1396, "media_type": "tv", "name": "Breaking Bad",
                         "first_air_date": "2008-01-20", "overview": "A chemist turns to crime", "vote_average": 8.9},
                        {"id": 17419, "media_type": "person", "name": "Bryan Cranston"},
                        {"id": 559969, "media_type": "movie", "title": "El Camino",
                         "release_date": "2019-10-11", "overview": null, "vote_average": 6.9}
                    ],
                    "total_pages": 3,
                    "total_results": 41
                }"#,
            )
            .create_async()
            .await;

        let result = client(&server)
            .search_multi("breaking-bad", true)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].title, "Breaking Bad");
        assert_eq!(result.items[0].kind, MediaType::Tv);
        assert_eq!(result.items[0].year, Some(2008));
        assert_eq!(result.items[1].title, "El Camino");
        assert_eq!(result.items[1].kind, MediaType::Movie);
        assert!(result.has_more_pages());
    }

    #[tokio::test]
    async fn test_trending_is_weekly() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/trending/all/week")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"page": 1, "results": [], "total_pages": 1, "total_results": 0}"#)
            .create_async()
            .await;

        let result = client(&server).trending().await.unwrap();

        mock.assert_async().await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_season_details() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/tv/1396/season/2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"season_number": 2, "episodes": [
                    {"episode_number": 1, "name": "Seven Thirty-Seven"},
                    {"episode_number": 2, "name": "Grilled"}
                ]}"#,
            )
            .create_async()
            .await;

        let season = client(&server).season_details(1396, 2).await.unwrap();
        assert_eq!(season.number, 2);
        assert_eq!(season.len(), 2);
        assert_eq!(season.episodes[1].name, "Grilled");
    }

    #[tokio::test]
    async fn test_show_details() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/tv/1396")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": 1396, "name": "Breaking Bad", "number_of_seasons": 5}"#)
            .create_async()
            .await;

        let details = client(&server).show_details(1396).await.unwrap();
        assert_eq!(details.number_of_seasons, 5);
    }

    #[tokio::test]
    async fn test_external_id() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/movie/603/external_ids")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": 603, "imdb_id": "tt0133093"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/tv/42/external_ids")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": 42, "imdb_id": null}"#)
            .create_async()
            .await;

        let client = client(&server);
        assert_eq!(
            client.external_id(603, MediaType::Movie).await.unwrap(),
            "tt0133093"
        );
        assert!(matches!(
            client.external_id(42, MediaType::Tv).await,
            Err(ApiError::ExternalIdNotFound { id: 42, .. })
        ));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/tv/1/season/9")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"success": false}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/trending/all/week")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;
        server
            .mock("GET", "/tv/2")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = client(&server);
        assert!(matches!(
            client.season_details(1, 9).await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(
            client.trending().await,
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(client.show_details(2).await, Err(ApiError::Tmdb(_))));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/tv/3")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server).show_details(3).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse response"));
    }
}
