//! Embed providers
//!
//! A provider turns TMDB identifiers into an embeddable player URL. The
//! registry keeps them in a fixed order, tracks the selected one and falls
//! back to the first provider when the selected one cannot serve a kind.

mod embed;

use std::fmt;

use async_trait::async_trait;

use crate::api::{MediaType, TmdbClient};
use crate::error::{ProviderError, Result};

pub use embed::builtin;

/// Which kinds of media a provider can play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Movie,
    Tv,
    Both,
}

impl Capability {
    pub fn supports(&self, kind: MediaType) -> bool {
        matches!(
            (self, kind),
            (Capability::Both, _)
                | (Capability::Movie, MediaType::Movie)
                | (Capability::Tv, MediaType::Tv)
        )
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Movie => write!(f, "movies"),
            Capability::Tv => write!(f, "tv"),
            Capability::Both => write!(f, "movies & tv"),
        }
    }
}

/// Translates TMDB ids to IMDb ids for providers keyed on IMDb
#[async_trait]
pub trait IdResolver: Send + Sync {
    async fn imdb_id(&self, tmdb_id: u64, kind: MediaType) -> Result<String>;
}

#[async_trait]
impl IdResolver for TmdbClient {
    async fn imdb_id(&self, tmdb_id: u64, kind: MediaType) -> Result<String> {
        Ok(self.external_id(tmdb_id, kind).await?)
    }
}

/// A source of embeddable player URLs
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier used in config
    fn key(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn capability(&self) -> Capability;

    async fn movie_url(&self, ids: &dyn IdResolver, movie_id: u64) -> Result<String>;

    async fn episode_url(
        &self,
        ids: &dyn IdResolver,
        show_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<String>;
}

/// A resolved URL and the provider that built it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub provider: &'static str,
}

/// Ordered providers plus the current selection
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
    current: usize,
}

impl ProviderRegistry {
    /// `providers` must not be empty; the first one is the fallback
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        debug_assert!(!providers.is_empty());
        Self {
            providers,
            current: 0,
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            builtin()
                .into_iter()
                .map(|p| Box::new(p) as Box<dyn Provider>)
                .collect(),
        )
    }

    /// Number of providers, as shown by `pr`
    pub fn count(&self) -> usize {
        self.providers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Provider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    /// 0-based index of the selected provider
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &dyn Provider {
        self.providers[self.current].as_ref()
    }

    fn fallback(&self) -> &dyn Provider {
        self.providers[0].as_ref()
    }

    /// Select by 0-based index; out of range leaves the selection unchanged
    pub fn select(&mut self, index: usize) -> std::result::Result<&dyn Provider, ProviderError> {
        if index >= self.providers.len() {
            return Err(ProviderError::OutOfRange {
                count: self.providers.len(),
            });
        }

        self.current = index;
        tracing::info!("Video provider set to {}", self.current().name());
        Ok(self.current())
    }

    /// Select by config key
    pub fn select_key(&mut self, key: &str) -> std::result::Result<&dyn Provider, ProviderError> {
        let index = self
            .providers
            .iter()
            .position(|p| p.key() == key)
            .ok_or_else(|| ProviderError::UnknownKey(key.to_string()))?;
        self.select(index)
    }

    /// The selected provider if it can play `kind`, otherwise the fallback
    fn for_kind(&self, kind: MediaType) -> &dyn Provider {
        let current = self.current();
        if current.capability().supports(kind) {
            current
        } else {
            tracing::warn!(
                "{} does not support {}, falling back to {}",
                current.name(),
                kind,
                self.fallback().name()
            );
            self.fallback()
        }
    }

    pub async fn resolve_movie(&self, ids: &dyn IdResolver, movie_id: u64) -> Result<ResolvedUrl> {
        let provider = self.for_kind(MediaType::Movie);
        let url = provider.movie_url(ids, movie_id).await?;
        tracing::debug!("Resolved movie {} via {}: {}", movie_id, provider.name(), url);

        Ok(ResolvedUrl {
            url,
            provider: provider.name(),
        })
    }

    pub async fn resolve_episode(
        &self,
        ids: &dyn IdResolver,
        show_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<ResolvedUrl> {
        let provider = self.for_kind(MediaType::Tv);
        let url = provider.episode_url(ids, show_id, season, episode).await?;
        tracing::debug!(
            "Resolved {} S{}E{} via {}: {}",
            show_id,
            season,
            episode,
            provider.name(),
            url
        );

        Ok(ResolvedUrl {
            url,
            provider: provider.name(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Id translation that answers `tt<id>` and counts calls
    #[derive(Default)]
    pub(crate) struct FakeIds {
        calls: AtomicUsize,
    }

    impl FakeIds {
        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdResolver for FakeIds {
        async fn imdb_id(&self, tmdb_id: u64, _kind: MediaType) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("tt{}", tmdb_id))
        }
    }

    /// Provider that records nothing and builds `<key>://<kind>/<id>` URLs
    struct Marker(&'static str, Capability);

    #[async_trait]
    impl Provider for Marker {
        fn key(&self) -> &'static str {
            self.0
        }

        fn name(&self) -> &'static str {
            self.0
        }

        fn capability(&self) -> Capability {
            self.1
        }

        async fn movie_url(&self, _ids: &dyn IdResolver, movie_id: u64) -> Result<String> {
            Ok(format!("{}://movie/{}", self.0, movie_id))
        }

        async fn episode_url(
            &self,
            _ids: &dyn IdResolver,
            show_id: u64,
            season: u32,
            episode: u32,
        ) -> Result<String> {
            Ok(format!("{}://tv/{}/{}/{}", self.0, show_id, season, episode))
        }
    }

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(vec![
            Box::new(Marker("a", Capability::Both)),
            Box::new(Marker("b", Capability::Both)),
            Box::new(Marker("m", Capability::Movie)),
        ])
    }

    #[test]
    fn test_capability_supports() {
        assert!(Capability::Both.supports(MediaType::Tv));
        assert!(Capability::Movie.supports(MediaType::Movie));
        assert!(!Capability::Movie.supports(MediaType::Tv));
        assert!(!Capability::Tv.supports(MediaType::Movie));
    }

    #[tokio::test]
    async fn test_selected_provider_builds_movie_url() {
        let ids = FakeIds::default();
        let mut registry = registry();

        for (index, key) in ["a", "b", "m"].iter().enumerate() {
            registry.select(index).unwrap();
            let resolved = registry.resolve_movie(&ids, 603).await.unwrap();
            assert_eq!(resolved.url, format!("{}://movie/603", key));
            assert_eq!(resolved.provider, *key);
        }
    }

    #[test]
    fn test_out_of_range_selection_is_rejected() {
        let mut registry = registry();
        registry.select(1).unwrap();

        let err = registry.select(3).err().unwrap();
        assert!(matches!(err, ProviderError::OutOfRange { count: 3 }));
        assert_eq!(registry.current_index(), 1);
    }

    #[test]
    fn test_select_key() {
        let mut registry = registry();
        registry.select_key("m").unwrap();
        assert_eq!(registry.current_index(), 2);
        assert!(registry.select_key("zzz").is_err());
        assert_eq!(registry.current_index(), 2);
    }

    #[tokio::test]
    async fn test_movie_only_provider_falls_back_for_episodes() {
        let ids = FakeIds::default();
        let mut registry = registry();
        registry.select(2).unwrap();

        let resolved = registry.resolve_episode(&ids, 1396, 2, 5).await.unwrap();
        assert_eq!(resolved.url, "a://tv/1396/2/5");
        assert_eq!(registry.current_index(), 2);
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(registry.count(), 7);
        assert_eq!(registry.current().key(), "vidsrc");
        assert!(registry
            .iter()
            .any(|p| p.capability() == Capability::Movie));
    }
}
