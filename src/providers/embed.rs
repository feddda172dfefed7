use async_trait::async_trait;

use crate::api::MediaType;
use crate::error::Result;
use crate::providers::{Capability, IdResolver, Provider};

/// Which identifier a provider's URLs are keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    Tmdb,
    Imdb,
}

/// A provider whose URLs are string templates.
///
/// Templates use `{id}`, `{season}` and `{episode}` placeholders. IMDb-keyed
/// providers translate the TMDB id before filling the template.
#[derive(Debug, Clone)]
pub struct EmbedProvider {
    key: &'static str,
    name: &'static str,
    ids: IdScheme,
    movie_template: Option<&'static str>,
    episode_template: Option<&'static str>,
}

impl EmbedProvider {
    pub const fn both(
        key: &'static str,
        name: &'static str,
        ids: IdScheme,
        movie_template: &'static str,
        episode_template: &'static str,
    ) -> Self {
        Self {
            key,
            name,
            ids,
            movie_template: Some(movie_template),
            episode_template: Some(episode_template),
        }
    }

    pub const fn movies_only(
        key: &'static str,
        name: &'static str,
        ids: IdScheme,
        movie_template: &'static str,
    ) -> Self {
        Self {
            key,
            name,
            ids,
            movie_template: Some(movie_template),
            episode_template: None,
        }
    }

    async fn media_id(&self, ids: &dyn IdResolver, tmdb_id: u64, kind: MediaType) -> Result<String> {
        match self.ids {
            IdScheme::Tmdb => Ok(tmdb_id.to_string()),
            IdScheme::Imdb => {
                tracing::debug!("{} needs an IMDb id for {} {}", self.name, kind, tmdb_id);
                ids.imdb_id(tmdb_id, kind).await
            }
        }
    }

    fn unsupported(&self, kind: MediaType) -> anyhow::Error {
        anyhow::anyhow!("{} cannot play {} content", self.name, kind)
    }
}

fn fill(template: &str, id: &str, season: u32, episode: u32) -> String {
    template
        .replace("{id}", id)
        .replace("{season}", &season.to_string())
        .replace("{episode}", &episode.to_string())
}

#[async_trait]
impl Provider for EmbedProvider {
    fn key(&self) -> &'static str {
        self.key
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn capability(&self) -> Capability {
        match (self.movie_template, self.episode_template) {
            (Some(_), Some(_)) => Capability::Both,
            (None, Some(_)) => Capability::Tv,
            _ => Capability::Movie,
        }
    }

    async fn movie_url(&self, ids: &dyn IdResolver, movie_id: u64) -> Result<String> {
        let template = self
            .movie_template
            .ok_or_else(|| self.unsupported(MediaType::Movie))?;
        let id = self.media_id(ids, movie_id, MediaType::Movie).await?;
        Ok(fill(template, &id, 0, 0))
    }

    async fn episode_url(
        &self,
        ids: &dyn IdResolver,
        show_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<String> {
        let template = self
            .episode_template
            .ok_or_else(|| self.unsupported(MediaType::Tv))?;
        let id = self.media_id(ids, show_id, MediaType::Tv).await?;
        Ok(fill(template, &id, season, episode))
    }
}

/// The built-in providers, in display order. The first one is the fallback.
pub fn builtin() -> Vec<EmbedProvider> {
    vec![
        EmbedProvider::both(
            "vidsrc",
            "VidSrc",
            IdScheme::Tmdb,
            "https://vidsrc.xyz/embed/movie?tmdb={id}",
            "https://vidsrc.xyz/embed/tv?tmdb={id}&season={season}&episode={episode}",
        ),
        EmbedProvider::both(
            "vidsrc-to",
            "VidSrc.to",
            IdScheme::Tmdb,
            "https://vidsrc.to/embed/movie/{id}",
            "https://vidsrc.to/embed/tv/{id}/{season}/{episode}",
        ),
        EmbedProvider::both(
            "embed-su",
            "Embed.su",
            IdScheme::Tmdb,
            "https://embed.su/embed/movie/{id}",
            "https://embed.su/embed/tv/{id}/{season}/{episode}",
        ),
        EmbedProvider::both(
            "2embed",
            "2Embed",
            IdScheme::Imdb,
            "https://www.2embed.cc/embed/{id}",
            "https://www.2embed.cc/embedtv/{id}&s={season}&e={episode}",
        ),
        EmbedProvider::both(
            "multiembed",
            "MultiEmbed",
            IdScheme::Imdb,
            "https://multiembed.mov/?video_id={id}",
            "https://multiembed.mov/?video_id={id}&s={season}&e={episode}",
        ),
        EmbedProvider::movies_only(
            "moviesapi",
            "MoviesAPI",
            IdScheme::Tmdb,
            "https://moviesapi.club/movie/{id}",
        ),
        EmbedProvider::movies_only(
            "vidsrc-imdb",
            "VidSrc (IMDb)",
            IdScheme::Imdb,
            "https://vidsrc.me/embed/movie?imdb={id}",
        ),
    ]
}
