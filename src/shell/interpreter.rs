use std::time::Duration;

use rand::Rng;

use crate::api::{MediaItem, MediaType, SearchResult, Season, TmdbClient};
use crate::config::ShellConfig;
use crate::error::{ApiError, ProviderError, Result, ShellError};
use crate::history::{WatchHistory, WatchProgress};
use crate::providers::{ProviderRegistry, ResolvedUrl};
use crate::settings::{Settings, SettingsStore};
use crate::shell::address::{normalize_title, path_number, Address};
use crate::shell::command::{split_line, Command, HELP};
use crate::shell::custom::customize;
use crate::shell::navigation::{Location, NavigationState};
use crate::shell::{Effect, PlayRequest, Response};
use crate::store::Store;

/// Record key of the selected provider (0-based)
const PROVIDER_KEY: &str = "provider_index";

const UNKNOWN_COMMAND: &str = "Unknown command. Type 'help' for available commands.";
const NO_HISTORY: &str = "No watch history found.";
const DOWNLOAD_FAILURE: &str =
    "err69420: Implementation deferred due to resource allocation constraints and development cycle optimization.";

/// Target of a single-segment `cd` or `play`
enum Target {
    /// A number, and the text it was typed as
    Index(u32, String),
    Name(String),
}

impl Target {
    fn index(index: u32, argument: &str) -> Self {
        Target::Index(index, argument.trim().to_string())
    }

    /// Query used when the target has to be searched for
    fn text(&self) -> &str {
        match self {
            Target::Index(_, text) | Target::Name(text) => text,
        }
    }
}

/// Executes shell lines against the catalog, the providers and the store
pub struct Interpreter {
    tmdb: TmdbClient,
    providers: ProviderRegistry,
    store: Store,
    nav: NavigationState,
    current_url: Option<String>,
    download_delay_ms: (u64, u64),
}

impl Interpreter {
    pub fn new(tmdb: TmdbClient, store: Store, shell: &ShellConfig) -> Self {
        let mut providers = ProviderRegistry::builtin();

        match store.get::<usize>(PROVIDER_KEY) {
            Ok(Some(index)) => {
                if let Err(e) = providers.select(index) {
                    tracing::warn!("Ignoring saved provider: {}", e);
                }
            }
            Ok(None) => {
                if let Err(e) = providers.select_key(&shell.provider) {
                    tracing::warn!("{}, using {}", e, providers.current().name());
                }
            }
            Err(e) => tracing::warn!("Failed to read saved provider: {}", e),
        }

        let [low, high] = shell.download_delay_ms;

        Self {
            tmdb,
            providers,
            store,
            nav: NavigationState::new(),
            current_url: None,
            download_delay_ms: (low.min(high), low.max(high)),
        }
    }

    /// Path shown in the prompt
    pub fn path(&self) -> String {
        self.nav.path()
    }

    /// Saved appearance settings, or the defaults if they cannot be read
    pub fn settings(&self) -> Settings {
        SettingsStore::new(&self.store).load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load settings: {}", e);
            Settings::default()
        })
    }

    /// Run one input line
    pub async fn interpret(&mut self, line: &str) -> Response {
        let mut out = Response::default();
        let (verb, argument) = split_line(line);

        if verb.is_empty() {
            return out;
        }

        let Some(command) = Command::from_verb(&verb) else {
            out.line(UNKNOWN_COMMAND);
            out.line("");
            return out;
        };

        match command {
            Command::Exit => return out,
            Command::Help => {
                out.lines.extend(HELP.iter().map(|line| line.to_string()));
                return out;
            }
            _ => {}
        }

        tracing::debug!("Running {:?} with argument {:?}", command, argument);

        match self.dispatch(command, argument, &mut out).await {
            Ok(()) => {
                if command != Command::Clear {
                    out.line("");
                }
            }
            Err(err) => match err.downcast_ref::<ShellError>() {
                Some(shell_error) => {
                    out.line(shell_error.to_string());
                    out.line("");
                }
                None => {
                    tracing::warn!("'{}' failed: {:#}", verb, err);
                    out.line(format!("Error: {}", err));
                }
            },
        }

        out
    }

    /// Play the episode after the cursor
    pub async fn next(&mut self) -> Response {
        self.interpret("n").await
    }

    async fn dispatch(&mut self, command: Command, argument: &str, out: &mut Response) -> Result<()> {
        match command {
            Command::Find => self.find(argument, out).await,
            Command::Cd => self.cd(argument).await,
            Command::Pwd => {
                let path = self.nav.path();
                out.line(if path.is_empty() { "/".to_string() } else { path });
                Ok(())
            }
            Command::Play => self.play(argument, out).await,
            Command::List => self.list(out).await,
            Command::Next => self.play_next(out).await,
            Command::Clear => {
                out.line(self.settings().title());
                out.effect = Some(Effect::Clear);
                Ok(())
            }
            Command::Download => self.download(argument, out).await,
            Command::History => self.show_history(out),
            Command::Last => self.play_last(0, out).await,
            Command::LastNext => self.play_last(1, out).await,
            Command::Provider => self.provider(argument, out),
            Command::Toggle => {
                out.line("Video player visibility toggled");
                out.effect = Some(Effect::TogglePlayer);
                Ok(())
            }
            Command::Custom => customize(&self.store, argument, out),
            Command::Url => {
                out.line(
                    self.current_url
                        .as_deref()
                        .unwrap_or("Nothing has been played yet."),
                );
                Ok(())
            }
            Command::Echo => {
                out.line(argument);
                Ok(())
            }
            Command::Help | Command::Exit => Ok(()),
        }
    }

    // Catalog lookups

    async fn find(&mut self, query: &str, out: &mut Response) -> Result<()> {
        if query.is_empty() {
            return Err(ShellError::usage("Usage: f <search term>").into());
        }

        let result = self.tmdb.search_multi(query, false).await?;
        tracing::debug!("{} results for '{}'", result.total_results, query);
        list_search(&result, out);
        self.nav = self.nav.with_search(result);
        Ok(())
    }

    /// Loose search, first result
    async fn search_first(&self, query: &str) -> Result<(MediaItem, SearchResult)> {
        let result = self.tmdb.search_multi(query, true).await?;
        let first = result
            .items
            .first()
            .cloned()
            .ok_or_else(|| ShellError::not_found(format!("No results found for '{}'.", query)))?;
        Ok((first, result))
    }

    /// Resolve a single segment against the active search, or search for it.
    ///
    /// Returns the item and the new search result when one was made.
    async fn pick(&self, target: &Target) -> Result<(MediaItem, Option<SearchResult>)> {
        if let Some(search) = self.nav.search() {
            match target {
                Target::Index(index, _) => {
                    let item = search.get(*index as usize).cloned().ok_or_else(|| {
                        ShellError::not_found(format!("Invalid index: {}", index))
                    })?;
                    return Ok((item, None));
                }
                Target::Name(name) => {
                    if let Some(item) = find_by_title(search, name) {
                        return Ok((item.clone(), None));
                    }
                }
            }
        }

        let (item, result) = self.search_first(target.text()).await?;
        Ok((item, Some(result)))
    }

    /// Resolve the show segment of a `show/season` path
    async fn resolve_show(&self, name: &str) -> Result<(MediaItem, Option<SearchResult>)> {
        let wanted = normalize_title(name);

        if let Some(current) = self.nav.media() {
            if normalize_title(&current.title) == wanted {
                return Ok((current.clone(), None));
            }
        }
        if let Some(item) = self.nav.search().and_then(|s| find_by_title(s, name)) {
            return Ok((item.clone(), None));
        }

        let (item, result) = self.search_first(name).await?;
        Ok((item, Some(result)))
    }

    async fn fetch_season(&self, show_id: u64, number: u32) -> Result<Season> {
        match self.tmdb.season_details(show_id, number).await {
            Ok(season) => Ok(season),
            Err(ApiError::NotFound) => {
                Err(ShellError::not_found(format!("Season {} not found.", number)).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The season and episode after `episode`, rolling into the next season
    async fn advance(&self, show: &MediaItem, season: Season, episode: u32) -> Result<(Season, u32)> {
        if !season.is_empty() && episode >= season.len() {
            tracing::debug!("{} season {} finished", show.title, season.number);
            let next = self.fetch_season(show.id, season.number + 1).await?;
            Ok((next, 1))
        } else {
            Ok((season, episode + 1))
        }
    }

    /// Base state for a commit, with the search replaced if a new one was made
    fn base_state(&self, search: Option<SearchResult>) -> NavigationState {
        match search {
            Some(search) => self.nav.with_search(search),
            None => self.nav.clone(),
        }
    }

    fn history_entry(&self, index: u32) -> Result<Option<WatchProgress>> {
        if self.nav.search().is_some() {
            return Ok(None);
        }

        let entries = WatchHistory::new(&self.store).list()?;
        if entries.is_empty() {
            return Ok(None);
        }

        index
            .checked_sub(1)
            .and_then(|i| entries.get(i as usize).cloned())
            .map(Some)
            .ok_or_else(|| ShellError::not_found(format!("Invalid history index: {}", index)).into())
    }

    // cd

    async fn cd(&mut self, argument: &str) -> Result<()> {
        match Address::parse(argument)? {
            None => self.nav = self.nav.to_root(),
            Some(Address::Up) => self.nav = self.nav.pop(),
            Some(Address::Index(index)) => self.cd_single(Target::index(index, argument)).await?,
            Some(Address::Name(name)) => self.cd_single(Target::Name(name)).await?,
            Some(Address::Path(segments)) => self.cd_path(&segments).await?,
        }
        Ok(())
    }

    async fn cd_single(&mut self, target: Target) -> Result<()> {
        match self.nav.location() {
            Location::Season { .. } => Err(ShellError::invalid_state(
                "You are currently in a season. Use 'cd ..' to go back to the parent directory.",
            )
            .into()),
            Location::Media(item) if !item.is_tv() => Err(ShellError::invalid_state(
                "A movie is selected. Use 'cd ..' to go back to the parent directory.",
            )
            .into()),
            Location::Media(show) => {
                let Target::Index(number, _) = target else {
                    return Err(ShellError::usage("Invalid season index: cd <season index>").into());
                };
                let show = show.clone();
                let season = self.fetch_season(show.id, number).await?;
                self.nav = self.nav.enter_season(show, season, None)?;
                Ok(())
            }
            Location::Root => {
                if let Target::Index(index, _) = &target {
                    if let Some(progress) = self.history_entry(*index)? {
                        let show = history_show(&progress);
                        let season = self.fetch_season(show.id, progress.season_number).await?;
                        self.nav = self.nav.to_root().enter_season(
                            show,
                            season,
                            Some(progress.episode_number),
                        )?;
                        return Ok(());
                    }
                }

                let (item, search) = self.pick(&target).await?;
                self.nav = self.base_state(search).select(item);
                Ok(())
            }
        }
    }

    async fn cd_path(&mut self, segments: &[String]) -> Result<()> {
        let season_number = path_number(&segments[1])?;

        let (show, search, episode) = if segments.len() == 3 {
            let episode = path_number(&segments[2])?;
            let (show, result) = self.search_first(&segments[0]).await?;
            (show, Some(result), Some(episode))
        } else {
            let (show, search) = self.resolve_show(&segments[0]).await?;
            (show, search, None)
        };

        require_show(&show)?;
        let season = self.fetch_season(show.id, season_number).await?;
        self.nav = self.base_state(search).enter_season(show, season, episode)?;
        Ok(())
    }

    // play

    async fn play(&mut self, argument: &str, out: &mut Response) -> Result<()> {
        match Address::parse(argument)? {
            None => self.play_current(out).await,
            Some(Address::Up) => Err(ShellError::usage("Usage: p [<index>|<path>]").into()),
            Some(Address::Index(index)) => {
                self.play_single(Target::index(index, argument), out).await
            }
            Some(Address::Name(name)) => self.play_single(Target::Name(name), out).await,
            Some(Address::Path(segments)) => self.play_path(&segments, out).await,
        }
    }

    async fn play_current(&mut self, out: &mut Response) -> Result<()> {
        match self.nav.location().clone() {
            Location::Root => Err(ShellError::usage(
                "No media selected... Use 'f' to search for media.",
            )
            .into()),
            Location::Media(item) if !item.is_tv() => self.play_movie(item, None, out).await,
            Location::Media(show) => self.play_episode(show, 1, 1, None, out).await,
            Location::Season { show, season } => {
                let episode = self.nav.episode().unwrap_or(1);
                self.play_in_season(show, season, episode, None, out).await
            }
        }
    }

    async fn play_single(&mut self, target: Target, out: &mut Response) -> Result<()> {
        match (self.nav.location().clone(), &target) {
            (Location::Season { show, season }, Target::Index(episode, _)) => {
                self.play_in_season(show, season, *episode, None, out).await
            }
            (Location::Season { .. }, Target::Name(_)) => {
                Err(ShellError::usage("Usage: p <episode number>").into())
            }
            (Location::Media(show), Target::Index(season, _)) if show.is_tv() => {
                self.play_episode(show, *season, 1, None, out).await
            }
            (Location::Media(show), Target::Name(_)) if show.is_tv() => Err(ShellError::usage(
                "Usage: p <season number>",
            )
            .into()),
            _ => {
                if let Target::Index(index, _) = &target {
                    if let Some(progress) = self.history_entry(*index)? {
                        let show = history_show(&progress);
                        return self.resume(show, &progress, 1, None, out).await;
                    }
                }

                let (item, search) = self.pick(&target).await?;
                if item.is_tv() {
                    self.play_episode(item, 1, 1, search, out).await
                } else {
                    self.play_movie(item, search, out).await
                }
            }
        }
    }

    async fn play_path(&mut self, segments: &[String], out: &mut Response) -> Result<()> {
        let season = path_number(&segments[1])?;

        let (show, search, episode) = if segments.len() == 3 {
            let episode = path_number(&segments[2])?;
            let (show, result) = self.search_first(&segments[0]).await?;
            (show, Some(result), episode)
        } else {
            let (show, search) = self.resolve_show(&segments[0]).await?;
            (show, search, 1)
        };

        require_show(&show)?;
        self.play_episode(show, season, episode, search, out).await
    }

    async fn play_movie(
        &mut self,
        movie: MediaItem,
        search: Option<SearchResult>,
        out: &mut Response,
    ) -> Result<()> {
        let ResolvedUrl { url, provider } =
            self.providers.resolve_movie(&self.tmdb, movie.id).await?;

        tracing::info!("Playing {} via {}", movie.title, provider);
        out.line(format!("Playing: {}", movie.title));
        out.effect = Some(Effect::Play(PlayRequest {
            url: url.clone(),
            title: movie.title.clone(),
            provider,
        }));

        self.nav = self.base_state(search).select(movie);
        self.current_url = Some(url);
        Ok(())
    }

    async fn play_episode(
        &mut self,
        show: MediaItem,
        season: u32,
        episode: u32,
        search: Option<SearchResult>,
        out: &mut Response,
    ) -> Result<()> {
        let season = self.fetch_season(show.id, season).await?;
        self.play_in_season(show, season, episode, search, out).await
    }

    /// Resolve and play; navigation and history change only on success
    async fn play_in_season(
        &mut self,
        show: MediaItem,
        season: Season,
        episode: u32,
        search: Option<SearchResult>,
        out: &mut Response,
    ) -> Result<()> {
        if !season.is_empty() && (episode == 0 || episode > season.len()) {
            return Err(ShellError::not_found(format!(
                "Episode {} not found in Season {}.",
                episode, season.number
            ))
            .into());
        }

        let season_number = season.number;
        let next_state = self
            .base_state(search)
            .enter_season(show.clone(), season, None)?
            .with_episode(episode);

        let ResolvedUrl { url, provider } = self
            .providers
            .resolve_episode(&self.tmdb, show.id, season_number, episode)
            .await?;

        WatchHistory::new(&self.store).record(show.id, season_number, episode, &show.title)?;

        tracing::info!(
            "Playing {} S{}E{} via {}",
            show.title,
            season_number,
            episode,
            provider
        );
        out.line(format!(
            "Playing: {} S{} E{}",
            show.title, season_number, episode
        ));
        out.effect = Some(Effect::Play(PlayRequest {
            url: url.clone(),
            title: format!("{} S{}E{}", show.title, season_number, episode),
            provider,
        }));

        self.nav = next_state;
        self.current_url = Some(url);
        Ok(())
    }

    async fn resume(
        &mut self,
        show: MediaItem,
        progress: &WatchProgress,
        offset: u32,
        search: Option<SearchResult>,
        out: &mut Response,
    ) -> Result<()> {
        let season = self.fetch_season(show.id, progress.season_number).await?;
        let (season, episode) = if offset > 0 {
            self.advance(&show, season, progress.episode_number).await?
        } else {
            (season, progress.episode_number)
        };
        self.play_in_season(show, season, episode, search, out).await
    }

    // n, l, ln

    async fn play_next(&mut self, out: &mut Response) -> Result<()> {
        match (self.nav.location().clone(), self.nav.episode()) {
            (Location::Media(item), _) if !item.is_tv() => {
                out.line("Movies have no next episode.");
                Ok(())
            }
            (Location::Season { show, season }, Some(episode)) => {
                let (season, episode) = self.advance(&show, season, episode).await?;
                self.play_in_season(show, season, episode, None, out).await
            }
            _ => Err(ShellError::invalid_state("I do not know which episode was your last.").into()),
        }
    }

    async fn play_last(&mut self, offset: u32, out: &mut Response) -> Result<()> {
        let history = WatchHistory::new(&self.store);

        match self.nav.media().cloned() {
            Some(item) if !item.is_tv() => {
                Err(ShellError::invalid_state("Current media is not a TV show.").into())
            }
            Some(show) => {
                let progress = history
                    .find_by_show(show.id)?
                    .ok_or_else(|| ShellError::not_found("No watch history found for this show."))?;
                self.resume(show, &progress, offset, None, out).await
            }
            None => {
                let progress = history
                    .latest()?
                    .ok_or_else(|| ShellError::not_found(NO_HISTORY))?;

                let result = self.tmdb.search_multi(&progress.show_name, true).await?;
                let show = result
                    .items
                    .iter()
                    .find(|item| item.same_as(MediaType::Tv, progress.show_id))
                    .or_else(|| result.items.iter().find(|item| item.is_tv()))
                    .cloned()
                    .ok_or_else(|| {
                        ShellError::not_found(format!("Could not find '{}'.", progress.show_name))
                    })?;

                self.resume(show, &progress, offset, Some(result), out).await
            }
        }
    }

    // ls

    async fn list(&mut self, out: &mut Response) -> Result<()> {
        match self.nav.location() {
            Location::Root => {
                let trending = self.tmdb.trending().await?;
                list_search(&trending, out);
                self.nav = self.nav.with_search(trending);
            }
            Location::Media(item) if !item.is_tv() => {
                return Err(ShellError::invalid_state("Selected media is not a TV show.").into());
            }
            Location::Media(show) => {
                let details = self.tmdb.show_details(show.id).await?;
                tracing::debug!(
                    "{} ({}) has {} seasons",
                    details.name,
                    details.id,
                    details.number_of_seasons
                );
                for number in 1..=details.number_of_seasons {
                    out.line(format!("{}. Season {}", number, number));
                }
            }
            Location::Season { season, .. } => {
                for episode in &season.episodes {
                    out.line(format!("Episode {}: {}", episode.number, episode.name));
                }
            }
        }
        Ok(())
    }

    // d, hs, pr

    async fn download(&self, argument: &str, out: &mut Response) -> Result<()> {
        let name = if argument.is_empty() { "Media" } else { argument };
        out.line(format!("Downloading {}...", name));

        let (low, high) = self.download_delay_ms;
        let delay = rand::rng().random_range(low..=high);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        out.line(format!(
            "An error occurred while downloading {}: {}",
            name, DOWNLOAD_FAILURE
        ));
        Ok(())
    }

    fn show_history(&self, out: &mut Response) -> Result<()> {
        let entries = WatchHistory::new(&self.store).list()?;
        if entries.is_empty() {
            out.line(NO_HISTORY);
            return Ok(());
        }

        out.line("Watch History:");
        out.line("-------------");
        for (i, progress) in entries.iter().enumerate() {
            let mut line = format!(
                "{}. {}: Season {}, Episode {}",
                i + 1,
                progress.show_name,
                progress.season_number,
                progress.episode_number
            );
            if let Some(age) = progress.watched_at_display() {
                line.push_str(&format!(" ({})", age));
            }
            out.line(line);
        }
        Ok(())
    }

    fn provider(&mut self, argument: &str, out: &mut Response) -> Result<()> {
        if argument.is_empty() {
            let current = self.providers.current_index();
            for (i, provider) in self.providers.iter().enumerate() {
                out.line(format!(
                    "{}: {} [{}]{}",
                    i + 1,
                    provider.name(),
                    provider.capability(),
                    if i == current { " (current)" } else { "" }
                ));
            }
            return Ok(());
        }

        let out_of_range = || {
            ShellError::usage(
                ProviderError::OutOfRange {
                    count: self.providers.count(),
                }
                .to_string(),
            )
        };
        let index = argument
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(out_of_range)?;

        let name = self
            .providers
            .select(index)
            .map_err(|e| ShellError::usage(e.to_string()))?
            .name();
        self.store.put(PROVIDER_KEY, &index)?;

        out.line(format!("Video provider set to: {}", name));
        Ok(())
    }
}

/// Search, listed the way `f` and `ls` print it
fn list_search(result: &SearchResult, out: &mut Response) {
    if result.is_empty() {
        out.line("No results found.");
        return;
    }

    for (i, item) in result.items.iter().enumerate() {
        out.line(format!("{}. {} ({})", i + 1, item.title, item.kind));
    }
    if result.has_more_pages() {
        out.line("...");
    }
}

fn find_by_title<'a>(search: &'a SearchResult, name: &str) -> Option<&'a MediaItem> {
    let wanted = normalize_title(name);
    search
        .items
        .iter()
        .find(|item| normalize_title(&item.title) == wanted)
}

fn require_show(item: &MediaItem) -> Result<()> {
    if item.is_tv() {
        Ok(())
    } else {
        Err(ShellError::invalid_state(format!("'{}' is not a TV show.", item.title)).into())
    }
}

/// A show rebuilt from its history entry
fn history_show(progress: &WatchProgress) -> MediaItem {
    MediaItem {
        id: progress.show_id,
        kind: MediaType::Tv,
        title: progress.show_name.clone(),
        overview: String::new(),
        rating: 0.0,
        year: None,
    }
}
