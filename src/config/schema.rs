use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub shell: ShellConfig,
}

impl Config {
    /// Create a new config with just the API key, using defaults for everything else
    pub fn new(tmdb_api_key: String) -> Self {
        Self {
            tmdb: TmdbConfig {
                api_key: tmdb_api_key,
                ..TmdbConfig::default()
            },
            ..Config::default()
        }
    }

    /// Check if the config has a TMDB API key
    pub fn has_api_key(&self) -> bool {
        !self.tmdb.api_key.is_empty()
    }
}

/// TMDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Player configuration: the program that opens embed URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Command used to open a URL
    #[serde(default = "default_player_command")]
    pub command: String,

    /// Additional arguments passed before the URL
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            args: Vec::new(),
        }
    }
}

fn default_player_command() -> String {
    if cfg!(target_os = "macos") {
        "open".to_string()
    } else if cfg!(target_os = "windows") {
        "explorer".to_string()
    } else {
        "xdg-open".to_string()
    }
}

/// Shell behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Provider key used until one is picked with `pr`
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Bounds of the simulated download delay, in milliseconds
    #[serde(default = "default_download_delay")]
    pub download_delay_ms: [u64; 2],
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            download_delay_ms: default_download_delay(),
        }
    }
}

fn default_provider() -> String {
    "vidsrc".to_string()
}

fn default_download_delay() -> [u64; 2] {
    [1000, 5000]
}
