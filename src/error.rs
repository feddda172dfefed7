use thiserror::Error;

/// Application-wide result type
pub type Result<T> = anyhow::Result<T>;

/// Catalog API errors with typed variants for matching
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("TMDB API error: {0}")]
    Tmdb(String),

    #[error("TMDB resource not found")]
    NotFound,

    #[error("TMDB rejected the API key. Run 'ratflix config --set tmdb_api_key=<key>'.")]
    Unauthorized,

    #[error("No IMDb id is known for TMDB {kind} {id}")]
    ExternalIdNotFound { kind: String, id: u64 },

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(reqwest::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err)
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    Invalid(String),

    #[error("TMDB API key is required. Set TMDB_API_KEY or run 'ratflix config --set tmdb_api_key=<key>'.")]
    MissingApiKey,

    #[error("Failed to save config: {0}")]
    SaveFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Player errors
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Opener '{0}' not found. Install it or configure a different player command.")]
    NotFound(String),

    #[error("Opener exited with error: {0}")]
    ExitError(String),

    #[error("Failed to launch opener: {0}")]
    LaunchFailed(String),
}

/// Provider registry errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Invalid provider index. Please choose between 1 and {count}")]
    OutOfRange { count: usize },

    #[error("Unknown provider '{0}'")]
    UnknownKey(String),
}

/// Errors a shell command reports inline without aborting the session.
///
/// Anything that is not a `ShellError` is rendered as `Error: <message>`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShellError {
    /// Missing or malformed argument
    #[error("{0}")]
    Usage(String),

    /// Empty search, index out of range, no history
    #[error("{0}")]
    NotFound(String),

    /// Command does not apply to the current location
    #[error("{0}")]
    InvalidState(String),
}

impl ShellError {
    pub fn usage(msg: impl Into<String>) -> Self {
        ShellError::Usage(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ShellError::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        ShellError::InvalidState(msg.into())
    }
}
