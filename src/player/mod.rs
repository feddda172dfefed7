use std::process::{Command, Stdio};

use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::shell::PlayRequest;

/// Opens embed URLs with an external program (browser opener by default)
pub struct Player {
    config: PlayerConfig,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self { config }
    }

    /// Check if the configured opener is available in PATH
    pub fn is_available(&self) -> bool {
        which::which(&self.config.command).is_ok()
    }

    pub fn command(&self) -> &str {
        &self.config.command
    }

    /// Open a play request without blocking the console
    pub fn open(&self, request: &PlayRequest) -> Result<(), PlayerError> {
        tracing::info!("Opening {} ({})", request.title, request.provider);
        self.open_url(&request.url)
    }

    pub fn open_url(&self, url: &str) -> Result<(), PlayerError> {
        if !self.is_available() {
            return Err(PlayerError::NotFound(self.config.command.clone()));
        }

        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args).arg(url);

        // Keep the opener off the terminal the console is drawing on
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        tracing::debug!("Launching opener: {} {}", self.config.command, url);

        let mut child = cmd
            .spawn()
            .map_err(|e| PlayerError::LaunchFailed(e.to_string()))?;

        let command = self.config.command.clone();
        std::thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                let err = PlayerError::ExitError(match status.code() {
                    Some(code) => format!("Exit code: {}", code),
                    None => "terminated by signal".to_string(),
                });
                tracing::warn!("{}: {}", command, err);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to wait for {}: {}", command, e),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(command: &str) -> Player {
        Player::new(PlayerConfig {
            command: command.to_string(),
            args: Vec::new(),
        })
    }

    #[test]
    fn test_missing_opener() {
        let player = player("ratflix-no-such-opener");
        assert!(!player.is_available());

        let request = PlayRequest {
            url: "https://vidsrc.xyz/embed/movie?tmdb=603".to_string(),
            title: "The Matrix".to_string(),
            provider: "VidSrc",
        };
        assert!(matches!(
            player.open(&request),
            Err(PlayerError::NotFound(cmd)) if cmd == "ratflix-no-such-opener"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawns_opener() {
        let player = player("true");
        if player.is_available() {
            assert!(player.open_url("https://example.com").is_ok());
        }
    }
}
