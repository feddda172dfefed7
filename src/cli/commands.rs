use std::io::{self, Write};

use crate::api::TmdbClient;
use crate::config::{config_path, load_config, save_config, Config};
use crate::error::{ConfigError, Result};
use crate::player::Player;
use crate::providers::ProviderRegistry;
use crate::shell::Interpreter;
use crate::store::Store;
use crate::ui::App;

const CONFIG_KEYS: &str = "tmdb_api_key, player_command, provider";

/// Prompt for the TMDB API key and save it
pub async fn init() -> Result<()> {
    let config_exists = config_path().exists();

    if config_exists {
        print!("Configuration already exists. Overwrite? [y/N]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Setup cancelled.");
            return Ok(());
        }
    }

    println!("Get a free API key at https://www.themoviedb.org/settings/api");
    print!("TMDB API key: ");
    io::stdout().flush()?;

    let mut key = String::new();
    io::stdin().read_line(&mut key)?;
    let key = key.trim();

    if key.is_empty() {
        println!("\nSetup cancelled.");
        return Ok(());
    }

    let config = match load_config() {
        Ok(mut config) => {
            config.tmdb.api_key = key.to_string();
            config
        }
        Err(e) => {
            tracing::warn!("Replacing unreadable config: {}", e);
            Config::new(key.to_string())
        }
    };
    save_config(&config)?;

    println!("\nSaved to {}. Run 'ratflix' to start watching.", config_path().display());
    Ok(())
}

/// Apply one `key=value` pair from `config --set`
fn apply_setting(config: &mut Config, key: &str, value: &str) -> std::result::Result<(), String> {
    match key {
        "tmdb_api_key" => config.tmdb.api_key = value.to_string(),
        "player_command" => config.player.command = value.to_string(),
        "provider" => {
            ProviderRegistry::builtin()
                .select_key(value)
                .map_err(|e| e.to_string())?;
            config.shell.provider = value.to_string();
        }
        _ => return Err(format!("Unknown key: {}", key)),
    }
    Ok(())
}

fn masked(key: &str) -> String {
    if key.is_empty() {
        "(not configured)".to_string()
    } else {
        format!("\"{}...\"", key.chars().take(8).collect::<String>())
    }
}

/// Handle the config command
pub async fn config(show: bool, set: Option<String>, reset: bool) -> Result<()> {
    if reset {
        if config_path().exists() {
            std::fs::remove_file(config_path())?;
            println!("Configuration reset. Run 'ratflix init' to set up again.");
        } else {
            println!("No configuration file found.");
        }
        return Ok(());
    }

    if let Some(key_value) = set {
        let Some((key, value)) = key_value.split_once('=') else {
            println!("Invalid format. Use: --set key=value");
            println!("Available keys: {}", CONFIG_KEYS);
            return Ok(());
        };

        let mut config = load_config().unwrap_or_default();
        if let Err(message) = apply_setting(&mut config, key.trim(), value.trim()) {
            println!("{}", message);
            println!("Available keys: {}", CONFIG_KEYS);
            return Ok(());
        }

        save_config(&config)?;
        println!("Configuration updated.");
        return Ok(());
    }

    if show {
        match load_config() {
            Ok(config) => {
                println!("Configuration file: {}\n", config_path().display());
                println!("[tmdb]");
                println!("api_key = {}", masked(&config.tmdb.api_key));
                println!("base_url = \"{}\"", config.tmdb.base_url);
                println!("timeout_secs = {}", config.tmdb.timeout_secs);
                println!("\n[player]");
                println!("command = \"{}\"", config.player.command);
                println!("args = {:?}", config.player.args);
                println!("\n[shell]");
                println!("provider = \"{}\"", config.shell.provider);
                println!("download_delay_ms = {:?}", config.shell.download_delay_ms);
            }
            Err(e) => {
                println!("Error: {}", e);
            }
        }
        return Ok(());
    }

    // Default: show help
    println!("Usage: ratflix config [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --show         Show current configuration");
    println!("  --set KEY=VAL  Set a configuration value");
    println!("  --reset        Reset configuration to defaults");
    println!();
    println!("Available keys for --set:");
    println!("  tmdb_api_key    TMDB API key");
    println!("  player_command  Command that opens stream URLs");
    println!("  provider        Default provider key (e.g. vidsrc, embed-su)");

    Ok(())
}

fn open_store(ephemeral: bool) -> Result<Store> {
    if ephemeral {
        Store::open_in_memory()
    } else {
        Store::open()
    }
}

fn interpreter(config: &Config, ephemeral: bool) -> Result<Interpreter> {
    if !config.has_api_key() {
        return Err(ConfigError::MissingApiKey.into());
    }
    let tmdb = TmdbClient::from_config(config);
    Ok(Interpreter::new(tmdb, open_store(ephemeral)?, &config.shell))
}

/// Run shell lines one after another, printing their output
pub async fn exec(lines: Vec<String>, ephemeral: bool) -> Result<()> {
    let config = load_config()?;
    let mut interpreter = interpreter(&config, ephemeral)?;
    let player = Player::new(config.player.clone());

    for line in lines {
        let response = interpreter.interpret(&line).await;
        if response.is_empty() {
            continue;
        }
        for output in &response.lines {
            println!("{}", output);
        }

        if let Some(request) = response.play_request() {
            if let Err(e) = player.open(request) {
                eprintln!("Error: {}", e);
            }
        }
    }

    Ok(())
}

/// Run interactive mode (default)
pub async fn interactive(ephemeral: bool) -> Result<()> {
    let config = load_config()?;

    if !config.has_api_key() {
        println!("No TMDB API key configured. Running setup...\n");
        init().await?;
        return Ok(());
    }

    let interpreter = interpreter(&config, ephemeral)?;
    let player = Player::new(config.player.clone());

    let mut app = App::new(interpreter, player);
    app.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_setting() {
        let mut config = Config::default();
        apply_setting(&mut config, "tmdb_api_key", "abc123").unwrap();
        apply_setting(&mut config, "player_command", "firefox").unwrap();
        apply_setting(&mut config, "provider", "embed-su").unwrap();

        assert_eq!(config.tmdb.api_key, "abc123");
        assert_eq!(config.player.command, "firefox");
        assert_eq!(config.shell.provider, "embed-su");
    }

    #[test]
    fn test_apply_setting_rejects_unknown() {
        let mut config = Config::default();
        assert_eq!(
            apply_setting(&mut config, "theme", "dark").unwrap_err(),
            "Unknown key: theme"
        );
        assert!(apply_setting(&mut config, "provider", "nope").is_err());
        assert_eq!(config.shell.provider, Config::default().shell.provider);
    }

    #[test]
    fn test_masked() {
        assert_eq!(masked(""), "(not configured)");
        assert_eq!(masked("0123456789abcdef"), "\"01234567...\"");
    }

    #[test]
    fn test_interpreter_requires_key() {
        let err = interpreter(&Config::default(), true).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingApiKey)
        ));
    }
}
