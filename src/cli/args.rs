use clap::{Parser, Subcommand};

/// ratflix - browse TMDB and stream through embed providers from a terminal shell
#[derive(Parser)]
#[command(name = "ratflix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Keep history and settings in memory for this session only
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prompt for the TMDB API key and save it
    Init,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set a config value (format: key=value)
        #[arg(long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },

    /// Run shell lines without the full-screen console
    #[command(alias = "x")]
    Exec {
        /// Lines to run in order, e.g. "f breaking bad" "p 1/1/1"
        #[arg(required = true)]
        lines: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exec_lines() {
        let cli = Cli::try_parse_from(["ratflix", "exec", "f matrix", "p 1", "--ephemeral"]).unwrap();
        assert!(cli.ephemeral);
        match cli.command {
            Some(Commands::Exec { lines }) => assert_eq!(lines, vec!["f matrix", "p 1"]),
            _ => panic!("expected exec"),
        }
    }

    #[test]
    fn test_exec_requires_lines() {
        assert!(Cli::try_parse_from(["ratflix", "exec"]).is_err());
    }

    #[test]
    fn test_no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["ratflix"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.ephemeral);
    }
}
