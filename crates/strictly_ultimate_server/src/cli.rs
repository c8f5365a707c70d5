//! Command-line interface for strictly_ultimate.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Ultimate - ultimate tic-tac-toe over a move authority
#[derive(Parser, Debug)]
#[command(name = "strictly_ultimate")]
#[command(about = "Ultimate tic-tac-toe with a remote move authority", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true, default_value = "strictly_ultimate.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP move authority
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Play a hot-seat match in the terminal
    Play {
        /// Move authority URL (overrides config and environment)
        #[arg(long, conflicts_with = "local")]
        authority_url: Option<String>,

        /// Use an in-process authority instead of a remote one
        #[arg(long)]
        local: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "strictly_ultimate",
            "play",
            "--local",
            "--authority-url",
            "http://x",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["strictly_ultimate", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Command::Serve { port, host } => {
                assert_eq!(port, Some(9000));
                assert_eq!(host, None);
            }
            Command::Play { .. } => panic!("expected serve"),
        }
        assert_eq!(cli.config, PathBuf::from("strictly_ultimate.toml"));
    }
}
