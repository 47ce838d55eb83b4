//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// eventscope: OAuth2 credential lifecycle and related-event lookups.
#[derive(Debug, Parser)]
#[command(name = "eventscope", version, about)]
pub struct Cli {
    /// Data directory holding token files and cached events.
    #[arg(long, env = "EVENTSCOPE_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Enable debug logging.
    #[arg(short, long)]
    pub debug: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the authorization URL for a service.
    Login {
        /// Service name (meetup, eventbrite).
        service: String,
    },

    /// Complete the authorization flow with callback parameters.
    Callback {
        /// Service name (meetup, eventbrite).
        service: String,

        /// The authorization code from the callback.
        #[arg(long)]
        code: Option<String>,

        /// The upstream error identifier, when authorization was denied.
        #[arg(long)]
        error: Option<String>,

        /// The upstream error description, when present.
        #[arg(long)]
        error_description: Option<String>,
    },

    /// Show authentication status for one or all services.
    Status {
        /// Service name; omit to show every registered service.
        service: Option<String>,
    },

    /// Delete the stored grant for a service.
    Logout {
        /// Service name (meetup, eventbrite).
        service: String,
    },

    /// Find externally-listed events related to a planned event.
    Find {
        /// Service name (meetup, eventbrite).
        service: String,

        /// Free-text location (city, country).
        #[arg(long)]
        location: String,

        /// Category of the planned event.
        #[arg(long)]
        category: String,

        /// Optional free-text search term.
        #[arg(long)]
        query: Option<String>,

        /// Planned start (RFC 3339 or "YYYY-MM-DD HH:MM").
        #[arg(long)]
        start: Option<String>,

        /// Planned end (RFC 3339 or "YYYY-MM-DD HH:MM").
        #[arg(long)]
        end: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_find_command() {
        let cli = Cli::parse_from([
            "eventscope",
            "find",
            "meetup",
            "--location",
            "Ostrava, Czech Republic",
            "--category",
            "music",
            "--start",
            "2025-07-01 19:00",
        ]);
        match cli.command {
            Command::Find {
                service,
                location,
                category,
                start,
                ..
            } => {
                assert_eq!(service, "meetup");
                assert_eq!(location, "Ostrava, Czech Republic");
                assert_eq!(category, "music");
                assert_eq!(start.as_deref(), Some("2025-07-01 19:00"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
