//! CLI command definitions and parsing
use crate::query::SearchType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "namesearch",
    version,
    author = "neur0map",
    about = "Nickname-aware name search over a document index",
    long_about = "Namesearch expands a queried name into nickname and spelling variants with a \
                  language model, composes a filtered full-syntax query over the variants and \
                  normalizes the index hits into client-facing summaries."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/namesearch/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Configuration profile to apply
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a request and print the index request it would produce
    Plan {
        /// Name to search for
        query: String,

        /// Application/county scope identifier
        #[arg(short, long)]
        scope: Option<String>,

        /// Restrict to a record kind (e.g. "I" or "B")
        #[arg(short, long)]
        field: Option<String>,

        /// Date field the date filter applies to
        #[arg(long)]
        date_field: Option<String>,

        /// Relative date range ("today", "last week", "last 30 days")
        #[arg(short, long)]
        date: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value = "1", allow_negative_numbers = true)]
        page: i64,

        /// Results per page
        #[arg(long, default_value = "10", allow_negative_numbers = true)]
        page_size: i64,

        /// keyword, semantic_hybrid or vector
        #[arg(short = 't', long, default_value = "semantic_hybrid")]
        search_type: SearchType,
    },

    /// Normalize raw index hits from a JSON file into result summaries
    Normalize {
        /// File holding an index response or an array of hits
        file: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_arguments() {
        let cli = Cli::try_parse_from([
            "namesearch",
            "plan",
            "jon",
            "--scope",
            "42",
            "--date",
            "last 7 days",
            "--page-size",
            "25",
            "-t",
            "keyword",
        ])
        .unwrap();

        match cli.command {
            Commands::Plan {
                query,
                scope,
                date,
                page,
                page_size,
                search_type,
                ..
            } => {
                assert_eq!(query, "jon");
                assert_eq!(scope.as_deref(), Some("42"));
                assert_eq!(date.as_deref(), Some("last 7 days"));
                assert_eq!(page, 1);
                assert_eq!(page_size, 25);
                assert_eq!(search_type, SearchType::Keyword);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_search_type_rejected() {
        let result = Cli::try_parse_from(["namesearch", "plan", "jon", "-t", "fuzzy"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["namesearch", "config", "show", "--verbose", "-p", "fast"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.profile.as_deref(), Some("fast"));
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Show
            }
        ));
    }
}
