//! Command-line argument parsing for Earthie
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Earthie - knowledge-grounded chat companion for Earth2
#[derive(Parser, Debug)]
#[command(name = "earthie")]
#[command(version)]
#[command(about = "Chat with an Earth2 companion grounded in a local knowledge base", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Knowledge cache file (overrides config)
    #[arg(long, global = true)]
    pub cache: Option<PathBuf>,

    /// Generation model (overrides config)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Working directory used to resolve relative paths
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question
    Ask {
        /// The question
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// Additional context appended after the knowledge base
        #[arg(long)]
        context: Option<String>,
    },

    /// Start an interactive chat session
    Start,

    /// Answer a chat API request (JSON) from a file or stdin
    Api {
        /// Request file; reads stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Show knowledge cache statistics
    Knowledge,

    /// Run configuration and connectivity checks
    Doctor,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Get working directory (current dir if not specified)
    pub fn working_dir(&self) -> PathBuf {
        self.cwd.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        })
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Parse the config file spelling
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quiet" => Some(Verbosity::Quiet),
            "normal" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            "very_verbose" => Some(Verbosity::VeryVerbose),
            _ => None,
        }
    }

    /// Default tracing filter directive for this level
    pub fn log_level(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show a spinner while waiting
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let args = Args::parse_from(["earthie", "ask", "how to make a jewel", "--context", "owns 10 tiles"]);
        match args.command {
            Commands::Ask { message, context } => {
                assert_eq!(message, "how to make a jewel");
                assert_eq!(context.as_deref(), Some("owns 10 tiles"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verbosity_flags() {
        let args = Args::parse_from(["earthie", "-vv", "doctor"]);
        assert_eq!(args.verbosity(), Verbosity::VeryVerbose);

        let args = Args::parse_from(["earthie", "knowledge", "--quiet"]);
        assert_eq!(args.verbosity(), Verbosity::Quiet);

        let args = Args::parse_from(["earthie", "start"]);
        assert_eq!(args.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_global_overrides() {
        let args = Args::parse_from(["earthie", "api", "--cache", "/tmp/kb.json", "--model", "gemini-pro"]);
        assert_eq!(args.cache, Some(PathBuf::from("/tmp/kb.json")));
        assert_eq!(args.model.as_deref(), Some("gemini-pro"));
    }

    #[test]
    fn test_verbosity_names_roundtrip() {
        for v in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::VeryVerbose,
        ] {
            assert_eq!(Verbosity::from_name(v.as_str()), Some(v));
        }
        assert_eq!(Verbosity::from_name("loud"), None);
    }
}
