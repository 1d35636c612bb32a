//! CLI definitions for PagePilot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// PagePilot CLI.
#[derive(Parser)]
#[command(name = "pagepilot")]
#[command(about = "Structured page capture and verified page actions for browser agents")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.pagepilot/config.toml)
    #[arg(short, long, global = true, env = "PAGEPILOT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Capture an HTML file as PageModel JSON
    Capture {
        /// HTML file, or "-" for stdin
        file: PathBuf,

        /// Base URL for resolving relative links
        #[arg(long)]
        base_url: Option<String>,

        /// Maximum controls to emit (hard cap 400)
        #[arg(long)]
        max_controls: Option<usize>,

        /// Maximum headings to emit
        #[arg(long)]
        max_headings: Option<usize>,

        /// Include non-password field values
        #[arg(long)]
        include_values: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Build the selector map of an HTML file
    SelectorMap {
        /// HTML file, or "-" for stdin
        file: PathBuf,

        /// Base URL recorded in the map metadata
        #[arg(long)]
        base_url: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Run a page action against a live browser over CDP
    Act {
        /// JSON file holding a page_action request or a bare action command
        #[arg(long)]
        action: PathBuf,

        /// DevTools HTTP endpoint (overrides browser.cdp_endpoint)
        #[arg(long, env = "PAGEPILOT_CDP_ENDPOINT")]
        endpoint: Option<String>,

        /// Page id or URL fragment of the tab to act on
        #[arg(long)]
        target: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate the configuration file
    ConfigCheck,
}
