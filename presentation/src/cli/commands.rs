//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for listings and transcripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormat> for polychat_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => polychat_domain::OutputFormat::Text,
            OutputFormat::Json => polychat_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for polychat
#[derive(Parser, Debug)]
#[command(name = "polychat")]
#[command(author, version, about = "Terminal client for a multi-model chat service")]
#[command(long_about = r#"
polychat keeps a local, optimistic view of your conversations on a
multi-model chat backend (GPT and Claude models).

Messages you send appear immediately and are replaced by the server's copy
once the model replies; if the request fails they are rolled back and the
text is offered again.

Configuration files are loaded from (in priority order):
1. POLYCHAT_* env vars   e.g. POLYCHAT_SERVER__BASE_URL
2. --config <path>       Explicit config file
3. ./polychat.toml       Project-level config
4. ~/.config/polychat/config.toml   Global config

Example:
  polychat list
  polychat send "What's new in Rust 2024?"
  polychat chat 42
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format (overrides [output] format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Backend URL (overrides server.base_url)
    #[arg(long, value_name = "URL", global = true)]
    pub server: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long, global = true)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List conversations, newest first
    List,

    /// Print a conversation with its messages
    Show {
        /// Conversation id
        id: String,
    },

    /// Create a conversation
    New {
        /// Title (the server picks one if omitted)
        #[arg(short, long)]
        title: Option<String>,

        /// Model that answers (defaults to chat.default_model)
        #[arg(short, long, value_name = "MODEL")]
        model: Option<String>,
    },

    /// Rename a conversation
    Rename {
        /// Conversation id
        id: String,
        /// New title
        title: String,
    },

    /// Switch the model that answers in a conversation
    SetModel {
        /// Conversation id
        id: String,
        /// Model id, e.g. claude-3-5-sonnet-20241022
        model: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation id
        id: String,
    },

    /// Search conversation titles and messages
    Search {
        /// Search text
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Send one message and print the reply
    Send {
        /// Conversation id (a new conversation is created if omitted)
        #[arg(short, long, value_name = "ID")]
        chat: Option<String>,

        /// Message text
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },

    /// Interactive chat
    Chat {
        /// Conversation to open first
        id: Option<String>,
    },
}
