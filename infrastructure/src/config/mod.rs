//! Configuration file loading for polychat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `POLYCHAT_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./polychat.toml` or `./.polychat.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/polychat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileChatConfig, FileConfig, FileJournalConfig, FileOutputConfig, FileOutputFormat,
    FileSearchConfig, FileServerConfig,
};
pub use loader::ConfigLoader;
