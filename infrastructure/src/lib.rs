//! Infrastructure layer for polychat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod gateway;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileChatConfig, FileConfig, FileJournalConfig, FileOutputConfig,
    FileOutputFormat, FileSearchConfig, FileServerConfig,
};
pub use gateway::{HttpSessionGateway, SessionExpiry};
pub use logging::JsonlSyncJournal;
