//! Application constants and configuration defaults
//!
//! Centralized location for magic strings and default values

/// Storage configuration
pub mod storage {
    /// Source label recorded when the caller does not supply one
    pub const DEFAULT_SOURCE: &str = "agent";

    /// Data directory name (under the user's home directory)
    pub const DATA_DIR_NAME: &str = ".wellness";

    /// Database file name inside the data directory
    pub const DB_FILE_NAME: &str = "wellness.db";
}
