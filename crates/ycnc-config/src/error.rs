//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and editing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write a config file.
    #[error("failed to write config file '{path}': {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Channel entry is not a handle.
    #[error("invalid channel handle '{0}': handles start with '@'")]
    InvalidHandle(String),

    /// Channel is already in the allow-list.
    #[error("channel '{0}' is already listed")]
    DuplicateHandle(String),

    /// No user config directory could be determined.
    #[error("no config directory available; set YCNC_CONFIG_DIR")]
    NoConfigDir,
}
