//! Configuration for ycnc.
//!
//! TOML files, layered (later overrides earlier):
//! - `config.toml` in the user config dir (`YCNC_CONFIG_DIR` or the platform
//!   default `ycnc/` directory)
//! - `./ycnc.toml` (project-local)
//!
//! Each `[section]` present in a later layer replaces the earlier one whole.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_with_options, read_config_file,
    user_config_dir, user_config_path, write_config_file,
};
pub use error::{ConfigError, Result};
pub use types::*;
