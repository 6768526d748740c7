#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::{
    AppConfig, ExportConfig, LogFormat, LoggingConfig, MetadataConfig, StorageConfig,
    DEFAULT_CONFIG_FILE,
};
