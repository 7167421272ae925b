pub mod config;
pub mod paths;

pub use config::{Config, KeysConfig, StorageConfig};
pub use paths::{base_path_override, PathManager};
