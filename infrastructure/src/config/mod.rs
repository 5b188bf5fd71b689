//! Configuration loading and registry bootstrap

mod bootstrap;
mod file_config;
mod loader;

pub use bootstrap::{Bootstrap, BootstrapError, bootstrap};
pub use file_config::{FileCircleConfig, FileConfig, FileEntityConfig, FileLoggingConfig};
pub use loader::ConfigLoader;
