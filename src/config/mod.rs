//! Configuration module for icon-layout
//!
//! Settings are read once at startup and handed to each component when it is
//! constructed; nothing here is global.

pub mod settings;

pub use settings::{AppConfig, ConfigError};
