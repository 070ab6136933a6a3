//! Rigg Config provides a registry of configs that can be injected in the rest of the
//! application through a Rigg DI [Container](rigg_di::Container).
//!
//! Rigg Config is split into two major parts:
//! 1. ConfigProvider: Used to create the registry of all configs
//! 2. Config<T>: A wrapper type to be able to resolve and retrieve configs
//!
//! # Examples
//!
//! ```rust
//! use rigg_config::{ConfigError, ConfigProvider};
//!
//! #[derive(Clone)]
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! fn setup_config() -> Result<(), ConfigError> {
//!     let app_config = AppConfig {
//!         host: "localhost".to_string(),
//!         port: 8080_u16,
//!     };
//!
//!     let mut config_provider = ConfigProvider::default();
//!     config_provider.add_config(app_config.clone())?;
//!
//!     let retrieved_config = config_provider.require_config::<AppConfig>()?;
//!
//!     assert_eq!(app_config.host, retrieved_config.host);
//!     assert_eq!(app_config.port, retrieved_config.port);
//!     Ok(())
//! }
//!
//! setup_config().unwrap();
//! ```
//!
//! Rigg Config consists of the following components:
//!
//! 1. Config - for injecting a config and handling resolution
//! 2. Provider - for creating a registry of configs, adding and retrieving configs
//! 3. Errors - for config errors

pub mod config;
pub mod errors;
pub mod provider;

pub use config::Config;
pub use errors::ConfigError;
pub use provider::ConfigProvider;
