//! itmaths-api — Remote exam backend integrations.
//!
//! Implements the `ExamBackend` trait over the platform's REST API, plus an
//! in-memory mock backend for engine tests and offline practice, and the
//! client configuration loader.

pub mod config;
pub mod mock;
pub mod rest;

pub use config::{load_config, load_config_from, BackendSettings, ItmathsConfig};
pub use mock::MockBackend;
pub use rest::RestBackend;
