//! Pipeline Configuration Module
//!
//! Provides the station configuration loaded from TOML files, replacing
//! hardcoded acquisition, statistics and classification constants with
//! operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. Explicit path (the binary's `--config` flag)
//! 2. `PROCWATCH_CONFIG` environment variable (path to TOML file)
//! 3. `procwatch.toml` in the current working directory
//! 4. Built-in defaults
//!
//! A file that is found but cannot be read, parsed or validated is a fatal
//! [`ConfigError`]; there is no silent fallback to defaults.
//!
//! ## Usage
//!
//! ```ignore
//! let config = PipelineConfig::load(None)?;
//! let mut session = AcquisitionLoop::new(transport, &config);
//! ```
//!
//! Components receive the sections they need by reference at construction;
//! there is no global configuration state.

mod pipeline_config;
pub mod defaults;
pub mod validation;

pub use pipeline_config::*;
