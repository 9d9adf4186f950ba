//! QC Configuration Module
//!
//! Tolerances, simulator flavour and engine options loaded from TOML files.
//! The engine itself never reads global state: a [`QcConfig`] is loaded once
//! by the caller and handed to [`crate::engine::QcEngine::new`].
//!
//! ## Loading Order
//!
//! 1. An explicit path (the `--config` CLI flag)
//! 2. `SWATINIT_QC_CONFIG` environment variable (path to TOML file)
//! 3. `swatinit_qc.toml` in the current working directory
//! 4. Built-in defaults
//!
//! ## Usage
//!
//! ```ignore
//! let config = QcConfig::load(None);
//! let engine = QcEngine::new(&config);
//! ```

mod qc_config;
pub mod defaults;
pub mod validation;

pub use qc_config::*;
