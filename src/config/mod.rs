// src/config/mod.rs

//! Configuration loading and validation for termrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`), including the strategy
//!   options and their defaults.
//! - Load a run file from disk (`loader.rs`).
//! - Validate the task section and flag odd option combinations (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    HighlightStyle, OnCreateCallback, RawRunFile, RawTaskSection, RunFile, StrategyConfig,
    TaskSpec,
};
pub use validate::validate_run_file;
