// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawRunFile, RunFile};
use crate::errors::Result;

/// Load a run file from a given path and return the raw `RawRunFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawRunFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawRunFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a run file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks the task section (see [`crate::config::validate_run_file`]).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<RunFile> {
    let raw = load_from_path(&path)?;
    RunFile::try_from(raw)
}

/// Default run file looked up in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Termrun.toml")
}
