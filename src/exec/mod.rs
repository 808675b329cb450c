// src/exec/mod.rs

//! Process bookkeeping shared by strategies.
//!
//! - [`lines`] reassembles output lines from raw terminal chunks.
//! - [`registry`] tracks the jobs started by strategies so shutdown code can
//!   stop each of them exactly once.
//! - [`shell`] turns argument lists into shell command lines.

pub mod lines;
pub mod registry;
pub mod shell;

pub use lines::LineSplitter;
pub use registry::JobRegistry;
pub use shell::{escape_args, QuoteMode, EXIT_STATUS_LINE};
