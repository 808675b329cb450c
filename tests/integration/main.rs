#[path = "../common/mod.rs"]
mod common;

mod error_handling;
mod run_file;
