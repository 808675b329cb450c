// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `termrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "termrun",
    version,
    about = "Run a task through the terminal strategy and report its output and exit code.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the run file (TOML) with `[strategy]` and `[task]` sections.
    ///
    /// Default: `Termrun.toml` in the current working directory. The default
    /// file may be missing when a command is given after `--`.
    #[arg(long, value_name = "PATH", default_value = "Termrun.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TERMRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the effective strategy and command, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run, overriding `[task].cmd`. Each word is one argument.
    #[arg(last = true, value_name = "CMD")]
    pub cmd: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_command_is_collected() {
        let args = CliArgs::try_parse_from(["termrun", "--dry-run", "--", "echo", "a b"]).unwrap();
        assert!(args.dry_run);
        assert_eq!(args.config, "Termrun.toml");
        assert_eq!(args.cmd, vec!["echo".to_string(), "a b".to_string()]);
    }

    #[test]
    fn log_level_is_parsed() {
        let args = CliArgs::try_parse_from(["termrun", "--log-level", "debug"]).unwrap();
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.cmd.is_empty());
    }
}
