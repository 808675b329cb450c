// src/exec/shell.rs

//! Turning an argument list into a single POSIX shell command line.

use std::borrow::Cow;

/// Line sent after a command typed into an interactive shell so the shell
/// exits with that command's status.
pub const EXIT_STATUS_LINE: &str = "exit $?";

/// How arguments are quoted when joined into a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteMode {
    /// Quote every argument, whether or not it needs it.
    #[default]
    Strong,
    /// Quote only arguments that contain shell metacharacters.
    Escape,
}

/// Escape each argument with `mode` and join them with single spaces.
pub fn escape_args<S: AsRef<str>>(args: &[S], mode: QuoteMode) -> String {
    args.iter()
        .map(|arg| match mode {
            QuoteMode::Strong => strong_quote(arg.as_ref()),
            QuoteMode::Escape => {
                shell_escape::unix::escape(Cow::Borrowed(arg.as_ref())).into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Wrap `s` in single quotes, encoding embedded quotes as `'\''`.
fn strong_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
