// src/config/model.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::errors::TermrunError;
use crate::strategy::TaskCommand;
use crate::terminal::TerminalSession;
use crate::types::{Direction, QuitOnExit};

/// User callback run when a session has been created.
pub type OnCreateCallback = Arc<dyn Fn(&mut dyn TerminalSession) + Send + Sync>;

/// Options of the terminal strategy.
///
/// Every field is optional in TOML; missing keys keep the defaults below:
///
/// ```toml
/// [strategy]
/// use_shell = false
/// direction = "none"
/// close_on_exit = false
/// quit_on_exit = "never"
/// open_on_start = true
/// hidden = false
/// ```
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyConfig {
    /// Start the session's shell and type the command into it instead of
    /// running the command directly.
    pub use_shell: bool,

    pub direction: Direction,

    /// Highlight groups applied to the terminal window.
    pub highlights: Option<BTreeMap<String, HighlightStyle>>,

    /// Follow output as it arrives. `None` keeps the terminal's own setting.
    pub auto_scroll: Option<bool>,

    /// Let the terminal component close itself when the job exits.
    pub close_on_exit: bool,

    /// Close the session from the strategy once the job exits.
    pub quit_on_exit: QuitOnExit,

    /// Show the terminal when the task starts.
    pub open_on_start: bool,

    /// Keep the terminal out of the terminal component's toggle list.
    pub hidden: bool,

    #[serde(skip)]
    pub on_create: Option<OnCreateCallback>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            use_shell: false,
            direction: Direction::None,
            highlights: None,
            auto_scroll: None,
            close_on_exit: false,
            quit_on_exit: QuitOnExit::Never,
            open_on_start: true,
            hidden: false,
            on_create: None,
        }
    }
}

impl StrategyConfig {
    pub fn with_on_create<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn TerminalSession) + Send + Sync + 'static,
    {
        self.on_create = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyConfig")
            .field("use_shell", &self.use_shell)
            .field("direction", &self.direction)
            .field("highlights", &self.highlights)
            .field("auto_scroll", &self.auto_scroll)
            .field("close_on_exit", &self.close_on_exit)
            .field("quit_on_exit", &self.quit_on_exit)
            .field("open_on_start", &self.open_on_start)
            .field("hidden", &self.hidden)
            .field("on_create", &self.on_create.is_some())
            .finish()
    }
}

/// A highlight group definition, e.g. `Normal = { bg = "#1e1e2e" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HighlightStyle {
    #[serde(default)]
    pub fg: Option<String>,
    #[serde(default)]
    pub bg: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Run file exactly as read from TOML, before validation.
///
/// ```toml
/// [strategy]
/// quit_on_exit = "success"
///
/// [task]
/// name = "build"
/// cmd = ["cargo", "build"]
/// cwd = "."
/// env = { RUST_LOG = "info" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRunFile {
    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub task: RawTaskSection,
}

/// `[task]` section. `cmd` may be omitted when the command line supplies it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTaskSection {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub cmd: Option<TaskCommand>,

    #[serde(default)]
    pub cwd: Option<PathBuf>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Validated run file.
#[derive(Debug, Clone)]
pub struct RunFile {
    pub strategy: StrategyConfig,
    pub task: TaskSpec,
}

/// Validated task description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: String,
    pub cmd: TaskCommand,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl TryFrom<RawRunFile> for RunFile {
    type Error = TermrunError;

    fn try_from(raw: RawRunFile) -> Result<Self, Self::Error> {
        crate::config::validate::validate_run_file(&raw)?;

        let RawTaskSection {
            name,
            cmd,
            cwd,
            env,
        } = raw.task;

        let cmd = cmd.ok_or_else(|| {
            TermrunError::ConfigError("[task].cmd is required".to_string())
        })?;
        let name = name.unwrap_or_else(|| cmd.to_string());

        Ok(RunFile {
            strategy: raw.strategy,
            task: TaskSpec {
                name,
                cmd,
                cwd,
                env,
            },
        })
    }
}
