#![allow(dead_code)]

use std::collections::BTreeMap;

use termrun::config::{HighlightStyle, StrategyConfig};
use termrun::terminal::TerminalSession;
use termrun::types::{Direction, QuitOnExit};

/// Builder for `StrategyConfig` to simplify test setup.
pub struct StrategyConfigBuilder {
    config: StrategyConfig,
}

impl StrategyConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: StrategyConfig::default(),
        }
    }

    pub fn use_shell(mut self, val: bool) -> Self {
        self.config.use_shell = val;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.config.direction = direction;
        self
    }

    pub fn quit_on_exit(mut self, val: QuitOnExit) -> Self {
        self.config.quit_on_exit = val;
        self
    }

    pub fn close_on_exit(mut self, val: bool) -> Self {
        self.config.close_on_exit = val;
        self
    }

    pub fn open_on_start(mut self, val: bool) -> Self {
        self.config.open_on_start = val;
        self
    }

    pub fn hidden(mut self, val: bool) -> Self {
        self.config.hidden = val;
        self
    }

    pub fn auto_scroll(mut self, val: bool) -> Self {
        self.config.auto_scroll = Some(val);
        self
    }

    pub fn highlight(mut self, group: &str, style: HighlightStyle) -> Self {
        self.config
            .highlights
            .get_or_insert_with(BTreeMap::new)
            .insert(group.to_string(), style);
        self
    }

    pub fn on_create<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn TerminalSession) + Send + Sync + 'static,
    {
        self.config = self.config.with_on_create(f);
        self
    }

    pub fn build(self) -> StrategyConfig {
        self.config
    }
}

impl Default for StrategyConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
