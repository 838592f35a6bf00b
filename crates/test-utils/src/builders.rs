#![allow(dead_code)]

use lemonfeed::config::{BlockConfig, ConfigFile, RawConfigFile, StyleConfig};
use lemonfeed::types::Align;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_block(mut self, sid: &str, block: BlockConfig) -> Self {
        self.config.block.insert(sid.to_string(), block);
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.config.bar.format = format.to_string();
        self
    }

    /// Renderer command and its full argument list.
    pub fn bar_command(mut self, bin: &str, args: &[&str]) -> Self {
        self.config.bar.bin = bin.to_string();
        self.config.bar.args = Some(args.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn default_style(mut self, style: StyleConfig) -> Self {
        self.config.default = style;
        self
    }

    pub fn tolerance(mut self, secs: f64) -> Self {
        self.config.config.tolerance = secs;
        self
    }

    pub fn block_timeout(mut self, secs: f64) -> Self {
        self.config.config.block_timeout = Some(secs);
        self
    }

    pub fn retry_delay(mut self, secs: f64) -> Self {
        self.config.config.retry_delay = secs;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `BlockConfig`.
pub struct BlockConfigBuilder {
    block: BlockConfig,
}

impl BlockConfigBuilder {
    pub fn new(command: &str) -> Self {
        Self {
            block: BlockConfig {
                command: Some(command.to_string()),
                ..BlockConfig::default()
            },
        }
    }

    pub fn reload(mut self, secs: f64) -> Self {
        self.block.reload = Some(secs);
        self
    }

    pub fn trigger(mut self, command: &str) -> Self {
        self.block.trigger = Some(command.to_string());
        self
    }

    pub fn live(mut self) -> Self {
        self.block.live = true;
        self
    }

    pub fn consume(mut self, val: bool) -> Self {
        self.block.consume = Some(val);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.block.align = Some(align);
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.block.width = width;
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.block.label = Some(label.to_string());
        self
    }

    pub fn fg(mut self, color: &str) -> Self {
        self.block.style.fg = Some(color.to_string());
        self
    }

    pub fn bg(mut self, color: &str) -> Self {
        self.block.style.bg = Some(color.to_string());
        self
    }

    pub fn style(mut self, style: StyleConfig) -> Self {
        self.block.style = style;
        self
    }

    pub fn mouse_left(mut self, command: &str) -> Self {
        self.block.mouse_left = Some(command.to_string());
        self
    }

    pub fn scroll_up(mut self, command: &str) -> Self {
        self.block.scroll_up = Some(command.to_string());
        self
    }

    pub fn build(self) -> BlockConfig {
        self.block
    }
}
