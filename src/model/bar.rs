// src/model/bar.rs

use std::io;

use tracing::{debug, info};

use crate::config::{BarSection, ConfigFile, Dock, LayoutSlot, StyleConfig};
use crate::errors::SpawnError;
use crate::process::lines::{drain_lines, Drained};
use crate::process::{ProcessHandle, StreamMode, Streams};

/// The renderer process and everything needed to feed it.
#[derive(Debug)]
pub struct Bar {
    pub handle: ProcessHandle,
    section: BarSection,
    defaults: StyleConfig,
    layout: Vec<LayoutSlot>,
    carry: Vec<u8>,
}

impl Bar {
    pub fn new(section: BarSection, defaults: StyleConfig, layout: Vec<LayoutSlot>) -> Self {
        let args = section
            .args
            .clone()
            .unwrap_or_else(|| renderer_args(&section));
        Self {
            handle: ProcessHandle::new(section.bin.clone()).with_args(args),
            section,
            defaults,
            layout,
            carry: Vec::new(),
        }
    }

    pub fn from_config(cfg: &ConfigFile, layout: Vec<LayoutSlot>) -> Self {
        Self::new(cfg.bar.clone(), cfg.default.clone(), layout)
    }

    pub fn section(&self) -> &BarSection {
        &self.section
    }

    /// Bar-level block style (`[default]`).
    pub fn defaults(&self) -> &StyleConfig {
        &self.defaults
    }

    pub fn layout(&self) -> &[LayoutSlot] {
        &self.layout
    }

    /// Start the renderer with piped stdin (bar text) and a non-blocking
    /// stdout (action tokens).
    pub fn open(&mut self) -> Result<u32, SpawnError> {
        let pid = self.handle.spawn(Streams::IN_OUT, StreamMode::NonBlocking)?;
        info!(
            pid,
            bin = self.handle.command(),
            args = ?self.handle.args(),
            "renderer started"
        );
        Ok(pid)
    }

    /// Send one full bar line.
    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.handle.write_line(text)
    }

    /// Everything the renderer printed since the last drain.
    pub fn drain_output(&mut self, limit: usize) -> io::Result<Drained> {
        match self.handle.stdout_mut() {
            Some(stdout) => drain_lines(stdout, &mut self.carry, limit),
            None => Ok(Drained::default()),
        }
    }

    /// Close stdin (the renderer exits on EOF) and make sure it is gone.
    pub fn close(&mut self) {
        debug!(pid = self.handle.pid(), "closing renderer");
        self.handle.close();
        self.handle.terminate(libc::SIGKILL);
    }
}

/// Renderer command line built from the `[bar]` geometry and style.
pub fn renderer_args(bar: &BarSection) -> Vec<String> {
    let dim = |v: u32| if v == 0 { String::new() } else { v.to_string() };

    let mut args = vec![
        "-g".to_string(),
        format!("{}x{}+{}+{}", dim(bar.width), dim(bar.height), bar.x, bar.y),
    ];

    let colors = [("-F", &bar.fg), ("-B", &bar.bg), ("-U", &bar.lc)];
    for (flag, value) in colors {
        if let Some(color) = value {
            args.push(flag.to_string());
            args.push(color.clone());
        }
    }
    if let Some(lw) = bar.lw {
        args.push("-u".to_string());
        args.push(lw.to_string());
    }
    if bar.dock == Dock::Bottom {
        args.push("-b".to_string());
    }
    if bar.force {
        args.push("-d".to_string());
    }
    for font in [&bar.block_font, &bar.label_font, &bar.affix_font]
        .into_iter()
        .flatten()
    {
        args.push("-f".to_string());
        args.push(font.clone());
    }
    args.push("-n".to_string());
    args.push(bar.name.clone());

    args
}
