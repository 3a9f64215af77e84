use crate::capture::{CommandSpec, StreamPreference};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct JsonlineConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub commands: BTreeMap<String, CommandPreset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub prefer: StreamPreference,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            prefer: StreamPreference::default(),
        }
    }
}

impl CaptureConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandPreset {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl JsonlineConfig {
    /// Resolve a named preset. A relative `cwd` is taken relative to `root`.
    pub fn preset(&self, name: &str, root: &Path) -> Option<CommandSpec> {
        let p = self.commands.get(name)?;
        Some(CommandSpec {
            program: p.program.clone(),
            args: p.args.clone(),
            cwd: p.cwd.as_ref().map(|c| root.join(c)),
        })
    }
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join("jsonline.toml")
}

pub fn load_from_root(root: &Path) -> Result<Option<JsonlineConfig>> {
    let p = config_path(root);
    if !p.exists() {
        tracing::debug!(path = %p.display(), "no config file");
        return Ok(None);
    }
    let txt = std::fs::read_to_string(&p).map_err(|e| Error::Config {
        path: p.clone(),
        message: format!("read: {e}"),
    })?;
    let cfg: JsonlineConfig = toml::from_str(&txt).map_err(|e| Error::Config {
        path: p.clone(),
        message: format!("parse: {e}"),
    })?;
    tracing::debug!(path = %p.display(), presets = cfg.commands.len(), "loaded config");
    Ok(Some(cfg))
}
