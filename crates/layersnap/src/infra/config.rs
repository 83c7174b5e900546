//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".layersnap/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub output: Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    /// Depth used when an export request carries none.
    #[serde(default = "Defaults::default_depth")]
    pub depth: u32,
}

impl Defaults {
    fn default_depth() -> u32 {
        0
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            depth: Self::default_depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Output {
    #[serde(default)]
    dir: Option<String>,
    #[serde(default)]
    manifest_file: Option<String>,
}

impl Output {
    fn default_dir() -> &'static str {
        "layersnap-export"
    }

    fn default_manifest_file() -> &'static str {
        "manifest.json"
    }

    /// Directory artifacts are written to.
    pub fn dir(&self) -> PathBuf {
        PathBuf::from(self.dir.clone().unwrap_or_else(|| Self::default_dir().to_owned()))
    }

    /// File name for the serialized manifest.
    pub fn manifest_file(&self) -> String {
        self.manifest_file
            .clone()
            .unwrap_or_else(|| Self::default_manifest_file().to_owned())
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    depth: Option<u32>,
    output_dir: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            depth: env::var("LAYERSNAP_DEPTH")
                .ok()
                .and_then(|raw| raw.parse().ok()),
            output_dir: env::var("LAYERSNAP_OUTPUT_DIR").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(depth: u32, output_dir: &str) -> Self {
        Self {
            depth: Some(depth),
            output_dir: Some(output_dir.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            output: merge_output(self.output, other.output),
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        depth: if overlay.depth != Defaults::default_depth() {
            overlay.depth
        } else {
            base.depth
        },
    }
}

fn merge_output(mut base: Output, overlay: Output) -> Output {
    if let Some(value) = overlay.dir {
        base.dir = Some(value);
    }
    if let Some(value) = overlay.manifest_file {
        base.manifest_file = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("layersnap/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    Ok(Some(cwd.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(depth) = env.depth {
        config.defaults.depth = depth;
    }
    if let Some(output_dir) = env.output_dir {
        config.output.dir = Some(output_dir);
    }
    config
}
