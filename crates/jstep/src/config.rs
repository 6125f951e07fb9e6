//! Configuration file parsing for jstep.toml.

use jstep_core::{DEFAULT_BUILTIN_PACKAGES, DEFAULT_MAX_ARRAY_LEN, DEFAULT_STEP_LIMIT};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Interpreter settings
    #[serde(default)]
    pub interpreter: InterpreterSettings,

    /// Dynamic analysis settings
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Interpreter configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterpreterSettings {
    /// Maximum number of steps per run
    pub step_limit: usize,

    /// Directory of JSON class files
    pub classpath: PathBuf,

    /// Fault on reads of static fields that were never written
    pub strict_statics: bool,

    /// Longest array a program may create
    pub max_array_len: usize,

    /// Package prefixes whose missing classes are treated as built-in
    pub builtin_packages: Vec<String>,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            classpath: PathBuf::from("target/decompiled"),
            strict_statics: false,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            builtin_packages: DEFAULT_BUILTIN_PACKAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Dynamic analysis configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Sampled ints besides 0 for a single int-like parameter
    pub int_samples: usize,

    /// Values per parameter, 0 included, for multi-parameter signatures
    pub pair_samples: usize,

    /// Ints are drawn from `-sample_range..=sample_range`
    pub sample_range: i32,

    /// Sampler seed
    pub seed: u64,

    /// Frequency (percent) at which a label gets boosted
    pub floor: u32,

    /// Highest reported confidence (percent)
    pub ceiling: u32,

    /// Percentage points added once a frequency clears the floor
    pub boost: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            int_samples: 8,
            pair_samples: 4,
            sample_range: 100,
            seed: 0x2545_f491_4f6c_dd1d,
            floor: 20,
            ceiling: 98,
            boost: 49,
        }
    }
}

/// Load configuration from a file or search for default config files.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = match path {
        Some(path) if !path.exists() => {
            anyhow::bail!("Config file {} does not exist", path.display())
        }
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Search for configuration file in the current directory and parent directories.
fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    const CONFIG_NAMES: &[&str] = &["jstep.toml", ".jsteprc.toml"];

    let mut dir = Some(cwd.as_path());
    while let Some(current) = dir {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        dir = current.parent();
    }

    None
}
