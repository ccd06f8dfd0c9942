//! Compiler configuration loaded from actiondef.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dsl::compile::CompileOptions;
use crate::host::HostError;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "actiondef.yaml";

/// Configuration loaded from YAML. Every field is optional in the file;
/// compile options sit at the top level next to the output directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub options: CompileOptions,
    /// Directory receiving runtime artifacts.
    pub out_dir: PathBuf,
    /// Directory receiving editor-only artifacts.
    pub editor_out_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            options: CompileOptions::default(),
            out_dir: PathBuf::from("src/generated"),
            editor_out_dir: PathBuf::from("src/editor/generated"),
        }
    }
}

/// User-level config path (~/.actiondef/config.yaml).
pub fn user_config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".actiondef");
    path.push("config.yaml");
    Some(path)
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let content = std::fs::read_to_string(path).map_err(|source| HostError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&content).map_err(|e| HostError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Resolve the config to use: explicit path, then ./actiondef.yaml, then
    /// the user config, then defaults. Only an explicit path must exist.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, HostError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidates = [Some(PathBuf::from(LOCAL_CONFIG)), user_config_path()];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "using config");
                return Self::load(&path);
            }
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    fn validate(&self, path: &Path) -> Result<(), HostError> {
        let spacing = self.options.marker_spacing;
        if !spacing.is_finite() || spacing < 0.0 {
            return Err(HostError::Config {
                path: path.to_path_buf(),
                message: format!(
                    "marker_spacing must be a non-negative number, got {spacing}"
                ),
            });
        }
        Ok(())
    }

    pub fn compile_options(&self) -> CompileOptions {
        self.options.clone()
    }
}
