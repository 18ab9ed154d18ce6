//! Settings shared by the store and the command-line tools, read from RON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Every field is optional in the file; missing fields take their defaults.
///
/// ```ron
/// (
///     fluke_dir: "flukes",
///     shuffle_prompts: true,
///     seed: Some(42),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `.fluke` files.
    pub fluke_dir: PathBuf,
    /// Present prompts to the player in random order.
    pub shuffle_prompts: bool,
    /// Fixed seed for the prompt shuffle. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fluke_dir: PathBuf::from("flukes"),
            shuffle_prompts: true,
            seed: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Settings, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}
