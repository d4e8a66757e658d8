//! Beam search configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::err_msg;
use crate::grammar::ActionOptions;
use crate::DecodeError;

/// Beam search configuration parameters
///
/// # Examples
///
/// ```rust
/// use treebeam::search::SynthesizerConfig;
/// let config = SynthesizerConfig::from_yaml_str("beam_size: 4\nmax_steps: 50").unwrap();
/// assert_eq!(config.beam_size, 4);
/// assert_eq!(config.max_steps, Some(50));
/// assert!(config.options.retain_variadic_fields);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Number of candidates to produce; also the frontier width.
    pub beam_size: usize,

    /// Maximum number of oracle calls. `None` runs until the beam is full or
    /// no hypothesis survives.
    pub max_steps: Option<usize>,

    /// Encoding of lists and leaves, shared with the evaluators.
    pub options: ActionOptions,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            beam_size: 10,
            max_steps: None,
            options: ActionOptions::default(),
        }
    }
}

impl SynthesizerConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, DecodeError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()
    }

    pub fn from_json_str(text: &str) -> Result<Self, DecodeError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()
    }

    /// Loads a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, DecodeError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(err_msg!(Config, "unsupported config file '{}'", path.display())
                .with_help("use a .yaml, .yml or .json file")),
        }
    }

    pub fn validate(self) -> Result<Self, DecodeError> {
        if self.beam_size == 0 {
            return Err(err_msg!(Config, "beam_size must be at least 1"));
        }
        Ok(self)
    }
}
