//! Experiment header and trial directory derivation
//!
//! The training framework reads a fixed set of top-level keys to decide where a
//! run writes its outputs: `exp_root_dir/name/trial_name`, where the trial name
//! is the tag plus an optional `@YYYYMMDD-HHMMSS` timestamp.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::domain::{ConfigNode, ResolvedConfig};
use crate::error::{ConfigError, Result};

const TIMESTAMP_FORMAT: &str = "@%Y%m%d-%H%M%S";

/// Top-level keys of an experiment config, with the framework's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentHeader {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    pub description: String,
    /// Numbers and booleans are accepted and kept as their text (`tag: ${seed}`).
    #[serde(deserialize_with = "scalar_string")]
    pub tag: String,
    pub seed: i64,
    pub use_timestamp: bool,
    pub timestamp: Option<String>,
    pub exp_root_dir: String,
    pub n_gpus: u32,
    pub resume: Option<String>,
}

impl Default for ExperimentHeader {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            description: String::new(),
            tag: String::new(),
            seed: 0,
            use_timestamp: true,
            timestamp: None,
            exp_root_dir: "outputs".to_string(),
            n_gpus: 1,
            resume: None,
        }
    }
}

fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    let node = match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => return Ok(text),
        Scalar::Int(i) => ConfigNode::Int(i),
        Scalar::Float(f) => ConfigNode::Float(f),
        Scalar::Bool(b) => ConfigNode::Bool(b),
    };
    Ok(node.to_string())
}

/// Header plus the derived output locations of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentConfig {
    #[serde(flatten)]
    pub header: ExperimentHeader,
    pub trial_name: String,
    pub exp_dir: PathBuf,
    pub trial_dir: PathBuf,
}

impl ExperimentConfig {
    pub fn from_resolved(config: &ResolvedConfig) -> Result<Self> {
        Self::from_resolved_at(config, Local::now().naive_local())
    }

    /// Derive the trial layout using `now` for the timestamp.
    pub fn from_resolved_at(config: &ResolvedConfig, now: NaiveDateTime) -> Result<Self> {
        let mut header: ExperimentHeader = config.extract("")?;

        if header.tag.is_empty() && !header.use_timestamp {
            return Err(ConfigError::Experiment {
                message: "Either tag is specified or use_timestamp is True.".to_string(),
            });
        }

        // An explicit timestamp comes from a resumed run and is kept verbatim.
        let timestamp = match header.timestamp.take() {
            Some(ts) => ts,
            None if header.use_timestamp && header.n_gpus > 1 => {
                tracing::warn!(
                    "Timestamp is disabled when using multiple GPUs, please make sure you have a unique tag."
                );
                String::new()
            }
            None if header.use_timestamp => now.format(TIMESTAMP_FORMAT).to_string(),
            None => String::new(),
        };

        let trial_name = format!("{}{}", header.tag, timestamp);
        let exp_dir = PathBuf::from(&header.exp_root_dir).join(&header.name);
        let trial_dir = exp_dir.join(&trial_name);
        header.timestamp = Some(timestamp);

        tracing::debug!("Trial directory: {}", trial_dir.display());
        Ok(Self { header, trial_name, exp_dir, trial_dir })
    }

    /// Where the parsed config of this trial is saved.
    pub fn configs_dir(&self) -> PathBuf {
        self.trial_dir.join("configs")
    }
}
