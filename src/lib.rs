//! expconf: layered experiment-configuration resolver
//!
//! A configuration is one or more YAML/TOML/JSON files, layered in order, plus
//! command-line `dotted.path=value` overrides. String values may reference
//! other values with `${path}` or `${transform:path}`, and `???` marks a value
//! that must be supplied before a run can start.
//!
//! ```
//! use expconf::config::{ConfigDocument, Override, ResolverOptions};
//!
//! let mut doc = ConfigDocument::from_yaml_str(
//!     "data:\n  image_path: '???'\ntag: ${rmspace:system.prompt}\nsystem:\n  prompt: a cat\n",
//! )?;
//! let overrides = [Override::parse("data.image_path=load/images/cat.png")?];
//! doc.apply_overrides(&overrides, &ResolverOptions::default())?;
//!
//! let cfg = doc.resolve()?;
//! assert_eq!(cfg.get_str("tag"), Some("a_cat"));
//! # Ok::<(), expconf::ConfigError>(())
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod experiment;
pub mod interp;
pub mod render;
pub mod resolve;

pub use config::{load_config, ConfigDocument, ResolverOptions};
pub use domain::{ConfigNode, ConfigPath, ResolvedConfig};
pub use error::{ConfigError, Result};
pub use experiment::ExperimentConfig;
