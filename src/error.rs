//! Error kinds surfaced by loading, overriding and resolving configurations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Every failure is fatal: resolution either fully succeeds or the run does not start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed parsing {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid override '{arg}': expected dotted.path=value")]
    InvalidOverride { arg: String },

    #[error("path not found: {path}")]
    PathNotFound { path: String },

    #[error("unknown transform '{name}' in interpolation at {path}")]
    UnknownTransform { name: String, path: String },

    #[error("invalid interpolation at {path}: {message}")]
    InvalidInterpolation { path: String, message: String },

    #[error("interpolation cycle detected at {path}")]
    Cycle { path: String },

    #[error("missing required value at {path}")]
    MissingRequiredField { path: String },

    #[error("cannot override {path} with '{value}': expected {expected}")]
    TypeCoercion { path: String, expected: &'static str, value: String },

    #[error("cannot deserialize {path}: {message}")]
    Deserialize { path: String, message: String },

    #[error("invalid experiment config: {message}")]
    Experiment { message: String },
}

impl ConfigError {
    /// Dotted path the error is about, when it names one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::PathNotFound { path }
            | ConfigError::UnknownTransform { path, .. }
            | ConfigError::InvalidInterpolation { path, .. }
            | ConfigError::Cycle { path }
            | ConfigError::MissingRequiredField { path }
            | ConfigError::TypeCoercion { path, .. }
            | ConfigError::Deserialize { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_path() {
        let err = ConfigError::MissingRequiredField { path: "data.image_path".into() };
        assert_eq!(err.to_string(), "missing required value at data.image_path");
        assert_eq!(err.path(), Some("data.image_path"));
    }

    #[test]
    fn io_errors_have_no_dotted_path() {
        let err = ConfigError::Io {
            path: PathBuf::from("missing.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.path().is_none());
        assert!(err.to_string().contains("missing.yaml"));
    }
}
