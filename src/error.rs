//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or missing configuration. Always fatal for the request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("{0} is not set")]
    Missing(&'static str),
    /// A setting was provided but could not be interpreted.
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Name of the setting.
        key: &'static str,
        /// The rejected raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Override keys form more than one run of consecutive indices.
    #[error("sprint overrides must cover one run of consecutive indices, found runs starting at {starts:?}")]
    NonContiguousOverrides {
        /// First index of each run, ascending.
        starts: Vec<i64>,
    },
}

/// Failure reported by an external collaborator behind a port.
#[derive(Debug, Error)]
pub enum PortError {
    /// Local I/O failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// An HTTP request failed or returned a non-success status.
    #[error("request to {url} failed: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// Transport error or status description.
        message: String,
    },
    /// A payload could not be decoded.
    #[error("failed to parse {what}: {message}")]
    Parse {
        /// What was being parsed.
        what: String,
        /// Decoder message.
        message: String,
    },
    /// A download link could not be produced.
    #[error("cannot sign link for {identity}: {message}")]
    Signing {
        /// Identity of the build being linked.
        identity: String,
        /// Reason.
        message: String,
    },
}

impl PortError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Builds a parse error from any displayable decoder error.
    pub fn parse(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Parse { what: what.into(), message: err.to_string() }
    }
}

/// Top-level error for one invocation.
#[derive(Debug, Error)]
pub enum BuildListError {
    /// Configuration problem; nothing is rendered.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// A collaborator failed.
    #[error(transparent)]
    Port(#[from] PortError),
    /// Writing the rendered output failed.
    #[error("failed to write {}: {source}", path.display())]
    Output {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The async runtime could not be started.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_setting_names_the_variable() {
        let err = BuildListError::from(ConfigError::Missing("BUILDS_STORAGE"));
        assert_eq!(err.to_string(), "configuration error: BUILDS_STORAGE is not set");
    }

    #[test]
    fn port_errors_pass_through_unchanged() {
        let err = BuildListError::from(PortError::parse("manifest", "expected value"));
        assert_eq!(err.to_string(), "failed to parse manifest: expected value");
    }

    #[test]
    fn io_error_includes_path() {
        let err = PortError::io("/srv/builds", std::io::Error::other("denied"));
        assert_eq!(err.to_string(), "I/O error at /srv/builds: denied");
    }
}
