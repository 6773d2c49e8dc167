//! Error types for the service graph converter

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for graph conversion
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A manifest or the embedded graph failed to encode
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Service graph failed the optional validation stage
    #[error("validation error: {0}")]
    Validation(String),

    /// Reading a graph file failed
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an I/O error for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Story Tests: Error Propagation in Graph Conversion
    // ==========================================================================

    /// Story: Serialization errors abort the whole compile
    ///
    /// Encoding failures are deterministic, so the message must say what
    /// failed to encode.
    #[test]
    fn story_serialization_errors_in_manifest_encoding() {
        let err = Error::serialization("failed to encode Deployment frontend");
        assert!(err.to_string().contains("serialization error"));
        assert!(err.to_string().contains("frontend"));

        match Error::serialization("encode issue") {
            Error::Serialization(msg) => assert_eq!(msg, "encode issue"),
            _ => panic!("Expected Serialization variant"),
        }
    }

    /// Story: Validation errors name the offending service
    #[test]
    fn story_validation_errors_from_graph_checks() {
        let err = Error::validation("service 'a' in namespace 'ns1' declared twice");
        assert!(err.to_string().contains("validation error"));
        assert!(err.to_string().contains("declared twice"));

        let dynamic = format!("service '{}' has negative numReplicas", "b");
        match Error::validation(dynamic) {
            Error::Validation(msg) => assert!(msg.contains("'b'")),
            _ => panic!("Expected Validation variant"),
        }
    }

    #[test]
    fn story_io_errors_carry_the_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::io("/tmp/graph.yaml", source);
        assert!(err.to_string().contains("/tmp/graph.yaml"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn story_yaml_errors_convert_to_serialization() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("{ not: a list }").unwrap_err();
        let err: Error = yaml_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
