//! Error types for registry parsing, diffing and command generation.
//!
//! Every failure aborts the operation that raised it: the parser never hands
//! back a partially built registry and the differ never returns a partial diff.

use std::io;
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while reading, comparing or rendering registries.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// I/O error occurred while reading the registry file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with the registry file header.
    #[error("not a wine registry file (header not found)")]
    NotARegistryFile,

    /// A value assignment appeared before any key header.
    #[error("invalid value at line {line} (no current key)")]
    NoCurrentKey {
        /// Line where the value assignment started.
        line: usize,
    },

    /// A `[` line that is not a `[key] timestamp` header.
    #[error("invalid key header at line {line}: '{text}'")]
    InvalidKeyLine {
        /// Line where the header started.
        line: usize,
        /// The offending logical line.
        text: String,
    },

    /// A value line that is not of the form `name=data`.
    #[error("invalid value assignment at line {line}: '{text}'")]
    InvalidValueLine {
        /// Line where the assignment started.
        line: usize,
        /// The offending logical line.
        text: String,
    },

    /// The textual encoding of a single value could not be decoded.
    #[error("{0}")]
    InvalidData(String),

    /// A value inside a key failed to decode.
    #[error("failed to parse data (line: {line}, key: {key}, name: {name}): {source}")]
    DataParse {
        /// Line where the assignment started.
        line: usize,
        /// Key the value belongs to.
        key: String,
        /// Name of the value.
        name: String,
        /// Underlying decode error.
        #[source]
        source: Box<RegistryError>,
    },

    /// A custom comparator failed.
    #[error("comparison failed: {0}")]
    Comparison(String),
}

impl RegistryError {
    /// Creates a data decode error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use wine_regdiff::error::RegistryError;
    /// let err = RegistryError::invalid_data(format!("unknown input: '{}'", "str(2):\"x\""));
    /// assert!(err.to_string().contains("unknown input"));
    /// ```
    pub fn invalid_data(message: String) -> Self {
        Self::InvalidData(message)
    }

    /// Wraps a decode error with the key and value name it belongs to.
    pub fn data_parse(line: usize, key: &str, name: &str, source: RegistryError) -> Self {
        Self::DataParse {
            line,
            key: key.to_string(),
            name: name.to_string(),
            source: Box::new(source),
        }
    }

    /// Creates a comparison error for custom comparators.
    pub fn comparison(message: impl Into<String>) -> Self {
        Self::Comparison(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_data_parse_keeps_source() {
        let err = RegistryError::data_parse(
            7,
            "Parent Key",
            "Value",
            RegistryError::invalid_data("bad dword".to_string()),
        );
        assert!(matches!(err, RegistryError::DataParse { line: 7, .. }));
        let msg = err.to_string();
        assert!(msg.contains("key: Parent Key"));
        assert!(msg.contains("name: Value"));
        assert_eq!(err.source().unwrap().to_string(), "bad dword");
    }

    #[test]
    fn test_io_conversion() {
        let err: RegistryError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, RegistryError::Io(_)));
    }
}
