//! Load errors and per-line diagnostics.

use std::{io, path::PathBuf};

use thiserror::Error;

/// File-level failure: the file could not be opened or read at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}

/// Why a single directive line was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum LineError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("invalid {field} '{token}'")]
    InvalidNumber { field: &'static str, token: String },
    #[error("invalid index '{0}'")]
    InvalidIndex(String),
    #[error("indices are 1-based; found 0")]
    ZeroIndex,
    #[error("relative index '{0}' is not supported")]
    NegativeIndex(String),
    #[error("{kind} index {index} out of range ({len} declared)")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("face needs at least 3 vertices, found {0}")]
    TooFewVertices(usize),
    #[error("missing {0} name")]
    MissingName(&'static str),
    #[error("line is not valid UTF-8 after byte {0}")]
    InvalidEncoding(usize),
}

/// A non-fatal problem recorded while loading.
#[derive(Debug, Error)]
pub enum Diagnostic {
    /// A companion file (material library) could not be read.
    #[error(transparent)]
    File(#[from] LoadError),
    #[error("{origin}:{line}: {error}")]
    Line {
        origin: String,
        line: usize,
        #[source]
        error: LineError,
    },
}

impl Diagnostic {
    pub fn line_error(&self) -> Option<&LineError> {
        match self {
            Self::Line { error, .. } => Some(error),
            Self::File(_) => None,
        }
    }
}

/// Parsed value plus everything that went wrong on the way.
#[derive(Debug, Default)]
pub struct LoadReport<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> LoadReport<T> {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_io_error_maps_to_not_found() {
        let err = LoadError::from_io("missing.obj", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert_eq!(err.to_string(), "file not found: missing.obj");
    }

    #[test]
    fn line_diagnostic_mentions_origin_and_line() {
        let diag = Diagnostic::Line {
            origin: "hand.OBJ".into(),
            line: 12,
            error: LineError::ZeroIndex,
        };
        assert_eq!(diag.to_string(), "hand.OBJ:12: indices are 1-based; found 0");
        assert_eq!(diag.line_error(), Some(&LineError::ZeroIndex));
    }
}
