use crate::parser::FitsError;
use std::{
    fmt::{self, Display, Formatter},
    path::{Path, PathBuf},
};

/// A file could not be opened as astronomical data.
#[derive(Debug)]
pub struct OpenError {
    path: PathBuf,
    source: FitsError,
}

impl OpenError {
    pub(crate) fn new(path: &Path, source: FitsError) -> OpenError {
        OpenError {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The path that was being opened
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What went wrong while reading it
    pub fn fits_error(&self) -> &FitsError {
        &self.source
    }
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "could not open {}", self.path.display())
    }
}

impl std::error::Error for OpenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// A descriptor could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorError {
    /// No class in the instrument's hierarchy provides the descriptor
    Unsupported {
        /// the requested descriptor
        descriptor: String,
        /// the instrument class of the file
        class: &'static str,
    },
    /// A keyword the descriptor cannot do without is absent
    MissingKeyword {
        /// the descriptor being evaluated
        descriptor: &'static str,
        /// the missing keyword
        keyword: String,
    },
    /// The headers hold something the descriptor cannot work with
    Evaluation {
        /// the descriptor being evaluated
        descriptor: &'static str,
        /// what went wrong
        reason: String,
    },
}

impl DescriptorError {
    pub(crate) fn missing(descriptor: &'static str, keyword: &str) -> DescriptorError {
        DescriptorError::MissingKeyword {
            descriptor,
            keyword: keyword.to_string(),
        }
    }

    pub(crate) fn evaluation(descriptor: &'static str, reason: impl Into<String>) -> DescriptorError {
        DescriptorError::Evaluation {
            descriptor,
            reason: reason.into(),
        }
    }
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::Unsupported { descriptor, class } => {
                write!(f, "descriptor {} is not supported for {} data", descriptor, class)
            }
            DescriptorError::MissingKeyword {
                descriptor,
                keyword,
            } => write!(f, "descriptor {} needs keyword {}, which is missing", descriptor, keyword),
            DescriptorError::Evaluation { descriptor, reason } => {
                write!(f, "could not evaluate descriptor {}: {}", descriptor, reason)
            }
        }
    }
}

impl std::error::Error for DescriptorError {}
