use crate::types::ValueRetrievalError;
use std::{
    fmt::{self, Display, Formatter},
    io,
};

/// Problems parsing the records of a single header.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderError {
    /// A card that is none of END, blank, value or commentary
    MalformedRecord {
        /// byte offset of the card in the file
        offset: usize,
        /// the card, lossily decoded
        record: String,
    },
    /// A non-blank card between `END` and the end of its block
    RecordAfterEnd {
        /// byte offset of the card in the file
        offset: usize,
    },
    /// The input ended before the header did
    Incomplete,
}

impl Display for HeaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::MalformedRecord { offset, record } => {
                write!(f, "malformed header record at byte {}: {:?}", offset, record)
            }
            HeaderError::RecordAfterEnd { offset } => {
                write!(f, "header record after END at byte {}", offset)
            }
            HeaderError::Incomplete => write!(f, "header is incomplete"),
        }
    }
}

impl std::error::Error for HeaderError {}

/// Problems reading a FITS file.
#[derive(Debug)]
pub enum FitsError {
    /// Reading or seeking failed
    Io(io::Error),
    /// The file does not start with a `SIMPLE` card
    NotFits,
    /// A header could not be parsed
    Header {
        /// index of the header-data unit, 0 for the primary header
        hdu: usize,
        /// what went wrong
        source: HeaderError,
    },
    /// The file ended in the middle of a header or a data unit
    Truncated {
        /// index of the header-data unit, 0 for the primary header
        hdu: usize,
    },
    /// The size of the data unit could not be worked out from the header
    DataSize {
        /// index of the header-data unit, 0 for the primary header
        hdu: usize,
        /// the keyword that was missing or had the wrong type
        source: ValueRetrievalError,
    },
}

impl Display for FitsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FitsError::Io(_) => write!(f, "i/o error"),
            FitsError::NotFits => write!(f, "not a FITS file"),
            FitsError::Header { hdu, .. } => write!(f, "could not parse header of HDU {}", hdu),
            FitsError::Truncated { hdu } => write!(f, "file ends inside HDU {}", hdu),
            FitsError::DataSize { hdu, .. } => {
                write!(f, "could not determine the data size of HDU {}", hdu)
            }
        }
    }
}

impl std::error::Error for FitsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FitsError::Io(e) => Some(e),
            FitsError::Header { source, .. } => Some(source),
            FitsError::DataSize { source, .. } => Some(source),
            FitsError::NotFits | FitsError::Truncated { .. } => None,
        }
    }
}

impl From<io::Error> for FitsError {
    fn from(e: io::Error) -> Self {
        FitsError::Io(e)
    }
}
