//! The parser module is responsible for parsing FITS files.
//! This parser was created following the FITS 3.0 standard.
//! Specifically https://www.aanda.org/articles/aa/pdf/2010/16/aa15362-10.pdf
//! using Appendix A.
//!
//! We deviate from their organizational structure to make header END and <blank>
//! records easier to reason about.
mod error;
mod header;
mod reader;
pub mod stream_parser;
mod util;

pub use error::{FitsError, HeaderError};
pub use reader::read_fits;
