#![warn(missing_docs)]
//! Read the headers of astronomical FITS files and compute instrument-aware
//! *descriptors* from them.
//!
//! The *Flexible Image Transport System* ([FITS](https://en.wikipedia.org/wiki/FITS)) is
//! > an open standard defining a digital file format useful for storage,
//! > transmission and processing of scientific and other images.
//!
//! A descriptor is a named value such as `camera`, `filter_name` or
//! `exposure_time`. What a descriptor means depends on the instrument that
//! took the data, so files are classified when they are opened and the
//! descriptor is looked up in the registry of that instrument class.
//!
//! ```no_run
//! use showd::astrodata::AstroData;
//!
//! let ad = AstroData::open("N20170101S0001.fits").unwrap();
//! let values = ad.descriptors(&["camera", "filter_name"]).unwrap();
//! ```

pub mod astrodata;
pub mod cli;
pub mod instruments;
pub mod parser;
pub mod types;

mod fits {
    /// All Keyword/Value/Comment lines are this fixed length
    pub(crate) const KEYWORD_LINE_LENGTH: usize = 80;

    /// All segments are in mulitples of this many bytes
    pub(crate) const FITS_BLOCK_SIZE: usize = 36 * KEYWORD_LINE_LENGTH; // 2880
}
