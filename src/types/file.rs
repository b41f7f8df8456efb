use super::Header;

/// The headers of a FITS file. Data units are not kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Fits<'a> {
    /// all the headers of a FITS file, the primary header first
    pub headers: Vec<Header<'a>>,
}

impl<'a> Fits<'a> {
    /// The primary header
    pub fn primary(&self) -> Option<&Header<'a>> {
        self.headers.first()
    }

    /// The headers of the extensions, in file order
    pub fn extensions(&self) -> &[Header<'a>] {
        self.headers.get(1..).unwrap_or(&[])
    }
}
