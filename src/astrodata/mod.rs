//! An opened FITS file, classified by instrument, with descriptor lookup.
//!
//! Only the headers are kept. When a file is opened its primary header
//! decides which [`InstrumentClass`] it belongs to, and the tag rules of that
//! class and its ancestors are evaluated once. Descriptors are evaluated on
//! request and never cached.
mod error;
mod tags;
mod value;

pub use error::{DescriptorError, OpenError};
pub use tags::{resolve, TagSet};
pub use value::{Date, DateTime, DescriptorValue, Section, Time};

use crate::{
    instruments::InstrumentClass,
    parser::{read_fits, FitsError},
    types::{Header, Value},
};
use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, Read, Seek},
    path::{Path, PathBuf},
    slice,
};
use tracing::debug;

/// The headers of one FITS file together with its instrument class and tags.
#[derive(Debug, Clone)]
pub struct AstroData {
    path: PathBuf,
    filename: String,
    phu: Header<'static>,
    extensions: Vec<Header<'static>>,
    class: InstrumentClass,
    tags: BTreeSet<&'static str>,
}

impl AstroData {
    /// Read the headers of the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<AstroData, OpenError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| OpenError::new(path, FitsError::Io(e)))?;
        AstroData::from_reader(path, BufReader::new(file))
    }

    /// Read the headers from `reader`, which holds the contents of `path`.
    pub fn from_reader<R: Read + Seek>(path: &Path, reader: R) -> Result<AstroData, OpenError> {
        let fits = read_fits(reader).map_err(|e| OpenError::new(path, e))?;
        let mut headers = fits.headers.into_iter();
        let phu = headers
            .next()
            .ok_or_else(|| OpenError::new(path, FitsError::NotFits))?;
        let ad = AstroData::from_headers(path, phu, headers.collect());
        debug!(
            path = %path.display(),
            class = ad.class.name(),
            extensions = ad.extensions.len(),
            tags = ?ad.tags,
            "opened"
        );
        Ok(ad)
    }

    /// Assemble a handle from headers that are already in memory.
    pub fn from_headers(
        path: impl Into<PathBuf>,
        phu: Header<'static>,
        extensions: Vec<Header<'static>>,
    ) -> AstroData {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let class = InstrumentClass::classify(&phu);
        let mut ad = AstroData {
            path,
            filename,
            phu,
            extensions,
            class,
            tags: BTreeSet::new(),
        };
        ad.tags = class.tags(&ad);
        ad
    }

    /// The last component of the path the file was opened with
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The path the file was opened with
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The primary header
    pub fn phu(&self) -> &Header<'static> {
        &self.phu
    }

    /// The extension headers, in file order
    pub fn extensions(&self) -> &[Header<'static>] {
        &self.extensions
    }

    /// The headers that per-extension descriptors consult: every extension,
    /// or the primary header when the file has none.
    pub fn hdr_headers(&self) -> &[Header<'static>] {
        if self.extensions.is_empty() {
            slice::from_ref(&self.phu)
        } else {
            &self.extensions
        }
    }

    /// The instrument class the file was classified as
    pub fn class(&self) -> InstrumentClass {
        self.class
    }

    /// All tags of the file
    pub fn tags(&self) -> &BTreeSet<&'static str> {
        &self.tags
    }

    /// Whether the file carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// The value of `name` in the primary header
    pub fn phu_get(&self, name: &str) -> Option<&Value<'static>> {
        self.phu.get(name)
    }

    /// The string value of `name` in the primary header
    pub fn phu_str(&self, name: &str) -> Option<&str> {
        self.phu_get(name).and_then(Value::as_str)
    }

    /// The numeric value of `name` in the primary header
    pub fn phu_f64(&self, name: &str) -> Option<f64> {
        self.phu_get(name).and_then(Value::as_f64)
    }

    /// The integer value of `name` in the primary header
    pub fn phu_i64(&self, name: &str) -> Option<i64> {
        self.phu_get(name).and_then(Value::as_i64)
    }

    /// Whether the primary header has a record for `name`, even an undefined one
    pub fn phu_contains(&self, name: &str) -> bool {
        self.phu.contains(name)
    }

    /// The names of all valued keywords in the primary header
    pub fn phu_keywords(&self) -> impl Iterator<Item = String> + '_ {
        self.phu.keywords().map(|keyword| keyword.to_string())
    }

    /// The value of `name` in the primary header, `None` when absent
    pub fn phu_value(&self, name: &str) -> DescriptorValue {
        self.phu_get(name).into()
    }

    /// The value of `name` in every header of [`hdr_headers`](Self::hdr_headers)
    pub fn hdr_get(&self, name: &str) -> Vec<Option<&Value<'static>>> {
        self.hdr_headers().iter().map(|h| h.get(name)).collect()
    }

    /// The string value of `name` in every header
    pub fn hdr_str(&self, name: &str) -> Vec<Option<&str>> {
        self.hdr_headers()
            .iter()
            .map(|h| h.get(name).and_then(Value::as_str))
            .collect()
    }

    /// The numeric value of `name` in every header
    pub fn hdr_f64(&self, name: &str) -> Vec<Option<f64>> {
        self.hdr_headers()
            .iter()
            .map(|h| h.get(name).and_then(Value::as_f64))
            .collect()
    }

    /// The values of `name` as a list with one entry per extension
    pub fn hdr_value(&self, name: &str) -> DescriptorValue {
        DescriptorValue::List(self.hdr_get(name).into_iter().map(Into::into).collect())
    }

    /// The header keyword that the class hierarchy associates with `name`.
    pub fn keyword_for(&self, name: &'static str) -> Result<&'static str, DescriptorError> {
        self.class
            .keyword_for(name)
            .ok_or_else(|| DescriptorError::evaluation(name, "no header keyword is associated with it"))
    }

    /// Evaluate the descriptor called `name`.
    pub fn descriptor(&self, name: &str) -> Result<DescriptorValue, DescriptorError> {
        let accessor =
            self.class
                .accessor(name)
                .ok_or_else(|| DescriptorError::Unsupported {
                    descriptor: name.to_string(),
                    class: self.class.name(),
                })?;
        accessor(self)
    }

    /// Evaluate every descriptor in `names`, in order. The first failure is
    /// returned.
    pub fn descriptors<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<DescriptorValue>, DescriptorError> {
        names
            .iter()
            .map(|name| self.descriptor(name.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HeaderRecord, Keyword, KeywordRecord, ValueRetrievalError};
    use std::{io::Cursor, str::FromStr};

    fn card(name: &str, value: Value<'static>) -> HeaderRecord<'static> {
        HeaderRecord::KeywordRecord(KeywordRecord::new(
            Keyword::from_str(name).unwrap(),
            value,
            None,
        ))
    }

    fn string(s: &str) -> Value<'static> {
        Value::CharacterString(s.to_string().into())
    }

    fn gmos_phu() -> Header<'static> {
        Header::from_records(vec![
            card("SIMPLE", Value::Logical(true)),
            card("BITPIX", Value::Integer(16)),
            card("NAXIS", Value::Integer(0)),
            card("INSTRUME", string("GMOS-N")),
            card("OBSERVAT", string("Gemini-North")),
            card("OBJECT", string("NGC 1068")),
            card("FILTER1", string("g_G0301")),
            card("FILTER2", string("open2-8")),
        ])
    }

    fn extension(ampname: &str) -> Header<'static> {
        Header::from_records(vec![
            card("XTENSION", string("IMAGE")),
            card("BITPIX", Value::Integer(16)),
            card("NAXIS", Value::Integer(0)),
            card("AMPNAME", string(ampname)),
        ])
    }

    #[test]
    fn filename_is_the_last_path_component() {
        let ad = AstroData::from_headers("/data/raw/A.fits", gmos_phu(), vec![]);

        assert_eq!(ad.filename(), "A.fits");
        assert_eq!(ad.path(), Path::new("/data/raw/A.fits"));
    }

    #[test]
    fn hdr_falls_back_to_the_primary_header() {
        let ad = AstroData::from_headers("A.fits", gmos_phu(), vec![]);
        assert_eq!(ad.hdr_str("INSTRUME"), vec![Some("GMOS-N")]);

        let ad = AstroData::from_headers(
            "A.fits",
            gmos_phu(),
            vec![extension("amp1"), extension("amp2")],
        );
        assert_eq!(ad.hdr_str("AMPNAME"), vec![Some("amp1"), Some("amp2")]);
        assert_eq!(ad.hdr_str("INSTRUME"), vec![None, None]);
    }

    #[test]
    fn descriptors_are_evaluated_in_order() {
        let ad = AstroData::from_headers("A.fits", gmos_phu(), vec![]);
        let values = ad.descriptors(&["camera", "filter_name", "object"]).unwrap();

        let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["GMOS-N", "g_G0301&open2-8", "NGC 1068"]);
    }

    #[test]
    fn unknown_descriptor_names_the_class() {
        let ad = AstroData::from_headers("A.fits", gmos_phu(), vec![]);

        assert_eq!(
            ad.descriptor("no_such_thing"),
            Err(DescriptorError::Unsupported {
                descriptor: "no_such_thing".to_string(),
                class: "GMOS",
            })
        );
    }

    #[test]
    fn classification_and_tags_happen_on_open() {
        let ad = AstroData::from_headers("A.fits", gmos_phu(), vec![]);

        assert_eq!(ad.class(), InstrumentClass::Gmos);
        assert!(ad.has_tag("GEMINI"));
        assert!(ad.has_tag("GMOS"));
        assert!(ad.has_tag("NORTH"));
        assert!(ad.has_tag("RAW"));
        assert!(ad.has_tag("UNPREPARED"));
    }

    #[test]
    fn from_reader_reports_the_path_on_failure() {
        let err = AstroData::from_reader(Path::new("bad.fits"), Cursor::new(vec![0u8; 10]))
            .unwrap_err();

        assert_eq!(err.path(), Path::new("bad.fits"));
        assert!(matches!(err.fits_error(), FitsError::NotFits));
    }

    #[test]
    fn absurd_data_sizes_are_errors() {
        let bytes = Header::from_records(vec![
            card("SIMPLE", Value::Logical(true)),
            card("BITPIX", Value::Integer(16)),
            card("NAXIS", Value::Integer(2)),
            card("NAXIS1", Value::Integer(1 << 40)),
            card("NAXIS2", Value::Integer(1 << 40)),
            card("INSTRUME", string("GMOS-N")),
        ])
        .encode();

        let err = AstroData::from_reader(Path::new("big.fits"), Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err.fits_error(),
            FitsError::DataSize {
                hdu: 0,
                source: ValueRetrievalError::DataSizeOutOfRange
            }
        ));
    }

    #[test]
    fn from_reader_reads_encoded_headers() {
        let bytes = gmos_phu().encode();
        let ad = AstroData::from_reader(Path::new("dir/A.fits"), Cursor::new(bytes)).unwrap();

        assert_eq!(ad.filename(), "A.fits");
        assert_eq!(ad.phu_str("OBSERVAT"), Some("Gemini-North"));
        assert!(ad.extensions().is_empty());
    }
}
