use showd::types::{Header, HeaderRecord, Keyword, KeywordRecord, Value};
use std::{fs, path::PathBuf, str::FromStr};
use tempfile::TempDir;

pub fn card(name: &str, value: Value<'static>) -> HeaderRecord<'static> {
    HeaderRecord::KeywordRecord(KeywordRecord::new(
        Keyword::from_str(name).unwrap(),
        value,
        None,
    ))
}

pub fn string(s: &str) -> Value<'static> {
    Value::CharacterString(s.to_string().into())
}

/// A GMOS-N image with one header-only extension.
pub fn gmos_image(object: &str, filter: &str) -> Vec<u8> {
    let phu = Header::from_records(vec![
        card("SIMPLE", Value::Logical(true)),
        card("BITPIX", Value::Integer(16)),
        card("NAXIS", Value::Integer(0)),
        card("EXTEND", Value::Logical(true)),
        card("INSTRUME", string("GMOS-N")),
        card("OBSERVAT", string("Gemini-North")),
        card("TELESCOP", string("Gemini-North")),
        card("OBJECT", string(object)),
        card("OBSTYPE", string("OBJECT")),
        card("FILTER1", string(filter)),
        card("FILTER2", string("open2-8")),
        card("GRATING", string("MIRROR")),
        card("MASKNAME", string("None")),
        card("EXPTIME", Value::Real(30.0)),
    ]);
    let extension = Header::from_records(vec![
        card("XTENSION", string("IMAGE")),
        card("BITPIX", Value::Integer(16)),
        card("NAXIS", Value::Integer(0)),
        card("PCOUNT", Value::Integer(0)),
        card("GCOUNT", Value::Integer(1)),
        card("EXTNAME", string("SCI")),
        card("AMPNAME", string("EEV 9273-20-04, right")),
    ]);

    let mut bytes = phu.encode();
    bytes.extend(extension.encode());
    bytes
}

/// Write `files` into a fresh directory, returning it with the file paths.
pub fn write_files(files: &[(&str, Vec<u8>)]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let paths = files
        .iter()
        .map(|(name, bytes)| {
            let path = dir.path().join(name);
            fs::write(&path, bytes).unwrap();
            path
        })
        .collect();
    (dir, paths)
}
