use super::Keyword;
use crate::fits::{FITS_BLOCK_SIZE, KEYWORD_LINE_LENGTH};
use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// The value of a keyword record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// A character string, without the delimiting quotes and with `''` unescaped
    CharacterString(Cow<'a, str>),
    /// Either `T` or `F`
    Logical(bool),
    /// A signed integer
    Integer(i64),
    /// A floating point number
    Real(f64),
    /// A pair of integers `(real, imaginary)`
    ComplexInteger((i64, i64)),
    /// A pair of floating point numbers `(real, imaginary)`
    Complex((f64, f64)),
    /// The value field was left empty
    Undefined,
}

impl<'a> Value<'a> {
    /// Detach this value from the buffer it was parsed from.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::CharacterString(s) => Value::CharacterString(Cow::Owned(s.into_owned())),
            Value::Logical(b) => Value::Logical(b),
            Value::Integer(n) => Value::Integer(n),
            Value::Real(f) => Value::Real(f),
            Value::ComplexInteger(c) => Value::ComplexInteger(c),
            Value::Complex(c) => Value::Complex(c),
            Value::Undefined => Value::Undefined,
        }
    }

    /// The string, when this is a character string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::CharacterString(s) => Some(s),
            _ => None,
        }
    }

    /// The number, when this is an integer or a real
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// The number, when this is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean, when this is a logical
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Logical(b) => Some(*b),
            _ => None,
        }
    }
}

/// Renders the value as it appears in a header card.
impl<'a> Display for Value<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::CharacterString(s) => write!(f, "'{:<8}'", s.replace('\'', "''")),
            Value::Logical(true) => write!(f, "T"),
            Value::Logical(false) => write!(f, "F"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(r) => write!(f, "{}", real_representation(*r)),
            Value::ComplexInteger((r, i)) => write!(f, "({}, {})", r, i),
            Value::Complex((r, i)) => {
                write!(f, "({}, {})", real_representation(*r), real_representation(*i))
            }
            Value::Undefined => Ok(()),
        }
    }
}

// Debug formatting always keeps a '.' or an exponent, so the parser reads a real back.
fn real_representation(r: f64) -> String {
    format!("{:?}", r).to_uppercase()
}

/// Problems retrieving a typed value from a header.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueRetrievalError {
    /// The keyword does not occur in the header
    KeywordNotPresent,
    /// The value is not an integer
    NotAnInteger,
    /// The value is not a character string
    NotAString,
    /// The value is neither an integer nor a real
    NotAReal,
    /// The keyword is present, but its value field is empty
    ValueUndefined,
    /// A data size keyword is negative, or the data unit is too large to address
    DataSizeOutOfRange,
}

impl Display for ValueRetrievalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let message = match self {
            ValueRetrievalError::KeywordNotPresent => "keyword not present",
            ValueRetrievalError::NotAnInteger => "value is not an integer",
            ValueRetrievalError::NotAString => "value is not a character string",
            ValueRetrievalError::NotAReal => "value is not a number",
            ValueRetrievalError::ValueUndefined => "value is undefined",
            ValueRetrievalError::DataSizeOutOfRange => "data size is out of range",
        };
        f.write_str(message)
    }
}

impl std::error::Error for ValueRetrievalError {}

/// A `KEYWORD = value / comment` record.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRecord<'a> {
    keyword: Keyword,
    value: Value<'a>,
    comment: Option<Cow<'a, str>>,
}

impl<'a> KeywordRecord<'a> {
    /// Create a keyword record
    pub fn new(keyword: Keyword, value: Value<'a>, comment: Option<&'a str>) -> KeywordRecord<'a> {
        KeywordRecord {
            keyword,
            value,
            comment: comment.map(Cow::Borrowed),
        }
    }

    pub(crate) fn from_parts(
        keyword: Keyword,
        value: Value<'a>,
        comment: Option<Cow<'a, str>>,
    ) -> KeywordRecord<'a> {
        KeywordRecord {
            keyword,
            value,
            comment,
        }
    }

    /// The keyword of this record
    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    /// The value of this record
    pub fn value(&self) -> &Value<'a> {
        &self.value
    }

    /// The comment of this record, if any
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    fn into_owned(self) -> KeywordRecord<'static> {
        KeywordRecord {
            keyword: self.keyword,
            value: self.value.into_owned(),
            comment: self.comment.map(|c| Cow::Owned(c.into_owned())),
        }
    }
}

impl<'a> Display for KeywordRecord<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let keyword = self.keyword.to_string();
        let value = self.value.to_string();
        let mut card = match self.value {
            Value::CharacterString(_) => format!("{:<8}= {:<20}", keyword, value),
            _ => format!("{:<8}= {:>20}", keyword, value),
        };
        if let Some(comment) = &self.comment {
            card.push_str(" / ");
            card.push_str(comment);
        }
        write_card(f, &card)
    }
}

/// A record without value indicator, e.g. `COMMENT` or `HISTORY`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentaryRecord<'a> {
    keyword: Keyword,
    text: Option<Cow<'a, str>>,
}

impl<'a> CommentaryRecord<'a> {
    /// Create a commentary record
    pub fn new(keyword: Keyword, text: Option<&'a str>) -> CommentaryRecord<'a> {
        CommentaryRecord {
            keyword,
            text: text.map(Cow::Borrowed),
        }
    }

    pub(crate) fn from_parts(keyword: Keyword, text: Option<Cow<'a, str>>) -> CommentaryRecord<'a> {
        CommentaryRecord { keyword, text }
    }

    /// The keyword of this record
    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    /// The commentary text, if any
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn into_owned(self) -> CommentaryRecord<'static> {
        CommentaryRecord {
            keyword: self.keyword,
            text: self.text.map(|t| Cow::Owned(t.into_owned())),
        }
    }
}

impl<'a> Display for CommentaryRecord<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let keyword = self.keyword.to_string();
        let card = format!("{:<8}{}", keyword, self.text.as_deref().unwrap_or(""));
        write_card(f, &card)
    }
}

/// A single 80 character record of a header.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderRecord<'a> {
    /// A record carrying a value
    KeywordRecord(KeywordRecord<'a>),
    /// A record carrying commentary text
    CommentaryRecord(CommentaryRecord<'a>),
    /// A record with a blank keyword field and an optional comment
    BlankRecord(Option<Cow<'a, str>>),
    /// The `END` record closing a header
    EndRecord,
}

impl<'a> HeaderRecord<'a> {
    /// Detach this record from the buffer it was parsed from.
    pub fn into_owned(self) -> HeaderRecord<'static> {
        match self {
            HeaderRecord::KeywordRecord(r) => HeaderRecord::KeywordRecord(r.into_owned()),
            HeaderRecord::CommentaryRecord(r) => HeaderRecord::CommentaryRecord(r.into_owned()),
            HeaderRecord::BlankRecord(c) => {
                HeaderRecord::BlankRecord(c.map(|c| Cow::Owned(c.into_owned())))
            }
            HeaderRecord::EndRecord => HeaderRecord::EndRecord,
        }
    }
}

impl<'a> Display for HeaderRecord<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            HeaderRecord::KeywordRecord(r) => r.fmt(f),
            HeaderRecord::CommentaryRecord(r) => r.fmt(f),
            HeaderRecord::BlankRecord(None) => write_card(f, ""),
            HeaderRecord::BlankRecord(Some(comment)) => {
                write_card(f, &format!("{:<8}/ {}", "", comment))
            }
            HeaderRecord::EndRecord => write_card(f, "END"),
        }
    }
}

/// Write `card` cut or padded to exactly one record.
fn write_card(f: &mut Formatter<'_>, card: &str) -> fmt::Result {
    let card: String = card.chars().take(KEYWORD_LINE_LENGTH).collect();
    write!(f, "{:<width$}", card, width = KEYWORD_LINE_LENGTH)
}

/// The header of a single header-data unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Header<'a> {
    records: Vec<HeaderRecord<'a>>,
    start: usize,
    size: usize,
}

impl<'a> Header<'a> {
    /// Create a header from its records, the byte offset where it starts in
    /// the file and the number of bytes it occupies.
    pub fn new(records: Vec<HeaderRecord<'a>>, start: usize, size: usize) -> Header<'a> {
        Header {
            records,
            start,
            size,
        }
    }

    /// Create a header that is not (yet) part of a file.
    pub fn from_records(records: Vec<HeaderRecord<'a>>) -> Header<'a> {
        let cards = records.len() + usize::from(!records.contains(&HeaderRecord::EndRecord));
        let size = padded_to_block(cards * KEYWORD_LINE_LENGTH);
        Header::new(records, 0, size)
    }

    /// All records, in file order
    pub fn records(&self) -> &[HeaderRecord<'a>] {
        &self.records
    }

    /// Byte offset of the first record in the file
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of bytes the header occupies, padding included
    pub fn size(&self) -> usize {
        self.size
    }

    /// The keyword records, in file order
    pub fn keyword_records(&self) -> impl Iterator<Item = &KeywordRecord<'a>> {
        self.records.iter().filter_map(|record| match record {
            HeaderRecord::KeywordRecord(r) => Some(r),
            _ => None,
        })
    }

    /// The keywords that carry a value, in file order
    pub fn keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.keyword_records().map(KeywordRecord::keyword)
    }

    /// The value of the first record with `keyword`
    pub fn value_of(&self, keyword: &Keyword) -> Result<&Value<'a>, ValueRetrievalError> {
        self.keyword_records()
            .find(|r| r.keyword() == keyword)
            .map(KeywordRecord::value)
            .ok_or(ValueRetrievalError::KeywordNotPresent)
    }

    /// The string value of `keyword`
    pub fn str_value_of(&self, keyword: &Keyword) -> Result<&str, ValueRetrievalError> {
        match self.value_of(keyword)? {
            Value::CharacterString(s) => Ok(s),
            Value::Undefined => Err(ValueRetrievalError::ValueUndefined),
            _ => Err(ValueRetrievalError::NotAString),
        }
    }

    /// The integer value of `keyword`
    pub fn integer_value_of(&self, keyword: &Keyword) -> Result<i64, ValueRetrievalError> {
        match self.value_of(keyword)? {
            Value::Integer(n) => Ok(*n),
            Value::Undefined => Err(ValueRetrievalError::ValueUndefined),
            _ => Err(ValueRetrievalError::NotAnInteger),
        }
    }

    /// The numeric value of `keyword`, integers included
    pub fn real_value_of(&self, keyword: &Keyword) -> Result<f64, ValueRetrievalError> {
        match self.value_of(keyword)? {
            Value::Undefined => Err(ValueRetrievalError::ValueUndefined),
            value => value.as_f64().ok_or(ValueRetrievalError::NotAReal),
        }
    }

    /// Look a value up by keyword name. Undefined values count as absent.
    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        let keyword = Keyword::from_str(name).ok()?;
        match self.value_of(&keyword) {
            Ok(Value::Undefined) | Err(_) => None,
            Ok(value) => Some(value),
        }
    }

    /// Whether a record with keyword `name` carries a value, defined or not
    pub fn contains(&self, name: &str) -> bool {
        Keyword::from_str(name)
            .map(|keyword| self.keywords().any(|k| *k == keyword))
            .unwrap_or(false)
    }

    /// The name of the extension, when the header carries an `EXTNAME`
    pub fn extension_name(&self) -> Option<&str> {
        self.str_value_of(&Keyword::EXTNAME).ok()
    }

    /// Number of bytes in the data unit that follows this header, without padding.
    pub fn data_array_size(&self) -> Result<usize, ValueRetrievalError> {
        let naxis = self.integer_value_of(&Keyword::NAXIS)?;
        if naxis == 0 {
            return Ok(0);
        }
        let bitpix = self.integer_value_of(&Keyword::BITPIX)?;
        let gcount = match self.integer_value_of(&Keyword::GCOUNT) {
            Err(ValueRetrievalError::KeywordNotPresent) => 1,
            other => other?,
        };
        let pcount = match self.integer_value_of(&Keyword::PCOUNT) {
            Err(ValueRetrievalError::KeywordNotPresent) => 0,
            other => other?,
        };
        if !(0..=999).contains(&naxis) || gcount < 0 || pcount < 0 {
            return Err(ValueRetrievalError::DataSizeOutOfRange);
        }
        // Random groups (NAXIS1 = 0) leave the first axis out of the product.
        let mut elements: i64 = 1;
        for n in 1..=naxis {
            let length = self.integer_value_of(&Keyword::NAXISn(n as u16))?;
            if length < 0 {
                return Err(ValueRetrievalError::DataSizeOutOfRange);
            }
            if !(n == 1 && length == 0) {
                elements = elements
                    .checked_mul(length)
                    .ok_or(ValueRetrievalError::DataSizeOutOfRange)?;
            }
        }
        bitpix
            .checked_abs()
            .and_then(|bits| (bits / 8).checked_mul(gcount))
            .and_then(|bytes| bytes.checked_mul(pcount.checked_add(elements)?))
            .and_then(|bytes| usize::try_from(bytes).ok())
            .ok_or(ValueRetrievalError::DataSizeOutOfRange)
    }

    /// Number of bytes the data unit occupies in the file, padding included.
    pub fn data_unit_size(&self) -> Result<usize, ValueRetrievalError> {
        let bytes = self.data_array_size()?;
        bytes
            .checked_add(FITS_BLOCK_SIZE - 1)
            .map(|end| end / FITS_BLOCK_SIZE * FITS_BLOCK_SIZE)
            .ok_or(ValueRetrievalError::DataSizeOutOfRange)
    }

    /// Encode the header as it would be written to a file: every record as
    /// an 80 byte card, `END` added when missing, blank-padded to a block.
    pub fn encode(&self) -> Vec<u8> {
        let mut cards = String::with_capacity(self.size);
        for record in &self.records {
            cards.push_str(&record.to_string());
        }
        if !self.records.contains(&HeaderRecord::EndRecord) {
            cards.push_str(&HeaderRecord::EndRecord.to_string());
        }
        let mut bytes = cards.into_bytes();
        bytes.resize(padded_to_block(bytes.len()), b' ');
        bytes
    }
}

impl<'a> Display for Header<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            if let HeaderRecord::BlankRecord(None) = record {
                continue;
            }
            writeln!(f, "{}", record.to_string().trim_end())?;
        }
        Ok(())
    }
}

fn padded_to_block(bytes: usize) -> usize {
    (bytes + FITS_BLOCK_SIZE - 1) / FITS_BLOCK_SIZE * FITS_BLOCK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(name: &str) -> Keyword {
        Keyword::from_str(name).unwrap()
    }

    fn image_header<'a>(bitpix: i64, axes: &[i64]) -> Header<'a> {
        let mut records = vec![
            HeaderRecord::KeywordRecord(KeywordRecord::new(
                Keyword::XTENSION,
                Value::CharacterString("IMAGE".into()),
                None,
            )),
            HeaderRecord::KeywordRecord(KeywordRecord::new(
                Keyword::BITPIX,
                Value::Integer(bitpix),
                None,
            )),
            HeaderRecord::KeywordRecord(KeywordRecord::new(
                Keyword::NAXIS,
                Value::Integer(axes.len() as i64),
                None,
            )),
        ];
        for (idx, length) in axes.iter().enumerate() {
            records.push(HeaderRecord::KeywordRecord(KeywordRecord::new(
                Keyword::NAXISn(idx as u16 + 1),
                Value::Integer(*length),
                None,
            )));
        }
        records.push(HeaderRecord::EndRecord);
        Header::from_records(records)
    }

    #[test]
    fn data_array_size_multiplies_axes_and_element_size() {
        let header = image_header(-32, &[2048, 4608]);

        assert_eq!(header.data_array_size().unwrap(), 4 * 2048 * 4608);
    }

    #[test]
    fn data_unit_size_is_padded_to_a_block() {
        let header = image_header(16, &[10, 10]);

        assert_eq!(header.data_array_size().unwrap(), 200);
        assert_eq!(header.data_unit_size().unwrap(), FITS_BLOCK_SIZE);
    }

    #[test]
    fn oversized_or_negative_axes_are_out_of_range() {
        let huge = 1 << 40;
        assert_eq!(
            image_header(16, &[huge, huge]).data_array_size(),
            Err(ValueRetrievalError::DataSizeOutOfRange)
        );
        assert_eq!(
            image_header(16, &[-10, 10]).data_array_size(),
            Err(ValueRetrievalError::DataSizeOutOfRange)
        );
        assert_eq!(
            image_header(i64::MIN, &[10]).data_unit_size(),
            Err(ValueRetrievalError::DataSizeOutOfRange)
        );
    }

    #[test]
    fn header_without_axes_has_no_data() {
        let header = image_header(8, &[]);

        assert_eq!(header.data_array_size().unwrap(), 0);
    }

    #[test]
    fn get_finds_unrecognized_keywords_by_name() {
        let header = Header::from_records(vec![HeaderRecord::KeywordRecord(KeywordRecord::new(
            keyword("DATE-OBS"),
            Value::CharacterString("2017-01-01".into()),
            None,
        ))]);

        assert_eq!(
            header.get("DATE-OBS").and_then(Value::as_str),
            Some("2017-01-01")
        );
        assert!(header.get("UTSTART").is_none());
        assert!(header.contains("DATE-OBS"));
    }

    #[test]
    fn undefined_values_are_absent_for_get_but_contained() {
        let header = Header::from_records(vec![HeaderRecord::KeywordRecord(KeywordRecord::new(
            keyword("PMRA"),
            Value::Undefined,
            None,
        ))]);

        assert!(header.get("PMRA").is_none());
        assert!(header.contains("PMRA"));
        assert_eq!(
            header.real_value_of(&keyword("PMRA")),
            Err(ValueRetrievalError::ValueUndefined)
        );
    }

    #[test]
    fn keyword_record_renders_as_a_fixed_format_card() {
        let record = KeywordRecord::new(Keyword::EXPTIME, Value::Real(300.0), Some("seconds"));
        let card = record.to_string();

        assert_eq!(card.len(), KEYWORD_LINE_LENGTH);
        assert!(card.starts_with("EXPTIME =                300.0 / seconds"));
    }

    #[test]
    fn string_values_are_quoted_and_escaped() {
        let record = KeywordRecord::new(
            Keyword::OBJECT,
            Value::CharacterString("O'HARA".into()),
            None,
        );

        assert!(record.to_string().starts_with("OBJECT  = 'O''HARA '"));
    }

    #[test]
    fn encode_appends_end_and_pads_to_a_block() {
        let header = Header::from_records(vec![HeaderRecord::KeywordRecord(KeywordRecord::new(
            Keyword::SIMPLE,
            Value::Logical(true),
            None,
        ))]);
        let bytes = header.encode();

        assert_eq!(bytes.len(), FITS_BLOCK_SIZE);
        assert_eq!(&bytes[80..83], b"END");
        assert!(bytes[83..].iter().all(|b| *b == b' '));
    }
}
