use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use self::keyword_text::KeywordText;

mod keyword_text {
    use std::fmt;
    use std::ops::Deref;
    use std::str;

    /// A stack-allocated string to store unrecognized keywords.
    ///
    /// Limited to at most 8 bytes.
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeywordText {
        buf: [u8; 8],
        len: usize,
    }

    impl KeywordText {
        /// Returns `None` when `keyword` does not fit in a header card.
        pub(crate) fn new(keyword: &str) -> Option<KeywordText> {
            let len = keyword.len();
            if len > 8 {
                return None;
            }
            let mut buf = [0; 8];
            buf[0..len].copy_from_slice(keyword.as_bytes());
            Some(KeywordText { buf, len })
        }

        pub fn as_str(&self) -> &str {
            // `new` only ever copies the bytes of a whole `&str`.
            unsafe { str::from_utf8_unchecked(&self.buf[..self.len]) }
        }
    }

    impl Deref for KeywordText {
        type Target = str;

        fn deref(&self) -> &Self::Target {
            self.as_str()
        }
    }

    impl fmt::Debug for KeywordText {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.as_str().fmt(f)
        }
    }

}

/// The keywords this crate knows by name.
///
/// Structural keywords are needed to walk a file, the rest are the ones the
/// descriptors consult most often. Every other keyword is kept as
/// `Unrecognized`, so lookups by name work for any keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types, missing_docs)]
pub enum Keyword {
    AIRMASS,
    BITPIX,
    CDELTn(u16),
    CDi_j(u16, u16),
    COMMENT,
    CONTINUE,
    CRPIXn(u16),
    CRVALn(u16),
    CTYPEn(u16),
    DATALAB,
    DATASEC,
    DETSEC,
    END,
    EXPTIME,
    EXTEND,
    EXTNAME,
    EXTVER,
    FILTER1,
    FILTER2,
    GCOUNT,
    HISTORY,
    INSTRUME,
    NAXIS,
    NAXISn(u16),
    OBJECT,
    OBSCLASS,
    OBSERVAT,
    OBSID,
    OBSTYPE,
    PCOUNT,
    SIMPLE,
    TELESCOP,
    XTENSION,
    Unrecognized(KeywordText),
}

impl Keyword {
    /// Whether this keyword carries commentary text rather than a value.
    pub fn is_commentary(&self) -> bool {
        matches!(self, Keyword::COMMENT | Keyword::HISTORY | Keyword::CONTINUE)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::CDELTn(n) => write!(f, "CDELT{}", n),
            Keyword::CDi_j(i, j) => write!(f, "CD{}_{}", i, j),
            Keyword::CRPIXn(n) => write!(f, "CRPIX{}", n),
            Keyword::CRVALn(n) => write!(f, "CRVAL{}", n),
            Keyword::CTYPEn(n) => write!(f, "CTYPE{}", n),
            Keyword::NAXISn(n) => write!(f, "NAXIS{}", n),
            Keyword::Unrecognized(k) => write!(f, "{}", k.as_str()),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// Problems that could occur when parsing a `str` for a Keyword are enumerated here.
#[derive(Debug, PartialEq)]
pub enum ParseKeywordError {
    /// Keywords are at most 8 characters long.
    TooLong,
}

impl FromStr for Keyword {
    type Err = ParseKeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end() {
            "AIRMASS" => Ok(Keyword::AIRMASS),
            "BITPIX" => Ok(Keyword::BITPIX),
            "COMMENT" => Ok(Keyword::COMMENT),
            "CONTINUE" => Ok(Keyword::CONTINUE),
            "DATALAB" => Ok(Keyword::DATALAB),
            "DATASEC" => Ok(Keyword::DATASEC),
            "DETSEC" => Ok(Keyword::DETSEC),
            "END" => Ok(Keyword::END),
            "EXPTIME" => Ok(Keyword::EXPTIME),
            "EXTEND" => Ok(Keyword::EXTEND),
            "EXTNAME" => Ok(Keyword::EXTNAME),
            "EXTVER" => Ok(Keyword::EXTVER),
            "FILTER1" => Ok(Keyword::FILTER1),
            "FILTER2" => Ok(Keyword::FILTER2),
            "GCOUNT" => Ok(Keyword::GCOUNT),
            "HISTORY" => Ok(Keyword::HISTORY),
            "INSTRUME" => Ok(Keyword::INSTRUME),
            "NAXIS" => Ok(Keyword::NAXIS),
            "OBJECT" => Ok(Keyword::OBJECT),
            "OBSCLASS" => Ok(Keyword::OBSCLASS),
            "OBSERVAT" => Ok(Keyword::OBSERVAT),
            "OBSID" => Ok(Keyword::OBSID),
            "OBSTYPE" => Ok(Keyword::OBSTYPE),
            "PCOUNT" => Ok(Keyword::PCOUNT),
            "SIMPLE" => Ok(Keyword::SIMPLE),
            "TELESCOP" => Ok(Keyword::TELESCOP),
            "XTENSION" => Ok(Keyword::XTENSION),
            input => {
                let c_delt_constructor = Keyword::CDELTn;
                let c_rpix_constructor = Keyword::CRPIXn;
                let c_rval_constructor = Keyword::CRVALn;
                let c_type_constructor = Keyword::CTYPEn;
                let naxis_constructor = Keyword::NAXISn;
                let cd_constructor = Keyword::CDi_j;
                let tuples: Vec<(&str, &(dyn Fn(u16) -> Keyword))> = vec![
                    ("CDELT", &c_delt_constructor),
                    ("CRPIX", &c_rpix_constructor),
                    ("CRVAL", &c_rval_constructor),
                    ("CTYPE", &c_type_constructor),
                    ("NAXIS", &naxis_constructor),
                ];
                let special_cases: Vec<PrefixedKeyword> = tuples
                    .into_iter()
                    .map(|(prefix, constructor)| PrefixedKeyword::new(prefix, constructor))
                    .collect();
                for special_case in special_cases {
                    if let Some(keyword) = special_case.transform(input) {
                        return Ok(keyword);
                    }
                }
                if let Some(keyword) = MatrixKeyword::new("CD", &cd_constructor).transform(input) {
                    return Ok(keyword);
                }
                KeywordText::new(input)
                    .map(Keyword::Unrecognized)
                    .ok_or(ParseKeywordError::TooLong)
            }
        }
    }
}

/// An indexed keyword family. `transform` answers `None` when `input` is not
/// a member, e.g. `NAXISLEN` for the `NAXISn` family.
trait KeywordSpecialCase {
    fn transform(&self, input: &str) -> Option<Keyword>;
}

struct PrefixedKeyword<'a> {
    prefix: &'a str,
    constructor: &'a (dyn Fn(u16) -> Keyword),
}

impl<'a> PrefixedKeyword<'a> {
    fn new(prefix: &'a str, constructor: &'a (dyn Fn(u16) -> Keyword)) -> PrefixedKeyword<'a> {
        PrefixedKeyword {
            prefix,
            constructor,
        }
    }
}

impl<'a> KeywordSpecialCase for PrefixedKeyword<'a> {
    fn transform(&self, input: &str) -> Option<Keyword> {
        let representation = input.strip_prefix(self.prefix)?;
        parse_index(representation).map(|n| (self.constructor)(n))
    }
}

struct MatrixKeyword<'a> {
    prefix: &'a str,
    constructor: &'a (dyn Fn(u16, u16) -> Keyword),
}

impl<'a> MatrixKeyword<'a> {
    fn new(prefix: &'a str, constructor: &'a (dyn Fn(u16, u16) -> Keyword)) -> MatrixKeyword<'a> {
        MatrixKeyword {
            prefix,
            constructor,
        }
    }
}

impl<'a> KeywordSpecialCase for MatrixKeyword<'a> {
    fn transform(&self, input: &str) -> Option<Keyword> {
        let representation = input.strip_prefix(self.prefix)?;
        let (i, j) = representation.split_once('_')?;
        Some((self.constructor)(parse_index(i)?, parse_index(j)?))
    }
}

fn parse_index(representation: &str) -> Option<u16> {
    if representation.is_empty() || !representation.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    u16::from_str(representation).ok()
}
