use crate::{
    fits::KEYWORD_LINE_LENGTH,
    parser::util::{exact_length, free_text, pair_values, ws},
    types::{CommentaryRecord, HeaderRecord, Keyword, KeywordRecord, Value},
};
use nom::{
    branch::alt,
    bytes::complete::{tag, take, take_while1},
    character::{
        complete::{one_of, space0},
        is_digit,
    },
    combinator::{map, map_res, not, opt, peek, recognize, rest, verify},
    multi::many0,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};
use std::{borrow::Cow, str::FromStr};

use super::util::is_ascii_text_char;

/// Use the `inner` parser to parse the next 80 bytes. Any final padding will be ignored.
fn parse_keyword_line<'a, F: 'a, O, E: nom::error::ParseError<&'a [u8]>>(
    inner: F,
) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], O, E>
where
    F: FnMut(&'a [u8]) -> IResult<&'a [u8], O, E>,
    E: 'a,
    O: 'a,
{
    exact_length(KEYWORD_LINE_LENGTH, terminated(inner, many0(tag(" "))))
}

/// Parse a single record from a header
pub(crate) fn header_record(input: &[u8]) -> IResult<&[u8], HeaderRecord> {
    alt((
        end_record,
        blankfield_record,
        value_keyword_record,
        commentary_keyword_record,
    ))(input)
}

// Any keyword without a value indicator is commentary: COMMENT, HISTORY,
// CONTINUE and the like. The text is kept as is.
fn commentary_keyword_record(input: &[u8]) -> IResult<&[u8], HeaderRecord> {
    parse_keyword_line(map(
        tuple((verify(keyword_field, |k| *k != Keyword::END), rest)),
        |(keyword, text)| {
            let text = free_text(text);
            let text = if text.is_empty() { None } else { Some(text) };
            HeaderRecord::CommentaryRecord(CommentaryRecord::from_parts(keyword, text))
        },
    ))(input)
}

fn value_keyword_record(input: &[u8]) -> IResult<&[u8], HeaderRecord> {
    parse_keyword_line(map(
        tuple((keyword_field, value_indicator, ws(opt(value)), opt(comment))),
        |(keyword, _, value, comment)| {
            let value = value.unwrap_or(Value::Undefined);
            HeaderRecord::KeywordRecord(KeywordRecord::from_parts(keyword, value, comment))
        },
    ))(input)
}

fn blankfield_record(input: &[u8]) -> IResult<&[u8], HeaderRecord> {
    parse_keyword_line(map(
        tuple((tag("        "), ws(opt(comment)))),
        |(_, comment)| HeaderRecord::BlankRecord(comment),
    ))(input)
}

fn end_record(input: &[u8]) -> IResult<&[u8], HeaderRecord> {
    parse_keyword_line(map(tag("END     "), |_| HeaderRecord::EndRecord))(input)
}

fn keyword_field(input: &[u8]) -> IResult<&[u8], Keyword> {
    map_res(
        map_res(take(8usize), std::str::from_utf8),
        Keyword::from_str,
    )(input)
}

fn value_indicator(input: &[u8]) -> IResult<&[u8], &[u8]> {
    tag("= ")(input)
}

fn comment(input: &[u8]) -> IResult<&[u8], Cow<str>> {
    map(preceded(tag("/"), preceded(space0, rest)), free_text)(input)
}

fn value(input: &[u8]) -> IResult<&[u8], Value> {
    alt((
        character_string_value,
        logical_value,
        integer_value,
        floating_value,
        complex_integer_value,
        complex_floating_value,
    ))(input)
}

fn character_string_value(input: &[u8]) -> IResult<&[u8], Value> {
    // Constraint: the begin_quote and end_quote are not part of the
    // character string value but only serve as delimiters. Leading
    // spaces are significant; trailing spaces are not. A quote inside
    // the string is written as two successive quotes.
    map(
        map_res(
            delimited(
                tag("'"),
                recognize(many0(alt((take_while1(is_string_text_char), tag("''"))))),
                tag("'"),
            ),
            std::str::from_utf8,
        ),
        |s| Value::CharacterString(unescape_quotes(s.trim_end())),
    )(input)
}

fn unescape_quotes(s: &str) -> Cow<str> {
    if s.contains("''") {
        Cow::Owned(s.replace("''", "'"))
    } else {
        Cow::Borrowed(s)
    }
}

fn logical_value(input: &[u8]) -> IResult<&[u8], Value> {
    map(alt((tag("T"), tag("F"))), |s: &[u8]| {
        Value::Logical(s == b"T")
    })(input)
}

fn integer_value(input: &[u8]) -> IResult<&[u8], Value> {
    map(integer, Value::Integer)(input)
}

// if an integer has a '.' or an exponent after, we assume its a float and shouldn't parse
fn integer(input: &[u8]) -> IResult<&[u8], i64> {
    map_res(
        map_res(
            recognize(tuple((
                sign,
                take_while1(is_digit),
                peek(not(one_of(".EDed"))),
            ))),
            std::str::from_utf8,
        ),
        i64::from_str,
    )(input)
}

fn sign(input: &[u8]) -> IResult<&[u8], Option<u8>> {
    opt(map(alt((tag("+"), tag("-"))), |x: &[u8]| x[0]))(input)
}

fn floating_value(input: &[u8]) -> IResult<&[u8], Value> {
    map(floating, Value::Real)(input)
}

fn floating(input: &[u8]) -> IResult<&[u8], f64> {
    map_res(
        map_res(
            recognize(tuple((decimal_number, opt(exponent)))),
            std::str::from_utf8,
        ),
        // FORTRAN double precision exponents: 3.14D2
        |s: &str| f64::from_str(&s.replace(['D', 'd'], "E")),
    )(input)
}

fn decimal_number(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(tuple((
        opt(sign),
        alt((decimal_number_must_integer, decimal_number_must_fractional)),
    )))(input)
}

fn decimal_number_must_integer(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(tuple((
        number_part,
        opt(tuple((tag("."), opt(number_part)))),
    )))(input)
}

fn decimal_number_must_fractional(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(tuple((opt(number_part), tag("."), number_part)))(input)
}

fn number_part(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(is_digit)(input)
}

fn exponent(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(tuple((exponent_letter, opt(sign), number_part)))(input)
}

fn exponent_letter(input: &[u8]) -> IResult<&[u8], &[u8]> {
    alt((tag("E"), tag("D"), tag("e"), tag("d")))(input)
}

fn complex_integer_value(input: &[u8]) -> IResult<&[u8], Value> {
    map(pair_values(integer, integer), |(r, c)| {
        Value::ComplexInteger((r, c))
    })(input)
}

fn complex_floating_value(input: &[u8]) -> IResult<&[u8], Value> {
    map(pair_values(floating, floating), |(r, c)| {
        Value::Complex((r, c))
    })(input)
}

fn is_string_text_char(chr: u8) -> bool {
    // Constraint: a string_text_char is identical to an ascii_text_char
    // except for the quote char; a quote char is represented by two
    // successive quote chars.
    let single_quote = b'\'';
    is_ascii_text_char(chr) && chr != single_quote
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommentaryRecord;

    fn card(text: &str) -> String {
        format!("{:<80}", text)
    }

    #[test]
    fn keyword_record_should_parse_a_keyword_record() {
        let data = card("OBJECT  = 'NGC 4038'           / Object Name");
        assert_eq!(data.len(), KEYWORD_LINE_LENGTH);

        let (_, record) = header_record(data.as_bytes()).unwrap();
        assert_eq!(
            record,
            HeaderRecord::KeywordRecord(KeywordRecord::new(
                Keyword::OBJECT,
                Value::CharacterString("NGC 4038".into()),
                Option::Some("Object Name")
            ))
        )
    }

    #[test]
    fn keyword_record_should_parse_unrecognized_keyword_record() {
        let data = card("PIXSCALE=               0.0807 / Pixel scale in Y in arcsec/pixel");

        let (_, record) = value_keyword_record(data.as_bytes()).unwrap();
        assert_eq!(
            record,
            HeaderRecord::KeywordRecord(KeywordRecord::new(
                Keyword::from_str("PIXSCALE").unwrap(),
                Value::Real(0.0807f64),
                Option::Some("Pixel scale in Y in arcsec/pixel")
            ))
        )
    }

    #[test]
    fn keyword_record_should_parse_a_keyword_record_without_a_comment() {
        let data = card("NAXIS1  =                 2048");

        let (_, result) = header_record(data.as_bytes()).unwrap();

        assert_eq!(
            result,
            HeaderRecord::KeywordRecord(KeywordRecord::new(
                Keyword::NAXISn(1),
                Value::Integer(2048),
                Option::None,
            ))
        )
    }

    #[test]
    fn keyword_record_without_value_is_undefined() {
        let data = card("PMRA    =                      / [arcsec/yr] RA proper motion");

        let (_, result) = header_record(data.as_bytes()).unwrap();

        assert_eq!(
            result,
            HeaderRecord::KeywordRecord(KeywordRecord::new(
                Keyword::from_str("PMRA").unwrap(),
                Value::Undefined,
                Option::Some("[arcsec/yr] RA proper motion"),
            ))
        )
    }

    #[test]
    fn header_record_should_parse_an_empty_comment() {
        let data = card("               / string version of target id");

        let (_, record) = header_record(data.as_bytes()).unwrap();
        assert_eq!(
            record,
            HeaderRecord::BlankRecord(Option::Some("string version of target id".into()))
        )
    }

    #[test]
    fn header_record_should_parse_a_blank_record() {
        let data = card("");

        let (_, record) = header_record(data.as_bytes()).unwrap();
        assert_eq!(record, HeaderRecord::BlankRecord(None))
    }

    #[test]
    fn header_record_should_parse_end() {
        let input = card("END");
        let (_, record) = header_record(input.as_bytes()).unwrap();
        assert_eq!(record, HeaderRecord::EndRecord)
    }

    #[test]
    fn header_record_should_parse_any_commentary_keyword() {
        for (keyword, text) in &[
            ("HISTORY", "prepare: 2017-01-01"),
            ("COMMENT", "FITS (Flexible Image Transport System)"),
            ("CONTINUE", "'continued&'"),
        ] {
            let data = card(&format!("{:<8}{}", keyword, text));

            let (_, record) = header_record(data.as_bytes()).unwrap();
            assert_eq!(
                record,
                HeaderRecord::CommentaryRecord(CommentaryRecord::new(
                    Keyword::from_str(keyword).unwrap(),
                    Some(text)
                ))
            )
        }
    }

    #[test]
    fn header_record_should_refuse_a_short_line() {
        assert!(header_record(b"SIMPLE  =                    T").is_err());
    }

    #[allow(non_snake_case)]
    #[test]
    fn logical_constant_should_parse_an_uppercase_T_or_F() {
        for (constant, boolean) in &[("T", true), ("F", false)] {
            let data = constant.as_bytes();

            let (_, result) = logical_value(data).unwrap();
            assert_eq!(result, Value::Logical(*boolean))
        }
    }

    #[test]
    fn real_should_parse_an_floating_point_number() {
        for (input, f) in &[("1.0", 1f64), ("37.0", 37f64), ("-51.5", -51.5f64), (".5", 0.5f64)] {
            let data = input.as_bytes();

            let (_, result) = value(data).unwrap();
            assert_eq!(result, Value::Real(*f))
        }
    }

    #[test]
    fn real_should_parse_exponents() {
        for (input, f) in &[("1.5E3", 1500f64), ("3.14D2", 314f64), ("2E-2", 0.02f64)] {
            let data = input.as_bytes();

            let (_, result) = value(data).unwrap();
            assert_eq!(result, Value::Real(*f))
        }
    }

    #[test]
    fn integer_should_parse_an_integer() {
        for (input, n) in &[("1", 1i64), ("+37", 37i64), ("-51", -51i64)] {
            let data = input.as_bytes();

            let (_, result) = value(data).unwrap();
            assert_eq!(result, Value::Integer(*n))
        }
    }

    #[test]
    fn parse_character_string_value() {
        let data = "'GMOS-N  '".as_bytes();
        let (_, k) = character_string_value(data).unwrap();
        assert_eq!(k, Value::CharacterString("GMOS-N".into()))
    }

    #[test]
    fn parse_character_string_value_with_escaped_quote() {
        let data = "'O''HARA'".as_bytes();
        let (_, k) = character_string_value(data).unwrap();
        assert_eq!(k, Value::CharacterString("O'HARA".into()))
    }

    #[test]
    fn parse_empty_character_string_value() {
        let data = "''".as_bytes();
        let (_, k) = character_string_value(data).unwrap();
        assert_eq!(k, Value::CharacterString("".into()))
    }

    #[test]
    fn parse_complex_values() {
        let (_, k) = value("(1, -2)".as_bytes()).unwrap();
        assert_eq!(k, Value::ComplexInteger((1, -2)));

        let (_, k) = value("(1.5, 2.0)".as_bytes()).unwrap();
        assert_eq!(k, Value::Complex((1.5, 2.0)));
    }

    #[test]
    #[allow(clippy::float_cmp)] // we are testing parsing not math
    fn parse_float() {
        let data = "0.00116355283466".as_bytes();
        let (_, k) = floating(data).unwrap();
        assert_eq!(k, 0.00116355283466f64)
    }

    #[test]
    fn parse_single_keywords() {
        let data = "OBJECT  ".as_bytes();
        let (_, k) = keyword_field(data).unwrap();
        assert_eq!(k, Keyword::OBJECT)
    }

    #[test]
    fn parse_unrecognized_keywords() {
        let data = "DATE-OBS".as_bytes();
        let (_, k) = keyword_field(data).unwrap();
        assert_eq!(k, Keyword::from_str("DATE-OBS").unwrap())
    }

    #[test]
    fn parse_comment() {
        let data = "/ string version of target id   ".as_bytes();
        let (_, k) = comment(data).unwrap();
        assert_eq!(k, "string version of target id")
    }
}
