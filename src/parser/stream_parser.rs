//! Types to help with parsing fits files
use crate::{
    fits::{FITS_BLOCK_SIZE, KEYWORD_LINE_LENGTH},
    parser::{error::HeaderError, header},
    types::{Header, HeaderRecord},
};

/// Parse a fits header one record at a time, keeping track of how many
/// bytes were consumed so block boundaries can be detected.
#[derive(Debug)]
pub struct HeaderParser {
    records: Vec<HeaderRecord<'static>>,
    start: usize,
    consumed: usize,
    ended: bool,
}

/// The result of parsing a single record
#[derive(Debug)]
pub enum ParseOutcome<'a> {
    /// A record was parsed and the header continues in the remaining input
    Ok(&'a [u8]),
    /// The header is complete; the remaining input belongs to what follows it
    Complete(&'a [u8]),
    /// The record could not be parsed
    Error(HeaderError),
}

impl HeaderParser {
    /// Create a parser for a header that starts at byte `start` of its file
    pub fn new(start: usize) -> HeaderParser {
        HeaderParser {
            records: Vec::new(),
            start,
            consumed: 0,
            ended: false,
        }
    }

    /// `END` was seen and the block it is in has been fully consumed
    pub fn is_complete(&self) -> bool {
        self.ended && self.consumed % FITS_BLOCK_SIZE == 0
    }

    /// Number of bytes consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Parse a single record from `input`
    pub fn parse_record<'a>(&mut self, input: &'a [u8]) -> ParseOutcome<'a> {
        let offset = self.start + self.consumed;
        if input.len() < KEYWORD_LINE_LENGTH {
            return ParseOutcome::Error(HeaderError::Incomplete);
        }
        let (remainder, record) = match header::header_record(input) {
            Ok(parsed) => parsed,
            Err(_) => {
                let record = String::from_utf8_lossy(&input[..KEYWORD_LINE_LENGTH]);
                return ParseOutcome::Error(HeaderError::MalformedRecord {
                    offset,
                    record: record.trim_end().to_string(),
                });
            }
        };

        match (self.ended, &record) {
            // padding after END is not kept
            (true, HeaderRecord::BlankRecord(None)) => {}
            (true, _) => return ParseOutcome::Error(HeaderError::RecordAfterEnd { offset }),
            (false, HeaderRecord::EndRecord) => {
                self.ended = true;
                self.records.push(record.into_owned());
            }
            (false, _) => self.records.push(record.into_owned()),
        }
        self.consumed += input.len() - remainder.len();

        if self.is_complete() {
            ParseOutcome::Complete(remainder)
        } else {
            ParseOutcome::Ok(remainder)
        }
    }

    /// Parse one block of records. Returns `true` once the header is complete.
    pub fn parse_block(&mut self, block: &[u8]) -> Result<bool, HeaderError> {
        let mut input = block;
        while !input.is_empty() {
            match self.parse_record(input) {
                ParseOutcome::Ok(remainder) => input = remainder,
                ParseOutcome::Complete(_) => return Ok(true),
                ParseOutcome::Error(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// Convert this into the `Header` type
    pub fn into_header(self) -> Header<'static> {
        Header::new(self.records, self.start, self.consumed)
    }
}
