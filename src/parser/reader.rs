use crate::{
    fits::FITS_BLOCK_SIZE,
    parser::{error::FitsError, stream_parser::HeaderParser},
    types::Fits,
};
use std::io::{self, Read, Seek, SeekFrom};
use tracing::{debug, warn};

/// Read every header of a FITS file, seeking over the data units.
///
/// The walk ends cleanly when the input ends at an HDU boundary. Bytes after
/// the last HDU that do not start an extension header are ignored. Input
/// that ends inside a header or a data unit is truncated; only the padding
/// of the last data unit may be missing.
pub fn read_fits<R: Read + Seek>(mut reader: R) -> Result<Fits<'static>, FitsError> {
    let start = reader.stream_position()?;
    let length = reader.seek(SeekFrom::End(0))?.saturating_sub(start);
    reader.seek(SeekFrom::Start(start))?;

    let mut headers = Vec::new();
    let mut block = vec![0u8; FITS_BLOCK_SIZE];
    let mut offset = 0usize;

    loop {
        let hdu = headers.len();
        let filled = read_block(&mut reader, &mut block)?;
        if hdu == 0 {
            if filled < FITS_BLOCK_SIZE || !block.starts_with(b"SIMPLE  =") {
                return Err(FitsError::NotFits);
            }
        } else if filled == 0 {
            break;
        } else if filled < FITS_BLOCK_SIZE || !block.starts_with(b"XTENSION") {
            warn!(offset, "ignoring trailing bytes after HDU {}", hdu - 1);
            break;
        }

        let mut parser = HeaderParser::new(offset);
        loop {
            let complete = parser
                .parse_block(&block)
                .map_err(|source| FitsError::Header { hdu, source })?;
            offset += FITS_BLOCK_SIZE;
            if complete {
                break;
            }
            if read_block(&mut reader, &mut block)? < FITS_BLOCK_SIZE {
                return Err(FitsError::Truncated { hdu });
            }
        }

        let header = parser.into_header();
        let data = header
            .data_unit_size()
            .map_err(|source| FitsError::DataSize { hdu, source })?;
        let unpadded = header
            .data_array_size()
            .map_err(|source| FitsError::DataSize { hdu, source })?;
        debug!(
            hdu,
            start = header.start(),
            size = header.size(),
            data,
            extname = header.extension_name(),
            "read header"
        );
        let data_end = offset.checked_add(unpadded).and_then(|end| u64::try_from(end).ok());
        if data_end.map_or(true, |end| end > length) {
            return Err(FitsError::Truncated { hdu });
        }
        if data > 0 {
            offset += data;
            reader.seek(SeekFrom::Start(start + offset as u64))?;
        }
        headers.push(header);
    }

    Ok(Fits { headers })
}

/// Fill `block` from `reader`, returning how many bytes were read. Fewer
/// than `block.len()` means the input ended.
fn read_block<R: Read>(reader: &mut R, block: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < block.len() {
        match reader.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
