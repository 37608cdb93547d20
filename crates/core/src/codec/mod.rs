//! Stream filter decoders.
//!
//! This module contains:
//! - `ascii85`: ASCII85 and ASCIIHex decoding
//! - `lzw`: LZW decompression (PDF variant)
//! - FlateDecode (zlib) and the filter pipeline dispatcher, below

use crate::error::{PdfError, Result};
use std::io::Read;

pub mod ascii85;
pub mod lzw;

pub use ascii85::{ascii85decode, asciihexdecode};
pub use lzw::lzwdecode;

/// Run a stream's raw bytes through its filter pipeline, in order.
///
/// Filter names come without the slash; `Fl` is the short form of
/// FlateDecode. An unrecognized name makes the whole stream contribute
/// nothing - the rest of the document stays usable.
pub fn apply_filters(filters: &[String], data: &[u8]) -> Result<Vec<u8>> {
    let mut data = data.to_vec();
    for name in filters {
        data = match name.as_str() {
            "Fl" | "FlateDecode" => flatedecode(&data)?,
            "LZWDecode" => lzwdecode(&data)?,
            "ASCII85Decode" => ascii85decode(&data)?,
            "ASCIIHexDecode" => asciihexdecode(&data)?,
            _ => return Ok(Vec::new()),
        };
    }
    Ok(data)
}

/// Inflate FlateDecode (zlib) data.
pub fn flatedecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|err| PdfError::FilterDecode {
            filter: "FlateDecode".into(),
            reason: err.to_string(),
        })?;
    Ok(out)
}
