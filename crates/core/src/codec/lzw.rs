//! LZW stream decoder using weezl crate.

use crate::error::Result;
use weezl::{BitOrder, decode::Decoder};

/// Decode LZW-encoded data (PDF variant: MSB first, 8-bit initial width).
pub fn lzwdecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new(BitOrder::Msb, 8);
    let mut output = Vec::new();
    // Lenient on corrupt tails: keep whatever decoded cleanly.
    let _ = decoder.into_vec(&mut output).decode(data);
    Ok(output)
}
