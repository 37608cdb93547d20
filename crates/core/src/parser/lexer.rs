//! PDF lexical scanner over a seekable byte source.
//!
//! [`TokenReader`] owns the single read cursor of an open document. All
//! lookahead helpers (`peek`, `peek_tokens`) restore the cursor before
//! returning; everything else consumes.

use crate::error::{PdfError, Result};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

/// Version reported when the %PDF header is missing or unreadable.
const DEFAULT_PDF_VERSION: &str = "1.3";

/// How far from the end of file the startxref marker is searched for.
const STARTXREF_WINDOW: u64 = 1024;

/// PDF whitespace set: space, CR, LF, tab, form feed, NUL.
pub(crate) const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\r' | b'\n' | b'\t' | b'\x0c' | b'\0')
}

/// Structural delimiter characters.
pub(crate) const fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b'<' | b'>' | b'[' | b']' | b'(' | b')')
}

/// One lexical token: a structural delimiter (`<<`, `>>`, `<`, `>`, `[`,
/// `]`, `(`, `)`) or a maximal run of non-whitespace, non-delimiter bytes.
///
/// An empty token signals end of input; callers treat it as a soft stop
/// rather than an error, since real-world files truncate cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(Vec<u8>);

impl Token {
    pub(crate) const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Byte-wise comparison against a literal.
    pub fn is(&self, bytes: &[u8]) -> bool {
        self.0 == bytes
    }

    /// Token text as UTF-8, if it is valid.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Tokenizing reader over a seekable byte source.
pub struct TokenReader<R: Read + Seek> {
    input: BufReader<R>,
    version: String,
}

impl<R: Read + Seek> TokenReader<R> {
    /// Wrap a byte source, sniff the `%PDF-x.y` header, and rewind.
    pub fn new(source: R) -> Result<Self> {
        let mut reader = Self {
            input: BufReader::new(source),
            version: DEFAULT_PDF_VERSION.to_string(),
        };
        reader.read_version()?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(reader)
    }

    /// The header version, or "1.3" if the header was absent.
    pub fn version(&self) -> &str {
        &self.version
    }

    fn read_version(&mut self) -> Result<()> {
        self.seek(SeekFrom::Start(0))?;
        let header = self.read_bytes(16)?;
        if let Some(rest) = header.strip_prefix(b"%PDF-") {
            let end = rest
                .iter()
                .position(|&b| !(b.is_ascii_digit() || b == b'.'))
                .unwrap_or(rest.len());
            if end > 0 {
                self.version = String::from_utf8_lossy(&rest[..end]).into_owned();
            }
        }
        Ok(())
    }

    /// Move the cursor; returns the new absolute position.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.input.seek(pos)?)
    }

    /// Current absolute cursor position.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.input.stream_position()?)
    }

    fn peek_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.input.fill_buf()?.first().copied())
    }

    /// Read one byte; `None` at end of input.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let byte = self.peek_byte()?;
        if byte.is_some() {
            self.input.consume(1);
        }
        Ok(byte)
    }

    /// Read up to `count` bytes; short reads mean end of input.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(count.min(8 * 1024));
        while out.len() < count {
            let available = self.input.fill_buf()?;
            if available.is_empty() {
                break;
            }
            let take = available.len().min(count - out.len());
            out.extend_from_slice(&available[..take]);
            self.input.consume(take);
        }
        Ok(out)
    }

    /// Look at the next `count` bytes without moving the cursor.
    pub fn peek(&mut self, count: usize) -> Result<Vec<u8>> {
        let bytes = self.read_bytes(count)?;
        self.input.seek_relative(-(bytes.len() as i64))?;
        Ok(bytes)
    }

    /// Skip `count` bytes forward.
    pub fn skip_bytes(&mut self, count: usize) -> Result<()> {
        self.input.seek_relative(count as i64)?;
        Ok(())
    }

    /// Read the next token. Leading whitespace is skipped; an empty token
    /// means the input is exhausted.
    pub fn read_token(&mut self) -> Result<Token> {
        loop {
            match self.peek_byte()? {
                Some(b) if is_whitespace(b) => self.input.consume(1),
                _ => break,
            }
        }

        let Some(first) = self.peek_byte()? else {
            return Ok(Token::new(Vec::new()));
        };

        if is_delimiter(first) {
            self.input.consume(1);
            // << and >> are single tokens
            if (first == b'<' || first == b'>') && self.peek_byte()? == Some(first) {
                self.input.consume(1);
                return Ok(Token::new(vec![first, first]));
            }
            return Ok(Token::new(vec![first]));
        }

        let mut bytes = Vec::new();
        loop {
            match self.peek_byte()? {
                Some(b) if !is_whitespace(b) && !is_delimiter(b) => {
                    self.input.consume(1);
                    bytes.push(b);
                }
                _ => break,
            }
        }
        Ok(Token::new(bytes))
    }

    /// Read `count` tokens in order.
    pub fn read_tokens(&mut self, count: usize) -> Result<Vec<Token>> {
        let mut tokens = Vec::with_capacity(count);
        for _ in 0..count {
            tokens.push(self.read_token()?);
        }
        Ok(tokens)
    }

    /// Read `count` tokens, then restore the cursor.
    pub fn peek_tokens(&mut self, count: usize) -> Result<Vec<Token>> {
        let saved = self.position()?;
        let tokens = self.read_tokens(count)?;
        self.seek(SeekFrom::Start(saved))?;
        Ok(tokens)
    }

    /// Consume raw bytes up to the next unescaped occurrence of `delim`.
    ///
    /// The delimiter itself is consumed but not returned. A backslash
    /// escapes the following byte; both land in the output verbatim.
    /// Returns `(bytes, found)`; `found` is false when input ran out.
    pub fn read_bytes_to_token(&mut self, delim: &[u8]) -> Result<(Vec<u8>, bool)> {
        let mut bytes = Vec::new();
        loop {
            let Some(byte) = self.read_byte()? else {
                return Ok((bytes, false));
            };
            if byte == b'\\' {
                bytes.push(byte);
                if let Some(escaped) = self.read_byte()? {
                    bytes.push(escaped);
                }
                continue;
            }
            bytes.push(byte);
            if bytes.ends_with(delim) {
                bytes.truncate(bytes.len() - delim.len());
                return Ok((bytes, true));
            }
        }
    }

    /// Read whole lines until one starts with the token `delim`.
    ///
    /// The matching line is not included and the cursor is left right
    /// after it. Returns `(lines, found)`.
    pub fn read_lines_to_token(&mut self, delim: &[u8]) -> Result<(Vec<Vec<u8>>, bool)> {
        let mut lines = Vec::new();
        let mut line: Vec<u8> = Vec::new();
        loop {
            match self.read_byte()? {
                None => {
                    if !line.is_empty() && !line_starts_with_token(&line, delim) {
                        lines.push(line);
                    } else if line_starts_with_token(&line, delim) {
                        return Ok((lines, true));
                    }
                    return Ok((lines, false));
                }
                Some(b'\r') => {
                    if self.peek_byte()? == Some(b'\n') {
                        self.input.consume(1);
                    }
                }
                Some(b'\n') => {}
                Some(byte) => {
                    line.push(byte);
                    continue;
                }
            }
            if line_starts_with_token(&line, delim) {
                return Ok((lines, true));
            }
            lines.push(std::mem::take(&mut line));
        }
    }

    /// Scan forward for `needle` at a token boundary, leaving the cursor
    /// at its first byte. Returns false (cursor at end) when absent.
    pub fn skip_to_token(&mut self, needle: &[u8]) -> Result<bool> {
        if needle.is_empty() {
            return Ok(true);
        }
        let mut window: VecDeque<u8> = VecDeque::with_capacity(needle.len() + 1);
        let mut scanned: u64 = 0;
        loop {
            let Some(byte) = self.read_byte()? else {
                return Ok(false);
            };
            scanned += 1;
            window.push_back(byte);
            if window.len() > needle.len() + 1 {
                window.pop_front();
            }

            let matched = if window.len() == needle.len() + 1 {
                let boundary = window[0];
                (is_whitespace(boundary) || is_delimiter(boundary))
                    && window.iter().skip(1).eq(needle.iter())
            } else {
                // A match flush against the scan start counts as a boundary.
                scanned == needle.len() as u64 && window.iter().eq(needle.iter())
            };

            if matched {
                self.input.seek_relative(-(needle.len() as i64))?;
                return Ok(true);
            }
        }
    }

    /// Locate the xref table offset via the trailing `startxref` marker.
    ///
    /// Scans the last kilobyte of input; the last marker wins, matching
    /// the footer of the most recent incremental update.
    pub fn find_xref_offset(&mut self) -> Result<u64> {
        let len = self.seek(SeekFrom::End(0))?;
        let window = len.min(STARTXREF_WINDOW);
        self.seek(SeekFrom::End(-(window as i64)))?;
        let tail = self.read_bytes(window as usize)?;

        let needle = b"startxref";
        let mut marker = None;
        if tail.len() >= needle.len() {
            for pos in 0..=tail.len() - needle.len() {
                if tail[pos..].starts_with(needle) {
                    marker = Some(pos);
                }
            }
        }
        let Some(pos) = marker else {
            return Err(PdfError::MalformedXref("startxref marker not found".into()));
        };

        let rest = &tail[pos + needle.len()..];
        let digits_start = rest
            .iter()
            .position(|&b| !is_whitespace(b))
            .unwrap_or(rest.len());
        let digits = &rest[digits_start..];
        let digits_end = digits
            .iter()
            .position(|&b| !b.is_ascii_digit())
            .unwrap_or(digits.len());
        if digits_end == 0 {
            return Err(PdfError::MalformedXref(
                "startxref marker has no offset".into(),
            ));
        }
        String::from_utf8_lossy(&digits[..digits_end])
            .parse::<u64>()
            .map_err(|_| PdfError::MalformedXref("bad startxref offset".into()))
    }
}

/// Whether `line`, after leading whitespace, begins with `delim` as a
/// whole token (followed by end of line, whitespace or a delimiter).
fn line_starts_with_token(line: &[u8], delim: &[u8]) -> bool {
    let start = line
        .iter()
        .position(|&b| !is_whitespace(b))
        .unwrap_or(line.len());
    let trimmed = &line[start..];
    if !trimmed.starts_with(delim) {
        return false;
    }
    match trimmed.get(delim.len()) {
        None => true,
        Some(&next) => is_whitespace(next) || is_delimiter(next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &[u8]) -> TokenReader<Cursor<Vec<u8>>> {
        TokenReader::new(Cursor::new(data.to_vec())).unwrap()
    }

    #[test]
    fn double_angle_brackets_are_single_tokens() {
        let mut r = reader(b"<</Type /Page>>");
        assert!(r.read_token().unwrap().is(b"<<"));
        assert!(r.read_token().unwrap().is(b"/Type"));
        assert!(r.read_token().unwrap().is(b"/Page"));
        assert!(r.read_token().unwrap().is(b">>"));
        assert!(r.read_token().unwrap().is_empty());
    }

    #[test]
    fn skip_to_token_respects_boundaries() {
        let mut r = reader(b"%PDF-1.4\n2117 0 obj\n117 0 obj\n");
        assert!(r.skip_to_token(b"117 0 obj").unwrap());
        assert_eq!(r.position().unwrap(), 20);
    }
}
