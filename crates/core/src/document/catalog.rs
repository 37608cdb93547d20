//! PDF document - open lifecycle, xref/trailer reading, the value
//! grammar and the object resolver.
//!
//! [`PDFDocument`] owns the single read cursor of the underlying byte
//! source. The resolver is the only component that seeks at random, and
//! it restores the cursor before returning, so any number of nested
//! resolutions leave the caller's position untouched.

use super::page::PDFPage;
use crate::error::{PdfError, Result};
use crate::model::objects::{ObjectDecl, ObjectRef, Value};
use crate::parser::lexer::{Token, TokenReader, is_whitespace};
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek, SeekFrom};

/// Cross-reference index: object identity to byte offset, plus the
/// document trailer.
#[derive(Debug, Default)]
pub struct XrefTable {
    /// Highest object number any subsection header announced.
    pub max_object: u32,
    /// File offset of the newest xref table.
    pub location: u64,
    entries: HashMap<ObjectRef, u64>,
    /// Trailer dictionary of the newest revision.
    pub trailer: HashMap<String, Value>,
}

impl XrefTable {
    /// Byte offset recorded for an object, if any.
    pub fn offset_of(&self, reference: ObjectRef) -> Option<u64> {
        self.entries.get(&reference).copied()
    }

    /// Number of in-use entries across all merged sections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First-seen-wins insert. Sections are read newest first, so an
    /// entry already present always comes from a more recent revision.
    fn insert(&mut self, reference: ObjectRef, offset: u64) {
        self.entries.entry(reference).or_insert(offset);
    }
}

/// An open PDF document, query-ready after [`PDFDocument::new`].
///
/// Dropping the document releases the underlying byte source. The
/// query surface takes `&mut self` because every query moves the shared
/// cursor; callers needing cross-thread access must serialize externally.
pub struct PDFDocument<R: Read + Seek> {
    reader: TokenReader<R>,
    xref: XrefTable,
    root: HashMap<String, Value>,
    pub(crate) pages: Vec<PDFPage>,
}

impl<R: Read + Seek> PDFDocument<R> {
    /// Open a document: locate and merge the xref chain, reject
    /// encrypted files, resolve the root and materialize the page list.
    ///
    /// Structural failures here are fatal; no partially-usable document
    /// is ever returned.
    pub fn new(source: R) -> Result<Self> {
        let reader = TokenReader::new(source)?;
        let mut doc = Self {
            reader,
            xref: XrefTable::default(),
            root: HashMap::new(),
            pages: Vec::new(),
        };
        doc.parse()?;
        Ok(doc)
    }

    /// The `%PDF-x.y` header version ("1.3" when the header is absent).
    pub fn version(&self) -> &str {
        self.reader.version()
    }

    /// The merged cross-reference index.
    pub fn xref(&self) -> &XrefTable {
        &self.xref
    }

    /// The resolved document root (catalog) dictionary.
    pub fn root(&self) -> &HashMap<String, Value> {
        &self.root
    }

    /// Current byte-cursor position of the underlying source.
    pub fn tell(&mut self) -> Result<u64> {
        self.reader.position()
    }

    fn parse(&mut self) -> Result<()> {
        let offset = self.reader.find_xref_offset()?;
        self.read_xref_chain(offset)?;

        if self.xref.trailer.contains_key("Encrypt") {
            return Err(PdfError::Encrypted);
        }

        self.read_root()?;
        self.read_pages()?;
        Ok(())
    }

    // === Xref & trailer ===

    /// Read the table at `start`, then follow /Prev links to earlier
    /// revisions. A visited set guards against offset cycles.
    fn read_xref_chain(&mut self, start: u64) -> Result<()> {
        let mut next = Some(start);
        let mut visited = HashSet::new();
        while let Some(offset) = next {
            if !visited.insert(offset) {
                break;
            }
            next = self.read_xref_section(offset)?;
        }
        Ok(())
    }

    /// Read one classic xref table plus its trailer; returns the /Prev
    /// offset when the trailer names an earlier revision.
    fn read_xref_section(&mut self, offset: u64) -> Result<Option<u64>> {
        if self.xref.location == 0 {
            self.xref.location = offset;
        }

        self.reader.seek(SeekFrom::Start(offset))?;
        let (lines, found) = self.reader.read_lines_to_token(b"trailer")?;
        if !found {
            return Err(PdfError::MalformedXref(
                "cannot read end of xref table".into(),
            ));
        }

        // Running object number, reset by each "start count" header.
        let mut number: u32 = 1;
        for raw in &lines {
            let line = String::from_utf8_lossy(raw);
            let fields: Vec<&str> = line.split_ascii_whitespace().collect();
            match fields.as_slice() {
                [] => {}
                ["xref"] => {}
                [start, count] => {
                    let start: u32 = parse_xref_field(start, &line)?;
                    let count: u32 = parse_xref_field(count, &line)?;
                    if count > 0 {
                        let last = start.saturating_add(count - 1);
                        self.xref.max_object = self.xref.max_object.max(last);
                    }
                    number = start;
                }
                [entry_offset, generation, flag] => {
                    let entry_offset: u64 = parse_xref_field(entry_offset, &line)?;
                    let generation: u32 = parse_xref_field(generation, &line)?;
                    if *flag == "n" {
                        self.xref
                            .insert(ObjectRef::new(number, generation), entry_offset);
                    }
                    number = number.saturating_add(1);
                }
                _ => {
                    return Err(PdfError::MalformedXref(format!(
                        "unexpected data in xref table: '{line}'"
                    )));
                }
            }
        }

        // The entry pass consumed the region; re-seek and parse the
        // trailer dictionary itself.
        self.reader.seek(SeekFrom::Start(offset))?;
        if !self.reader.skip_to_token(b"trailer")? {
            return Err(PdfError::MalformedXref("trailer keyword not found".into()));
        }
        self.reader.read_token()?;

        let Value::Dict(trailer) = self.read_value(None)? else {
            return Err(PdfError::MalformedXref("trailer is not a dictionary".into()));
        };
        let prev = trailer
            .get("Prev")
            .and_then(|v| v.as_int().ok())
            .map(|n| n as u64);

        // The newest trailer is the document trailer.
        if self.xref.trailer.is_empty() {
            self.xref.trailer = trailer;
        }
        Ok(prev)
    }

    // === Root & pages ===

    fn read_root(&mut self) -> Result<()> {
        let root_value = self
            .xref
            .trailer
            .get("Root")
            .ok_or(PdfError::MissingRoot("not present in trailer"))?;
        let Value::Ref(root_ref) = *root_value else {
            return Err(PdfError::MissingRoot("must be an indirect reference"));
        };
        let decl = self.resolve_object(root_ref)?;
        self.root = decl
            .dict()
            .map_err(|_| PdfError::MissingRoot("does not resolve to a dictionary"))?
            .clone();
        Ok(())
    }

    /// Flatten the root page tree: each element of the /Kids array of
    /// the root /Pages dictionary becomes one page, numbered 1..N in
    /// array order.
    fn read_pages(&mut self) -> Result<()> {
        let pages_value = self
            .root
            .get("Pages")
            .ok_or(PdfError::MissingPages("not present in root dictionary"))?;
        let Value::Ref(pages_ref) = *pages_value else {
            return Err(PdfError::MissingPages("must be an indirect reference"));
        };
        let pages_dict = self
            .resolve_object(pages_ref)?
            .dict()
            .map_err(|_| PdfError::MissingPages("does not resolve to a dictionary"))?
            .clone();

        let kids_value = pages_dict
            .get("Kids")
            .ok_or(PdfError::MissingKids("not present in pages dictionary"))?;
        let kids = self.resolve(kids_value)?;
        let Value::Array(kids) = kids else {
            return Err(PdfError::MissingKids("must be an array"));
        };

        for (index, kid) in kids.iter().enumerate() {
            let Value::Ref(kid_ref) = *kid else {
                return Err(PdfError::MissingKids("page entry must be an indirect reference"));
            };
            let dict = self
                .resolve_object(kid_ref)?
                .dict()
                .map_err(|_| PdfError::MissingKids("page does not resolve to a dictionary"))?
                .clone();
            self.pages.push(PDFPage {
                dict,
                number: index + 1,
            });
        }
        Ok(())
    }

    // === Object resolution ===

    /// Resolve an indirect reference to its materialized object body.
    ///
    /// Seeks to the recorded offset, falls back to a whole-file header
    /// scan when that offset is stale, and restores the cursor before
    /// returning - resolution is position-neutral for the caller.
    pub fn resolve_object(&mut self, reference: ObjectRef) -> Result<ObjectDecl> {
        let Some(offset) = self.xref.offset_of(reference) else {
            return Err(PdfError::ObjectNotFound {
                number: reference.number,
                generation: reference.generation,
            });
        };

        let saved = self.reader.position()?;
        let result = self.read_object_at(offset, reference);
        self.reader.seek(SeekFrom::Start(saved))?;
        result
    }

    /// Chase an indirect reference to its primary value; any other
    /// value is already direct and comes back unchanged.
    pub fn resolve(&mut self, value: &Value) -> Result<Value> {
        match value {
            Value::Ref(reference) => {
                let decl = self.resolve_object(*reference)?;
                Ok(decl.values.into_iter().next().unwrap_or(Value::Null))
            }
            other => Ok(other.clone()),
        }
    }

    fn read_object_at(&mut self, offset: u64, reference: ObjectRef) -> Result<ObjectDecl> {
        self.reader.seek(SeekFrom::Start(offset))?;
        let header = self.read_value(None)?;

        if header != Value::Ref(reference) {
            // Stale offset, common in append-only updates: scan the
            // whole file for the object header instead.
            self.reader.seek(SeekFrom::Start(0))?;
            let needle = format!("{} {} obj", reference.number, reference.generation);
            if !self.reader.skip_to_token(needle.as_bytes())? {
                return Err(PdfError::ObjectNotFound {
                    number: reference.number,
                    generation: reference.generation,
                });
            }
            self.reader.skip_bytes(needle.len())?;
        }

        let mut values: Vec<Value> = Vec::new();
        loop {
            let value = {
                let enclosing = match values.last() {
                    Some(Value::Dict(dict)) => Some(dict),
                    _ => None,
                };
                self.read_value_with(None, enclosing)?
            };
            // An empty keyword is end of input; both terminators are
            // discarded rather than stored.
            if value.is_keyword(b"endobj") || value.is_keyword(b"") {
                break;
            }
            values.push(value);
            if values.len() == 2 {
                // Defensive cap: an object without endobj cannot hold
                // more than a dictionary plus its stream.
                break;
            }
        }

        Ok(ObjectDecl {
            number: reference.number,
            generation: reference.generation,
            values,
        })
    }

    // === Value grammar ===

    /// Read the next value from the cursor, starting from `token` if the
    /// caller already consumed it.
    pub(crate) fn read_value(&mut self, token: Option<Token>) -> Result<Value> {
        self.read_value_with(token, None)
    }

    /// `enclosing` is the dictionary a following `stream` keyword needs
    /// for its /Length lookup; it travels as a parameter so nested
    /// resolutions cannot clobber each other's state.
    fn read_value_with(
        &mut self,
        token: Option<Token>,
        enclosing: Option<&HashMap<String, Value>>,
    ) -> Result<Value> {
        let token = match token {
            Some(token) => token,
            None => self.reader.read_token()?,
        };
        if token.is_empty() {
            return Ok(Value::Keyword(Vec::new()));
        }

        match token.as_bytes() {
            b"<" => {
                let (bytes, _) = self.reader.read_bytes_to_token(b">")?;
                Ok(Value::Hex(bytes))
            }
            b"<<" => self.read_dict(),
            b"[" => self.read_array(),
            b"(" => self.read_literal_string(),
            b"stream" => self.read_stream(enclosing),
            _ => self.read_scalar(token),
        }
    }

    fn read_dict(&mut self) -> Result<Value> {
        let mut dict = HashMap::new();
        loop {
            let key = self.reader.read_token()?;
            if key.is(b">>") || key.is_empty() {
                break;
            }
            let value = self.read_value(None)?;
            // A missing value hands us the closing >> (or end of
            // input); record the key as null and stop.
            if value.is_keyword(b">>") || value.is_keyword(b"") {
                dict.insert(name_from_token(&key), Value::Null);
                break;
            }
            dict.insert(name_from_token(&key), value);
        }
        Ok(Value::Dict(dict))
    }

    fn read_array(&mut self) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            // The token after [ may already be the first element.
            let token = self.reader.read_token()?;
            if token.is(b"]") || token.is_empty() {
                break;
            }
            items.push(self.read_value_with(Some(token), None)?);
        }
        Ok(Value::Array(items))
    }

    /// Literal string: raw bytes at parenthesis depth >= 1, escapes kept
    /// verbatim. Un-escaping is a consumer concern.
    fn read_literal_string(&mut self) -> Result<Value> {
        let mut depth = 1usize;
        let mut bytes = Vec::new();
        loop {
            let Some(byte) = self.reader.read_byte()? else {
                break;
            };
            match byte {
                b'(' => {
                    depth += 1;
                    bytes.push(byte);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    bytes.push(byte);
                }
                b'\\' => {
                    bytes.push(byte);
                    if let Some(escaped) = self.reader.read_byte()? {
                        bytes.push(escaped);
                    }
                }
                _ => bytes.push(byte),
            }
        }
        Ok(Value::String(bytes))
    }

    /// Stream body: skip the line break after the keyword, read exactly
    /// /Length raw bytes from the enclosing dictionary, tolerate a
    /// missing endstream.
    fn read_stream(&mut self, enclosing: Option<&HashMap<String, Value>>) -> Result<Value> {
        loop {
            match self.reader.peek(1)?.first() {
                Some(&byte) if is_whitespace(byte) => {
                    self.reader.read_byte()?;
                }
                _ => break,
            }
        }

        let length_value = enclosing
            .and_then(|dict| dict.get("Length"))
            .cloned()
            .ok_or_else(|| PdfError::SyntaxError("stream without /Length".into()))?;
        let length_value = self.resolve(&length_value)?;
        let length = length_value.as_num()? as usize;

        let data = self.reader.read_bytes(length)?;

        // Expected, but a missing endstream is tolerated; the next parse
        // starts from a recorded offset anyway.
        let _ = self.reader.read_token()?;

        Ok(Value::Stream(Bytes::from(data)))
    }

    fn read_scalar(&mut self, token: Token) -> Result<Value> {
        if let Some(text) = token.as_str() {
            if let Ok(int) = text.parse::<i64>() {
                // Two more integers ending in obj or R make this an
                // object header or reference; otherwise the lookahead
                // stays unconsumed for the next call.
                if let Ok(number) = u32::try_from(int) {
                    let ahead = self.reader.peek_tokens(2)?;
                    if ahead.len() == 2
                        && let Some(gen_text) = ahead[0].as_str()
                        && let Ok(generation) = gen_text.parse::<u32>()
                        && (ahead[1].is(b"R") || ahead[1].is(b"obj"))
                    {
                        self.reader.read_tokens(2)?;
                        return Ok(Value::Ref(ObjectRef::new(number, generation)));
                    }
                }
                return Ok(Value::Int(int));
            }
            if let Ok(real) = text.parse::<f64>() {
                return Ok(Value::Real(real));
            }
            match text {
                "true" => return Ok(Value::Bool(true)),
                "false" => return Ok(Value::Bool(false)),
                "null" => return Ok(Value::Null),
                _ => {}
            }
            if let Some(name) = text.strip_prefix('/') {
                return Ok(Value::Name(name.to_string()));
            }
        }
        Ok(Value::Keyword(token.into_bytes()))
    }
}

/// Dictionary keys are name tokens; the slash is dropped in the model.
fn name_from_token(token: &Token) -> String {
    let bytes = token.as_bytes();
    let bytes = bytes.strip_prefix(b"/").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

fn parse_xref_field<T: std::str::FromStr>(field: &str, line: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| PdfError::MalformedXref(format!("bad xref line: '{line}'")))
}
