//! Shared synthetic-document builder.
//!
//! Assembles classic PDFs (header, numbered objects, xref table,
//! trailer, startxref footer) with computed byte offsets, so fixtures
//! cannot drift when a test edits an object body.

#![allow(dead_code)]

use pageport_core::PDFDocument;
use std::collections::BTreeMap;
use std::io::Cursor;

pub struct PdfBuilder {
    version: String,
    objects: Vec<(u32, u32, Vec<u8>)>,
    trailer_extra: String,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            version: "1.4".to_string(),
            objects: Vec::new(),
            trailer_extra: String::new(),
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn object(mut self, number: u32, body: &str) -> Self {
        self.objects.push((number, 0, body.as_bytes().to_vec()));
        self
    }

    pub fn object_bytes(mut self, number: u32, body: Vec<u8>) -> Self {
        self.objects.push((number, 0, body));
        self
    }

    /// Extra trailer entries, e.g. `"/Encrypt 9 0 R"`.
    pub fn trailer_entry(mut self, entry: &str) -> Self {
        self.trailer_extra.push(' ');
        self.trailer_extra.push_str(entry);
        self
    }

    pub fn build(self, root: u32) -> Vec<u8> {
        let size = self.objects.iter().map(|(n, _, _)| *n).max().unwrap_or(0) + 1;
        let trailer = format!(
            "<< /Size {size} /Root {root} 0 R{} >>",
            self.trailer_extra
        );
        self.build_with_trailer(&trailer)
    }

    /// Build with a verbatim trailer dictionary, for tests that need a
    /// broken or unusual trailer.
    pub fn build_with_trailer(self, trailer: &str) -> Vec<u8> {
        let mut out = format!("%PDF-{}\n", self.version).into_bytes();

        let mut offsets: BTreeMap<u32, (u32, usize)> = BTreeMap::new();
        for (number, generation, body) in &self.objects {
            offsets.insert(*number, (*generation, out.len()));
            out.extend_from_slice(format!("{number} {generation} obj\n").as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let max = self.objects.iter().map(|(n, _, _)| *n).max().unwrap_or(0);
        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", max + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for number in 1..=max {
            match offsets.get(&number) {
                Some((generation, offset)) => {
                    out.extend_from_slice(
                        format!("{offset:010} {generation:05} n \n").as_bytes(),
                    );
                }
                None => out.extend_from_slice(b"0000000000 00000 f \n"),
            }
        }

        out.extend_from_slice(
            format!("trailer\n{trailer}\nstartxref\n{xref_offset}\n%%EOF\n").as_bytes(),
        );
        out
    }
}

/// Append an incremental update: replacement bodies for `objects` plus a
/// second xref section whose trailer points back at the previous one.
pub fn append_update(base: &[u8], objects: &[(u32, &str)], root: u32) -> Vec<u8> {
    let text = String::from_utf8_lossy(base);
    let marker = text.rfind("startxref").expect("base has a startxref marker");
    let prev: usize = text[marker + "startxref".len()..]
        .split_ascii_whitespace()
        .next()
        .expect("offset after startxref")
        .parse()
        .expect("numeric startxref offset");

    let mut out = base.to_vec();
    let mut offsets = Vec::new();
    for (number, body) in objects {
        offsets.push((*number, out.len()));
        out.extend_from_slice(format!("{number} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(b"xref\n");
    for (number, offset) in &offsets {
        out.extend_from_slice(format!("{number} 1\n{offset:010} 00000 n \n").as_bytes());
    }
    let size = objects.iter().map(|(n, _)| *n).max().unwrap_or(0) + 1;
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {size} /Root {root} 0 R /Prev {prev} >>\nstartxref\n{xref_offset}\n%%EOF\n"
        )
        .as_bytes(),
    );
    out
}

/// A stream object body with its /Length computed from the data.
pub fn stream_object(dict_extra: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!("<< /Length {}{dict_extra} >>\nstream\n", data.len()).into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(b"\nendstream");
    body
}

pub fn open(bytes: Vec<u8>) -> PDFDocument<Cursor<Vec<u8>>> {
    PDFDocument::new(Cursor::new(bytes)).expect("document should open")
}

/// Catalog, pages node and a single empty page.
pub fn minimal_doc() -> Vec<u8> {
    PdfBuilder::new()
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
        .object(3, "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>")
        .build(1)
}
