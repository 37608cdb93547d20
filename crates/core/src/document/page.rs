//! Page queries: boxes, rotation, resources and decoded content.
//!
//! Pages are materialized once at open time; every attribute query
//! resolves on demand and walks the /Parent chain for inheritable keys.
//! Absent attributes are "no value", never errors.

use super::catalog::PDFDocument;
use crate::codec;
use crate::error::{PdfError, Result};
use crate::model::geometry::{ALL_BOXES, PageBox, PageBoxes};
use crate::model::objects::{ObjectDecl, Value};
use std::collections::HashMap;
use std::io::{Read, Seek};

/// A page extracted from an existing PDF document.
#[derive(Debug, Clone)]
pub struct PDFPage {
    /// The page dictionary as materialized at open time.
    pub dict: HashMap<String, Value>,
    /// 1-indexed position in the /Kids array.
    pub number: usize,
}

impl<R: Read + Seek> PDFDocument<R> {
    /// Number of pages materialized at open time.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The materialized page list, in document order.
    pub fn pages(&self) -> &[PDFPage] {
        &self.pages
    }

    fn page_dict(&self, page: usize) -> Result<HashMap<String, Value>> {
        if page == 0 || page > self.pages.len() {
            return Err(PdfError::PageOutOfRange(page));
        }
        Ok(self.pages[page - 1].dict.clone())
    }

    /// All bounding boxes of a page, scaled by `k` (user-space points
    /// per caller unit).
    ///
    /// `page` is 1-indexed. Boxes a page neither carries nor inherits
    /// are simply absent from the result.
    pub fn get_page_boxes(&mut self, page: usize, k: f64) -> Result<PageBoxes> {
        let dict = self.page_dict(page)?;
        let mut boxes = HashMap::with_capacity(ALL_BOXES.len());
        for name in ALL_BOXES {
            if let Some(page_box) = self.page_box(&dict, name, k)? {
                boxes.insert(name.to_string(), page_box);
            }
        }
        Ok(PageBoxes::new(boxes))
    }

    /// One box, climbing /Parent when the page itself lacks it. The box
    /// entry may itself be an indirect reference to the array.
    fn page_box(
        &mut self,
        dict: &HashMap<String, Value>,
        name: &str,
        k: f64,
    ) -> Result<Option<PageBox>> {
        if let Some(entry) = dict.get(name) {
            let resolved = match self.resolve(entry) {
                Ok(value) => value,
                // A dangling box reference reads as "no box".
                Err(PdfError::ObjectNotFound { .. }) => return Ok(None),
                Err(err) => return Err(err),
            };
            if let Value::Array(numbers) = &resolved
                && numbers.len() == 4
                && let (Ok(a), Ok(b), Ok(c), Ok(d)) = (
                    numbers[0].as_num(),
                    numbers[1].as_num(),
                    numbers[2].as_num(),
                    numbers[3].as_num(),
                )
            {
                return Ok(Some(PageBox::from_array([a, b, c, d], k)));
            }
            return Ok(None);
        }

        match self.parent_dict(dict)? {
            Some(parent) => self.page_box(&parent, name, k),
            None => Ok(None),
        }
    }

    /// Page rotation in degrees, normalized into 0..360; `None` when no
    /// ancestor carries /Rotate.
    pub fn get_page_rotation(&mut self, page: usize) -> Result<Option<i64>> {
        let dict = self.page_dict(page)?;
        self.page_rotation(&dict)
    }

    fn page_rotation(&mut self, dict: &HashMap<String, Value>) -> Result<Option<i64>> {
        if let Some(entry) = dict.get("Rotate") {
            let resolved = match self.resolve(entry) {
                Ok(value) => value,
                Err(PdfError::ObjectNotFound { .. }) => return Ok(None),
                Err(err) => return Err(err),
            };
            return Ok(resolved.as_int().ok().map(|r| r.rem_euclid(360)));
        }

        match self.parent_dict(dict)? {
            Some(parent) => self.page_rotation(&parent),
            None => Ok(None),
        }
    }

    /// The page's resource values, inherited from /Parent when absent.
    /// A page with no resources anywhere yields an empty list.
    pub fn get_page_resources(&mut self, page: usize) -> Result<Vec<Value>> {
        let dict = self.page_dict(page)?;
        self.page_resources(&dict)
    }

    fn page_resources(&mut self, dict: &HashMap<String, Value>) -> Result<Vec<Value>> {
        if let Some(entry) = dict.get("Resources") {
            return match entry {
                Value::Ref(reference) => Ok(self.resolve_object(*reference)?.values),
                direct => Ok(vec![direct.clone()]),
            };
        }

        match self.parent_dict(dict)? {
            Some(parent) => self.page_resources(&parent),
            None => Ok(Vec::new()),
        }
    }

    /// Decoded content of a page: each /Contents stream is run through
    /// its own filter pipeline and the results are concatenated in
    /// array order. A page without /Contents decodes to nothing.
    pub fn get_page_content(&mut self, page: usize) -> Result<Vec<u8>> {
        let dict = self.page_dict(page)?;
        let Some(contents) = dict.get("Contents") else {
            return Ok(Vec::new());
        };

        let mut streams = Vec::new();
        self.collect_content_streams(contents, &mut streams)?;

        let mut out = Vec::new();
        for decl in &streams {
            let Some((stream_dict, raw)) = decl.stream_pair() else {
                continue;
            };
            let filters = self.stream_filters(stream_dict)?;
            let decoded = codec::apply_filters(&filters, raw)?;
            out.extend_from_slice(&decoded);
        }
        Ok(out)
    }

    /// Flatten /Contents into stream declarations: a single reference, an
    /// array of references, or arrays nested behind references.
    fn collect_content_streams(
        &mut self,
        value: &Value,
        out: &mut Vec<ObjectDecl>,
    ) -> Result<()> {
        match value {
            Value::Ref(reference) => {
                let decl = self.resolve_object(*reference)?;
                if let Some(Value::Array(items)) = decl.first().cloned() {
                    for item in &items {
                        self.collect_content_streams(item, out)?;
                    }
                } else {
                    out.push(decl);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.collect_content_streams(item, out)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Normalize a stream's /Filter entry to a list of filter names,
    /// resolving it first when indirect.
    fn stream_filters(&mut self, dict: &HashMap<String, Value>) -> Result<Vec<String>> {
        let Some(filter) = dict.get("Filter") else {
            return Ok(Vec::new());
        };
        let filter = self.resolve(filter)?;
        Ok(match filter {
            Value::Name(name) => vec![name],
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_name().ok().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Resolve a dictionary's /Parent link to the parent dictionary.
    fn parent_dict(
        &mut self,
        dict: &HashMap<String, Value>,
    ) -> Result<Option<HashMap<String, Value>>> {
        let Some(parent) = dict.get("Parent") else {
            return Ok(None);
        };
        let resolved = match self.resolve(parent) {
            Ok(value) => value,
            Err(PdfError::ObjectNotFound { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };
        match resolved {
            Value::Dict(parent) => Ok(Some(parent)),
            _ => Ok(None),
        }
    }
}
