//! pageport - read existing PDF files well enough to lift single pages
//! out of them: geometry, resources, rotation and decoded content
//! streams, ready for re-emission as reusable drawing objects.
//!
//! The crate is the parser/resolver side of page importing only. It
//! handles the classic xref table plus trailer; encrypted documents are
//! detected and rejected, and cross-reference streams / object streams
//! (PDF 1.5 compaction) are out of scope.
//!
//! ```no_run
//! use pageport_core::PDFDocument;
//! use std::fs::File;
//!
//! # fn main() -> pageport_core::Result<()> {
//! let mut doc = PDFDocument::new(File::open("report.pdf")?)?;
//! for page in 1..=doc.page_count() {
//!     let boxes = doc.get_page_boxes(page, 1.0)?;
//!     let content = doc.get_page_content(page)?;
//!     // hand boxes + content to a document writer
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod document;
pub mod error;
pub mod model;
pub mod parser;

pub use document::catalog::{PDFDocument, XrefTable};
pub use document::page::PDFPage;
pub use error::{PdfError, Result};
pub use model::geometry::{DEFAULT_BOX, PageBox, PageBoxes, Point, Size};
pub use model::objects::{ObjectDecl, ObjectRef, Value};
pub use parser::lexer::{Token, TokenReader};
