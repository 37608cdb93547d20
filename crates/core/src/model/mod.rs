//! Data model: PDF values and page geometry.

pub mod geometry;
pub mod objects;

pub use geometry::{PageBox, PageBoxes, Point, Size};
pub use objects::{ObjectDecl, ObjectRef, Value};
