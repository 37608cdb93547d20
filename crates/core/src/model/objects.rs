//! The PDF value model.
//!
//! Every primitive the object grammar can produce lives in one closed
//! [`Value`] enum; consumers inspect values through the typed `as_*`
//! accessors or by exhaustive matching, never by unchecked casts.

use crate::error::{PdfError, Result};
use bytes::Bytes;
use std::collections::HashMap;

/// Identity of an indirect object: object number plus generation.
///
/// Used both as the xref-table key and as the payload of [`Value::Ref`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub number: u32,
    /// Generation number
    pub generation: u32,
}

impl ObjectRef {
    /// Create a new object reference.
    pub const fn new(number: u32, generation: u32) -> Self {
        Self { number, generation }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// The materialized body of one indirect object.
///
/// Normally holds exactly one value; a dictionary followed by its stream
/// holds two. Objects whose `endobj` terminator is missing are capped at
/// two values so a malformed body cannot run away.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDecl {
    pub number: u32,
    pub generation: u32,
    pub values: Vec<Value>,
}

impl ObjectDecl {
    /// The object's primary value, if any was read.
    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }

    /// The primary value as a dictionary.
    pub fn dict(&self) -> Result<&HashMap<String, Value>> {
        match self.values.first() {
            Some(v) => v.as_dict(),
            None => Err(PdfError::TypeError {
                expected: "dict",
                got: "empty object",
            }),
        }
    }

    /// Dictionary-plus-stream pair, for objects that carry a stream body.
    pub fn stream_pair(&self) -> Option<(&HashMap<String, Value>, &Bytes)> {
        match (self.values.first(), self.values.get(1)) {
            (Some(Value::Dict(dict)), Some(Value::Stream(data))) => Some((dict, data)),
            _ => None,
        }
    }
}

/// PDF value - the fundamental tagged union of the object grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null object
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Real (floating point) value
    Real(f64),
    /// Name object (e.g. /Type, /Font), stored without the slash
    Name(String),
    /// Literal string: raw bytes between parentheses, escapes preserved
    String(Vec<u8>),
    /// Hex string: raw characters between angle brackets, undecoded
    Hex(Vec<u8>),
    /// Stream body: raw bytes, still filtered
    Stream(Bytes),
    /// Array of values
    Array(Vec<Self>),
    /// Dictionary (name -> value mapping)
    Dict(HashMap<String, Self>),
    /// Indirect object reference
    Ref(ObjectRef),
    /// Unrecognized bare keyword (endobj, endstream, trailer, ...)
    Keyword(Vec<u8>),
}

impl Value {
    /// Check if this is the null object.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get as boolean.
    pub const fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(PdfError::TypeError {
                expected: "bool",
                got: self.type_name(),
            }),
        }
    }

    /// Get as integer.
    pub const fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            _ => Err(PdfError::TypeError {
                expected: "int",
                got: self.type_name(),
            }),
        }
    }

    /// Get numeric value (int or real coerced to f64).
    pub const fn as_num(&self) -> Result<f64> {
        match self {
            Self::Int(n) => Ok(*n as f64),
            Self::Real(n) => Ok(*n),
            _ => Err(PdfError::TypeError {
                expected: "number",
                got: self.type_name(),
            }),
        }
    }

    /// Get as name string (without the leading slash).
    pub fn as_name(&self) -> Result<&str> {
        match self {
            Self::Name(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "name",
                got: self.type_name(),
            }),
        }
    }

    /// Get as array.
    pub const fn as_array(&self) -> Result<&Vec<Self>> {
        match self {
            Self::Array(arr) => Ok(arr),
            _ => Err(PdfError::TypeError {
                expected: "array",
                got: self.type_name(),
            }),
        }
    }

    /// Get as dictionary.
    pub const fn as_dict(&self) -> Result<&HashMap<String, Self>> {
        match self {
            Self::Dict(d) => Ok(d),
            _ => Err(PdfError::TypeError {
                expected: "dict",
                got: self.type_name(),
            }),
        }
    }

    /// Get as raw stream bytes.
    pub const fn as_stream(&self) -> Result<&Bytes> {
        match self {
            Self::Stream(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "stream",
                got: self.type_name(),
            }),
        }
    }

    /// Get as object reference.
    pub const fn as_obj_ref(&self) -> Result<ObjectRef> {
        match self {
            Self::Ref(r) => Ok(*r),
            _ => Err(PdfError::TypeError {
                expected: "ref",
                got: self.type_name(),
            }),
        }
    }

    /// Whether this value is the given bare keyword.
    pub fn is_keyword(&self, word: &[u8]) -> bool {
        matches!(self, Self::Keyword(k) if k.as_slice() == word)
    }

    /// Get type name for error messages.
    pub(crate) const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Name(_) => "name",
            Self::String(_) => "string",
            Self::Hex(_) => "hex string",
            Self::Stream(_) => "stream",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Ref(_) => "ref",
            Self::Keyword(_) => "keyword",
        }
    }
}
