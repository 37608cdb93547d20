//! Lexical layer: the tokenizing reader that owns the document cursor.

pub mod lexer;

pub use lexer::{Token, TokenReader};
