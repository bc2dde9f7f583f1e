//! Byte-level scanning toolkit: a transactional cursor, a step-list matcher,
//! a line lexer, and the hand-rolled grammars built on them.
//!
//! - [`ByteCursor`] scans a window of a byte buffer. Every `eat_*` primitive
//!   either consumes a full match or leaves the cursor untouched.
//! - [`FirstCharTable`] buckets literals by first byte for multi-literal
//!   matching; [`ByteMatcher`] chains cursor steps into a reusable pattern.
//! - [`HeaderParser`] and [`BodyParser`] parse HTTP/1.x request heads and
//!   form bodies from arbitrarily split chunks.
//! - [`Lexer`] drives a [`Tokenizer`] state machine line by line;
//!   [`GlobMatcher`] uses it to compile glob patterns.
//! - [`CsvTable`] reads and writes a small CSV table format.
//!
//! Nothing here performs I/O except [`FileStore`]; callers feed bytes in.

#![allow(missing_docs)]

mod chunk_utils;
mod error;
mod options;
mod stream;

pub mod csv;
pub mod cursor;
pub mod glob;
pub mod http;
pub mod lexer;
pub mod matcher;
pub mod table;

#[cfg(test)]
mod tests;

pub use chunk_utils::{produce_chunks, split_by_sizes};
pub use csv::{CsvTable, FileStore, TableStore};
pub use cursor::{ByteCursor, MergeBuffer, SkipTo};
pub use error::{
    BodyError, BodyErrorKind, CsvError, GlobError, HeaderError, HeaderErrorKind, LexError,
    LexErrorKind, StoreError,
};
pub use glob::{GlobMatcher, GlobToken, GlobTokenizer};
pub use http::{Body, BodyFile, BodyParser, Header, HeaderParser};
pub use lexer::{Lexeme, Lexer, Tokenizer};
pub use matcher::{ByteMatcher, Step};
pub use options::{LexerOptions, StreamOptions};
pub use table::FirstCharTable;
