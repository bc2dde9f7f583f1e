use std::io;

use thiserror::Error;

/// A grammar violation raised by [`crate::HeaderParser`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at byte {offset}")]
pub struct HeaderError {
    /// What was expected.
    pub kind: HeaderErrorKind,
    /// Absolute offset of the offending byte in the request stream.
    pub offset: usize,
}

/// Expectation violated by a request-head byte.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum HeaderErrorKind {
    #[error("invalid method character")]
    Method,
    #[error("invalid uri character")]
    Uri,
    #[error("invalid http version")]
    Version,
    #[error("expected line feed")]
    LineFeed,
    #[error("expected carriage return")]
    CarriageReturn,
    #[error("invalid header key character")]
    Key,
    #[error("expected colon after header key")]
    Colon,
    #[error("invalid header value character")]
    Value,
    #[error("token longer than {0} bytes")]
    TokenTooLong(usize),
}

/// A grammar violation raised by [`crate::BodyParser`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at byte {offset}")]
pub struct BodyError {
    /// What was expected.
    pub kind: BodyErrorKind,
    /// Absolute offset of the offending byte in the body stream.
    pub offset: usize,
}

/// Expectation violated by a body byte.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BodyErrorKind {
    #[error("invalid body start")]
    Body,
    #[error("invalid form key")]
    Key,
    #[error("invalid form value")]
    Value,
    #[error("invalid multipart boundary")]
    BeginMultipart,
    #[error("expected line feed")]
    LineFeed,
    #[error("invalid part header")]
    PartHeader,
    #[error("part without a content-disposition name")]
    ContentDisposition,
    #[error("invalid boundary terminator")]
    Boundary,
    #[error("part content not closed by a boundary")]
    ContentBody,
    #[error("body ended early")]
    Incomplete,
    #[error("token longer than {0} bytes")]
    TokenTooLong(usize),
}

/// A failure raised while lexing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {line}:{offset}")]
pub struct LexError {
    /// What went wrong.
    pub kind: LexErrorKind,
    /// Absolute byte offset in the lexed input.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
}

/// Tokenizer states are reported through their `Debug` rendering so the
/// error stays independent of the tokenizer's types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// No transition accepts `byte` in `state`.
    #[error("unexpected byte {byte:#04x} in state {state}")]
    Unexpected {
        /// State name.
        state: String,
        /// Offending byte.
        byte: u8,
    },
    /// A transition consumed nothing and kept its state.
    #[error("no progress in state {state}")]
    Stalled {
        /// State name.
        state: String,
    },
    /// A token is not valid UTF-8.
    #[error("token is not valid utf-8")]
    InvalidUtf8,
}

/// Compile errors of [`crate::GlobMatcher`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlobError {
    /// The pattern has no tokens.
    #[error("empty glob pattern")]
    Empty,
    /// The pattern does not end in something the matcher can anchor on.
    #[error("glob pattern cannot be anchored at byte {offset}")]
    Parse {
        /// Offset of the offending token.
        offset: usize,
    },
    /// The pattern failed to lex.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// A token arrived in a position the compiler never produces.
    #[error("unreachable glob token")]
    Unreachable,
}

/// Grammar and shape errors of [`crate::CsvTable`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CsvError {
    #[error("missing serial id")]
    SerialId,
    #[error("missing new line")]
    NewLine,
    #[error("empty header")]
    EmptyHeader,
    #[error("line {line}: expected {expected} columns, found {found}")]
    RowColumns {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },
    #[error("insert expects {expected} columns, got {found}")]
    InsertColumns { expected: usize, found: usize },
    #[error("update expects {expected} columns, got {found}")]
    UpdateColumns { expected: usize, found: usize },
    #[error("unreachable csv state")]
    Unreachable,
}

/// Errors from loading or saving a [`crate::CsvTable`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store failed.
    #[error("store i/o: {0}")]
    Io(#[from] io::Error),
    /// The stored bytes are not a valid table.
    #[error(transparent)]
    Csv(#[from] CsvError),
}
