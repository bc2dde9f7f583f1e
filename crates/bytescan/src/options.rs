/// Configuration shared by the streaming parsers ([`crate::HeaderParser`] and
/// [`crate::BodyParser`]).
///
/// # Examples
///
/// ```rust
/// use bytescan::{HeaderParser, StreamOptions};
///
/// let parser = HeaderParser::with_options(StreamOptions {
///     max_token_len: Some(8 * 1024),
///     ..Default::default()
/// });
/// assert!(!parser.is_done());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct StreamOptions {
    /// Initial reservation of the carry buffer that holds a token spanning
    /// several chunks. The buffer grows by doubling past this size.
    ///
    /// # Default
    ///
    /// `1024`
    pub carry_capacity: usize,

    /// Longest token accepted, in bytes. A longer token fails the parse with
    /// a `TokenTooLong` error instead of growing the carry buffer without
    /// bound.
    ///
    /// # Default
    ///
    /// `None` (unlimited)
    pub max_token_len: Option<usize>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            carry_capacity: 1024,
            max_token_len: None,
        }
    }
}

/// Configuration of a [`crate::Lexer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LexerOptions {
    /// Emit the tokenizer's newline token at every line break.
    ///
    /// # Default
    ///
    /// `true`
    pub emit_newlines: bool,

    /// Put the tokenizer back into its initial state at the start of every
    /// line. When `false`, the state reached at the end of a line carries over.
    ///
    /// # Default
    ///
    /// `true`
    pub reset_state_per_line: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            emit_newlines: true,
            reset_state_per_line: true,
        }
    }
}
