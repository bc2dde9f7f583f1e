//! Line-oriented lexer driven by a [`Tokenizer`] state machine.
//!
//! The input is split on `\n`; a `\r` right before it belongs to the line
//! terminator. Inside a line the lexer calls [`Tokenizer::step`] for the
//! active state until the line is used up. Each call consumes one run of
//! bytes and classifies it; a run of zero bytes is dropped rather than
//! emitted. Between lines the tokenizer's newline kind is emitted (see
//! [`LexerOptions::emit_newlines`]) and the state goes back to
//! [`Tokenizer::initial_state`] unless [`LexerOptions::reset_state_per_line`]
//! is off.
//!
//! Lexing stops at the first error; there is no recovery.
//!
//! ```
//! use bytescan::{ByteCursor, Lexer, Tokenizer};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Kind { Word, Space, Newline }
//!
//! struct Words;
//!
//! impl Tokenizer for Words {
//!     type State = ();
//!     type Kind = Kind;
//!
//!     fn initial_state(&self) {}
//!
//!     fn newline_kind(&self) -> Option<Kind> {
//!         Some(Kind::Newline)
//!     }
//!
//!     fn step(&mut self, _: &mut (), c: &mut ByteCursor<'_>) -> Option<Kind> {
//!         if c.eat_while_alpha().is_some() {
//!             Some(Kind::Word)
//!         } else {
//!             c.eat_while_space().map(|_| Kind::Space)
//!         }
//!     }
//! }
//!
//! let kinds: Vec<Kind> = Lexer::new(Words, b"ab cd\nef")
//!     .map(|lexeme| lexeme.map(|l| l.kind))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(
//!     kinds,
//!     [Kind::Word, Kind::Space, Kind::Word, Kind::Newline, Kind::Word]
//! );
//! ```

use core::fmt;
use core::ops::Range;
use core::str;

use tracing::{debug, trace};

use crate::{
    cursor::ByteCursor,
    error::{LexError, LexErrorKind},
    options::LexerOptions,
};

/// A state machine that classifies runs of bytes.
pub trait Tokenizer {
    /// Tokenizer state. Rendered with `Debug` in error messages.
    type State: Copy + Eq + fmt::Debug;
    /// Token classification.
    type Kind: Copy + Eq + fmt::Debug;

    /// State at the start of the input (and of every line, by default).
    fn initial_state(&self) -> Self::State;

    /// State tried before the active one at every token, typically to skip
    /// whitespace. Its transitions never change the active state.
    fn space_state(&self) -> Option<Self::State> {
        None
    }

    /// State the lexer falls back to when the active state cannot classify
    /// the byte at the cursor.
    fn default_state(&self) -> Option<Self::State> {
        None
    }

    /// Kind emitted for each line break.
    fn newline_kind(&self) -> Option<Self::Kind> {
        None
    }

    /// Runs the transition of `state` at the cursor.
    ///
    /// Returns the kind of the run consumed since the token start, or `None`
    /// if the byte at the cursor is unexpected in this state. The transition
    /// may move to another state by writing through `state`.
    fn step(&mut self, state: &mut Self::State, c: &mut ByteCursor<'_>) -> Option<Self::Kind>;
}

/// One classified run of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<K> {
    /// Classification of the run.
    pub kind: K,
    /// Byte range in the input.
    pub span: Range<usize>,
    /// 1-based line the run belongs to. A newline lexeme belongs to the line
    /// it terminates.
    pub line: usize,
}

impl<K> Lexeme<K> {
    /// The bytes of this lexeme in `input`.
    #[must_use]
    pub fn bytes<'i>(&self, input: &'i [u8]) -> &'i [u8] {
        &input[self.span.clone()]
    }
}

/// Lexes a whole input with a [`Tokenizer`].
///
/// The lexer is an iterator of lexemes; the first error ends it.
pub struct Lexer<'a, T: Tokenizer> {
    tokenizer: T,
    options: LexerOptions,
    cursor: ByteCursor<'a>,
    state: T::State,
    line: usize,
    /// Start of the line after the current one.
    next_line: usize,
    /// Line terminator of the current line, if it has one.
    terminator: Option<Range<usize>>,
    finished: bool,
}

impl<T: Tokenizer> fmt::Debug for Lexer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("state", &self.state)
            .field("line", &self.line)
            .field("position", &self.cursor.position())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<'a, T: Tokenizer> Lexer<'a, T> {
    #[must_use]
    pub fn new(tokenizer: T, input: &'a [u8]) -> Self {
        Self::with_options(tokenizer, input, LexerOptions::default())
    }

    #[must_use]
    pub fn with_options(tokenizer: T, input: &'a [u8], options: LexerOptions) -> Self {
        let state = tokenizer.initial_state();
        let mut lexer = Self {
            tokenizer,
            options,
            cursor: ByteCursor::new(input),
            state,
            line: 0,
            next_line: 0,
            terminator: None,
            finished: input.is_empty(),
        };
        if !lexer.finished {
            lexer.enter_line(0);
        }
        lexer
    }

    /// The input being lexed.
    #[must_use]
    pub fn input(&self) -> &'a [u8] {
        self.cursor.bytes()
    }

    /// Active tokenizer state.
    #[must_use]
    pub fn state(&self) -> T::State {
        self.state
    }

    /// Current 1-based line.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Narrows the cursor to the line starting at `from`.
    fn enter_line(&mut self, from: usize) {
        let input = self.cursor.bytes();
        self.line += 1;
        let (end, next) = match self.cursor.find_index(b'\n', from) {
            Some(lf) if lf > from && input[lf - 1] == b'\r' => (lf - 1, lf + 1),
            Some(lf) => (lf, lf + 1),
            None => (input.len(), input.len()),
        };
        self.terminator = (next > end).then_some(end..next);
        self.next_line = next;
        self.cursor.set_window(from, end);
        trace!(line = self.line, start = from, end, "lexer line");
    }

    fn fail(&mut self, kind: LexErrorKind, offset: usize) -> LexError {
        self.finished = true;
        debug!(?kind, offset, line = self.line, "lex error");
        LexError {
            kind,
            offset,
            line: self.line,
        }
    }

    /// Runs the space state, then the active state, then the default state,
    /// until one of them classifies a run.
    fn classify(&mut self) -> Option<T::Kind> {
        let start = self.cursor.position();
        if let Some(mut space) = self.tokenizer.space_state() {
            match self.tokenizer.step(&mut space, &mut self.cursor) {
                Some(kind) if self.cursor.position() > start => return Some(kind),
                _ => self.cursor.seek(start),
            }
        }
        if let Some(kind) = self.tokenizer.step(&mut self.state, &mut self.cursor) {
            return Some(kind);
        }
        self.cursor.seek(start);
        let fallback = self.tokenizer.default_state()?;
        self.state = fallback;
        self.tokenizer.step(&mut self.state, &mut self.cursor)
    }

    fn next_in_line(&mut self) -> Option<Result<Lexeme<T::Kind>, LexError>> {
        while !self.cursor.is_eol() {
            self.cursor.begin_token();
            let start = self.cursor.position();
            let before = self.state;
            let Some(kind) = self.classify() else {
                let byte = self.input()[start];
                let state = format!("{:?}", self.state);
                return Some(Err(self.fail(LexErrorKind::Unexpected { state, byte }, start)));
            };
            let end = self.cursor.position();
            if end > start {
                return Some(Ok(Lexeme {
                    kind,
                    span: start..end,
                    line: self.line,
                }));
            }
            if self.state == before {
                let state = format!("{:?}", self.state);
                return Some(Err(self.fail(LexErrorKind::Stalled { state }, start)));
            }
        }
        None
    }

    /// Drives the lexer to the end, handing each token kind to `f`.
    ///
    /// # Errors
    ///
    /// Returns the first [`LexError`].
    pub fn parse(self, mut f: impl FnMut(T::Kind)) -> Result<(), LexError> {
        for lexeme in self {
            f(lexeme?.kind);
        }
        Ok(())
    }

    /// Like [`Lexer::parse`], but also hands over the token text.
    ///
    /// # Errors
    ///
    /// Returns the first [`LexError`], or [`LexErrorKind::InvalidUtf8`] for a
    /// token that is not valid UTF-8.
    pub fn parse_token_strings(self, mut f: impl FnMut(T::Kind, &str)) -> Result<(), LexError> {
        let input = self.input();
        for lexeme in self {
            let lexeme = lexeme?;
            let text = str::from_utf8(lexeme.bytes(input)).map_err(|_| LexError {
                kind: LexErrorKind::InvalidUtf8,
                offset: lexeme.span.start,
                line: lexeme.line,
            })?;
            f(lexeme.kind, text);
        }
        Ok(())
    }
}

impl<T: Tokenizer> Iterator for Lexer<'_, T> {
    type Item = Result<Lexeme<T::Kind>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if let Some(item) = self.next_in_line() {
                return Some(item);
            }

            let line = self.line;
            let terminator = self.terminator.take();
            if self.next_line < self.input().len() {
                if self.options.reset_state_per_line {
                    self.state = self.tokenizer.initial_state();
                }
                self.enter_line(self.next_line);
            } else {
                self.finished = true;
            }
            if !self.options.emit_newlines {
                continue;
            }
            if let (Some(span), Some(kind)) = (terminator, self.tokenizer.newline_kind()) {
                return Some(Ok(Lexeme { kind, span, line }));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests;
