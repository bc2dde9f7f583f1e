use std::collections::BTreeMap;

use bstr::ByteVec;
use tracing::{debug, trace};

use crate::{
    cursor::{ByteCursor, classes::is_upper},
    error::{HeaderError, HeaderErrorKind},
    options::StreamOptions,
    stream::TokenCarry,
};

/// A parsed request line and its header fields.
///
/// Field names are stored as sent; when a name repeats, the last value wins.
/// Tokens that are not valid UTF-8 are decoded lossily.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Header {
    /// Request method, e.g. `GET`.
    pub method: String,
    /// Request target as sent.
    pub uri: String,
    /// Protocol version, e.g. `HTTP/1.1`.
    pub version: String,
    /// Header fields by name.
    pub fields: BTreeMap<String, String>,
}

impl Header {
    /// Value of the field `key`, compared case-sensitively.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Method,
    MethodStarted,
    Space,
    Uri,
    UriStarted,
    HttpVersion,
    HttpVersionStarted,
    LineFeed,
    CarriageReturn,
    Key,
    HeaderExit,
    KeyStarted,
    Colon,
    Value,
    ValueStarted,
    Done,
}

/// Streaming parser for an HTTP/1.x request head.
///
/// Feed successive reads of one connection to [`HeaderParser::parse`]; it
/// returns `Ok(true)` once the empty line ending the head was seen. A token
/// cut by a chunk boundary is carried over, so splitting the input anywhere
/// yields the same [`Header`].
///
/// ```
/// use bytescan::HeaderParser;
///
/// let mut parser = HeaderParser::new();
/// assert!(!parser.parse(b"GET /x HT").unwrap());
/// assert!(parser.parse(b"TP/1.1\r\nHost: a\r\n\r\nbody").unwrap());
/// assert_eq!(parser.header().uri, "/x");
/// assert_eq!(parser.header().get("Host"), Some("a"));
/// assert_eq!(parser.body_offset(), Some(28));
/// assert_eq!(parser.body_index(), Some(19));
/// ```
#[derive(Debug, Clone)]
pub struct HeaderParser {
    state: State,
    lined_up: State,
    header: Header,
    key: String,
    carry: TokenCarry,
    consumed: usize,
    body_index: Option<usize>,
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderParser {
    /// Creates a parser with default [`StreamOptions`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(StreamOptions::default())
    }

    /// Creates a parser that carries split tokens according to `options`.
    #[must_use]
    pub fn with_options(options: StreamOptions) -> Self {
        Self {
            state: State::Method,
            lined_up: State::Method,
            header: Header::default(),
            key: String::new(),
            carry: TokenCarry::new(&options),
            consumed: 0,
            body_index: None,
        }
    }

    /// `true` once the head is complete.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// The request line and fields read so far.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Consumes the parser, returning what it has read.
    #[must_use]
    pub fn into_header(self) -> Header {
        self.header
    }

    /// Bytes of the stream consumed so far. Once done, this is the length of
    /// the head.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Index of the first body byte in the chunk that completed the head.
    #[must_use]
    pub fn body_index(&self) -> Option<usize> {
        self.body_index
    }

    /// Offset of the first body byte in the whole stream.
    #[must_use]
    pub fn body_offset(&self) -> Option<usize> {
        self.is_done().then_some(self.consumed)
    }

    /// Parses the next chunk of the stream.
    ///
    /// # Errors
    ///
    /// Returns a [`HeaderError`] naming the violated expectation and its
    /// stream offset. The parser must not be fed again after an error.
    pub fn parse(&mut self, chunk: &[u8]) -> Result<bool, HeaderError> {
        self.parse_window(chunk, 0, chunk.len())
    }

    /// Parses `buf[start..end)` as the next chunk of the stream.
    ///
    /// # Errors
    ///
    /// See [`HeaderParser::parse`].
    pub fn parse_window(
        &mut self,
        buf: &[u8],
        start: usize,
        end: usize,
    ) -> Result<bool, HeaderError> {
        if self.is_done() {
            return Ok(true);
        }
        let mut c = ByteCursor::with_window(buf, start, end);
        let start = c.position();
        trace!(len = c.remaining(), state = ?self.state, "header chunk");

        let result = self.run(&mut c).and_then(|()| {
            if self.is_done() {
                Ok(())
            } else {
                self.carry
                    .suspend(buf, c.window_end())
                    .map_err(HeaderErrorKind::TokenTooLong)
            }
        });
        if let Err(kind) = result {
            let offset = self.consumed + (c.position() - start);
            debug!(?kind, offset, state = ?self.state, "header parse error");
            return Err(HeaderError { kind, offset });
        }

        self.consumed += c.position() - start;
        if self.is_done() {
            self.body_index = Some(c.position());
            debug!(body_offset = self.consumed, fields = self.header.fields.len(), "header done");
        }
        Ok(self.is_done())
    }

    fn run(&mut self, c: &mut ByteCursor<'_>) -> Result<(), HeaderErrorKind> {
        while !c.is_eol() && !self.is_done() {
            self.step(c)?;
        }
        Ok(())
    }

    fn collect(&mut self, c: &ByteCursor<'_>) -> Result<String, HeaderErrorKind> {
        self.carry
            .collect(c.bytes(), c.position())
            .map(|token| token.into_string_lossy())
            .map_err(HeaderErrorKind::TokenTooLong)
    }

    /// Opens a token at the cursor if `accept` holds for its byte.
    fn open(&mut self, c: &mut ByteCursor<'_>, accept: impl Fn(u8) -> bool, next: State) -> bool {
        let at = c.position();
        if c.eat(accept) {
            self.carry.begin(at);
            self.state = next;
            return true;
        }
        false
    }

    fn space_then(&mut self, c: &mut ByteCursor<'_>, lined_up: State) {
        c.next();
        self.state = State::Space;
        self.lined_up = lined_up;
    }

    fn step(&mut self, c: &mut ByteCursor<'_>) -> Result<(), HeaderErrorKind> {
        use HeaderErrorKind as E;

        match self.state {
            State::Method => {
                if !self.open(c, is_upper, State::MethodStarted) {
                    return Err(E::Method);
                }
            }
            State::MethodStarted => {
                c.eat_while_upper();
                match c.peek() {
                    None => {}
                    Some(b' ') => {
                        self.header.method = self.collect(c)?;
                        self.space_then(c, State::Uri);
                    }
                    Some(_) => return Err(E::Method),
                }
            }
            State::Space => {
                c.eat_while_one(b' ');
                if !c.is_eol() {
                    self.state = self.lined_up;
                }
            }
            State::Uri => {
                if !self.open(c, |b| b > b' ', State::UriStarted) {
                    return Err(E::Uri);
                }
            }
            State::UriStarted => {
                c.eat_while(|b| b > b' ');
                match c.peek() {
                    None => {}
                    Some(b' ') => {
                        self.header.uri = self.collect(c)?;
                        self.space_then(c, State::HttpVersion);
                    }
                    Some(_) => return Err(E::Uri),
                }
            }
            State::HttpVersion => {
                if !self.open(c, |b| b == b'H', State::HttpVersionStarted) {
                    return Err(E::Version);
                }
            }
            State::HttpVersionStarted => {
                c.eat_while(|b| b > b' ');
                let next = match c.peek() {
                    None => return Ok(()),
                    Some(b' ') => State::Space,
                    Some(b'\r') => State::LineFeed,
                    Some(b'\n') => State::Key,
                    Some(_) => return Err(E::Version),
                };
                self.header.version = self.collect(c)?;
                c.next();
                self.state = next;
                self.lined_up = State::CarriageReturn;
            }
            State::LineFeed => {
                if !c.eat_lf() {
                    return Err(E::LineFeed);
                }
                self.state = State::Key;
            }
            State::CarriageReturn => {
                self.state = match c.next() {
                    Some(b'\r') => State::LineFeed,
                    Some(b'\n') => State::Key,
                    _ => {
                        c.back_up(1);
                        return Err(E::CarriageReturn);
                    }
                };
            }
            State::Key => {
                if self.open(c, |b| b.is_ascii_alphabetic(), State::KeyStarted) {
                    return Ok(());
                }
                match c.peek() {
                    Some(b'\n') => {
                        c.next();
                        self.state = State::Done;
                    }
                    Some(b'\r') => {
                        c.next();
                        self.state = State::HeaderExit;
                    }
                    _ => return Err(E::Key),
                }
            }
            State::HeaderExit => {
                if !c.eat_lf() {
                    return Err(E::LineFeed);
                }
                self.state = State::Done;
            }
            State::KeyStarted => {
                c.eat_while(|b| b > b' ' && b != b':');
                let lined_up = match c.peek() {
                    None => return Ok(()),
                    Some(b':') => State::Value,
                    Some(b' ') => State::Colon,
                    Some(_) => return Err(E::Key),
                };
                self.key = self.collect(c)?;
                self.space_then(c, lined_up);
            }
            State::Colon => {
                if !c.eat_colon() {
                    return Err(E::Colon);
                }
                self.state = State::Space;
                self.lined_up = State::Value;
            }
            State::Value => {
                if !self.open(c, |b| b > b' ', State::ValueStarted) {
                    return Err(E::Value);
                }
            }
            State::ValueStarted => {
                c.eat_while(|b| b >= b' ');
                let next = match c.peek() {
                    None => return Ok(()),
                    Some(b'\r') => State::LineFeed,
                    Some(b'\n') => State::Key,
                    Some(_) => return Err(E::Value),
                };
                let value = self.collect(c)?;
                self.header.fields.insert(std::mem::take(&mut self.key), value);
                c.next();
                self.state = next;
            }
            State::Done => {}
        }
        Ok(())
    }
}
