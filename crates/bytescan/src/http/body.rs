use std::collections::BTreeMap;

use bstr::{ByteSlice, ByteVec};
use tracing::{debug, trace};

use crate::{
    cursor::ByteCursor,
    error::{BodyError, BodyErrorKind},
    options::StreamOptions,
    stream::TokenCarry,
};

/// An uploaded multipart part: one with a filename or a content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BodyFile {
    /// Client-side file name, empty if none was sent.
    pub name: String,
    /// Declared content type, empty if none was sent.
    pub content_type: String,
    /// Part content.
    pub data: Vec<u8>,
}

/// Fields and uploads of a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Body {
    /// Text fields by name; the last occurrence wins.
    pub fields: BTreeMap<String, String>,
    /// Multipart uploads by field name.
    pub files: BTreeMap<String, BodyFile>,
}

impl Body {
    /// Value of the text field `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Body,
    BeginMultipart,
    BeginMultipartStarted,
    KeyStarted,
    NextKey,
    Value,
    ValueStarted,
    LineFeed,
    PartHeader,
    PartHeaderStarted,
    ContentStart,
    Content,
    AfterBoundary,
    BoundaryEnd,
    Done,
}

#[derive(Debug, Clone, Default)]
struct Part {
    name: Option<String>,
    filename: Option<String>,
    content_type: Option<String>,
}

/// `A-Z a-z 0-9 ' ( ) + , - . / : = ? _`
fn is_boundary(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"'()+,-./:=?_".contains(&b)
}

fn is_terminator(b: u8) -> bool {
    b == b'\r' || b == 0
}

/// Decodes `application/x-www-form-urlencoded` bytes: `+` is a space and
/// `%XX` a hex escape. Returns `None` for a malformed escape.
#[must_use]
pub fn form_url_decode(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut c = ByteCursor::new(bytes);
    while !c.is_eol() {
        if c.eat_until(|b| b == b'+' || b == b'%').is_some() {
            out.extend_from_slice(c.collect_token());
            continue;
        }
        if c.eat_plus() {
            out.push(b' ');
        } else {
            c.eat_percent();
            let hi = c.eat_hex()?;
            let lo = c.eat_hex()?;
            out.push((hex_value(hi) << 4) | hex_value(lo));
        }
        c.begin_token();
    }
    Some(out)
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

/// Streaming parser for a request body.
///
/// Two grammars share the state machine:
/// - `application/x-www-form-urlencoded`: `key=value&key=value` ended by CR
///   or NUL (or by [`BodyParser::finish`]). Keys and values are form-url
///   decoded; `key=` yields an empty value.
/// - `multipart/form-data`: a body starting with `--boundary` CRLF. Each part
///   has header lines, an empty line, then content up to CRLF `--boundary`.
///   `--boundary--` ends the body.
///
/// ```
/// use bytescan::BodyParser;
///
/// let mut parser = BodyParser::new();
/// assert!(!parser.parse(b"a=1&b=&c=").unwrap());
/// assert!(parser.parse(b"3\r").unwrap());
/// let body = parser.body();
/// assert_eq!(body.get("a"), Some("1"));
/// assert_eq!(body.get("b"), Some(""));
/// assert_eq!(body.get("c"), Some("3"));
/// ```
#[derive(Debug, Clone)]
pub struct BodyParser {
    state: State,
    lined_up: State,
    body: Body,
    key: String,
    carry: TokenCarry,
    consumed: usize,
    delimiter: Vec<u8>,
    matched: usize,
    part: Part,
}

impl Default for BodyParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyParser {
    /// Creates a parser with default [`StreamOptions`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(StreamOptions::default())
    }

    /// Creates a parser that carries split tokens according to `options`.
    #[must_use]
    pub fn with_options(options: StreamOptions) -> Self {
        Self {
            state: State::Body,
            lined_up: State::Body,
            body: Body::default(),
            key: String::new(),
            carry: TokenCarry::new(&options),
            consumed: 0,
            delimiter: Vec::new(),
            matched: 0,
            part: Part::default(),
        }
    }

    /// `true` once the body has been read to its end.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// The fields and files read so far.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Consumes the parser, returning what it has read.
    #[must_use]
    pub fn into_body(self) -> Body {
        self.body
    }

    /// The multipart boundary, leading `--` included, once recognised.
    #[must_use]
    pub fn boundary(&self) -> Option<&[u8]> {
        self.delimiter.get(2..)
    }

    /// Bytes of the stream consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Parses the next chunk of the body.
    ///
    /// # Errors
    ///
    /// Returns a [`BodyError`] naming the violated expectation and its stream
    /// offset. The parser must not be fed again after an error.
    pub fn parse(&mut self, chunk: &[u8]) -> Result<bool, BodyError> {
        self.parse_window(chunk, 0, chunk.len())
    }

    /// Parses `buf[start..end)` as the next chunk of the body.
    ///
    /// # Errors
    ///
    /// See [`BodyParser::parse`].
    pub fn parse_window(&mut self, buf: &[u8], start: usize, end: usize) -> Result<bool, BodyError> {
        if self.is_done() {
            return Ok(true);
        }
        let mut c = ByteCursor::with_window(buf, start, end);
        let start = c.position();
        trace!(len = c.remaining(), state = ?self.state, "body chunk");

        let result = self.run(&mut c).and_then(|()| {
            if self.is_done() {
                Ok(())
            } else {
                self.carry
                    .suspend(buf, c.window_end())
                    .map_err(BodyErrorKind::TokenTooLong)
            }
        });
        let offset = self.consumed + (c.position() - start);
        if let Err(kind) = result {
            debug!(?kind, offset, state = ?self.state, "body parse error");
            return Err(BodyError { kind, offset });
        }
        self.consumed = offset;
        if self.is_done() {
            self.log_done();
        }
        Ok(self.is_done())
    }

    /// Signals the end of the body.
    ///
    /// A urlencoded body may end without its CR/NUL terminator; a pending
    /// value is stored. An empty body is complete too.
    ///
    /// # Errors
    ///
    /// [`BodyErrorKind::ContentBody`] if a multipart part was cut off, and
    /// [`BodyErrorKind::Incomplete`] if the body stopped anywhere else short
    /// of its end (inside a key, a part header, or the final boundary).
    pub fn finish(&mut self) -> Result<&Body, BodyError> {
        let error = |kind| BodyError {
            kind,
            offset: self.consumed,
        };
        match self.state {
            State::Done => return Ok(&self.body),
            State::Body | State::NextKey => {}
            State::Value => {
                self.body.fields.insert(std::mem::take(&mut self.key), String::new());
            }
            State::ValueStarted => {
                let token = self
                    .carry
                    .collect(&[], 0)
                    .map_err(|limit| error(BodyErrorKind::TokenTooLong(limit)))?;
                let value = form_url_decode(&token).ok_or_else(|| error(BodyErrorKind::Value))?;
                self.body
                    .fields
                    .insert(std::mem::take(&mut self.key), value.into_string_lossy());
            }
            State::ContentStart | State::Content => {
                return Err(error(BodyErrorKind::ContentBody));
            }
            _ => return Err(error(BodyErrorKind::Incomplete)),
        }
        self.state = State::Done;
        self.log_done();
        Ok(&self.body)
    }

    fn log_done(&self) {
        debug!(
            consumed = self.consumed,
            fields = self.body.fields.len(),
            files = self.body.files.len(),
            "body done"
        );
    }

    fn run(&mut self, c: &mut ByteCursor<'_>) -> Result<(), BodyErrorKind> {
        while !c.is_eol() && !self.is_done() {
            self.step(c)?;
        }
        Ok(())
    }

    fn collect(&mut self, c: &ByteCursor<'_>) -> Result<Vec<u8>, BodyErrorKind> {
        self.carry
            .collect(c.bytes(), c.position())
            .map_err(BodyErrorKind::TokenTooLong)
    }

    fn collect_decoded(
        &mut self,
        c: &ByteCursor<'_>,
        kind: BodyErrorKind,
    ) -> Result<String, BodyErrorKind> {
        let token = self.collect(c)?;
        form_url_decode(&token)
            .map(|decoded| decoded.into_string_lossy())
            .ok_or(kind)
    }

    fn open(&mut self, c: &mut ByteCursor<'_>, accept: impl Fn(u8) -> bool, next: State) -> bool {
        let at = c.position();
        if c.eat(accept) {
            self.carry.begin(at);
            self.state = next;
            return true;
        }
        false
    }

    fn line_feed_then(&mut self, c: &mut ByteCursor<'_>, lined_up: State) {
        c.next();
        self.state = State::LineFeed;
        self.lined_up = lined_up;
    }

    fn store_value(&mut self, value: String) {
        self.body.fields.insert(std::mem::take(&mut self.key), value);
    }

    fn step(&mut self, c: &mut ByteCursor<'_>) -> Result<(), BodyErrorKind> {
        use BodyErrorKind as E;

        match self.state {
            State::Body => {
                if self.open(c, |b| b == b'-', State::BeginMultipart) {
                    return Ok(());
                }
                if !self.open(c, |b| b >= b' ' && b != b'=', State::KeyStarted) {
                    return Err(E::Body);
                }
            }
            State::BeginMultipart => {
                // A single leading `-` is just the start of a key.
                self.state = if c.eat_minus() {
                    State::BeginMultipartStarted
                } else {
                    State::KeyStarted
                };
            }
            State::BeginMultipartStarted => {
                c.eat_while(is_boundary);
                match c.peek() {
                    None => {}
                    Some(b'\r') => {
                        let boundary = self.collect(c)?;
                        // The token after `--` needs at least two bytes.
                        if boundary.len() <= 3 {
                            return Err(E::BeginMultipart);
                        }
                        self.delimiter = [&b"\r\n"[..], &boundary[..]].concat();
                        trace!(boundary = ?boundary.as_bstr(), "multipart body");
                        self.line_feed_then(c, State::PartHeader);
                    }
                    Some(_) => return Err(E::BeginMultipart),
                }
            }
            State::KeyStarted => {
                c.eat_while(|b| b >= b' ' && b != b'=');
                match c.peek() {
                    None => {}
                    Some(b'=') => {
                        self.key = self.collect_decoded(c, E::Key)?;
                        c.next();
                        self.state = State::Value;
                    }
                    Some(_) => return Err(E::Key),
                }
            }
            State::NextKey => {
                if !self.open(c, |b| b >= b' ' && b != b'=', State::KeyStarted) {
                    return Err(E::Key);
                }
            }
            State::Value => match c.peek() {
                Some(b'&') => {
                    c.next();
                    self.store_value(String::new());
                    self.state = State::NextKey;
                }
                Some(b) if is_terminator(b) => {
                    c.next();
                    self.store_value(String::new());
                    self.state = State::Done;
                }
                _ => {
                    if !self.open(c, |b| b >= b' ', State::ValueStarted) {
                        return Err(E::Value);
                    }
                }
            },
            State::ValueStarted => {
                c.eat_while(|b| b >= b' ' && b != b'&');
                let next = match c.peek() {
                    None => return Ok(()),
                    Some(b'&') => State::NextKey,
                    Some(b) if is_terminator(b) => State::Done,
                    Some(_) => return Err(E::Value),
                };
                let value = self.collect_decoded(c, E::Value)?;
                self.store_value(value);
                c.next();
                self.state = next;
            }
            State::LineFeed => {
                if !c.eat_lf() {
                    return Err(E::LineFeed);
                }
                self.state = self.lined_up;
            }
            State::PartHeader => {
                if c.peek_is(b'\r') {
                    if self.part.name.is_none() {
                        return Err(E::ContentDisposition);
                    }
                    self.line_feed_then(c, State::ContentStart);
                } else if !self.open(c, |b| b >= b' ' || b == b'\t', State::PartHeaderStarted) {
                    return Err(E::PartHeader);
                }
            }
            State::PartHeaderStarted => {
                c.eat_while(|b| b >= b' ' || b == b'\t');
                match c.peek() {
                    None => {}
                    Some(b'\r') => {
                        let line = self.collect(c)?;
                        parse_part_header(&line, &mut self.part)?;
                        self.line_feed_then(c, State::PartHeader);
                    }
                    Some(_) => return Err(E::PartHeader),
                }
            }
            State::ContentStart => {
                self.carry.begin(c.position());
                self.matched = 0;
                self.state = State::Content;
            }
            State::Content => self.scan_content(c)?,
            State::AfterBoundary => {
                if c.eat_cr() {
                    self.state = State::LineFeed;
                    self.lined_up = State::PartHeader;
                } else if c.eat_minus() {
                    self.state = State::BoundaryEnd;
                } else {
                    return Err(E::Boundary);
                }
            }
            State::BoundaryEnd => {
                if !c.eat_minus() {
                    return Err(E::Boundary);
                }
                self.state = State::Done;
            }
            State::Done => {}
        }
        Ok(())
    }

    /// Consumes part content until the delimiter `CRLF--boundary` completes.
    /// Progress through the delimiter survives chunk boundaries.
    fn scan_content(&mut self, c: &mut ByteCursor<'_>) -> Result<(), BodyErrorKind> {
        while let Some(b) = c.peek() {
            if self.matched == 0 && b != b'\r' {
                c.eat_until_one(b'\r');
                continue;
            }
            c.next();
            if b == self.delimiter[self.matched] {
                self.matched += 1;
                if self.matched == self.delimiter.len() {
                    return self.store_part(c);
                }
            } else {
                self.matched = usize::from(b == b'\r');
            }
        }
        Ok(())
    }

    fn store_part(&mut self, c: &ByteCursor<'_>) -> Result<(), BodyErrorKind> {
        let mut data = self.collect(c)?;
        data.truncate(data.len().saturating_sub(self.delimiter.len()));
        let part = std::mem::take(&mut self.part);
        let name = part.name.ok_or(BodyErrorKind::ContentDisposition)?;
        trace!(name = name.as_str(), len = data.len(), "multipart part");
        if part.filename.is_some() || part.content_type.is_some() {
            let file = BodyFile {
                name: part.filename.unwrap_or_default(),
                content_type: part.content_type.unwrap_or_default(),
                data,
            };
            self.body.files.insert(name, file);
        } else {
            self.body.fields.insert(name, data.into_string_lossy());
        }
        self.matched = 0;
        self.state = State::AfterBoundary;
        Ok(())
    }
}

/// Reads one part header line into `part`. Only `Content-Disposition` and
/// `Content-Type` are interpreted, matched on the whole field name in any
/// case; other well-formed headers are skipped.
fn parse_part_header(line: &[u8], part: &mut Part) -> Result<(), BodyErrorKind> {
    let mut c = ByteCursor::new(line);
    if c.eat_while(|b| b != b':').is_none() {
        return Err(BodyErrorKind::PartHeader);
    }
    let name = &line[..c.position()];
    if !c.eat_colon() {
        return Err(BodyErrorKind::PartHeader);
    }
    c.eat_while_space_tab();
    if name.eq_ignore_ascii_case(b"content-disposition") {
        if !c.eat_on_either_bytes(b"form-data", b"FORM-DATA") {
            return Err(BodyErrorKind::ContentDisposition);
        }
        while c.eat_semicolon() {
            c.eat_while_space_tab();
            c.begin_token();
            c.eat_until(|b| b == b'=' || b == b';');
            let param = c.collect_token().to_ascii_lowercase();
            let value = if c.eat_equal() {
                param_value(&mut c)
            } else {
                String::new()
            };
            match &param[..] {
                b"name" => part.name = Some(value),
                b"filename" => part.filename = Some(value),
                _ => {}
            }
            c.eat_while_space_tab();
        }
        if !c.is_eol() {
            return Err(BodyErrorKind::ContentDisposition);
        }
    } else if name.eq_ignore_ascii_case(b"content-type") {
        part.content_type = Some(c.rest().trim_ascii().to_str_lossy().into_owned());
    }
    Ok(())
}

/// A parameter value: quoted (with backslash escapes) or bare up to `;`.
fn param_value(c: &mut ByteCursor<'_>) -> String {
    c.begin_token();
    if c.eat_in_escaped_quotes(b'"').is_some() {
        let quoted = c.collect_token();
        let inner = &quoted[1..quoted.len() - 1];
        let mut out = Vec::with_capacity(inner.len());
        let mut escaped = false;
        for &b in inner {
            if b == b'\\' && !escaped {
                escaped = true;
                continue;
            }
            escaped = false;
            out.push(b);
        }
        return out.into_string_lossy();
    }
    c.eat_until(|b| b == b';');
    c.collect_token().trim_ascii().to_str_lossy().into_owned()
}
