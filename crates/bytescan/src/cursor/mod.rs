//! ByteCursor: a windowed, transactional cursor over a byte buffer.
//!
//! What it does
//! - Scans a borrowed byte buffer inside a window `[token_start .. window_end)`
//!   with a read position (`position`) that only moves forward unless a
//!   speculative match rewinds it.
//! - Every `eat_*` primitive is all-or-nothing: it either advances the cursor
//!   past the full match and reports what it consumed, or it reports failure
//!   and leaves the cursor exactly as it was. Combinators (`maybe_eat`,
//!   `nest_match`, [`crate::ByteMatcher`]) rely on this for backtracking.
//! - The current token is always `bytes[token_start .. position)`;
//!   collecting it moves `token_start` up to `position`.
//!
//! Failure channel
//! - Counted matches return `Option<usize>` (`None` is failure; a zero-length
//!   run is a failure unless documented otherwise).
//! - Single-byte classes return `Option<u8>` with the consumed byte.
//! - Fixed literals return `bool`.
//!
//! Invariants
//! - `0 <= token_start <= position <= window_end <= bytes.len()`.
//! - The milestone is one-shot: it is read and cleared by the first rewind
//!   that observes it.
//!
//! Example
//! ```
//! use bytescan::ByteCursor;
//!
//! let mut c = ByteCursor::new(b"Host: example.org");
//! assert_eq!(c.eat_while_alpha(), Some(4));
//! assert_eq!(c.collect_token_text(), Some("Host"));
//! assert!(c.eat_colon());
//! assert!(c.eat_space().is_some());
//! assert!(!c.eat_bytes(b"example.com"));
//! assert_eq!(c.position(), 6);
//! ```

use core::fmt;
use core::str;

use bstr::{BStr, ByteSlice};

use crate::table::FirstCharTable;

pub mod classes;
mod merge;

pub use merge::MergeBuffer;

/// Result of [`ByteCursor::skip_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipTo {
    /// The byte was found inside the window and the cursor now rests on it.
    Moved(usize),
    /// The byte exists in the buffer but past the window; nothing moved.
    OutsideWindow(usize),
    /// The byte does not occur at or after the cursor.
    NotFound,
}

impl SkipTo {
    /// Returns `true` if the cursor was moved.
    #[must_use]
    pub fn is_moved(self) -> bool {
        matches!(self, SkipTo::Moved(_))
    }
}

/// A transactional cursor over a borrowed byte buffer.
///
/// Copying a cursor is cheap and yields an independent cursor over the same
/// buffer, which is what [`ByteCursor::nest_match`] uses for speculative
/// lookahead.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    start: usize,
    pos: usize,
    end: usize,
    milestone: Option<usize>,
}

impl fmt::Debug for ByteCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteCursor")
            .field("token", &BStr::new(self.current_token()))
            .field("rest", &BStr::new(self.rest()))
            .field("start", &self.start)
            .field("pos", &self.pos)
            .field("end", &self.end)
            .field("milestone", &self.milestone)
            .finish()
    }
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor over the whole buffer.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            start: 0,
            pos: 0,
            end: bytes.len(),
            milestone: None,
        }
    }

    /// Creates a cursor restricted to `bytes[start..end)`.
    ///
    /// Out-of-range bounds are clamped to the buffer.
    #[must_use]
    pub fn with_window(bytes: &'a [u8], start: usize, end: usize) -> Self {
        let end = end.min(bytes.len());
        let start = start.min(end);
        Self {
            bytes,
            start,
            pos: start,
            end,
            milestone: None,
        }
    }

    /// Re-initialises the cursor over a new buffer (whole-buffer window).
    pub fn reset_with(&mut self, bytes: &'a [u8]) {
        *self = Self::new(bytes);
    }

    /// Moves the window back to the whole buffer and the cursor to its start.
    pub fn reset(&mut self) {
        self.start = 0;
        self.pos = 0;
        self.end = self.bytes.len();
        self.milestone = None;
    }

    /// Narrows the window to `[start, end)` and places the cursor at `start`.
    pub fn set_window(&mut self, start: usize, end: usize) {
        self.end = end.min(self.bytes.len());
        self.start = start.min(self.end);
        self.pos = self.start;
        self.check_invariants();
    }

    /// Moves the cursor to `pos`, clamped to the window. The token start is
    /// pulled back if `pos` lies before it.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.end);
        self.start = self.start.min(self.pos);
        self.check_invariants();
    }

    /// Sets the token start to the current position.
    pub fn begin_token(&mut self) {
        self.start = self.pos;
    }

    /// Moves the cursor back by `n` bytes, never before the token start.
    pub fn back_up(&mut self, n: usize) {
        self.pos = self.pos.saturating_sub(n).max(self.start);
    }

    /// The whole underlying buffer.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Current read position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Start of the current token.
    #[must_use]
    pub fn token_start(&self) -> usize {
        self.start
    }

    /// Exclusive end of the window.
    #[must_use]
    pub fn window_end(&self) -> usize {
        self.end
    }

    /// Unread bytes inside the window.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..self.end]
    }

    /// Number of unread bytes inside the window.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// `true` once the cursor reached the end of the window.
    #[must_use]
    pub fn is_eol(&self) -> bool {
        self.pos >= self.end
    }

    #[inline]
    fn check_invariants(&self) {
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            self.start <= self.pos && self.pos <= self.end && self.end <= self.bytes.len(),
            "cursor invariant violated: {self:?}"
        );
    }

    #[inline]
    fn commit_run(&mut self, n: usize) -> Option<usize> {
        if n == 0 {
            return None;
        }
        self.pos += n;
        Some(n)
    }

    // --- Single bytes -----------------------------------------------------

    /// Byte at the cursor, without consuming it.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.rest().first().copied()
    }

    /// `true` if the byte at the cursor equals `b`.
    #[inline]
    #[must_use]
    pub fn peek_is(&self, b: u8) -> bool {
        self.peek() == Some(b)
    }

    /// Consumes and returns one byte.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Consumes one byte satisfying `pred`.
    #[inline]
    pub fn eat(&mut self, pred: impl Fn(u8) -> bool) -> bool {
        self.eat_class(pred).is_some()
    }

    /// Consumes one byte satisfying `pred` and returns it.
    #[inline]
    pub fn eat_class(&mut self, pred: impl Fn(u8) -> bool) -> Option<u8> {
        let b = self.peek().filter(|&b| pred(b))?;
        self.pos += 1;
        Some(b)
    }

    /// Consumes the byte `b`.
    #[inline]
    pub fn eat_one(&mut self, b: u8) -> bool {
        self.eat(|c| c == b)
    }

    /// Consumes the two-byte sequence `b1 b2`.
    #[inline]
    pub fn eat_two(&mut self, b1: u8, b2: u8) -> bool {
        self.eat_bytes(&[b1, b2])
    }

    /// Consumes the three-byte sequence `b1 b2 b3`.
    #[inline]
    pub fn eat_three(&mut self, b1: u8, b2: u8, b3: u8) -> bool {
        self.eat_bytes(&[b1, b2, b3])
    }

    // --- Runs -------------------------------------------------------------

    /// Consumes the maximal run of bytes satisfying `pred`.
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> Option<usize> {
        let n = self.rest().iter().take_while(|&&b| pred(b)).count();
        self.commit_run(n)
    }

    /// Consumes bytes up to (excluding) the first one satisfying `pred`, or to
    /// the end of the window.
    pub fn eat_until(&mut self, pred: impl Fn(u8) -> bool) -> Option<usize> {
        let rest = self.rest();
        let n = rest.iter().position(|&b| pred(b)).unwrap_or(rest.len());
        self.commit_run(n)
    }

    /// Consumes the maximal run of the byte `b`.
    pub fn eat_while_one(&mut self, b: u8) -> Option<usize> {
        self.eat_while(|c| c == b)
    }

    /// Consumes bytes up to the first `b`, or to the end of the window.
    pub fn eat_until_one(&mut self, b: u8) -> Option<usize> {
        self.eat_until(|c| c == b)
    }

    /// Consumes bytes while none of `stops` is seen.
    ///
    /// Lexers use this with small fixed delimiter sets (at most seven bytes in
    /// practice) to scan free text up to the next control byte.
    pub fn eat_while_neither(&mut self, stops: &[u8]) -> Option<usize> {
        match *stops {
            [a] => self.eat_until(|c| c == a),
            [a, b] => self.eat_until(|c| c == a || c == b),
            [a, b, c] => self.eat_until(|x| x == a || x == b || x == c),
            _ => self.eat_until(|x| stops.contains(&x)),
        }
    }

    /// Like [`ByteCursor::eat_until`], but a backslash makes the following
    /// byte opaque to `pred`.
    pub fn eat_escaping_until(&mut self, pred: impl Fn(u8) -> bool) -> Option<usize> {
        let rest = self.rest();
        let mut i = 0;
        while i < rest.len() {
            let c = rest[i];
            if c == b'\\' {
                i += 1;
            } else if pred(c) {
                break;
            }
            i += 1;
        }
        self.commit_run(i.min(rest.len()))
    }

    // --- Literals ---------------------------------------------------------

    /// Consumes the literal `lit`.
    pub fn eat_bytes(&mut self, lit: &[u8]) -> bool {
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            return true;
        }
        false
    }

    /// Consumes a literal where every byte may equal the byte at the same
    /// position in either `a` or `b`.
    ///
    /// Passing the lower- and upper-case spellings of a keyword gives an ASCII
    /// case-insensitive match without allocating.
    pub fn eat_on_either_bytes(&mut self, a: &[u8], b: &[u8]) -> bool {
        debug_assert_eq!(a.len(), b.len(), "either-literals must have equal length");
        let len = a.len().min(b.len());
        let rest = self.rest();
        if rest.len() < len {
            return false;
        }
        let matched = rest[..len]
            .iter()
            .zip(a.iter().zip(b))
            .all(|(&c, (&x, &y))| c == x || c == y);
        if matched {
            self.pos += len;
        }
        matched
    }

    /// Consumes bytes up to (excluding) the next occurrence of `lit`.
    ///
    /// Succeeds with `Some(0)` if `lit` starts right at the cursor; fails if
    /// `lit` does not occur inside the window.
    pub fn eat_until_bytes(&mut self, lit: &[u8]) -> Option<usize> {
        let i = self.rest().find(lit)?;
        self.pos += i;
        Some(i)
    }

    /// Consumes bytes up to and including the next occurrence of `lit`.
    pub fn eat_until_including_bytes(&mut self, lit: &[u8]) -> Option<usize> {
        let n = self.rest().find(lit)? + lit.len();
        self.pos += n;
        Some(n)
    }

    /// Consumes bytes up to the first occurrence of `lit` that is not preceded
    /// by an odd number of consecutive backslashes.
    pub fn eat_until_escaped_bytes(&mut self, lit: &[u8]) -> Option<usize> {
        let rest = self.rest();
        let mut backslashes = 0usize;
        for (i, &c) in rest.iter().enumerate() {
            if backslashes % 2 == 0 && rest[i..].starts_with(lit) {
                return self.commit_run(i);
            }
            if c == b'\\' {
                backslashes += 1;
            } else {
                backslashes = 0;
            }
        }
        None
    }

    /// Consumes a run delimited by `quote` on both sides, quotes included.
    pub fn eat_in_quotes(&mut self, quote: u8) -> Option<usize> {
        let rest = self.rest();
        if rest.first() != Some(&quote) {
            return None;
        }
        let close = rest[1..].find_byte(quote)?;
        self.commit_run(close + 2)
    }

    /// Like [`ByteCursor::eat_in_quotes`], but a backslash escapes the byte
    /// after it, so `\"` does not close the run.
    pub fn eat_in_escaped_quotes(&mut self, quote: u8) -> Option<usize> {
        let rest = self.rest();
        if rest.first() != Some(&quote) {
            return None;
        }
        let mut i = 1;
        while i < rest.len() {
            match rest[i] {
                b'\\' => i += 2,
                c if c == quote => return self.commit_run(i + 1),
                _ => i += 1,
            }
        }
        None
    }

    /// Consumes the literal `lit` only if the byte after it (if any) cannot
    /// continue an identifier, so `in` does not match the start of `index`.
    pub fn eat_keyword(&mut self, lit: &[u8]) -> bool {
        let rest = self.rest();
        if !rest.starts_with(lit) {
            return false;
        }
        if rest.get(lit.len()).is_some_and(|&b| classes::is_alpha_underline_digit(b)) {
            return false;
        }
        self.pos += lit.len();
        true
    }

    // --- Tables -----------------------------------------------------------

    /// Consumes the first sequence of `table` that matches at the cursor.
    pub fn eat_bytes_from_table(&mut self, table: &FirstCharTable) -> Option<usize> {
        let n = table.match_len(self.rest())?;
        self.commit_run(n)
    }

    /// Consumes bytes up to (excluding) the first position where a sequence
    /// of `table` matches. Fails on a zero-length run or if nothing matches.
    pub fn eat_until_bytes_from_table(&mut self, table: &FirstCharTable) -> Option<usize> {
        let rest = self.rest();
        let i = (0..rest.len()).find(|&i| table.match_len(&rest[i..]).is_some())?;
        self.commit_run(i)
    }

    /// Consumes bytes up to and including the first sequence of `table`
    /// found from the cursor on.
    pub fn eat_until_including_bytes_from_table(
        &mut self,
        table: &FirstCharTable,
    ) -> Option<usize> {
        let rest = self.rest();
        let n = (0..rest.len()).find_map(|i| table.match_len(&rest[i..]).map(|n| i + n))?;
        self.commit_run(n)
    }

    /// Repeatedly consumes sequences of `table`, accumulating their length.
    ///
    /// Each iteration takes the first entry of the bucket that matches (in
    /// insertion order); later entries of the same bucket are only
    /// reconsidered on the next iteration, regardless of their length. A
    /// class sentinel bucket does not end the loop: a run of class bytes is
    /// consumed one byte per iteration.
    pub fn eat_while_bytes_from_table(&mut self, table: &FirstCharTable) -> Option<usize> {
        let rest = self.rest();
        let mut i = 0;
        while let Some(n) = table.match_len(&rest[i..]) {
            i += n;
        }
        self.commit_run(i)
    }

    /// Consumes one byte that leads some entry of `table`.
    pub fn eat_one_from_table(&mut self, table: &FirstCharTable) -> Option<u8> {
        self.eat_class(|b| table.contains_lead(b))
    }

    /// Consumes one byte that leads no entry of `table`.
    pub fn eat_one_not_from_table(&mut self, table: &FirstCharTable) -> Option<u8> {
        self.eat_class(|b| !table.contains_lead(b))
    }

    /// Keyword variant of [`ByteCursor::eat_bytes_from_table`]: an entry only
    /// matches if it is not followed by an identifier byte.
    pub fn eat_keyword_from_list(&mut self, table: &FirstCharTable) -> Option<usize> {
        let rest = self.rest();
        let n = table.candidates(rest).find(|&n| {
            !rest
                .get(n)
                .is_some_and(|&b| classes::is_alpha_underline_digit(b))
        })?;
        self.commit_run(n)
    }

    /// Checks whether the unread part of the window ends with one of `list`.
    ///
    /// On success the cursor jumps to the window end and the index of the
    /// matching entry is returned.
    pub fn eat_bytes_from_list_at_end<S: AsRef<[u8]>>(&mut self, list: &[S]) -> Option<usize> {
        let rest = self.rest();
        let idx = list.iter().position(|s| rest.ends_with(s.as_ref()))?;
        self.pos = self.end;
        Some(idx)
    }

    // --- Jumps ------------------------------------------------------------

    /// Moves the cursor to the end of the window. Always succeeds.
    pub fn skip_to_end(&mut self) -> bool {
        self.pos = self.end;
        true
    }

    /// Index of the first `b` at or after `from` anywhere in the buffer,
    /// ignoring the window.
    #[must_use]
    pub fn find_index(&self, b: u8, from: usize) -> Option<usize> {
        self.bytes.get(from..)?.find_byte(b).map(|i| i + from)
    }

    /// Moves the cursor onto the next `b` if that occurrence lies inside the
    /// window.
    pub fn skip_to(&mut self, b: u8) -> SkipTo {
        match self.find_index(b, self.pos) {
            Some(i) if i >= self.start && i < self.end => {
                self.pos = i;
                SkipTo::Moved(i)
            }
            Some(i) => SkipTo::OutsideWindow(i),
            None => SkipTo::NotFound,
        }
    }

    // --- Tokens -----------------------------------------------------------

    /// Bytes of the current token, `bytes[token_start .. position)`.
    #[must_use]
    pub fn current_token(&self) -> &'a [u8] {
        &self.bytes[self.start..self.pos]
    }

    /// Returns the current token and starts a new one at the cursor.
    pub fn collect_token(&mut self) -> &'a [u8] {
        let token = self.current_token();
        self.start = self.pos;
        token
    }

    /// Like [`ByteCursor::collect_token`], decoded as UTF-8.
    ///
    /// Returns `None` for an empty token (the cursor never moved past the
    /// token start) or for invalid UTF-8; the token is collected either way.
    pub fn collect_token_text(&mut self) -> Option<&'a str> {
        let token = self.collect_token();
        if token.is_empty() {
            return None;
        }
        str::from_utf8(token).ok()
    }

    // --- Speculation ------------------------------------------------------

    /// The armed milestone, if any.
    #[must_use]
    pub fn milestone(&self) -> Option<usize> {
        self.milestone
    }

    /// Arms the one-shot milestone at `index`.
    pub fn set_milestone(&mut self, index: usize) {
        self.milestone = Some(index);
    }

    /// Runs `f`; if it fails, arms the milestone one byte past the cursor so
    /// an enclosing rewind keeps the progress made so far.
    pub fn keep_milestone_if_not(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let ok = f(self);
        if !ok {
            self.milestone = Some(self.pos + 1);
        }
        ok
    }

    fn take_milestone(&mut self) -> Option<usize> {
        self.milestone
            .take()
            .map(|m| m.clamp(self.start, self.end))
    }

    /// Runs a speculative match directly on this cursor.
    ///
    /// If `f` fails, the cursor is restored to where it was, or to the
    /// milestone when `f` armed one.
    pub fn maybe_eat(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let (start, pos) = (self.start, self.pos);
        if f(self) {
            return true;
        }
        self.start = start;
        self.pos = self.take_milestone().unwrap_or(pos).max(start);
        self.check_invariants();
        false
    }

    /// Runs a speculative match on an independent copy of this cursor and
    /// adopts its position only on success.
    ///
    /// A milestone armed by `f` on the copy is honoured like in
    /// [`ByteCursor::maybe_eat`].
    pub fn nest_match(&mut self, f: impl FnOnce(&mut Self) -> bool) -> Option<usize> {
        let mut nested = *self;
        nested.milestone = None;
        if f(&mut nested) && nested.pos >= self.pos {
            let n = nested.pos - self.pos;
            self.pos = nested.pos;
            return Some(n);
        }
        if let Some(m) = nested.take_milestone() {
            self.pos = m.max(self.start);
            self.check_invariants();
        }
        None
    }
}
