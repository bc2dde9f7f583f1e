//! Glob patterns compiled to [`ByteMatcher`]s.
//!
//! Supported syntax: `*` (any run, `**` lexes as one), `?` (any byte),
//! `[...]` sets with `a-z`/`A-Z`/`0-9` style ranges and `[!...]`/`[^...]`
//! negation, `{a,b}` alternation, `/` separators and `\` escapes.
//!
//! A `*` is non-greedy: it extends up to the first occurrence of whatever
//! follows it, and only a trailing `*` runs to the end of the input.

use tracing::debug;

use crate::{
    cursor::{
        ByteCursor,
        classes::{is_digit, is_lower, is_upper},
    },
    error::GlobError,
    lexer::{Lexer, Tokenizer},
    matcher::ByteMatcher,
    table::FirstCharTable,
};

/// Token kinds of a glob pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobToken {
    /// Literal run; may contain `\` escapes.
    Name,
    /// `/`.
    Separator,
    /// `*` or `**`.
    AnyRun,
    /// `?`.
    AnyByte,
    SetOpen,
    /// `!` or `^` right after `[`.
    SetNegation,
    /// One set member, possibly escaped.
    SetChar,
    /// The `-` of a range.
    SetRange,
    SetClose,
    AlternationOpen,
    AlternationName,
    AlternationComma,
    AlternationClose,
    /// A line break inside the pattern, matched literally.
    Newline,
    /// Rest of a pattern that could not be tokenized.
    Text,
}

/// States of [`GlobTokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum GlobState {
    Body,
    SetFirst,
    SetNegated,
    Set,
    SetDash,
    SetRangeEnd,
    AlternationFirst,
    AlternationName,
    AlternationSeparator,
    Text,
}

/// Splits a glob pattern into [`GlobToken`]s. Anything it cannot classify
/// becomes a trailing [`GlobToken::Text`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobTokenizer;

fn is_context(b: u8) -> bool {
    matches!(b, b'/' | b'*' | b'?' | b'{' | b'[')
}

fn is_range(lo: u8, hi: u8) -> bool {
    let classes: [fn(u8) -> bool; 3] = [is_lower, is_upper, is_digit];
    let same_class = classes.iter().any(|class| class(lo) && class(hi));
    same_class && lo <= hi
}

impl GlobTokenizer {
    fn set_member(state: &mut GlobState, c: &mut ByteCursor<'_>) -> Option<GlobToken> {
        let escaped = c.eat_backslash();
        let member = c.next()?;
        *state = match c.rest() {
            [b'-', hi, ..] if !escaped && is_range(member, *hi) => GlobState::SetDash,
            _ => GlobState::Set,
        };
        Some(GlobToken::SetChar)
    }

    fn alternation_name(state: &mut GlobState, c: &mut ByteCursor<'_>) -> Option<GlobToken> {
        c.eat_escaping_until(|b| b == b',' || b == b'}')?;
        *state = GlobState::AlternationSeparator;
        Some(GlobToken::AlternationName)
    }
}

impl Tokenizer for GlobTokenizer {
    type State = GlobState;
    type Kind = GlobToken;

    fn initial_state(&self) -> GlobState {
        GlobState::Body
    }

    fn default_state(&self) -> Option<GlobState> {
        Some(GlobState::Text)
    }

    fn newline_kind(&self) -> Option<GlobToken> {
        Some(GlobToken::Newline)
    }

    fn step(&mut self, state: &mut GlobState, c: &mut ByteCursor<'_>) -> Option<GlobToken> {
        use GlobState as S;
        use GlobToken as T;

        match *state {
            S::Body => {
                if c.eat_slash() {
                    Some(T::Separator)
                } else if c.eat_asterisk() {
                    c.eat_asterisk();
                    Some(T::AnyRun)
                } else if c.eat_question() {
                    Some(T::AnyByte)
                } else if c.eat_left_brace() {
                    *state = S::AlternationFirst;
                    Some(T::AlternationOpen)
                } else if c.eat_left_bracket() {
                    *state = S::SetFirst;
                    Some(T::SetOpen)
                } else {
                    c.eat_escaping_until(is_context).map(|_| T::Name)
                }
            }
            S::SetFirst => {
                if c.peek_is(b']') {
                    return None;
                }
                if c.eat(|b| b == b'!' || b == b'^') {
                    *state = S::SetNegated;
                    return Some(T::SetNegation);
                }
                Self::set_member(state, c)
            }
            S::SetNegated => {
                if c.peek_is(b']') {
                    return None;
                }
                Self::set_member(state, c)
            }
            S::Set => {
                if c.eat_right_bracket() {
                    *state = S::Body;
                    return Some(T::SetClose);
                }
                Self::set_member(state, c)
            }
            S::SetDash => {
                if !c.eat_minus() {
                    return None;
                }
                *state = S::SetRangeEnd;
                Some(T::SetRange)
            }
            S::SetRangeEnd => {
                c.next()?;
                *state = S::Set;
                Some(T::SetChar)
            }
            S::AlternationFirst => {
                if c.eat_right_brace() {
                    *state = S::Body;
                    return Some(T::AlternationClose);
                }
                Self::alternation_name(state, c)
            }
            S::AlternationName => Self::alternation_name(state, c),
            S::AlternationSeparator => {
                if c.eat_comma() {
                    *state = S::AlternationName;
                    Some(T::AlternationComma)
                } else if c.eat_right_brace() {
                    *state = S::Body;
                    Some(T::AlternationClose)
                } else {
                    None
                }
            }
            S::Text => {
                c.skip_to_end();
                Some(T::Text)
            }
        }
    }
}

/// Resolves `\` escapes. A trailing lone backslash stays literal.
fn unescape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied();
    while let Some(b) = bytes.next() {
        if b == b'\\' {
            out.push(bytes.next().unwrap_or(b'\\'));
        } else {
            out.push(b);
        }
    }
    out
}

#[derive(Debug)]
enum Group {
    Set {
        open: usize,
        negated: bool,
        members: Vec<u8>,
        range: bool,
    },
    Alternation {
        open: usize,
        names: Vec<Vec<u8>>,
    },
}

/// Turns the token stream into matcher steps, left to right.
#[derive(Debug, Default)]
struct Assembler {
    matcher: ByteMatcher,
    literal: Vec<u8>,
    any_run: bool,
    group: Option<Group>,
}

impl Assembler {
    fn push(&mut self, kind: GlobToken, text: &[u8], offset: usize) -> Result<(), GlobError> {
        use GlobToken as T;

        if kind == T::Text {
            return Err(GlobError::Parse { offset });
        }
        if self.group.is_some() {
            return self.push_grouped(kind, text);
        }
        match kind {
            T::Name | T::Separator | T::Newline => self.literal.extend(unescape(text)),
            T::AnyRun => {
                self.flush_literal();
                self.any_run = true;
            }
            T::AnyByte => {
                self.flush_literal();
                self.matcher.next();
            }
            T::SetOpen => {
                self.flush_literal();
                self.group = Some(Group::Set {
                    open: offset,
                    negated: false,
                    members: Vec::new(),
                    range: false,
                });
            }
            T::AlternationOpen => {
                self.flush_literal();
                self.group = Some(Group::Alternation {
                    open: offset,
                    names: Vec::new(),
                });
            }
            _ => return Err(GlobError::Unreachable),
        }
        Ok(())
    }

    fn push_grouped(&mut self, kind: GlobToken, text: &[u8]) -> Result<(), GlobError> {
        use GlobToken as T;

        match (kind, self.group.as_mut()) {
            (T::SetNegation, Some(Group::Set { negated, .. })) => *negated = true,
            (T::SetChar, Some(Group::Set { members, range, .. })) => {
                let hi = *text.last().ok_or(GlobError::Unreachable)?;
                let lo = members.last().copied();
                match lo {
                    Some(lo) if core::mem::take(range) => members.extend(lo.saturating_add(1)..=hi),
                    _ => members.push(hi),
                }
            }
            (T::SetRange, Some(Group::Set { range, .. })) => *range = true,
            (T::AlternationName, Some(Group::Alternation { names, .. })) => {
                names.push(unescape(text));
            }
            (T::AlternationComma, Some(Group::Alternation { .. })) => {}
            (T::Newline, Some(Group::Set { open, .. } | Group::Alternation { open, .. })) => {
                return Err(GlobError::Parse { offset: *open });
            }
            (T::SetClose | T::AlternationClose, Some(_)) => {
                let group = self.group.take().ok_or(GlobError::Unreachable)?;
                self.close(kind, group)?;
            }
            _ => return Err(GlobError::Unreachable),
        }
        Ok(())
    }

    fn close(&mut self, kind: GlobToken, group: Group) -> Result<(), GlobError> {
        let any_run = core::mem::take(&mut self.any_run);
        match (kind, group) {
            (GlobToken::SetClose, Group::Set { negated, members, .. }) => {
                let class = FirstCharTable::char_class(members);
                match (any_run, negated) {
                    (false, false) => self.matcher.eat_one_from_table(class),
                    (false, true) => self.matcher.eat_one_not_from_table(class),
                    (true, false) => self.matcher.eat_until_including_bytes_from_table(class),
                    (true, true) => self
                        .matcher
                        .eat_until_including_bytes_from_table(class.complement()),
                };
            }
            // `{}` adds nothing, so a pending `*` stays pending.
            (GlobToken::AlternationClose, Group::Alternation { names, .. }) if names.is_empty() => {
                self.any_run = any_run;
            }
            (GlobToken::AlternationClose, Group::Alternation { names, .. }) => {
                let table = FirstCharTable::from_sequences(&names);
                if any_run {
                    self.matcher.eat_until_including_bytes_from_table(table);
                } else {
                    self.matcher.eat_bytes_from_table(table);
                }
            }
            _ => return Err(GlobError::Unreachable),
        }
        Ok(())
    }

    fn flush_literal(&mut self) {
        if self.literal.is_empty() {
            return;
        }
        let literal = core::mem::take(&mut self.literal);
        if core::mem::take(&mut self.any_run) {
            self.matcher.eat_until_including_bytes(&literal);
        } else {
            self.matcher.eat_bytes(&literal);
        }
    }

    fn finish(mut self) -> Result<ByteMatcher, GlobError> {
        if let Some(Group::Set { open, .. } | Group::Alternation { open, .. }) = self.group {
            return Err(GlobError::Parse { offset: open });
        }
        self.flush_literal();
        if self.any_run {
            self.matcher.skip_to_end();
        }
        Ok(self.matcher)
    }
}

/// A compiled glob pattern.
///
/// ```
/// use bytescan::GlobMatcher;
///
/// let glob = GlobMatcher::parse("hello*.txt").unwrap();
/// assert_eq!(glob.matches(b"hello_world.txta"), Some(15));
/// assert!(!glob.is_match(b"hello_world.txta"));
/// assert!(glob.is_match(b"hello_world.txt"));
/// ```
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    pattern: Box<[u8]>,
    matcher: ByteMatcher,
    whole: ByteMatcher,
}

impl GlobMatcher {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// [`GlobError::Empty`] for an empty pattern, [`GlobError::Parse`] for an
    /// unterminated set or alternation or any text that does not tokenize.
    pub fn parse(pattern: impl AsRef<[u8]>) -> Result<Self, GlobError> {
        let pattern = pattern.as_ref();
        if pattern.is_empty() {
            return Err(GlobError::Empty);
        }
        let mut assembler = Assembler::default();
        for lexeme in Lexer::new(GlobTokenizer, pattern) {
            let lexeme = lexeme?;
            assembler.push(lexeme.kind, lexeme.bytes(pattern), lexeme.span.start)?;
        }
        let matcher = assembler.finish()?;
        let mut whole = matcher.clone();
        whole.match_end();
        debug!(steps = matcher.len(), "compiled glob");
        Ok(Self {
            pattern: pattern.into(),
            matcher,
            whole,
        })
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// The compiled steps.
    #[must_use]
    pub fn matcher(&self) -> &ByteMatcher {
        &self.matcher
    }

    /// Requires matches to reach the end of the input.
    #[must_use]
    pub fn anchored(mut self) -> Self {
        self.matcher = self.whole.clone();
        self
    }

    /// Length matched at `start`, if any. Unanchored unless
    /// [`GlobMatcher::anchored`] was applied.
    #[must_use]
    pub fn match_at(&self, input: &[u8], start: usize) -> Option<usize> {
        self.matcher.match_at(input, start)
    }

    /// [`GlobMatcher::match_at`] from the start of `input`.
    #[must_use]
    pub fn matches(&self, input: &[u8]) -> Option<usize> {
        self.matcher.matches(input)
    }

    /// `true` if the pattern matches all of `input`.
    #[must_use]
    pub fn is_match(&self, input: &[u8]) -> bool {
        self.whole.matches(input).is_some()
    }
}
