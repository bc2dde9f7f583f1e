//! ByteMatcher: a prebuilt sequence of cursor steps, matched all-or-nothing.
//!
//! A matcher is assembled once (by hand or by [`crate::GlobMatcher`]) and run
//! many times. Every run builds its own [`ByteCursor`], so a built matcher is
//! `Send + Sync` and can be shared read-only across threads.
//!
//! ```
//! use bytescan::ByteMatcher;
//!
//! let mut m = ByteMatcher::new();
//! m.eat_bytes(b"v").eat_digits().eat_one(b'.').optional().eat_digits().optional();
//! assert_eq!(m.matches(b"v12.4-beta"), Some(5));
//! assert_eq!(m.matches(b"v7"), Some(2));
//! assert_eq!(m.matches(b"version"), None);
//! ```

use std::{fmt, sync::Arc};

use crate::{cursor::ByteCursor, table::FirstCharTable};

/// Cursor access for [`Step::Custom`].
pub type CustomStep = Arc<dyn Fn(&mut ByteCursor<'_>) -> bool + Send + Sync>;

/// One operation of a [`ByteMatcher`]. Each variant maps onto the
/// [`ByteCursor`] primitive of the same name.
#[derive(Clone)]
#[allow(missing_docs)]
pub enum Step {
    Bytes(Box<[u8]>),
    UntilBytes(Box<[u8]>),
    UntilIncludingBytes(Box<[u8]>),
    One(u8),
    UntilOne(u8),
    /// Any single byte.
    Next,
    Class(fn(u8) -> bool),
    While(fn(u8) -> bool),
    Digits,
    FromTable(Arc<FirstCharTable>),
    UntilFromTable(Arc<FirstCharTable>),
    UntilIncludingFromTable(Arc<FirstCharTable>),
    WhileFromTable(Arc<FirstCharTable>),
    OneFromTable(Arc<FirstCharTable>),
    OneNotFromTable(Arc<FirstCharTable>),
    ListAtEnd(Arc<[Box<[u8]>]>),
    SkipToEnd,
    /// Succeeds only at the end of the input.
    End,
    Custom(CustomStep),
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use bstr::BStr;
        match self {
            Step::Bytes(b) => f.debug_tuple("Bytes").field(&BStr::new(b)).finish(),
            Step::UntilBytes(b) => f.debug_tuple("UntilBytes").field(&BStr::new(b)).finish(),
            Step::UntilIncludingBytes(b) => f
                .debug_tuple("UntilIncludingBytes")
                .field(&BStr::new(b))
                .finish(),
            Step::One(b) => f.debug_tuple("One").field(&char::from(*b)).finish(),
            Step::UntilOne(b) => f.debug_tuple("UntilOne").field(&char::from(*b)).finish(),
            Step::Next => f.write_str("Next"),
            Step::Class(_) => f.write_str("Class(..)"),
            Step::While(_) => f.write_str("While(..)"),
            Step::Digits => f.write_str("Digits"),
            Step::FromTable(t) => f.debug_tuple("FromTable").field(t).finish(),
            Step::UntilFromTable(t) => f.debug_tuple("UntilFromTable").field(t).finish(),
            Step::UntilIncludingFromTable(t) => {
                f.debug_tuple("UntilIncludingFromTable").field(t).finish()
            }
            Step::WhileFromTable(t) => f.debug_tuple("WhileFromTable").field(t).finish(),
            Step::OneFromTable(t) => f.debug_tuple("OneFromTable").field(t).finish(),
            Step::OneNotFromTable(t) => f.debug_tuple("OneNotFromTable").field(t).finish(),
            Step::ListAtEnd(list) => f
                .debug_tuple("ListAtEnd")
                .field(&list.iter().map(|s| BStr::new(s)).collect::<Vec<_>>())
                .finish(),
            Step::SkipToEnd => f.write_str("SkipToEnd"),
            Step::End => f.write_str("End"),
            Step::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Step {
    /// Runs the step. Returns `false` if the underlying primitive failed.
    pub fn run(&self, c: &mut ByteCursor<'_>) -> bool {
        match self {
            Step::Bytes(lit) => c.eat_bytes(lit),
            Step::UntilBytes(lit) => c.eat_until_bytes(lit).is_some(),
            Step::UntilIncludingBytes(lit) => c.eat_until_including_bytes(lit).is_some(),
            Step::One(b) => c.eat_one(*b),
            Step::UntilOne(b) => c.eat_until_one(*b).is_some(),
            Step::Next => c.next().is_some(),
            Step::Class(pred) => c.eat(pred),
            Step::While(pred) => c.eat_while(pred).is_some(),
            Step::Digits => c.eat_while_digit().is_some(),
            Step::FromTable(t) => c.eat_bytes_from_table(t).is_some(),
            Step::UntilFromTable(t) => c.eat_until_bytes_from_table(t).is_some(),
            Step::UntilIncludingFromTable(t) => {
                c.eat_until_including_bytes_from_table(t).is_some()
            }
            Step::WhileFromTable(t) => c.eat_while_bytes_from_table(t).is_some(),
            Step::OneFromTable(t) => c.eat_one_from_table(t).is_some(),
            Step::OneNotFromTable(t) => c.eat_one_not_from_table(t).is_some(),
            Step::ListAtEnd(list) => c.eat_bytes_from_list_at_end(&list[..]).is_some(),
            Step::SkipToEnd => c.skip_to_end(),
            Step::End => c.is_eol(),
            Step::Custom(f) => f(c),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    step: Step,
    optional: bool,
}

/// An ordered list of [`Step`]s.
///
/// [`ByteMatcher::match_at`] runs the steps in order and reports the total
/// length consumed, or `None` as soon as a required step fails. It never
/// reports a partial match, and it does not anchor at the end of the input
/// unless [`ByteMatcher::match_end`] was added.
#[derive(Debug, Clone, Default)]
pub struct ByteMatcher {
    entries: Vec<Entry>,
}

impl ByteMatcher {
    /// An empty matcher; it matches zero bytes anywhere.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `step`.
    pub fn push(&mut self, step: Step) -> &mut Self {
        self.entries.push(Entry {
            step,
            optional: false,
        });
        self
    }

    /// Marks the last step as optional: if it fails, matching continues as if
    /// it were absent.
    pub fn optional(&mut self) -> &mut Self {
        if let Some(last) = self.entries.last_mut() {
            last.optional = true;
        }
        self
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no step was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The steps, in order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.entries.iter().map(|e| &e.step)
    }

    /// The literal `lit`.
    pub fn eat_bytes(&mut self, lit: &[u8]) -> &mut Self {
        self.push(Step::Bytes(lit.into()))
    }

    /// Everything before the next `lit`, which stays unread.
    pub fn eat_until_bytes(&mut self, lit: &[u8]) -> &mut Self {
        self.push(Step::UntilBytes(lit.into()))
    }

    /// Everything up to and including the next `lit`.
    pub fn eat_until_including_bytes(&mut self, lit: &[u8]) -> &mut Self {
        self.push(Step::UntilIncludingBytes(lit.into()))
    }

    /// The byte `b`.
    pub fn eat_one(&mut self, b: u8) -> &mut Self {
        self.push(Step::One(b))
    }

    /// Everything before the next `b`.
    pub fn eat_until_one(&mut self, b: u8) -> &mut Self {
        self.push(Step::UntilOne(b))
    }

    /// Any single byte.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> &mut Self {
        self.push(Step::Next)
    }

    /// One byte satisfying `pred`.
    pub fn eat_class(&mut self, pred: fn(u8) -> bool) -> &mut Self {
        self.push(Step::Class(pred))
    }

    /// A non-empty run of bytes satisfying `pred`.
    pub fn eat_while(&mut self, pred: fn(u8) -> bool) -> &mut Self {
        self.push(Step::While(pred))
    }

    /// A non-empty run of ASCII digits.
    pub fn eat_digits(&mut self) -> &mut Self {
        self.push(Step::Digits)
    }

    /// One sequence of `table`, first inserted match.
    pub fn eat_bytes_from_table(&mut self, table: impl Into<Arc<FirstCharTable>>) -> &mut Self {
        self.push(Step::FromTable(table.into()))
    }

    /// Everything before the earliest sequence of `table`.
    pub fn eat_until_bytes_from_table(
        &mut self,
        table: impl Into<Arc<FirstCharTable>>,
    ) -> &mut Self {
        self.push(Step::UntilFromTable(table.into()))
    }

    /// Everything up to and including the earliest sequence of `table`.
    pub fn eat_until_including_bytes_from_table(
        &mut self,
        table: impl Into<Arc<FirstCharTable>>,
    ) -> &mut Self {
        self.push(Step::UntilIncludingFromTable(table.into()))
    }

    /// A non-empty run of `table` sequences.
    pub fn eat_while_bytes_from_table(
        &mut self,
        table: impl Into<Arc<FirstCharTable>>,
    ) -> &mut Self {
        self.push(Step::WhileFromTable(table.into()))
    }

    /// One byte that leads a sequence of `table`.
    pub fn eat_one_from_table(&mut self, table: impl Into<Arc<FirstCharTable>>) -> &mut Self {
        self.push(Step::OneFromTable(table.into()))
    }

    /// One byte that leads no sequence of `table`.
    pub fn eat_one_not_from_table(&mut self, table: impl Into<Arc<FirstCharTable>>) -> &mut Self {
        self.push(Step::OneNotFromTable(table.into()))
    }

    /// Succeeds if the rest of the input ends with one of `list`, consuming it
    /// all.
    pub fn eat_bytes_from_list_at_end<S: AsRef<[u8]>>(&mut self, list: &[S]) -> &mut Self {
        let list: Arc<[Box<[u8]>]> = list.iter().map(|s| s.as_ref().into()).collect();
        self.push(Step::ListAtEnd(list))
    }

    /// The rest of the input, possibly empty.
    pub fn skip_to_end(&mut self) -> &mut Self {
        self.push(Step::SkipToEnd)
    }

    /// Anchors the match at the end of the input.
    pub fn match_end(&mut self) -> &mut Self {
        self.push(Step::End)
    }

    /// A step with direct cursor access. The closure should leave the cursor
    /// untouched when it fails; optional custom steps are rewound regardless.
    pub fn eat_custom(
        &mut self,
        f: impl Fn(&mut ByteCursor<'_>) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.push(Step::Custom(Arc::new(f)))
    }

    /// Runs every step on `input` from `start`; returns the consumed length.
    #[must_use]
    pub fn match_at(&self, input: &[u8], start: usize) -> Option<usize> {
        if start > input.len() {
            return None;
        }
        let mut cursor = ByteCursor::with_window(input, start, input.len());
        for entry in &self.entries {
            let before = cursor;
            if !entry.step.run(&mut cursor) {
                if !entry.optional {
                    return None;
                }
                cursor = before;
            }
        }
        Some(cursor.position() - start)
    }

    /// [`ByteMatcher::match_at`] from the start of `input`.
    #[must_use]
    pub fn matches(&self, input: &[u8]) -> Option<usize> {
        self.match_at(input, 0)
    }
}
