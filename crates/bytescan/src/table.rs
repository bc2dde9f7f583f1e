//! First-byte lookup tables for multi-literal matching.

use core::fmt;

use bstr::BStr;

/// Byte sequences bucketed by their first byte.
///
/// A bucket is `None` when no sequence starts with that byte. A bucket holding
/// an empty list means "this byte alone matches" (length 1), which is how
/// character classes are encoded. Within a bucket, sequences keep insertion
/// order and the first one that matches wins.
#[derive(Clone, PartialEq, Eq)]
pub struct FirstCharTable {
    buckets: Box<[Option<Vec<Box<[u8]>>>; 256]>,
}

impl Default for FirstCharTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FirstCharTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (lead, bucket) in (0..=255u8).zip(self.buckets.iter()) {
            if let Some(bucket) = bucket {
                let seqs: Vec<&BStr> = bucket.iter().map(|s| BStr::new(&**s)).collect();
                map.entry(&BStr::new(&[lead][..]), &seqs);
            }
        }
        map.finish()
    }
}

impl FirstCharTable {
    /// An empty table that matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: Box::new([const { None }; 256]),
        }
    }

    /// Builds a table from `sequences`. Empty sequences are skipped.
    pub fn from_sequences<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut table = Self::new();
        for seq in sequences {
            table.insert(seq.as_ref());
        }
        table
    }

    /// Builds a single-byte class table from `bytes`.
    pub fn char_class(bytes: impl IntoIterator<Item = u8>) -> Self {
        let mut table = Self::new();
        for b in bytes {
            table.insert_lead(b);
        }
        table
    }

    /// Appends `seq` to the bucket of its first byte. Empty input is ignored.
    pub fn insert(&mut self, seq: &[u8]) {
        let Some(&lead) = seq.first() else {
            return;
        };
        match &mut self.buckets[lead as usize] {
            slot @ None => *slot = Some(vec![seq.into()]),
            Some(bucket) => {
                // Spell out a class sentinel before it stops being empty.
                if bucket.is_empty() {
                    bucket.push(Box::new([lead]));
                }
                bucket.push(seq.into());
            }
        }
    }

    /// Marks `lead` as matching on its own.
    pub fn insert_lead(&mut self, lead: u8) {
        match &mut self.buckets[lead as usize] {
            slot @ None => *slot = Some(Vec::new()),
            Some(bucket) if bucket.is_empty() => {}
            Some(bucket) => bucket.push(Box::new([lead])),
        }
    }

    /// The class of all bytes that lead no sequence of this table.
    #[must_use]
    pub fn complement(&self) -> Self {
        Self::char_class((0..=255u8).filter(|&b| !self.contains_lead(b)))
    }

    /// The bucket for `lead`.
    #[must_use]
    pub fn bucket(&self, lead: u8) -> Option<&[Box<[u8]>]> {
        self.buckets[lead as usize].as_deref()
    }

    /// `true` if some sequence starts with `lead`.
    #[must_use]
    pub fn contains_lead(&self, lead: u8) -> bool {
        self.buckets[lead as usize].is_some()
    }

    /// `true` if the table matches nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Option::is_none)
    }

    /// Lengths of the sequences matching at the start of `hay`, in bucket
    /// order.
    pub(crate) fn candidates<'t>(&'t self, hay: &'t [u8]) -> impl Iterator<Item = usize> + 't {
        let bucket = hay.first().and_then(|&b| self.bucket(b));
        let sentinel = bucket.is_some_and(<[_]>::is_empty).then_some(1);
        sentinel.into_iter().chain(
            bucket
                .unwrap_or_default()
                .iter()
                .filter(move |seq| hay.starts_with(seq))
                .map(|seq| seq.len()),
        )
    }

    /// Length of the first sequence matching at the start of `hay`.
    pub(crate) fn match_len(&self, hay: &[u8]) -> Option<usize> {
        self.candidates(hay).next()
    }
}
