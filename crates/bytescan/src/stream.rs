//! Token carry-over between the chunks of a streaming parse.
//!
//! A streaming parser records where the open token starts in the current
//! chunk. If the chunk ends first, [`TokenCarry::suspend`] copies the partial
//! token aside and the token continues at index 0 of the next chunk. When the
//! terminator shows up, [`TokenCarry::collect`] returns the carried prefix and
//! the new bytes as one contiguous token, so a field is never exposed in two
//! halves.

use crate::options::StreamOptions;

#[derive(Debug, Clone, Default)]
pub(crate) struct TokenCarry {
    buf: Vec<u8>,
    open: Option<usize>,
    capacity: usize,
    limit: Option<usize>,
}

impl TokenCarry {
    pub(crate) fn new(options: &StreamOptions) -> Self {
        Self {
            buf: Vec::new(),
            open: None,
            capacity: options.carry_capacity,
            limit: options.max_token_len,
        }
    }

    /// Opens a token at `index` of the current chunk.
    pub(crate) fn begin(&mut self, index: usize) {
        self.open = Some(index);
    }

    #[cfg(test)]
    pub(crate) fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Length of the open token if it ended at `end`.
    fn token_len(&self, end: usize) -> usize {
        self.buf.len() + self.open.map_or(0, |start| end.saturating_sub(start))
    }

    fn check(&self, end: usize) -> Result<(), usize> {
        match self.limit {
            Some(limit) if self.token_len(end) > limit => Err(limit),
            _ => Ok(()),
        }
    }

    /// Closes the open token at `end` and returns its bytes, carried prefix
    /// included. Returns an empty token if none was open.
    ///
    /// Fails with the configured limit if the token is too long.
    pub(crate) fn collect(&mut self, chunk: &[u8], end: usize) -> Result<Vec<u8>, usize> {
        self.check(end)?;
        let start = self.open.take().unwrap_or(end).min(end);
        if self.buf.is_empty() {
            return Ok(chunk[start..end].to_vec());
        }
        let mut token = Vec::with_capacity(self.buf.len() + (end - start));
        token.extend_from_slice(&self.buf);
        token.extend_from_slice(&chunk[start..end]);
        self.buf.clear();
        Ok(token)
    }

    /// Called when a chunk ends at `end`: moves the open part of the token
    /// into the carry buffer so it resumes at index 0 of the next chunk.
    pub(crate) fn suspend(&mut self, chunk: &[u8], end: usize) -> Result<(), usize> {
        let Some(start) = self.open else {
            return Ok(());
        };
        self.check(end)?;
        if self.buf.capacity() == 0 {
            self.buf.reserve(self.capacity);
        }
        self.buf.extend_from_slice(&chunk[start.min(end)..end]);
        self.open = Some(0);
        Ok(())
    }

    /// Bytes currently held across a chunk boundary.
    #[cfg(test)]
    pub(crate) fn carried(&self) -> usize {
        self.buf.len()
    }
}
