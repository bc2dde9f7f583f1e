use super::ByteCursor;

/// Owns the bytes of a stream that a [`ByteCursor`] has not finished with.
///
/// Each [`MergeBuffer::merge`] drops the bytes before the open token and
/// appends the new chunk, so a token split across chunks is contiguous when
/// the next cursor is handed out. Read the cursor's token start and position
/// before dropping it and hand them to [`MergeBuffer::commit`].
#[derive(Debug, Default, Clone)]
pub struct MergeBuffer {
    bytes: Vec<u8>,
    start: usize,
    pos: usize,
}

impl MergeBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk`, discarding everything before the open token.
    pub fn merge(&mut self, chunk: &[u8]) {
        if self.start > 0 {
            self.bytes.drain(..self.start);
            self.pos -= self.start;
            self.start = 0;
        }
        self.bytes.extend_from_slice(chunk);
    }

    /// A cursor over the retained bytes, positioned where the last commit
    /// left off.
    #[must_use]
    pub fn cursor(&self) -> ByteCursor<'_> {
        let mut cursor = ByteCursor::new(&self.bytes);
        cursor.seek(self.pos);
        cursor.start = self.start;
        cursor
    }

    /// Records where the last cursor left off: the start of its open token
    /// and its position.
    pub fn commit(&mut self, token_start: usize, position: usize) {
        debug_assert!(position <= self.bytes.len());
        self.start = token_start.min(self.bytes.len());
        self.pos = position.clamp(self.start, self.bytes.len());
    }

    /// Bytes of the open token plus everything not yet read.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.bytes[self.start..]
    }

    /// Number of retained bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if no bytes are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Drops all retained bytes.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.start = 0;
        self.pos = 0;
    }
}
