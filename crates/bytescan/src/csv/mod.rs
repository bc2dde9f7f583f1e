//! A small CSV table format with a leading serial-id line.
//!
//! ```text
//! 3                 <- next id handed out by insert
//! id,name,note      <- header; the first column is always "id"
//! 0,apple,"red, round"
//! 2,pear,"say ""hi"""
//! ```
//!
//! Fields may be double-quoted to hold commas, newlines and doubled quotes.
//! Records end with `\n`; blank lines between records are skipped. Rows are
//! looked up by a linear scan over the id column.

use std::borrow::Cow;
use std::iter;

use bstr::ByteVec;
use tracing::debug;

use crate::{
    cursor::ByteCursor,
    error::{CsvError, StoreError},
};

mod store;

pub use store::{FileStore, TableStore};

/// An in-memory CSV table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct CsvTable {
    serial_id: u64,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn line_at(bytes: &[u8], pos: usize) -> usize {
    bytes[..pos].iter().filter(|&&b| b == b'\n').count() + 1
}

fn is_field_end(b: u8) -> bool {
    b == b',' || b == b'\n'
}

/// Reads one field; the cursor stops on the delimiter after it.
fn read_field(c: &mut ByteCursor<'_>) -> Result<String, CsvError> {
    c.begin_token();
    if !c.eat_double_quote() {
        c.eat_until(is_field_end);
        return Ok(c.collect_token().to_vec().into_string_lossy());
    }

    let open = c.token_start();
    let mut value = Vec::new();
    c.begin_token();
    loop {
        if !c.skip_to(b'"').is_moved() {
            return Err(CsvError::UnterminatedQuote {
                line: line_at(c.bytes(), open),
            });
        }
        value.extend_from_slice(c.collect_token());
        c.next();
        if !c.eat_double_quote() {
            break;
        }
        value.push(b'"');
        c.begin_token();
    }
    // Bytes between the closing quote and the delimiter are kept.
    c.begin_token();
    c.eat_until(is_field_end);
    value.extend_from_slice(c.collect_token());
    Ok(value.into_string_lossy())
}

/// Reads the next record and the offset it starts at.
fn read_record(c: &mut ByteCursor<'_>) -> Result<Option<(usize, Vec<String>)>, CsvError> {
    c.eat_while_one(b'\n');
    if c.is_eol() {
        return Ok(None);
    }
    let start = c.position();
    let mut record = Vec::new();
    loop {
        record.push(read_field(c)?);
        match c.next() {
            Some(b',') => {}
            Some(b'\n') | None => return Ok(Some((start, record))),
            Some(_) => return Err(CsvError::Unreachable),
        }
    }
}

fn write_record(out: &mut String, record: &[String]) {
    // A lone empty field would otherwise read back as a blank line.
    if let [only] = record {
        if only.is_empty() {
            out.push_str("\"\"\n");
            return;
        }
    }
    for (i, field) in record.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(field));
    }
    out.push('\n');
}

/// Quotes `field` if it holds a double quote, comma or newline.
#[must_use]
pub fn escape(field: &str) -> Cow<'_, str> {
    if !field.contains(['"', ',', '\n']) {
        return Cow::Borrowed(field);
    }
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
    Cow::Owned(out)
}

/// Reverses [`escape`]: strips the surrounding quotes and undoubles inner
/// quotes. Anything that is not a quoted field is returned as is.
#[must_use]
pub fn unescape(field: &str) -> Cow<'_, str> {
    match field
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => Cow::Owned(inner.replace("\"\"", "\"")),
        None => Cow::Borrowed(field),
    }
}

impl CsvTable {
    /// A table with no rows whose header is `id` followed by `columns`.
    pub fn create<S: AsRef<str>>(columns: &[S]) -> Self {
        let header = iter::once("id".to_owned())
            .chain(columns.iter().map(|c| c.as_ref().to_owned()))
            .collect();
        Self {
            serial_id: 0,
            header,
            rows: Vec::new(),
        }
    }

    /// Parses the serialized form.
    ///
    /// # Errors
    ///
    /// A [`CsvError`] for a missing serial id or header, a row whose width
    /// differs from the header, or an unterminated quoted field.
    pub fn parse(bytes: &[u8]) -> Result<Self, CsvError> {
        let mut c = ByteCursor::new(bytes);
        c.eat_while_digit().ok_or(CsvError::SerialId)?;
        let serial_id: u64 = c
            .collect_token_text()
            .and_then(|digits| digits.parse().ok())
            .ok_or(CsvError::SerialId)?;
        if !c.eat_lf() {
            return Err(CsvError::NewLine);
        }

        let (_, header) = read_record(&mut c)?.ok_or(CsvError::EmptyHeader)?;
        let mut rows = Vec::new();
        while let Some((start, row)) = read_record(&mut c)? {
            if row.len() != header.len() {
                return Err(CsvError::RowColumns {
                    line: line_at(bytes, start),
                    expected: header.len(),
                    found: row.len(),
                });
            }
            rows.push(row);
        }
        debug!(serial_id, columns = header.len(), rows = rows.len(), "parsed csv table");
        Ok(Self {
            serial_id,
            header,
            rows,
        })
    }

    /// Reads and parses the table held by `store`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if reading fails, [`StoreError::Csv`] if the bytes
    /// are not a table.
    pub fn load(store: &mut impl TableStore) -> Result<Self, StoreError> {
        let bytes = store.read_all()?;
        Ok(Self::parse(&bytes)?)
    }

    /// Writes the serialized table to `store`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if writing fails.
    pub fn save(&self, store: &mut impl TableStore) -> Result<(), StoreError> {
        store.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// The serialized table.
    #[must_use]
    pub fn data(&self) -> String {
        let mut out = format!("{}\n", self.serial_id);
        for record in iter::once(&self.header).chain(&self.rows) {
            write_record(&mut out, record);
        }
        out
    }

    /// [`CsvTable::data`] as bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data().into_bytes()
    }

    /// Id the next [`CsvTable::insert`] hands out.
    #[must_use]
    pub fn serial_id(&self) -> u64 {
        self.serial_id
    }

    /// Column names.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Rows in table order, id first.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn find(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.first().is_some_and(|first| first == id))
    }

    fn with_id<S: AsRef<str>>(id: String, row: &[S]) -> Vec<String> {
        iter::once(id)
            .chain(row.iter().map(|field| field.as_ref().to_owned()))
            .collect()
    }

    /// Appends `row` (every column but `id`) under the next serial id and
    /// returns that id.
    ///
    /// # Errors
    ///
    /// [`CsvError::InsertColumns`] if `row` does not fill the other columns.
    pub fn insert<S: AsRef<str>>(&mut self, row: &[S]) -> Result<u64, CsvError> {
        if row.len() + 1 != self.header.len() {
            return Err(CsvError::InsertColumns {
                expected: self.header.len().saturating_sub(1),
                found: row.len(),
            });
        }
        let id = self.serial_id;
        self.rows.push(Self::with_id(id.to_string(), row));
        self.serial_id += 1;
        Ok(id)
    }

    /// Alias for [`CsvTable::insert`].
    ///
    /// # Errors
    ///
    /// See [`CsvTable::insert`].
    pub fn append<S: AsRef<str>>(&mut self, row: &[S]) -> Result<u64, CsvError> {
        self.insert(row)
    }

    /// Replaces the columns of row `id`. An unknown id is appended as a new
    /// row keeping that id; the serial id is left alone.
    ///
    /// # Errors
    ///
    /// [`CsvError::UpdateColumns`] if `row` does not fill the other columns.
    pub fn update<S: AsRef<str>>(&mut self, id: &str, row: &[S]) -> Result<(), CsvError> {
        if row.len() + 1 != self.header.len() {
            return Err(CsvError::UpdateColumns {
                expected: self.header.len().saturating_sub(1),
                found: row.len(),
            });
        }
        let record = Self::with_id(id.to_owned(), row);
        match self.find(id) {
            Some(i) => self.rows[i] = record,
            None => self.rows.push(record),
        }
        Ok(())
    }

    /// Removes row `id`, returning it. Unknown ids are ignored.
    pub fn delete(&mut self, id: &str) -> Option<Vec<String>> {
        let i = self.find(id)?;
        Some(self.rows.remove(i))
    }

    /// Sets one column of row `id`. Returns `false` if the row or column does
    /// not exist.
    pub fn update_column(&mut self, id: &str, column: usize, value: impl Into<String>) -> bool {
        let Some(field) = self
            .find(id)
            .and_then(|i| self.rows[i].get_mut(column))
        else {
            return false;
        };
        *field = value.into();
        true
    }

    /// The row whose first field is `id`.
    #[must_use]
    pub fn select(&self, id: &str) -> Option<&[String]> {
        self.find(id).map(|i| self.rows[i].as_slice())
    }
}
