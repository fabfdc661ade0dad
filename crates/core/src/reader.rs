//! Input reader for print cache exports
//!
//! The export is SQL Server Management Studio's "Save as CSV" output: no header
//! row, fields that may contain commas wrapped in double quotes, and embedded
//! quotes doubled. Pages can be large, so no field size limit is applied.
//!
//! Every physical line outside a quoted field is one row. The `csv` crate drops
//! blank lines, so the reader follows its line counter and reports each blank
//! line it skipped as an empty row.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Byte source for the CSV parser
///
/// Drops a leading UTF-8 byte-order mark and remembers how the input ended,
/// which the reader needs to tell whether the final row had a line terminator.
struct Source<R> {
    inner: R,
    /// Bytes read while checking for a BOM, served before `inner`
    head: Vec<u8>,
    last: Option<u8>,
    eof: bool,
}

impl<R: Read> Source<R> {
    fn new(mut inner: R) -> io::Result<Self> {
        let mut head = Vec::with_capacity(UTF8_BOM.len());
        inner
            .by_ref()
            .take(UTF8_BOM.len() as u64)
            .read_to_end(&mut head)?;
        if head == UTF8_BOM {
            head.clear();
        }

        Ok(Self {
            inner,
            head,
            last: None,
            eof: false,
        })
    }

    /// Whether the row just parsed ended with a newline
    ///
    /// The parser only reaches end of input while a row is still open when
    /// that row has no terminator.
    fn row_terminated(&self) -> bool {
        !self.eof || self.last == Some(b'\n')
    }
}

impl<R: Read> Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = if self.head.is_empty() {
            self.inner.read(buf)?
        } else {
            let n = self.head.len().min(buf.len());
            buf[..n].copy_from_slice(&self.head[..n]);
            self.head.drain(..n);
            n
        };

        match buf[..n].last() {
            Some(&b) => self.last = Some(b),
            None if !buf.is_empty() => self.eof = true,
            None => {}
        }
        Ok(n)
    }
}

/// Lazy iterator over the raw rows of an export
///
/// Each item is either the row's fields or a per-row error. Blank lines come
/// out as [`Error::InvalidRecord`] so they are counted like any other bad row.
/// An I/O failure is reported as [`Error::Io`] and ends iteration.
pub struct RecordReader<R: Read> {
    csv: csv::Reader<Source<R>>,
    /// First line not yet accounted for
    next_line: u64,
    pending: VecDeque<Result<Vec<String>>>,
    done: bool,
}

impl RecordReader<File> {
    /// Open an export file
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), "Opened input file");
        Self::from_reader(file)
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap an already-open reader, skipping a leading UTF-8 byte-order mark
    pub fn from_reader(reader: R) -> Result<Self> {
        // Only `\n` ends a row, so every row's terminator is consumed with the
        // row and the parser's line counter lines up with row boundaries. The
        // `\r` of a CRLF ending is trimmed from the last field instead.
        let csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_reader(Source::new(reader)?);

        Ok(Self {
            csv,
            next_line: 1,
            pending: VecDeque::new(),
            done: false,
        })
    }

    fn read_row(&mut self) {
        let mut record = csv::ByteRecord::new();
        match self.csv.read_byte_record(&mut record) {
            Ok(true) => {
                let end = self.csv.position().line();
                let embedded = record.as_slice().iter().filter(|&&b| b == b'\n').count() as u64;
                let terminator = u64::from(self.csv.get_ref().row_terminated());
                let start = end.saturating_sub(embedded + terminator);

                self.queue_blank_lines(start);
                self.pending.push_back(decode(record, start));
                self.next_line = end.max(self.next_line);
            }
            Ok(false) => {
                // Blank lines after the last row
                self.queue_blank_lines(self.csv.position().line());
                self.done = true;
            }
            Err(e) if e.is_io_error() => {
                self.done = true;
                self.pending.push_back(Err(Error::Io(io::Error::other(e))));
            }
            Err(e) => self.pending.push_back(Err(Error::Csv(e))),
        }
    }

    fn queue_blank_lines(&mut self, until: u64) {
        for line in self.next_line..until {
            tracing::debug!(line, "Blank line in input");
            self.pending.push_back(Err(empty_row(line)));
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.pop_front() {
                return Some(row);
            }
            if self.done {
                return None;
            }
            self.read_row();
        }
    }
}

fn empty_row(line: u64) -> Error {
    Error::InvalidRecord(format!("empty row at line {line}"))
}

fn decode(record: csv::ByteRecord, line: u64) -> Result<Vec<String>> {
    let record = csv::StringRecord::from_byte_record(record)
        .map_err(|e| Error::InvalidRecord(format!("line {line}: {e}")))?;

    let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
    if let Some(last) = fields.last_mut()
        && last.ends_with('\r')
    {
        last.pop();
    }

    // A blank CRLF line parses as a single empty field
    if fields.len() == 1 && fields[0].is_empty() {
        return Err(empty_row(line));
    }
    Ok(fields)
}
