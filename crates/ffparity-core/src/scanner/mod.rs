//! Forward line scanning over a seekable report stream.
//!
//! Both reports are only ever read forward. The two exceptions are explicit
//! bookmark restores: a failed [`LineCursor::find`] rewinds to where the
//! search began, and [`LineCursor::line_at`] re-reads an earlier row for a
//! diagnostic without disturbing the current position.
//!
//! A cursor can be fenced to one molecule block with [`LineCursor::set_limit`]:
//! lines starting at or past the limit read as end of stream.

use std::io::{self, BufRead, Seek, SeekFrom};

/// Marker for the dashed rule that sits between a section header and its rows.
pub const SEPARATOR_MARKER: &str = "----------------";

#[derive(Debug)]
pub struct LineCursor<R> {
    reader: R,
    buffer: String,
    limit: Option<u64>,
}

impl<R: BufRead + Seek> LineCursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            limit: None,
        }
    }

    pub fn set_limit(&mut self, limit: Option<u64>) {
        self.limit = limit;
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.reader.stream_position()
    }

    pub fn seek(&mut self, position: u64) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(position)).map(|_| ())
    }

    /// Reads one line, without its trailing line terminator.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        if let Some(limit) = self.limit {
            if self.position()? >= limit {
                return Ok(None);
            }
        }
        self.buffer.clear();
        if self.reader.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        let line = self.buffer.trim_end_matches(['\n', '\r']);
        Ok(Some(line.to_string()))
    }

    /// Advances past the next line containing `marker` and returns it.
    ///
    /// When the stream ends first, the cursor is restored to where the search
    /// started and `None` is returned.
    pub fn find(&mut self, marker: &str) -> io::Result<Option<String>> {
        let start = self.position()?;
        while let Some(line) = self.next_line()? {
            if line.contains(marker) {
                return Ok(Some(line));
            }
        }
        self.seek(start)?;
        Ok(None)
    }

    pub fn skip_past(&mut self, marker: &str) -> io::Result<bool> {
        Ok(self.find(marker)?.is_some())
    }

    /// Stream position where the next line containing `marker` starts. The
    /// cursor does not move.
    pub fn locate(&mut self, marker: &str) -> io::Result<Option<u64>> {
        let start = self.position()?;
        let mut found = None;
        loop {
            let line_start = self.position()?;
            match self.next_line()? {
                Some(line) if line.contains(marker) => {
                    found = Some(line_start);
                    break;
                }
                Some(_) => {}
                None => break,
            }
        }
        self.seek(start)?;
        Ok(found)
    }

    /// Returns line `offset` (zero-based) counted from `start`, leaving the
    /// cursor where it was.
    pub fn line_at(&mut self, start: u64, offset: usize) -> io::Result<Option<String>> {
        let current = self.position()?;
        self.seek(start)?;
        let mut line = None;
        for _ in 0..=offset {
            line = self.next_line()?;
            if line.is_none() {
                break;
            }
        }
        self.seek(current)?;
        Ok(line)
    }
}
