//! Forward-only cursor over plumbing output bytes.

use std::borrow::Cow;

/// Reads delimited and fixed-width spans out of a byte buffer.
///
/// Every `take_*` call either consumes the span (and its delimiter) or
/// leaves the position untouched, so callers can report the offset of the
/// record that failed.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Skip a run of `byte`, returning how many bytes were skipped.
    pub fn skip_run(&mut self, byte: u8) -> usize {
        let skipped = self.remaining().iter().take_while(|b| **b == byte).count();
        self.pos += skipped;
        skipped
    }

    /// Absolute offset of the next `delimiter`, if any.
    pub fn find(&self, delimiter: u8) -> Option<usize> {
        self.remaining()
            .iter()
            .position(|b| *b == delimiter)
            .map(|idx| self.pos + idx)
    }

    /// Take the span up to `delimiter` and consume the delimiter.
    pub fn take_until(&mut self, delimiter: u8) -> Option<&'a [u8]> {
        let end = self.find(delimiter)?;
        let span = &self.data[self.pos..end];
        self.pos = end + 1;
        Some(span)
    }

    /// Take exactly `len` bytes.
    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        if end > self.data.len() {
            return None;
        }
        let span = &self.data[self.pos..end];
        self.pos = end;
        Some(span)
    }

    /// Take everything that is left.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let span = self.remaining();
        self.pos = self.data.len();
        span
    }
}

/// Parse an unsigned decimal integer. Empty spans, signs and overflow are rejected.
pub fn parse_decimal(span: &[u8]) -> Option<u64> {
    if span.is_empty() {
        return None;
    }
    span.iter().try_fold(0u64, |acc, b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
    })
}

/// Parse a decimal integer with an optional leading `+` or `-`.
pub fn parse_signed_decimal(span: &[u8]) -> Option<i64> {
    match span.split_first() {
        Some((b'-', rest)) => parse_decimal(rest)
            .and_then(|v| i64::try_from(v).ok())
            .map(|v| -v),
        Some((b'+', rest)) => parse_decimal(rest).and_then(|v| i64::try_from(v).ok()),
        _ => parse_decimal(span).and_then(|v| i64::try_from(v).ok()),
    }
}

/// Decode a span as UTF-8, replacing invalid sequences.
pub fn decode_lossy(span: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(span)
}
