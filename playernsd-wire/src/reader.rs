// Copyright © 2024 Nathaniel Hardesty
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the “Software”), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

//! ## LINE READER
//!
//! Wraps a byte stream in a [`BufReader`] and exposes two read primitives:
//! a delimited line read for header lines, and an exact-length read for
//! the raw payload that follows a `msgbin` header. Because both draw from
//! the same [`BufReader`], any payload bytes the line read over-buffered
//! past the header's `\n` are still there for the following exact read —
//! handled here by construction rather than by any special-casing at the
//! call site.

use std::io::{BufRead, BufReader, Read};

use crate::error::WireError;

/// Maximum header line length accepted before giving up and treating the
/// stream as unrecoverable. Generous relative to anything the protocol
/// legitimately sends (the longest header is a `listclients` ACK, bounded
/// by the number of connected clients times `ID_WIDTH`).
const MAX_LINE_BYTES: usize = 1 << 20;

pub struct LineReader<R> {
    inner: BufReader<R>,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
        }
    }

    /// Reads one `\n`-terminated line, stripping the trailing `\n` (and a
    /// preceding `\r`, tolerated but not required by this protocol). Returns
    /// `Ok(None)` on a clean EOF with no partial line pending.
    pub fn read_line(&mut self) -> Result<Option<String>, WireError> {
        let mut buf = Vec::new();
        let read = self.inner.read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        if buf.len() > MAX_LINE_BYTES {
            return Err(WireError::MissingTokens("line exceeded maximum length"));
        }
        let line = String::from_utf8(buf).map_err(|_| WireError::MalformedMsgBinHeader("line is not valid utf-8"))?;
        Ok(Some(line))
    }

    /// Reads exactly `len` raw bytes, consuming any bytes the previous
    /// `read_line` call had already buffered before pulling more from the
    /// underlying stream.
    pub fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, WireError> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_line_then_exact_payload_spanning_prebuffered_bytes() {
        let mut data = b"msgbin bot2 5\n".to_vec();
        data.extend_from_slice(b"\x00A\n\n\xff");
        data.extend_from_slice(b"ping\n");
        let mut reader = LineReader::new(Cursor::new(data));

        let header = reader.read_line().unwrap().unwrap();
        assert_eq!(header, "msgbin bot2 5");

        let payload = reader.read_exact(5).unwrap();
        assert_eq!(payload, b"\x00A\n\n\xff");

        let next = reader.read_line().unwrap().unwrap();
        assert_eq!(next, "ping");
    }

    #[test]
    fn clean_eof_yields_none() {
        let mut reader = LineReader::new(Cursor::new(Vec::new()));
        assert!(reader.read_line().unwrap().is_none());
    }

    #[test]
    fn strips_trailing_carriage_return() {
        let mut reader = LineReader::new(Cursor::new(b"ping\r\n".to_vec()));
        assert_eq!(reader.read_line().unwrap().unwrap(), "ping");
    }
}
