//! Position-tracked byte buffers.
//!
//! [`ByteWriter`] appends to a growable buffer and reports its position so
//! callers can remember offsets (the value offset of a record, the span of
//! an inlined sort key). [`ByteReader`] walks a borrowed slice forward.
//!
//! Multi-byte integers are big-endian so that byte order equals numeric
//! order for unsigned values.

use crate::error::{CoreError, CoreResult};

/// Escape byte: a 0x00 in the payload is written as 0x00 0x01.
const ESCAPE_BYTE: u8 = 0x01;
/// Terminator: escaped sequences end with 0x00 0x00.
const TERMINATOR: u8 = 0x00;

/// Append-only byte buffer with a write position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    /// Current write position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Copy of the buffer with every byte in `start..end` inverted.
    ///
    /// Inverting a self-delimiting, order-preserving sub-range reverses its
    /// sort order while leaving the surrounding bytes untouched.
    #[must_use]
    pub fn to_bytes_flipped(&self, start: usize, end: usize) -> Vec<u8> {
        let mut out = self.buf.clone();
        let end = end.min(out.len());
        if start < end {
            flip_bytes(&mut out[start..end]);
        }
        out
    }

    /// Invert every byte in `start..end` in place.
    pub fn flip_range(&mut self, start: usize, end: usize) {
        let end = end.min(self.buf.len());
        if start < end {
            flip_bytes(&mut self.buf[start..end]);
        }
    }

    /// Write a single byte.
    pub fn put_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Write raw bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a big-endian `u32`.
    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a big-endian `u64`.
    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a big-endian `i64`.
    pub fn put_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a `u32` length prefix followed by the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if the payload exceeds `u32::MAX` bytes.
    pub fn put_length_prefixed(&mut self, bytes: &[u8]) -> CoreResult<()> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| CoreError::Encoding("payload too long".to_owned()))?;
        self.put_u32(len);
        self.put_bytes(bytes);
        Ok(())
    }

    /// Write an unsigned integer as a length byte plus its significant
    /// big-endian bytes.
    ///
    /// The encoding is self-delimiting and preserves numeric order: a value
    /// with more significant bytes has a larger length byte.
    pub fn put_ordered_varint(&mut self, v: u64) {
        let bytes = v.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
        // len is in 1..=8
        self.buf.push((8 - skip) as u8);
        self.buf.extend_from_slice(&bytes[skip..]);
    }

    /// Write bytes with null-escape encoding.
    ///
    /// Each 0x00 becomes 0x00 0x01 and the sequence ends with 0x00 0x00, so
    /// the result is self-delimiting and sorts like the raw bytes.
    pub fn put_escaped(&mut self, data: &[u8]) {
        for &byte in data {
            if byte == 0x00 {
                self.buf.push(0x00);
                self.buf.push(ESCAPE_BYTE);
            } else {
                self.buf.push(byte);
            }
        }
        self.buf.push(TERMINATOR);
        self.buf.push(TERMINATOR);
    }
}

/// Forward-only reader over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Whether all bytes have been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Unread bytes.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    /// Skip `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if fewer than `n` bytes remain.
    pub fn advance(&mut self, n: usize) -> CoreResult<()> {
        self.get_bytes(n).map(|_| ())
    }

    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] at end of input.
    pub fn get_u8(&mut self) -> CoreResult<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| CoreError::Encoding("unexpected end of input".to_owned()))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read `n` raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if fewer than `n` bytes remain.
    pub fn get_bytes(&mut self, n: usize) -> CoreResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| CoreError::Encoding("unexpected end of input".to_owned()))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn get_array<const N: usize>(&mut self) -> CoreResult<[u8; N]> {
        self.get_bytes(N)?
            .try_into()
            .map_err(|_| CoreError::Encoding(format!("failed to read {N} bytes")))
    }

    /// Read a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] on truncated input.
    pub fn get_u32(&mut self) -> CoreResult<u32> {
        Ok(u32::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian `u64`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] on truncated input.
    pub fn get_u64(&mut self) -> CoreResult<u64> {
        Ok(u64::from_be_bytes(self.get_array()?))
    }

    /// Read a big-endian `i64`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] on truncated input.
    pub fn get_i64(&mut self) -> CoreResult<i64> {
        Ok(i64::from_be_bytes(self.get_array()?))
    }

    /// Read a `u32` length prefix and that many bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] on truncated input.
    pub fn get_length_prefixed(&mut self) -> CoreResult<&'a [u8]> {
        let len = self.get_u32()? as usize;
        self.get_bytes(len)
    }

    /// Read a value written by [`ByteWriter::put_ordered_varint`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] on a bad length byte or truncated input.
    pub fn get_ordered_varint(&mut self) -> CoreResult<u64> {
        let len = self.get_u8()? as usize;
        if !(1..=8).contains(&len) {
            return Err(CoreError::Encoding(format!("invalid varint length: {len}")));
        }
        let mut bytes = [0u8; 8];
        bytes[8 - len..].copy_from_slice(self.get_bytes(len)?);
        Ok(u64::from_be_bytes(bytes))
    }

    /// Read a null-escaped byte sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] on an invalid escape or missing terminator.
    pub fn get_escaped(&mut self) -> CoreResult<Vec<u8>> {
        let mut result = Vec::new();
        loop {
            let byte = self
                .get_u8()
                .map_err(|_| CoreError::Encoding("missing terminator in escaped bytes".into()))?;
            if byte != 0x00 {
                result.push(byte);
                continue;
            }
            match self.get_u8()? {
                TERMINATOR => return Ok(result),
                ESCAPE_BYTE => result.push(0x00),
                other => {
                    return Err(CoreError::Encoding(format!(
                        "invalid escape sequence: 0x00 0x{other:02x}"
                    )))
                }
            }
        }
    }

    /// Read a null-escaped UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] on malformed input or invalid UTF-8.
    pub fn get_escaped_string(&mut self) -> CoreResult<String> {
        String::from_utf8(self.get_escaped()?)
            .map_err(|e| CoreError::Encoding(format!("invalid UTF-8: {e}")))
    }
}

/// Invert every byte of `bytes` in place.
pub fn flip_bytes(bytes: &mut [u8]) {
    for b in bytes {
        *b = !*b;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_roundtrip() {
        let mut w = ByteWriter::new();
        w.put_u8(7);
        w.put_u32(0xDEAD_BEEF);
        w.put_u64(u64::MAX);
        w.put_i64(-5);
        let bytes = w.into_bytes();

        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.get_u8().unwrap(), 7);
        assert_eq!(r.get_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(r.get_u64().unwrap(), u64::MAX);
        assert_eq!(r.get_i64().unwrap(), -5);
        assert!(r.is_empty());
    }

    #[test]
    fn ordered_varint_roundtrip_and_order() {
        let values = [0u64, 1, 255, 256, 65_535, 1 << 40, u64::MAX];
        let mut encoded = Vec::new();
        for v in values {
            let mut w = ByteWriter::new();
            w.put_ordered_varint(v);
            let bytes = w.into_bytes();
            assert_eq!(ByteReader::new(&bytes).get_ordered_varint().unwrap(), v);
            encoded.push(bytes);
        }
        let mut sorted = encoded.clone();
        sorted.sort();
        assert_eq!(sorted, encoded);
    }

    #[test]
    fn escaped_roundtrip_with_nulls() {
        let mut w = ByteWriter::new();
        w.put_escaped(&[1, 0, 2, 0, 0]);
        w.put_u8(9);
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.get_escaped().unwrap(), vec![1, 0, 2, 0, 0]);
        assert_eq!(r.get_u8().unwrap(), 9);
    }

    #[test]
    fn escaped_missing_terminator() {
        let mut r = ByteReader::new(b"abc");
        assert!(r.get_escaped().is_err());
    }

    #[test]
    fn flipped_copy_only_touches_range() {
        let mut w = ByteWriter::new();
        w.put_bytes(&[0x01, 0x02, 0x03]);
        assert_eq!(w.to_bytes_flipped(1, 2), vec![0x01, 0xFD, 0x03]);
        assert_eq!(w.as_slice(), &[0x01, 0x02, 0x03]);
        w.flip_range(0, 10);
        assert_eq!(w.as_slice(), &[0xFE, 0xFD, 0xFC]);
    }

    #[test]
    fn truncated_reads_fail() {
        let mut r = ByteReader::new(&[0, 0]);
        assert!(r.get_u32().is_err());
        let mut r = ByteReader::new(&[9]);
        assert!(r.get_ordered_varint().is_err());
    }
}
