use crate::error::{Error, MalformedKind, Result};

/// Cursor over a borrowed game record. Every read that runs past the end
/// reports a truncated record at the current offset.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// A malformed-record error at the current offset.
    pub fn malformed(&self, kind: MalformedKind) -> Error {
        Error::Malformed { offset: self.pos, kind }
    }

    pub fn get_byte(&mut self) -> Result<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.malformed(MalformedKind::Truncated))
    }

    pub fn get_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.malformed(MalformedKind::Truncated));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.get_bytes(len).map(|_| ())
    }

    /// Big-endian 24-bit value.
    pub fn get_u24(&mut self) -> Result<u32> {
        let b = self.get_bytes(3)?;
        Ok(((b[0] as u32) << 16) | ((b[1] as u32) << 8) | b[2] as u32)
    }

    /// LEB128 unsigned length.
    pub fn get_varint(&mut self) -> Result<usize> {
        let start = self.pos;
        let mut value: usize = 0;
        let mut shift = 0;
        loop {
            let byte = self.get_byte()?;
            if shift >= usize::BITS {
                return Err(Error::Malformed { offset: start, kind: MalformedKind::Truncated });
            }
            value |= ((byte & 0x7F) as usize) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// `len` bytes of UTF-8 text.
    pub fn get_text(&mut self, len: usize) -> Result<String> {
        let start = self.pos;
        let bytes = self.get_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::Malformed { offset: start, kind: MalformedKind::BadUtf8 })
    }

    /// NUL-terminated UTF-8 text.
    pub fn get_cstring(&mut self) -> Result<String> {
        let len = self.data[self.pos..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::Malformed { offset: self.data.len(), kind: MalformedKind::Truncated })?;
        let text = self.get_text(len)?;
        self.pos += 1;
        Ok(text)
    }
}

/// Growable output buffer for an encoded game record.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_byte(&mut self, byte: u8) {
        self.data.push(byte);
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn put_u24(&mut self, value: u32) {
        self.put_bytes(&[(value >> 16) as u8, (value >> 8) as u8, value as u8]);
    }

    pub fn put_varint(&mut self, mut value: usize) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.put_byte(byte);
                return;
            }
            self.put_byte(byte | 0x80);
        }
    }

    pub fn put_cstring(&mut self, text: &str) {
        self.put_bytes(text.as_bytes());
        self.put_byte(0);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
