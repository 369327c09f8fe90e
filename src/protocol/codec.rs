//! AMP wire codec (encode/decode)
//!
//! A box is written as length-prefixed key and value chunks followed by a
//! zero key length.

use bytes::{BufMut, Bytes};
use tracing::{debug, trace};

use super::{AmpBox, CodecConfig, Error, LENGTH_PREFIX_SIZE, MAX_VALUE_LENGTH, Result, TERMINATOR};

/// Encode a box to bytes
///
/// # Format
///
/// ```text
/// [KEY LEN (u16 BE)] [KEY] [VALUE LEN (u16 BE)] [VALUE] ... [0x00 0x00]
/// ```
///
/// # Errors
///
/// Returns [`Error::Overflow`] if a key or value is longer than 65535 bytes,
/// or [`Error::Malformed`] if a key is empty. Nothing is returned on failure.
pub fn encode(ampbox: &AmpBox) -> Result<Vec<u8>> {
    let total_size = ampbox
        .entries()
        .map(|pair| 2 * LENGTH_PREFIX_SIZE + pair.key().len() + pair.value().len())
        .sum::<usize>()
        + TERMINATOR.len();
    let mut bytes = Vec::with_capacity(total_size);

    for pair in ampbox {
        if pair.key().is_empty() {
            return Err(Error::Malformed(
                "empty key would terminate the box".to_string(),
            ));
        }
        put_chunk(&mut bytes, pair.key())?;
        put_chunk(&mut bytes, pair.value())?;
    }
    bytes.put_slice(&TERMINATOR);

    trace!(pairs = ampbox.len(), len = bytes.len(), "encoded AMP box");
    Ok(bytes)
}

/// Decode a buffer holding exactly one box
///
/// # Errors
///
/// Returns an error if:
/// - The input ends inside a length prefix, key or value
/// - Bytes follow the terminator
pub fn decode(bytes: Bytes) -> Result<AmpBox> {
    decode_with(bytes, &CodecConfig::default())
}

/// Decode a buffer holding exactly one box under `config`
pub fn decode_with(bytes: Bytes, config: &CodecConfig) -> Result<AmpBox> {
    let total = bytes.len();
    let (ampbox, consumed) = decode_prefix_with(&bytes, config)?;
    if consumed != total {
        debug!(consumed, total, "trailing bytes after AMP box terminator");
        return Err(Error::Malformed(format!(
            "{} bytes after the box terminator at offset {}",
            total - consumed,
            consumed - TERMINATOR.len()
        )));
    }
    Ok(ampbox)
}

/// Decode the first box of a buffer, returning it with the number of bytes
/// it occupied (terminator included)
pub fn decode_prefix(bytes: &Bytes) -> Result<(AmpBox, usize)> {
    decode_prefix_with(bytes, &CodecConfig::default())
}

/// [`decode_prefix`] under `config`
pub fn decode_prefix_with(bytes: &Bytes, config: &CodecConfig) -> Result<(AmpBox, usize)> {
    let mut reader = ChunkReader::new(bytes.clone());
    let mut ampbox = AmpBox::new();

    loop {
        let key_len = reader.read_len()?;
        if key_len == 0 {
            break;
        }
        if config.max_pairs.is_some_and(|max| ampbox.len() >= max) {
            debug!(max_pairs = ?config.max_pairs, "AMP box pair limit exceeded");
            return Err(Error::Malformed(format!(
                "more than {} pairs in one box",
                ampbox.len()
            )));
        }
        let key = reader.read_bytes(key_len)?;
        let value_len = reader.read_len()?;
        let value = reader.read_bytes(value_len)?;
        ampbox.put(key, value);
    }

    trace!(pairs = ampbox.len(), consumed = reader.position(), "decoded AMP box");
    Ok((ampbox, reader.position()))
}

/// Append `chunk` with its big-endian u16 length prefix
pub(crate) fn put_chunk(out: &mut Vec<u8>, chunk: &[u8]) -> Result<()> {
    let len = u16::try_from(chunk.len()).map_err(|_| Error::Overflow {
        len: chunk.len(),
        max: MAX_VALUE_LENGTH,
    })?;
    out.put_u16(len);
    out.put_slice(chunk);
    Ok(())
}

/// Cursor over length-prefixed chunks
pub(crate) struct ChunkReader {
    bytes: Bytes,
    pos: usize,
}

impl ChunkReader {
    pub(crate) const fn new(bytes: Bytes) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub(crate) fn read_len(&mut self) -> Result<u16> {
        let raw = self.take(LENGTH_PREFIX_SIZE)?;
        Ok(u16::from_be_bytes([raw[0], raw[1]]))
    }

    pub(crate) fn read_bytes(&mut self, len: u16) -> Result<Bytes> {
        self.take(usize::from(len))
    }

    fn take(&mut self, len: usize) -> Result<Bytes> {
        if self.remaining() < len {
            return Err(Error::Truncated {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let chunk = self.bytes.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(chunk)
    }
}
