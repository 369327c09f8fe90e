//! List grammar
//!
//! ```text
//! [LEN (u16 BE)] [ELEMENT] ... [0x00 0x00]
//! ```
//!
//! Each element is encoded under the tail of the type path. A list whose
//! element type is an item record is framed by the item grammar instead.

use bytes::Bytes;
use tracing::{debug, trace};

use super::{AmpType, Value, decode_value, encode_value, item};
use crate::protocol::{ChunkReader, CodecConfig, Error, Result, TERMINATOR, put_chunk};

/// Encode list elements under `path`
pub fn encode(path: &[AmpType], value: &Value) -> Result<Bytes> {
    let (head, tail) = path
        .split_first()
        .ok_or_else(|| Error::Missing("encode".to_string()))?;

    if let (AmpType::Item(schema), []) = (head, tail) {
        return item::encode(&schema.resolve(), value);
    }

    let Value::List(elements) = value else {
        return Err(Error::type_mismatch("list", value.kind()));
    };

    let mut out = Vec::new();
    for element in elements {
        let chunk = encode_value(head, tail, element)?;
        put_chunk(&mut out, &chunk)?;
    }
    out.extend_from_slice(&TERMINATOR);

    trace!(elements = elements.len(), len = out.len(), "encoded list");
    Ok(Bytes::from(out))
}

/// Decode list elements under `path`
///
/// A zero length ends the list only as the final two bytes; elsewhere it is
/// an empty element. A list without a terminator also decodes.
pub fn decode(path: &[AmpType], bytes: Bytes, config: &CodecConfig) -> Result<Value> {
    let (head, tail) = path
        .split_first()
        .ok_or_else(|| Error::Missing("decode".to_string()))?;

    if let (AmpType::Item(schema), []) = (head, tail) {
        return item::decode(&schema.resolve(), bytes, config);
    }

    let mut reader = ChunkReader::new(bytes);
    let mut elements = Vec::new();
    while !reader.is_empty() {
        let len = reader.read_len()?;
        if len == 0 && reader.is_empty() {
            break;
        }
        let chunk = reader.read_bytes(len)?;
        let index = elements.len();
        let element = decode_value(head, tail, chunk, config).inspect_err(|err| {
            debug!(index, error = %err, "list element rejected");
        })?;
        elements.push(element);
    }

    trace!(elements = elements.len(), "decoded list");
    Ok(Value::List(elements))
}
