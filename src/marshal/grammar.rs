//! Dispatch from a declared type to its grammar

use bytes::Bytes;

use super::{AmpType, Value, item, list, scalar};
use crate::protocol::{CodecConfig, Result};

/// Encode `value` under `ty`, with `path` giving list element types
pub fn encode_value(ty: &AmpType, path: &[AmpType], value: &Value) -> Result<Bytes> {
    match ty {
        AmpType::List => list::encode(path, value),
        AmpType::Item(schema) => item::encode(&schema.resolve(), value),
        scalar_type => scalar::encode(scalar_type, value),
    }
}

/// Decode `bytes` under `ty`, with `path` giving list element types
///
/// Item types always decode to a [`Value::List`] of [`Value::Item`]s.
pub fn decode_value(
    ty: &AmpType,
    path: &[AmpType],
    bytes: Bytes,
    config: &CodecConfig,
) -> Result<Value> {
    match ty {
        AmpType::List => list::decode(path, bytes, config),
        AmpType::Item(schema) => item::decode(&schema.resolve(), bytes, config),
        scalar_type => scalar::decode(scalar_type, bytes, config),
    }
}
