//! Item record grammar
//!
//! Every element is written as a nested box and elements are concatenated:
//!
//! ```text
//! [KEY LEN] [ATTR NAME] [VALUE LEN] [ATTR VALUE] ... [0x00 0x00]   (element 1)
//! [KEY LEN] [ATTR NAME] [VALUE LEN] [ATTR VALUE] ... [0x00 0x00]   (element 2)
//! ```

use bytes::Bytes;
use tracing::{debug, trace};

use super::{Fields, Schema, Value, decode_value, encode_value, scalar};
use crate::protocol::{
    ChunkReader, CodecConfig, Error, Result, TERMINATOR, UnknownKeys, put_chunk,
};

/// Encode one item ([`Value::Item`]) or a sequence of items ([`Value::List`])
///
/// Attributes are written in schema declaration order; fields the schema
/// does not declare are not written.
pub fn encode(schema: &Schema, value: &Value) -> Result<Bytes> {
    let elements: Vec<&Fields> = match value {
        Value::Item(fields) => vec![fields],
        Value::List(items) => items
            .iter()
            .map(|item| match item {
                Value::Item(fields) => Ok(fields),
                other => Err(Error::type_mismatch("item", other.kind())),
            })
            .collect::<Result<_>>()?,
        other => return Err(Error::type_mismatch("item", other.kind())),
    };

    let mut out = Vec::new();
    for fields in &elements {
        for attr in schema.attributes() {
            let Some(field) = fields.get(attr.name()) else {
                continue;
            };
            let encoded = encode_value(attr.ty(), attr.elements(), field)?;
            put_chunk(&mut out, attr.name().as_bytes())?;
            put_chunk(&mut out, &encoded)?;
        }
        out.extend_from_slice(&TERMINATOR);
    }

    trace!(item = schema.name(), elements = elements.len(), len = out.len(), "encoded items");
    Ok(Bytes::from(out))
}

/// Decode a sequence of items into a [`Value::List`] of [`Value::Item`]s
pub fn decode(schema: &Schema, bytes: Bytes, config: &CodecConfig) -> Result<Value> {
    let mut reader = ChunkReader::new(bytes);
    let mut items = Vec::new();

    while !reader.is_empty() {
        let mut fields = Fields::new();
        loop {
            let key_len = reader.read_len()?;
            if key_len == 0 {
                break;
            }
            let key = reader.read_bytes(key_len)?;
            let value_len = reader.read_len()?;
            let raw = reader.read_bytes(value_len)?;

            let name = scalar::decode_string(&key)?;
            match schema.attribute(&name) {
                Some(attr) => {
                    let value = decode_value(attr.ty(), attr.elements(), raw, config)?;
                    fields.push(name, value);
                }
                None if config.unknown_item_keys == UnknownKeys::Reject => {
                    return Err(Error::Malformed(format!(
                        "item {} has no attribute {name:?}",
                        schema.name()
                    )));
                }
                None => {
                    debug!(item = schema.name(), key = %name, "dropping undeclared item key");
                }
            }
        }
        items.push(Value::Item(fields));
    }

    trace!(item = schema.name(), elements = items.len(), "decoded items");
    Ok(Value::List(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::{AmpType, Attribute};

    fn schema() -> Schema {
        Schema::new(
            "Item",
            vec![
                Attribute::new("a", AmpType::Integer),
                Attribute::new("b", AmpType::String),
            ],
        )
    }

    fn item(a: i64, b: &str) -> Value {
        Value::Item(
            [("a", Value::Integer(a)), ("b", Value::String(b.to_string()))]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn test_encode_two_items() {
        let encoded = encode(&schema(), &Value::List(vec![item(1, "x"), item(2, "yy")])).unwrap();
        let expected: &[u8] = &[
            0x00, 0x01, b'a', 0x00, 0x01, b'1', //
            0x00, 0x01, b'b', 0x00, 0x01, b'x', //
            0x00, 0x00, //
            0x00, 0x01, b'a', 0x00, 0x01, b'2', //
            0x00, 0x01, b'b', 0x00, 0x02, b'y', b'y', //
            0x00, 0x00,
        ];
        assert_eq!(encoded.as_ref(), expected);
    }

    #[test]
    fn test_items_roundtrip() {
        let value = Value::List(vec![item(1, "x"), item(2, "yy")]);
        let encoded = encode(&schema(), &value).unwrap();
        assert_eq!(decode(&schema(), encoded, &CodecConfig::default()).unwrap(), value);
    }

    #[test]
    fn test_empty_sequence() {
        let encoded = encode(&schema(), &Value::List(Vec::new())).unwrap();
        assert!(encoded.is_empty());
        assert_eq!(
            decode(&schema(), encoded, &CodecConfig::default()).unwrap(),
            Value::List(Vec::new())
        );
    }

    #[test]
    fn test_absent_attributes_are_skipped() {
        let partial = Value::Item([("b", Value::String("only".to_string()))].into_iter().collect());
        let encoded = encode(&schema(), &partial).unwrap();
        let decoded = decode(&schema(), encoded, &CodecConfig::default()).unwrap();
        assert_eq!(decoded, Value::List(vec![partial]));
    }

    #[test]
    fn test_unknown_keys() {
        let bytes = Bytes::from_static(&[
            0x00, 0x01, b'z', 0x00, 0x01, b'9', //
            0x00, 0x01, b'a', 0x00, 0x01, b'5', //
            0x00, 0x00,
        ]);

        let lenient = decode(&schema(), bytes.clone(), &CodecConfig::default()).unwrap();
        assert_eq!(
            lenient,
            Value::List(vec![Value::Item(
                [("a", Value::Integer(5))].into_iter().collect()
            )])
        );

        let strict = CodecConfig::default().with_unknown_item_keys(UnknownKeys::Reject);
        assert!(matches!(
            decode(&schema(), bytes, &strict),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_unterminated_item_is_truncated() {
        let bytes = Bytes::from_static(&[0x00, 0x01, b'a', 0x00, 0x01, b'5']);
        assert!(matches!(
            decode(&schema(), bytes, &CodecConfig::default()),
            Err(Error::Truncated { .. })
        ));
    }
}
