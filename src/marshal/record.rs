//! Binding between boxes and user records
//!
//! A record lists its attributes through [`AmpRecord::schema`]; the
//! [`amp_record!`](crate::amp_record) macro writes that registration for a
//! plain struct. Attribute names are the wire keys (UTF-8).

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use super::{AmpType, AmpValue, Fields, Schema, Value, decode_value, encode_value};
use crate::protocol::{AmpBox, CodecConfig, Error, Result};

/// A record whose attributes can be marshalled into and out of a box
pub trait AmpRecord {
    /// Attributes in declaration order
    fn schema() -> Arc<Schema>;

    /// Current attribute values; absent (`None`) attributes are left out
    fn to_fields(&self) -> Fields;

    /// Assign every field present in `fields`. Either all assignments
    /// happen or none do.
    fn apply_fields(&mut self, fields: Fields) -> Result<()>;
}

/// Build a record from a decoded item value
///
/// Accepts a single [`Value::Item`] or a one-element [`Value::List`] of items.
#[doc(hidden)]
pub fn record_from_value<R: AmpRecord + Default>(value: Value) -> Result<R> {
    match value {
        Value::Item(fields) => {
            let mut record = R::default();
            record.apply_fields(fields)?;
            Ok(record)
        }
        Value::List(mut items) if items.len() == 1 => match items.pop() {
            Some(item) => record_from_value(item),
            None => Err(Error::type_mismatch("item", "empty list")),
        },
        Value::List(items) => Err(Error::type_mismatch(
            "item",
            format!("list of {} items", items.len()),
        )),
        other => Err(Error::type_mismatch("item", other.kind())),
    }
}

/// Declare a struct whose public attributes are marshalled by name
///
/// The struct must implement [`Default`], which supplies attributes absent
/// from a decoded box. The generated type is also usable as an item record
/// attribute (`Vec<Item>`) inside other records, itself included.
///
/// Raw byte attributes are [`bytes::Bytes`]; `Vec<u8>` is not an attribute
/// type, since a `Vec` always means an AMP list.
///
/// ```
/// use amp::{AmpBox, amp_record};
///
/// amp_record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Sum {
///         pub a: i32,
///         pub b: i32,
///     }
/// }
///
/// let mut ampbox = AmpBox::new();
/// ampbox.fill_from(&Sum { a: 13, b: 81 })?;
/// assert_eq!(ampbox.get("a").unwrap().as_ref(), b"13");
///
/// let decoded: Sum = ampbox.extract()?;
/// assert_eq!(decoded, Sum { a: 13, b: 81 });
/// # Ok::<(), amp::Error>(())
/// ```
#[macro_export]
macro_rules! amp_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::AmpRecord for $name {
            fn schema() -> ::std::sync::Arc<$crate::Schema> {
                static SCHEMA: ::std::sync::OnceLock<::std::sync::Arc<$crate::Schema>> =
                    ::std::sync::OnceLock::new();
                ::std::sync::Arc::clone(SCHEMA.get_or_init(|| {
                    ::std::sync::Arc::new($crate::Schema::new(
                        stringify!($name),
                        vec![$($crate::Attribute::of::<$ty>(stringify!($field))),*],
                    ))
                }))
            }

            fn to_fields(&self) -> $crate::Fields {
                let mut fields = $crate::Fields::new();
                $(
                    if let Some(value) = $crate::AmpValue::to_value(&self.$field) {
                        fields.push(stringify!($field), value);
                    }
                )*
                fields
            }

            fn apply_fields(&mut self, mut fields: $crate::Fields) -> $crate::Result<()> {
                $(
                    let $field = match fields.take(stringify!($field)) {
                        Some(value) => Some(<$ty as $crate::AmpValue>::from_value(value)?),
                        None => None,
                    };
                )*
                $(
                    if let Some(value) = $field {
                        self.$field = value;
                    }
                )*
                Ok(())
            }
        }

        impl $crate::AmpValue for $name {
            fn amp_type() -> $crate::AmpType {
                $crate::AmpType::Item($crate::SchemaRef::lazy(
                    <Self as $crate::AmpRecord>::schema,
                ))
            }

            fn to_value(&self) -> Option<$crate::Value> {
                Some($crate::Value::Item(<Self as $crate::AmpRecord>::to_fields(self)))
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                $crate::record_from_value(value)
            }
        }
    };
}

impl AmpBox {
    /// Append one pair per present attribute of `record`, in declaration
    /// order. On error the box is left unchanged.
    pub fn fill_from<R: AmpRecord>(&mut self, record: &R) -> Result<()> {
        let schema = R::schema();
        let fields = record.to_fields();

        let mut staged = Vec::with_capacity(fields.len());
        for attr in schema.attributes() {
            let Some(value) = fields.get(attr.name()) else {
                continue;
            };
            let encoded = encode_value(attr.ty(), attr.elements(), value)?;
            staged.push((Bytes::copy_from_slice(attr.name().as_bytes()), encoded));
        }

        trace!(record = schema.name(), pairs = staged.len(), "filled box from record");
        self.extend(staged);
        Ok(())
    }

    /// Assign every attribute of `record` found in the box. Attributes
    /// missing from the box keep their current value. On error the record
    /// is left unchanged.
    pub fn fill_into<R: AmpRecord>(&self, record: &mut R) -> Result<()> {
        self.fill_into_with(record, &CodecConfig::default())
    }

    /// [`fill_into`](Self::fill_into) under `config`
    pub fn fill_into_with<R: AmpRecord>(&self, record: &mut R, config: &CodecConfig) -> Result<()> {
        let schema = R::schema();
        let mut fields = Fields::new();

        for attr in schema.attributes() {
            let Some(raw) = self.get(attr.name().as_bytes()) else {
                debug!(record = schema.name(), attribute = attr.name(), "attribute absent from box");
                continue;
            };
            let value = decode_value(attr.ty(), attr.elements(), raw.clone(), config)?;
            fields.push(attr.name(), value);
        }

        trace!(record = schema.name(), fields = fields.len(), "filling record from box");
        record.apply_fields(fields)
    }

    /// Decode a fresh record, starting from its default
    pub fn extract<R: AmpRecord + Default>(&self) -> Result<R> {
        let mut record = R::default();
        self.fill_into(&mut record)?;
        Ok(record)
    }

    /// Box holding the attributes of `record`
    pub fn from_record<R: AmpRecord>(record: &R) -> Result<Self> {
        let mut ampbox = Self::new();
        ampbox.fill_from(record)?;
        Ok(ampbox)
    }

    /// Encode `value` under an explicit declared type and append it
    pub fn put_value(
        &mut self,
        key: &str,
        ty: &AmpType,
        path: &[AmpType],
        value: &Value,
    ) -> Result<()> {
        let encoded = encode_value(ty, path, value)?;
        self.put(Bytes::copy_from_slice(key.as_bytes()), encoded);
        Ok(())
    }

    /// Encode any [`AmpValue`] and append it; `None` appends nothing
    pub fn put_typed<T: AmpValue>(&mut self, key: &str, value: &T) -> Result<()> {
        match value.to_value() {
            Some(value) => self.put_value(key, &T::amp_type(), &T::element_path(), &value),
            None => Ok(()),
        }
    }

    /// Decode the first value stored under `key` with an explicit declared type
    pub fn get_value(
        &self,
        key: &str,
        ty: &AmpType,
        path: &[AmpType],
        config: &CodecConfig,
    ) -> Result<Option<Value>> {
        self.get(key.as_bytes())
            .map(|raw| decode_value(ty, path, raw.clone(), config))
            .transpose()
    }

    /// Decode the first value stored under `key` as any [`AmpValue`]
    pub fn get_typed<T: AmpValue>(&self, key: &str) -> Result<Option<T>> {
        self.get_value(
            key,
            &T::amp_type(),
            &T::element_path(),
            &CodecConfig::default(),
        )?
        .map(T::from_value)
        .transpose()
    }
}
