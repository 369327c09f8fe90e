//! Mapping between Rust types and declared AMP types

use bigdecimal::BigDecimal;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, FixedOffset};

use super::{AmpType, TypePath, Value};
use crate::protocol::{Error, Result};

/// A Rust type usable as a record attribute
pub trait AmpValue: Sized {
    /// Declared type
    fn amp_type() -> AmpType;

    /// Element type path; non-empty only for lists
    fn element_path() -> TypePath {
        TypePath::new()
    }

    /// Dynamic value to encode, or `None` to leave the attribute out
    fn to_value(&self) -> Option<Value>;

    /// Convert a decoded value back
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! impl_integer_value {
    ($($t:ty),*) => {
        $(
            impl AmpValue for $t {
                fn amp_type() -> AmpType {
                    AmpType::Integer
                }

                fn to_value(&self) -> Option<Value> {
                    Some(Value::Integer(i64::from(*self)))
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Integer(i) => <$t>::try_from(i)
                            .map_err(|_| Error::type_mismatch(stringify!($t), i.to_string())),
                        other => Err(Error::type_mismatch(stringify!($t), other.kind())),
                    }
                }
            }
        )*
    };
}

// `u8` is left out so that `Vec<u8>` is not silently read as a list of
// integers; raw bytes are `bytes::Bytes`.
impl_integer_value!(i8, i16, i32, i64, u16, u32);

macro_rules! impl_scalar_value {
    ($t:ty, $amp:ident, $variant:ident) => {
        impl AmpValue for $t {
            fn amp_type() -> AmpType {
                AmpType::$amp
            }

            fn to_value(&self) -> Option<Value> {
                Some(Value::$variant(self.clone()))
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(Error::type_mismatch(AmpType::$amp.name(), other.kind())),
                }
            }
        }
    };
}

impl_scalar_value!(String, String, String);
impl_scalar_value!(bool, Boolean, Boolean);
impl_scalar_value!(f64, Float, Float);
impl_scalar_value!(BigDecimal, Decimal, Decimal);
impl_scalar_value!(DateTime<FixedOffset>, DateTime, DateTime);

impl AmpValue for f32 {
    fn amp_type() -> AmpType {
        AmpType::Float
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Float(f64::from(*self)))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl AmpValue for Bytes {
    fn amp_type() -> AmpType {
        AmpType::Bytes
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Bytes(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(bytes) => Ok(bytes),
            Value::ByteBuffer(buffer) => Ok(buffer.freeze()),
            other => Err(Error::type_mismatch("bytes", other.kind())),
        }
    }
}

impl AmpValue for BytesMut {
    fn amp_type() -> AmpType {
        AmpType::ByteBuffer
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::ByteBuffer(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::ByteBuffer(buffer) => Ok(buffer),
            Value::Bytes(bytes) => Ok(BytesMut::from(&bytes[..])),
            other => Err(Error::type_mismatch("byte buffer", other.kind())),
        }
    }
}

impl<T: AmpValue> AmpValue for Vec<T> {
    fn amp_type() -> AmpType {
        AmpType::List
    }

    fn element_path() -> TypePath {
        let mut path = vec![T::amp_type()];
        path.extend(T::element_path());
        path
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::List(self.iter().filter_map(T::to_value).collect()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(elements) => elements.into_iter().map(T::from_value).collect(),
            other => Err(Error::type_mismatch("list", other.kind())),
        }
    }
}

impl<T: AmpValue> AmpValue for Option<T> {
    fn amp_type() -> AmpType {
        T::amp_type()
    }

    fn element_path() -> TypePath {
        T::element_path()
    }

    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(T::to_value)
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Some)
    }
}
