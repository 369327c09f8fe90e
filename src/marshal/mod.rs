//! Typed marshalling between boxes and records
//!
//! Every attribute has a declared [`AmpType`]. Scalars map to fixed textual
//! forms; lists and item records nest length-prefixed frames inside a value.

mod grammar;
pub mod item;
pub mod list;
mod record;
pub mod scalar;
mod types;
mod value;

pub use grammar::{decode_value, encode_value};
pub use record::{AmpRecord, record_from_value};
pub use types::{AmpType, Attribute, Fields, Schema, SchemaRef, TypePath, Value};
pub use value::AmpValue;
