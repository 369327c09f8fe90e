//! AMP (Asynchronous Messaging Protocol) box codec
//!
//! An AMP message is a box: an ordered list of short key/value byte strings
//! ended by a zero-length key. This crate provides the box, its wire codec,
//! and a typed layer that projects a box onto the attributes of a record.
//!
//! # Quick Start
//!
//! ```rust
//! use amp::{AmpBox, amp_record};
//!
//! amp_record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Greeting {
//!         pub count: i32,
//!         pub name: String,
//!         pub ok: bool,
//!     }
//! }
//!
//! let greeting = Greeting { count: 7, name: "aé".to_string(), ok: true };
//!
//! // Record -> box -> bytes
//! let bytes = AmpBox::from_record(&greeting)?.encode()?;
//!
//! // Bytes -> box -> record
//! let decoded: Greeting = AmpBox::decode(&bytes)?.extract()?;
//! assert_eq!(decoded, greeting);
//! # Ok::<(), amp::Error>(())
//! ```
//!
//! # Features
//!
//! - **Ordered multimap** - duplicate keys kept, first match wins on lookup
//! - **Zero-copy decoding** - keys and values are slices of the input `Bytes`
//! - **Typed records** - integers, strings, bytes, booleans, floats, decimals,
//!   timestamps, byte buffers, nested lists and item records
//!
//! Transport, command dispatch and request correlation live outside this crate.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod marshal;
pub mod protocol;

pub use marshal::{
    AmpRecord, AmpType, AmpValue, Attribute, Fields, Schema, SchemaRef, TypePath, Value,
    decode_value, encode_value,
};
#[doc(hidden)]
pub use marshal::record_from_value;
pub use protocol::{
    AmpBox, BooleanSyntax, BoxKey, CodecConfig, ERROR_CODE_KEY, ERROR_DESCRIPTION_KEY, Error,
    IntegerSyntax, MAX_VALUE_LENGTH, Pair, RemoteError, Result, UnknownKeys, decode, encode,
};
