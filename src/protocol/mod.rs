//! AMP box and wire codec
//!
//! This module provides the ordered key/value box and its length-prefixed
//! wire format.

mod ampbox;
mod codec;
mod config;
mod error;

pub use ampbox::{
    AmpBox, BoxKey, ERROR_CODE_KEY, ERROR_DESCRIPTION_KEY, Pair, latin1_bytes, latin1_string,
};
pub use codec::{decode, decode_prefix, decode_prefix_with, decode_with, encode};
pub(crate) use codec::{ChunkReader, put_chunk};
pub use config::{BooleanSyntax, CodecConfig, IntegerSyntax, UnknownKeys};
pub use error::{Error, RemoteError, Result};

/// Maximum length of a key, value or nested chunk (u16 length prefix)
pub const MAX_VALUE_LENGTH: usize = u16::MAX as usize;

/// Length prefix size in bytes
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Zero key length ending a box (and a list or item element)
pub const TERMINATOR: [u8; 2] = [0x00, 0x00];
