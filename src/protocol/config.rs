//! Codec configuration

/// Accepted textual forms for integer values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntegerSyntax {
    /// Optional sign, then `0x`/`0X`/`#` hexadecimal, leading-`0` octal, or decimal.
    #[default]
    Lenient,
    /// Only `-?[0-9]+`.
    Decimal,
}

/// Accepted textual forms for boolean values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BooleanSyntax {
    /// `True` is true, every other byte string is false.
    #[default]
    Lenient,
    /// Only `True` and `False` are accepted.
    Strict,
}

/// Handling of item-record keys that the record does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnknownKeys {
    /// Drop the pair.
    #[default]
    Ignore,
    /// Fail the decode with [`Error::Malformed`](crate::Error::Malformed).
    Reject,
}

/// Decoder knobs. The default reproduces the reference AMP behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecConfig {
    /// Integer grammar.
    pub integer_syntax: IntegerSyntax,
    /// Boolean grammar.
    pub boolean_syntax: BooleanSyntax,
    /// Unknown item keys.
    pub unknown_item_keys: UnknownKeys,
    /// Upper bound on pairs per decoded box.
    pub max_pairs: Option<usize>,
}

impl CodecConfig {
    /// Configuration with every strict option selected.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            integer_syntax: IntegerSyntax::Decimal,
            boolean_syntax: BooleanSyntax::Strict,
            unknown_item_keys: UnknownKeys::Reject,
            max_pairs: None,
        }
    }

    /// Set the integer grammar
    #[must_use]
    pub const fn with_integer_syntax(mut self, syntax: IntegerSyntax) -> Self {
        self.integer_syntax = syntax;
        self
    }

    /// Set the boolean grammar
    #[must_use]
    pub const fn with_boolean_syntax(mut self, syntax: BooleanSyntax) -> Self {
        self.boolean_syntax = syntax;
        self
    }

    /// Set the unknown item key policy
    #[must_use]
    pub const fn with_unknown_item_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_item_keys = policy;
        self
    }

    /// Bound the number of pairs accepted per box
    #[must_use]
    pub const fn with_max_pairs(mut self, max_pairs: usize) -> Self {
        self.max_pairs = Some(max_pairs);
        self
    }
}
