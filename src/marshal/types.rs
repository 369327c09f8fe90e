//! Declared attribute types, record schemas and dynamic values

use std::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, FixedOffset};

/// Element types of a list attribute, outermost first.
///
/// `list<list<int>>` has the path `[List, Integer]`.
pub type TypePath = Vec<AmpType>;

/// Declared type of an attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AmpType {
    /// Signed integer, decimal ASCII
    Integer,
    /// Unicode string, UTF-8
    String,
    /// Raw bytes, verbatim
    Bytes,
    /// `True` / `False`
    Boolean,
    /// Double-precision float, or `Inf` / `-Inf` / `nan`
    Float,
    /// Arbitrary-precision decimal
    Decimal,
    /// Timestamp with a fixed UTC offset
    DateTime,
    /// Byte buffer, verbatim
    ByteBuffer,
    /// Homogeneous list; element types come from the attribute's [`TypePath`]
    List,
    /// Nested item record
    Item(SchemaRef),
}

impl AmpType {
    /// Type name used in diagnostics
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::DateTime => "datetime",
            Self::ByteBuffer => "byte buffer",
            Self::List => "list",
            Self::Item(_) => "item",
        }
    }
}

impl fmt::Display for AmpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(schema) => write!(f, "item {}", schema.resolve().name()),
            other => f.write_str(other.name()),
        }
    }
}

/// Schema of a nested item record.
///
/// Registered records hand out a resolver instead of the schema itself, so
/// a record may list itself among its own attributes (`Vec<Tree>` inside
/// `Tree`). Two references are equal when they name the same record.
#[derive(Clone)]
pub enum SchemaRef {
    /// Schema built up front
    Resolved(Arc<Schema>),
    /// Schema fetched on first use
    Lazy(fn() -> Arc<Schema>),
}

impl SchemaRef {
    /// Reference to a schema resolved on demand
    #[must_use]
    pub const fn lazy(resolve: fn() -> Arc<Schema>) -> Self {
        Self::Lazy(resolve)
    }

    /// The referenced schema
    #[must_use]
    pub fn resolve(&self) -> Arc<Schema> {
        match self {
            Self::Resolved(schema) => Arc::clone(schema),
            Self::Lazy(resolve) => resolve(),
        }
    }
}

impl From<Arc<Schema>> for SchemaRef {
    fn from(schema: Arc<Schema>) -> Self {
        Self::Resolved(schema)
    }
}

impl From<Schema> for SchemaRef {
    fn from(schema: Schema) -> Self {
        Self::Resolved(Arc::new(schema))
    }
}

impl PartialEq for SchemaRef {
    fn eq(&self, other: &Self) -> bool {
        let (ours, theirs) = (self.resolve(), other.resolve());
        Arc::ptr_eq(&ours, &theirs) || ours.name() == theirs.name()
    }
}

impl fmt::Debug for SchemaRef {
    // Only the name: a self-referencing schema would otherwise print forever.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SchemaRef")
            .field(&self.resolve().name())
            .finish()
    }
}

/// One named, typed attribute of a record
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    ty: AmpType,
    elements: TypePath,
}

impl Attribute {
    /// Scalar or item attribute
    pub fn new(name: impl Into<String>, ty: AmpType) -> Self {
        Self::list(name, ty, TypePath::new())
    }

    /// Attribute with an explicit element type path
    pub fn list(name: impl Into<String>, ty: AmpType, elements: TypePath) -> Self {
        Self {
            name: name.into(),
            ty,
            elements,
        }
    }

    /// Attribute typed after a Rust type
    pub fn of<T: super::AmpValue>(name: impl Into<String>) -> Self {
        Self::list(name, T::amp_type(), T::element_path())
    }

    /// Attribute name, also its wire key
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    #[must_use]
    pub const fn ty(&self) -> &AmpType {
        &self.ty
    }

    /// Element type path (empty unless the attribute is a list)
    #[must_use]
    pub fn elements(&self) -> &[AmpType] {
        &self.elements
    }
}

/// Attributes of a record, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    attributes: Vec<Attribute>,
}

impl Schema {
    /// Create a schema
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Record name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in declaration order
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

/// Decoded or to-be-encoded attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer
    Integer(i64),
    /// Unicode string
    String(String),
    /// Raw bytes
    Bytes(Bytes),
    /// Boolean
    Boolean(bool),
    /// Float
    Float(f64),
    /// Decimal
    Decimal(BigDecimal),
    /// Timestamp
    DateTime(DateTime<FixedOffset>),
    /// Byte buffer
    ByteBuffer(BytesMut),
    /// List elements
    List(Vec<Value>),
    /// Attributes of one item record
    Item(Fields),
}

impl Value {
    /// Variant name used in diagnostics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Boolean(_) => "boolean",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::DateTime(_) => "datetime",
            Self::ByteBuffer(_) => "byte buffer",
            Self::List(_) => "list",
            Self::Item(_) => "item",
        }
    }
}

/// Ordered name/value pairs of one record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    /// Empty field set
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a field
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push((name.into(), value));
    }

    /// First value stored under `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Remove and return the first value stored under `name`
    pub fn take(&mut self, name: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(field, _)| field == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<N: Into<String>> FromIterator<(N, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.push(name, value);
        }
        fields
    }
}
