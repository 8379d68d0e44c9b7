//! Value types for the object store
//!
//! This module defines:
//! - PrimitiveType: the closed set of twelve storable primitive kinds
//! - Primitive: a payload of exactly one primitive kind
//! - FieldType: the declared type of a field (a primitive or a map/list/set of primitives)
//! - Value: a tagged value that is either a primitive, a collection or a typed null
//!
//! ## Type Rules
//!
//! - A `Value`'s declared type and its payload's runtime type always agree.
//!   `Value::typed` is the checked constructor; every other constructor is
//!   correct by construction.
//! - No implicit coercions: `Long(1)` and `Int(1)` are different values.
//! - Primitives key maps and populate sets, so equality and hashing compare
//!   `Float`/`Double` payloads by bit pattern (`NaN == NaN`, `-0.0 != 0.0`).

use crate::collection::{CollectionKind, CollectionValue};
use crate::error::{Error, Result};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::net::IpAddr;
use uuid::Uuid;

/// The twelve primitive kinds a field or collection element may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveType {
    /// UTF-8 string
    Text,
    /// Binary blob
    Blob,
    /// 64-bit signed integer
    Long,
    /// 32-bit signed integer
    Int,
    /// UTC timestamp
    Timestamp,
    /// Boolean
    Boolean,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Arbitrary-precision decimal
    Decimal,
    /// Arbitrary-precision integer
    VarInt,
    /// 128-bit unique identifier
    Uuid,
    /// IPv4 or IPv6 address
    Inet,
}

impl PrimitiveType {
    /// All primitive kinds, in declaration order
    pub const ALL: [PrimitiveType; 12] = [
        PrimitiveType::Text,
        PrimitiveType::Blob,
        PrimitiveType::Long,
        PrimitiveType::Int,
        PrimitiveType::Timestamp,
        PrimitiveType::Boolean,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Decimal,
        PrimitiveType::VarInt,
        PrimitiveType::Uuid,
        PrimitiveType::Inet,
    ];

    /// Column type name used by the backing store
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Text => "text",
            PrimitiveType::Blob => "blob",
            PrimitiveType::Long => "bigint",
            PrimitiveType::Int => "int",
            PrimitiveType::Timestamp => "timestamp",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::VarInt => "varint",
            PrimitiveType::Uuid => "uuid",
            PrimitiveType::Inet => "inet",
        }
    }

    /// Value returned by typed getters for a field that was never written
    ///
    /// Numeric and boolean kinds default to zero/false; every other kind has
    /// no default and reads back as absent.
    pub fn default_primitive(&self) -> Option<Primitive> {
        match self {
            PrimitiveType::Long => Some(Primitive::Long(0)),
            PrimitiveType::Int => Some(Primitive::Int(0)),
            PrimitiveType::Boolean => Some(Primitive::Boolean(false)),
            PrimitiveType::Float => Some(Primitive::Float(0.0)),
            PrimitiveType::Double => Some(Primitive::Double(0.0)),
            PrimitiveType::Decimal => Some(Primitive::Decimal(BigDecimal::from(0i64))),
            PrimitiveType::VarInt => Some(Primitive::VarInt(BigInt::from(0i64))),
            PrimitiveType::Text
            | PrimitiveType::Blob
            | PrimitiveType::Timestamp
            | PrimitiveType::Uuid
            | PrimitiveType::Inet => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A payload of exactly one primitive kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Primitive {
    /// UTF-8 string
    Text(String),
    /// Binary blob
    Blob(Vec<u8>),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit signed integer
    Int(i32),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
    /// Boolean
    Boolean(bool),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Arbitrary-precision decimal
    Decimal(BigDecimal),
    /// Arbitrary-precision integer
    VarInt(BigInt),
    /// 128-bit unique identifier
    Uuid(Uuid),
    /// IPv4 or IPv6 address
    Inet(IpAddr),
}

impl Primitive {
    /// Runtime kind of this payload
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            Primitive::Text(_) => PrimitiveType::Text,
            Primitive::Blob(_) => PrimitiveType::Blob,
            Primitive::Long(_) => PrimitiveType::Long,
            Primitive::Int(_) => PrimitiveType::Int,
            Primitive::Timestamp(_) => PrimitiveType::Timestamp,
            Primitive::Boolean(_) => PrimitiveType::Boolean,
            Primitive::Float(_) => PrimitiveType::Float,
            Primitive::Double(_) => PrimitiveType::Double,
            Primitive::Decimal(_) => PrimitiveType::Decimal,
            Primitive::VarInt(_) => PrimitiveType::VarInt,
            Primitive::Uuid(_) => PrimitiveType::Uuid,
            Primitive::Inet(_) => PrimitiveType::Inet,
        }
    }

    /// Fail with a type error unless this payload is of the declared kind
    pub fn check_type(&self, declared: PrimitiveType) -> Result<()> {
        let actual = self.primitive_type();
        if actual == declared {
            Ok(())
        } else {
            Err(Error::type_mismatch(declared, actual))
        }
    }

    /// Order two primitives of the same kind
    ///
    /// Returns `None` for primitives of different kinds and for unordered
    /// float comparisons (NaN).
    pub fn compare(&self, other: &Primitive) -> Option<Ordering> {
        match (self, other) {
            (Primitive::Text(a), Primitive::Text(b)) => Some(a.cmp(b)),
            (Primitive::Blob(a), Primitive::Blob(b)) => Some(a.cmp(b)),
            (Primitive::Long(a), Primitive::Long(b)) => Some(a.cmp(b)),
            (Primitive::Int(a), Primitive::Int(b)) => Some(a.cmp(b)),
            (Primitive::Timestamp(a), Primitive::Timestamp(b)) => Some(a.cmp(b)),
            (Primitive::Boolean(a), Primitive::Boolean(b)) => Some(a.cmp(b)),
            (Primitive::Float(a), Primitive::Float(b)) => a.partial_cmp(b),
            (Primitive::Double(a), Primitive::Double(b)) => a.partial_cmp(b),
            (Primitive::Decimal(a), Primitive::Decimal(b)) => Some(a.cmp(b)),
            (Primitive::VarInt(a), Primitive::VarInt(b)) => Some(a.cmp(b)),
            (Primitive::Uuid(a), Primitive::Uuid(b)) => Some(a.cmp(b)),
            (Primitive::Inet(a), Primitive::Inet(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Get as &str if this is a Text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as Uuid if this is a Uuid value
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Primitive::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Get as i64 if this is a Long value
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Primitive::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Get as timestamp if this is a Timestamp value
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Primitive::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Primitive::Text(a), Primitive::Text(b)) => a == b,
            (Primitive::Blob(a), Primitive::Blob(b)) => a == b,
            (Primitive::Long(a), Primitive::Long(b)) => a == b,
            (Primitive::Int(a), Primitive::Int(b)) => a == b,
            (Primitive::Timestamp(a), Primitive::Timestamp(b)) => a == b,
            (Primitive::Boolean(a), Primitive::Boolean(b)) => a == b,
            (Primitive::Float(a), Primitive::Float(b)) => a.to_bits() == b.to_bits(),
            (Primitive::Double(a), Primitive::Double(b)) => a.to_bits() == b.to_bits(),
            (Primitive::Decimal(a), Primitive::Decimal(b)) => a == b,
            (Primitive::VarInt(a), Primitive::VarInt(b)) => a == b,
            (Primitive::Uuid(a), Primitive::Uuid(b)) => a == b,
            (Primitive::Inet(a), Primitive::Inet(b)) => a == b,
            // Different kinds are never equal
            _ => false,
        }
    }
}

impl Eq for Primitive {}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Primitive::Text(s) => s.hash(state),
            Primitive::Blob(b) => b.hash(state),
            Primitive::Long(l) => l.hash(state),
            Primitive::Int(i) => i.hash(state),
            Primitive::Timestamp(t) => t.hash(state),
            Primitive::Boolean(b) => b.hash(state),
            Primitive::Float(f) => f.to_bits().hash(state),
            Primitive::Double(d) => d.to_bits().hash(state),
            Primitive::Decimal(d) => d.hash(state),
            Primitive::VarInt(i) => i.hash(state),
            Primitive::Uuid(u) => u.hash(state),
            Primitive::Inet(a) => a.hash(state),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Text(s) => write!(f, "'{}'", s),
            Primitive::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Primitive::Long(l) => write!(f, "{}", l),
            Primitive::Int(i) => write!(f, "{}", i),
            Primitive::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Primitive::Boolean(b) => write!(f, "{}", b),
            Primitive::Float(v) => write!(f, "{}", v),
            Primitive::Double(v) => write!(f, "{}", v),
            Primitive::Decimal(d) => write!(f, "{}", d),
            Primitive::VarInt(i) => write!(f, "{}", i),
            Primitive::Uuid(u) => write!(f, "{}", u),
            Primitive::Inet(a) => write!(f, "{}", a),
        }
    }
}

/// Rust types that map one-to-one onto a primitive kind
///
/// Implemented for `String`, `Vec<u8>`, `i64`, `i32`, `DateTime<Utc>`,
/// `bool`, `f32`, `f64`, `BigDecimal`, `BigInt`, `Uuid` and `IpAddr`.
pub trait PrimitiveField: Sized {
    /// The primitive kind this type maps to
    const TYPE: PrimitiveType;

    /// Wrap into a tagged primitive
    fn into_primitive(self) -> Primitive;

    /// Unwrap a tagged primitive, `None` if it is of another kind
    fn from_primitive(primitive: Primitive) -> Option<Self>;
}

macro_rules! primitive_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl PrimitiveField for $ty {
                const TYPE: PrimitiveType = PrimitiveType::$variant;

                fn into_primitive(self) -> Primitive {
                    Primitive::$variant(self)
                }

                fn from_primitive(primitive: Primitive) -> Option<Self> {
                    match primitive {
                        Primitive::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Primitive {
                fn from(v: $ty) -> Self {
                    Primitive::$variant(v)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Primitive(Primitive::$variant(v))
                }
            }
        )*
    };
}

primitive_field! {
    String => Text,
    Vec<u8> => Blob,
    i64 => Long,
    i32 => Int,
    DateTime<Utc> => Timestamp,
    bool => Boolean,
    f32 => Float,
    f64 => Double,
    BigDecimal => Decimal,
    BigInt => VarInt,
    Uuid => Uuid,
    IpAddr => Inet,
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::Text(s.to_string())
    }
}

impl From<&[u8]> for Primitive {
    fn from(b: &[u8]) -> Self {
        Primitive::Blob(b.to_vec())
    }
}

/// Declared type of a field or value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// A single primitive
    Primitive(PrimitiveType),
    /// Map from one primitive kind to another
    Map {
        /// Key kind
        key: PrimitiveType,
        /// Value kind
        value: PrimitiveType,
    },
    /// Ordered list of one primitive kind
    List(PrimitiveType),
    /// Set of one primitive kind
    Set(PrimitiveType),
}

impl FieldType {
    /// Build a collection field type from its kind and element types
    ///
    /// Maps require `second`; lists and sets reject it.
    pub fn collection(
        kind: CollectionKind,
        first: PrimitiveType,
        second: Option<PrimitiveType>,
    ) -> Result<Self> {
        match (kind, second) {
            (CollectionKind::Map, Some(value)) => Ok(FieldType::Map { key: first, value }),
            (CollectionKind::Map, None) => Err(Error::invalid_argument(
                "map fields require a value element type",
            )),
            (CollectionKind::List, None) => Ok(FieldType::List(first)),
            (CollectionKind::Set, None) => Ok(FieldType::Set(first)),
            (kind, Some(_)) => Err(Error::invalid_argument(format!(
                "{} fields take a single element type",
                kind
            ))),
        }
    }

    /// Check if this is a primitive type
    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Primitive(_))
    }

    /// Check if this is a map, list or set type
    pub fn is_collection(&self) -> bool {
        !self.is_primitive()
    }

    /// Check if this is a map type
    pub fn is_map(&self) -> bool {
        matches!(self, FieldType::Map { .. })
    }

    /// Check if this is a list type
    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::List(_))
    }

    /// Check if this is a set type
    pub fn is_set(&self) -> bool {
        matches!(self, FieldType::Set(_))
    }

    /// Get the primitive kind if this is a primitive type
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match self {
            FieldType::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Get the collection kind if this is a collection type
    pub fn collection_kind(&self) -> Option<CollectionKind> {
        match self {
            FieldType::Primitive(_) => None,
            FieldType::Map { .. } => Some(CollectionKind::Map),
            FieldType::List(_) => Some(CollectionKind::List),
            FieldType::Set(_) => Some(CollectionKind::Set),
        }
    }

    /// Map key kind, or list/set element kind
    pub fn first_element_type(&self) -> Option<PrimitiveType> {
        match self {
            FieldType::Primitive(_) => None,
            FieldType::Map { key, .. } => Some(*key),
            FieldType::List(e) | FieldType::Set(e) => Some(*e),
        }
    }

    /// Map value kind
    pub fn second_element_type(&self) -> Option<PrimitiveType> {
        match self {
            FieldType::Map { value, .. } => Some(*value),
            _ => None,
        }
    }
}

impl From<PrimitiveType> for FieldType {
    fn from(p: PrimitiveType) -> Self {
        FieldType::Primitive(p)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Primitive(p) => write!(f, "{}", p),
            FieldType::Map { key, value } => write!(f, "map<{}, {}>", key, value),
            FieldType::List(e) => write!(f, "list<{}>", e),
            FieldType::Set(e) => write!(f, "set<{}>", e),
        }
    }
}

/// Tagged value: a primitive, a collection, or a typed null
///
/// Null is a valid "absent" value for any declared type and keeps that type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// A single primitive
    Primitive(Primitive),
    /// A validated map, list or set
    Collection(CollectionValue),
    /// Absent value of the given declared type
    Null(FieldType),
}

impl Value {
    /// Create a value of a declared primitive kind
    ///
    /// A `None` payload yields a typed null and skips the check; otherwise
    /// the payload must be of the declared kind.
    pub fn typed(declared: PrimitiveType, payload: Option<Primitive>) -> Result<Self> {
        match payload {
            None => Ok(Value::Null(FieldType::Primitive(declared))),
            Some(p) => {
                p.check_type(declared)?;
                Ok(Value::Primitive(p))
            }
        }
    }

    /// Create a typed null
    pub fn null(field_type: impl Into<FieldType>) -> Self {
        Value::Null(field_type.into())
    }

    /// Declared type of this value
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Primitive(p) => FieldType::Primitive(p.primitive_type()),
            Value::Collection(c) => c.field_type(),
            Value::Null(t) => *t,
        }
    }

    /// Fail with a type error unless this value has the declared type
    pub fn check_type(&self, declared: FieldType) -> Result<()> {
        let actual = self.field_type();
        if actual == declared {
            Ok(())
        } else {
            Err(Error::type_mismatch(declared, actual))
        }
    }

    /// Check if this is a typed null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Check if this value's declared type is a collection
    pub fn is_collection(&self) -> bool {
        self.field_type().is_collection()
    }

    /// Get the primitive payload, if any
    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Value::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Get the collection payload, if any
    pub fn as_collection(&self) -> Option<&CollectionValue> {
        match self {
            Value::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Take the primitive payload, if any
    pub fn into_primitive(self) -> Option<Primitive> {
        match self {
            Value::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Take the collection payload, if any
    pub fn into_collection(self) -> Option<CollectionValue> {
        match self {
            Value::Collection(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        Value::Primitive(p)
    }
}

impl From<CollectionValue> for Value {
    fn from(c: CollectionValue) -> Self {
        Value::Collection(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Primitive(Primitive::Text(s.to_string()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Primitive(p) => write!(f, "{}", p),
            Value::Collection(c) => write!(f, "{}", c),
            Value::Null(t) => write!(f, "null::{}", t),
        }
    }
}
