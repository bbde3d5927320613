use rust_decimal::Decimal;
use std::fmt::{self, Display, Formatter};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Abstract type a value has on the wire, independent from the native Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WireType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Varchar,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    Uuid,
}

impl WireType {
    pub const ALL: &'static [WireType] = &[
        WireType::Boolean,
        WireType::Int8,
        WireType::Int16,
        WireType::Int32,
        WireType::Int64,
        WireType::UInt8,
        WireType::UInt16,
        WireType::UInt32,
        WireType::UInt64,
        WireType::Float32,
        WireType::Float64,
        WireType::Decimal,
        WireType::Varchar,
        WireType::Blob,
        WireType::Date,
        WireType::Time,
        WireType::Timestamp,
        WireType::TimestampWithTimezone,
        WireType::Uuid,
    ];
}

impl Display for WireType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WireType::Boolean => "BOOLEAN",
            WireType::Int8 => "TINYINT",
            WireType::Int16 => "SMALLINT",
            WireType::Int32 => "INTEGER",
            WireType::Int64 => "BIGINT",
            WireType::UInt8 => "UTINYINT",
            WireType::UInt16 => "USMALLINT",
            WireType::UInt32 => "UINTEGER",
            WireType::UInt64 => "UBIGINT",
            WireType::Float32 => "FLOAT",
            WireType::Float64 => "DOUBLE",
            WireType::Decimal => "DECIMAL",
            WireType::Varchar => "VARCHAR",
            WireType::Blob => "BLOB",
            WireType::Date => "DATE",
            WireType::Time => "TIME",
            WireType::Timestamp => "TIMESTAMP",
            WireType::TimestampWithTimezone => "TIMESTAMPTZ",
            WireType::Uuid => "UUID",
        })
    }
}

/// Wire representation of a single field or parameter.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
}

impl Value {
    /// Typed null for the given wire type.
    pub fn null_of(wire_type: WireType) -> Value {
        match wire_type {
            WireType::Boolean => Value::Boolean(None),
            WireType::Int8 => Value::Int8(None),
            WireType::Int16 => Value::Int16(None),
            WireType::Int32 => Value::Int32(None),
            WireType::Int64 => Value::Int64(None),
            WireType::UInt8 => Value::UInt8(None),
            WireType::UInt16 => Value::UInt16(None),
            WireType::UInt32 => Value::UInt32(None),
            WireType::UInt64 => Value::UInt64(None),
            WireType::Float32 => Value::Float32(None),
            WireType::Float64 => Value::Float64(None),
            WireType::Decimal => Value::Decimal(None),
            WireType::Varchar => Value::Varchar(None),
            WireType::Blob => Value::Blob(None),
            WireType::Date => Value::Date(None),
            WireType::Time => Value::Time(None),
            WireType::Timestamp => Value::Timestamp(None),
            WireType::TimestampWithTimezone => Value::TimestampWithTimezone(None),
            WireType::Uuid => Value::Uuid(None),
        }
    }

    /// The wire type, `None` only for the untyped `Value::Null`.
    pub fn wire_type(&self) -> Option<WireType> {
        Some(match self {
            Value::Null => return None,
            Value::Boolean(..) => WireType::Boolean,
            Value::Int8(..) => WireType::Int8,
            Value::Int16(..) => WireType::Int16,
            Value::Int32(..) => WireType::Int32,
            Value::Int64(..) => WireType::Int64,
            Value::UInt8(..) => WireType::UInt8,
            Value::UInt16(..) => WireType::UInt16,
            Value::UInt32(..) => WireType::UInt32,
            Value::UInt64(..) => WireType::UInt64,
            Value::Float32(..) => WireType::Float32,
            Value::Float64(..) => WireType::Float64,
            Value::Decimal(..) => WireType::Decimal,
            Value::Varchar(..) => WireType::Varchar,
            Value::Blob(..) => WireType::Blob,
            Value::Date(..) => WireType::Date,
            Value::Time(..) => WireType::Time,
            Value::Timestamp(..) => WireType::Timestamp,
            Value::TimestampWithTimezone(..) => WireType::TimestampWithTimezone,
            Value::Uuid(..) => WireType::Uuid,
        })
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        self.wire_type() == other.wire_type()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

/// Human readable form used when logging bound parameters.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Boolean(Some(v)) => write!(f, "{v}"),
            Value::Int8(Some(v)) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::Int16(Some(v)) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::Int32(Some(v)) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::Int64(Some(v)) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::UInt8(Some(v)) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::UInt16(Some(v)) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::UInt32(Some(v)) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::UInt64(Some(v)) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::Float32(Some(v)) => f.write_str(ryu::Buffer::new().format(*v)),
            Value::Float64(Some(v)) => f.write_str(ryu::Buffer::new().format(*v)),
            Value::Decimal(Some(v)) => write!(f, "{v}"),
            Value::Varchar(Some(v)) => write!(f, "'{v}'"),
            Value::Blob(Some(v)) => write!(f, "X'{}'", hex::encode_upper(v)),
            Value::Date(Some(v)) => write!(f, "'{v}'"),
            Value::Time(Some(v)) => write!(f, "'{v}'"),
            Value::Timestamp(Some(v)) => write!(f, "'{v}'"),
            Value::TimestampWithTimezone(Some(v)) => write!(f, "'{v}'"),
            Value::Uuid(Some(v)) => write!(f, "'{v}'"),
            _ => f.write_str("NULL"),
        }
    }
}
