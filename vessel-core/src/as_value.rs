use crate::{Error, Result, Value, WireType};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::any;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use uuid::Uuid;

/// Textual layout of `DATE` values for stores that keep temporal values as text.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
/// Textual layout of `TIME` values.
pub const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]");
/// Textual layout of `TIMESTAMP` values.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
);

/// Conversion between a native Rust type and its wire [`Value`].
///
/// Every implementation is tied to exactly one [`WireType`]. `as_value` never
/// produces a null (nulls are routed by the caller), `try_from_value` accepts
/// the canonical variant and, when it is lossless, neighbouring variants a
/// driver may return instead (e.g. `Int64` for an `i32` column on SQLite).
///
/// ```rust
/// use vessel_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i32 = AsValue::try_from_value(Value::Int64(Some(42))).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Wire type this native type is encoded to.
    fn wire_type() -> WireType;
    /// Encode into the wire representation.
    fn as_value(self) -> Value;
    /// Decode from the wire representation.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} into {}",
        value,
        any::type_name::<T>()
    ))
}

fn out_of_range<T>(value: impl std::fmt::Display) -> Error {
    Error::msg(format!(
        "Value {} is out of range for {}",
        value,
        any::type_name::<T>()
    ))
}

fn null<T>() -> Error {
    Error::msg(format!(
        "Cannot convert NULL into the non nullable {}",
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value_integer {
    ($source:ty, $variant:ident) => {
        impl AsValue for $source {
            fn wire_type() -> WireType {
                WireType::$variant
            }
            fn as_value(self) -> Value {
                Value::$variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if value.is_null() {
                    return Err(null::<Self>());
                }
                match value {
                    Value::Boolean(Some(v)) => Ok(v as $source),
                    Value::Int8(Some(v)) => <$source>::try_from(v).map_err(|_| out_of_range::<Self>(v)),
                    Value::Int16(Some(v)) => <$source>::try_from(v).map_err(|_| out_of_range::<Self>(v)),
                    Value::Int32(Some(v)) => <$source>::try_from(v).map_err(|_| out_of_range::<Self>(v)),
                    Value::Int64(Some(v)) => <$source>::try_from(v).map_err(|_| out_of_range::<Self>(v)),
                    Value::UInt8(Some(v)) => <$source>::try_from(v).map_err(|_| out_of_range::<Self>(v)),
                    Value::UInt16(Some(v)) => <$source>::try_from(v).map_err(|_| out_of_range::<Self>(v)),
                    Value::UInt32(Some(v)) => <$source>::try_from(v).map_err(|_| out_of_range::<Self>(v)),
                    Value::UInt64(Some(v)) => <$source>::try_from(v).map_err(|_| out_of_range::<Self>(v)),
                    Value::Decimal(Some(v)) if v.fract().is_zero() => v
                        .to_i128()
                        .and_then(|v| <$source>::try_from(v).ok())
                        .ok_or_else(|| out_of_range::<Self>(v)),
                    Value::Varchar(Some(ref v)) => v
                        .trim()
                        .parse::<$source>()
                        .map_err(|e| Error::new(e).context(mismatch::<Self>(&value))),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value_integer!(i8, Int8);
impl_as_value_integer!(i16, Int16);
impl_as_value_integer!(i32, Int32);
impl_as_value_integer!(i64, Int64);
impl_as_value_integer!(u8, UInt8);
impl_as_value_integer!(u16, UInt16);
impl_as_value_integer!(u32, UInt32);
impl_as_value_integer!(u64, UInt64);

impl AsValue for bool {
    fn wire_type() -> WireType {
        WireType::Boolean
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v != 0),
            Value::Int16(Some(v)) => Ok(v != 0),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::UInt8(Some(v)) => Ok(v != 0),
            Value::UInt16(Some(v)) => Ok(v != 0),
            Value::UInt32(Some(v)) => Ok(v != 0),
            Value::UInt64(Some(v)) => Ok(v != 0),
            Value::Varchar(Some(ref v)) => match v.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(mismatch::<Self>(&value)),
            },
            v if v.is_null() => Err(null::<Self>()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

macro_rules! impl_as_value_float {
    ($source:ty, $variant:ident, $to:ident) => {
        impl AsValue for $source {
            fn wire_type() -> WireType {
                WireType::$variant
            }
            fn as_value(self) -> Value {
                Value::$variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Float32(Some(v)) => Ok(v as $source),
                    Value::Float64(Some(v)) => Ok(v as $source),
                    Value::Int8(Some(v)) => Ok(v as $source),
                    Value::Int16(Some(v)) => Ok(v as $source),
                    Value::Int32(Some(v)) => Ok(v as $source),
                    Value::Int64(Some(v)) => Ok(v as $source),
                    Value::UInt8(Some(v)) => Ok(v as $source),
                    Value::UInt16(Some(v)) => Ok(v as $source),
                    Value::UInt32(Some(v)) => Ok(v as $source),
                    Value::UInt64(Some(v)) => Ok(v as $source),
                    Value::Decimal(Some(v)) => v.$to().ok_or_else(|| out_of_range::<Self>(v)),
                    Value::Varchar(Some(ref v)) => v
                        .trim()
                        .parse::<$source>()
                        .map_err(|e| Error::new(e).context(mismatch::<Self>(&value))),
                    v if v.is_null() => Err(null::<Self>()),
                    v => Err(mismatch::<Self>(&v)),
                }
            }
        }
    };
}

impl_as_value_float!(f32, Float32, to_f32);
impl_as_value_float!(f64, Float64, to_f64);

impl AsValue for Decimal {
    fn wire_type() -> WireType {
        WireType::Decimal
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v.into()),
            Value::Int16(Some(v)) => Ok(v.into()),
            Value::Int32(Some(v)) => Ok(v.into()),
            Value::Int64(Some(v)) => Ok(v.into()),
            Value::UInt8(Some(v)) => Ok(v.into()),
            Value::UInt16(Some(v)) => Ok(v.into()),
            Value::UInt32(Some(v)) => Ok(v.into()),
            Value::UInt64(Some(v)) => Ok(v.into()),
            Value::Float32(Some(v)) => Decimal::from_f32(v).ok_or_else(|| out_of_range::<Self>(v)),
            Value::Float64(Some(v)) => Decimal::from_f64(v).ok_or_else(|| out_of_range::<Self>(v)),
            Value::Varchar(Some(ref v)) => v
                .trim()
                .parse::<Decimal>()
                .map_err(|e| Error::new(e).context(mismatch::<Self>(&value))),
            v if v.is_null() => Err(null::<Self>()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for String {
    fn wire_type() -> WireType {
        WireType::Varchar
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Blob(Some(v)) => String::from_utf8(v.into_vec()).map_err(Error::new),
            v if v.is_null() => Err(null::<Self>()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn wire_type() -> WireType {
        WireType::Blob
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v.into_vec()),
            Value::Varchar(Some(v)) => Ok(v.into_bytes()),
            v if v.is_null() => Err(null::<Self>()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for Date {
    fn wire_type() -> WireType {
        WireType::Date
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            Value::Varchar(Some(ref v)) => Date::parse(v.trim(), DATE_FORMAT)
                .map_err(|e| Error::new(e).context(mismatch::<Self>(&value))),
            v if v.is_null() => Err(null::<Self>()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for Time {
    fn wire_type() -> WireType {
        WireType::Time
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => Time::parse(v.trim(), TIME_FORMAT)
                .map_err(|e| Error::new(e).context(mismatch::<Self>(&value))),
            v if v.is_null() => Err(null::<Self>()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for PrimitiveDateTime {
    fn wire_type() -> WireType {
        WireType::Timestamp
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::TimestampWithTimezone(Some(v)) => {
                let v = v.to_offset(UtcOffset::UTC);
                Ok(PrimitiveDateTime::new(v.date(), v.time()))
            }
            Value::Varchar(Some(ref v)) => {
                PrimitiveDateTime::parse(&v.trim().replacen('T', " ", 1), TIMESTAMP_FORMAT)
                    .map_err(|e| Error::new(e).context(mismatch::<Self>(&value)))
            }
            v if v.is_null() => Err(null::<Self>()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for OffsetDateTime {
    fn wire_type() -> WireType {
        WireType::TimestampWithTimezone
    }
    fn as_value(self) -> Value {
        Value::TimestampWithTimezone(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::TimestampWithTimezone(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.assume_utc()),
            Value::Varchar(Some(ref v)) => OffsetDateTime::parse(v.trim(), &Rfc3339)
                .map_err(|e| Error::new(e).context(mismatch::<Self>(&value))),
            v if v.is_null() => Err(null::<Self>()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl AsValue for Uuid {
    fn wire_type() -> WireType {
        WireType::Uuid
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => Uuid::parse_str(v.trim())
                .map_err(|e| Error::new(e).context(mismatch::<Self>(&value))),
            Value::Blob(Some(ref v)) => {
                Uuid::from_slice(v).map_err(|e| Error::new(e).context(mismatch::<Self>(&value)))
            }
            v if v.is_null() => Err(null::<Self>()),
            v => Err(mismatch::<Self>(&v)),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        value.as_value()
    }
}

macro_rules! impl_from_native {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    value.as_value()
                }
            }
        )+
    };
}

impl_from_native!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    Decimal,
    String,
    Vec<u8>,
    Date,
    Time,
    PrimitiveDateTime,
    OffsetDateTime,
    Uuid,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.to_owned()))
    }
}

impl<T: AsValue> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.as_value(),
            None => Value::null_of(T::wire_type()),
        }
    }
}
