use rusqlite::types::{self, ValueRef};
use time::format_description::well_known::Rfc3339;
use vessel_core::{DATE_FORMAT, Error, Result, TIME_FORMAT, TIMESTAMP_FORMAT, Value};

/// Storage class value read from a result row.
pub(crate) fn extract_value(value: ValueRef<'_>) -> Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int64(Some(v)),
        ValueRef::Real(v) => Value::Float64(Some(v)),
        ValueRef::Text(v) => Value::Varchar(Some(String::from_utf8(v.to_vec())?)),
        ValueRef::Blob(v) => Value::Blob(Some(v.into())),
    })
}

/// Storage class a value is bound as: temporal and uuid values travel as text.
pub(crate) fn to_sqlite(value: &Value) -> Result<types::Value> {
    Ok(match value {
        Value::Boolean(Some(v)) => types::Value::Integer(*v as i64),
        Value::Int8(Some(v)) => types::Value::Integer(*v as i64),
        Value::Int16(Some(v)) => types::Value::Integer(*v as i64),
        Value::Int32(Some(v)) => types::Value::Integer(*v as i64),
        Value::Int64(Some(v)) => types::Value::Integer(*v),
        Value::UInt8(Some(v)) => types::Value::Integer(*v as i64),
        Value::UInt16(Some(v)) => types::Value::Integer(*v as i64),
        Value::UInt32(Some(v)) => types::Value::Integer(*v as i64),
        Value::UInt64(Some(v)) => types::Value::Integer(i64::try_from(*v).map_err(|_| {
            Error::msg(format!("{} does not fit in a sqlite INTEGER", v))
        })?),
        Value::Float32(Some(v)) => types::Value::Real(*v as f64),
        Value::Float64(Some(v)) => types::Value::Real(*v),
        Value::Decimal(Some(v)) => types::Value::Text(v.to_string()),
        Value::Varchar(Some(v)) => types::Value::Text(v.clone()),
        Value::Blob(Some(v)) => types::Value::Blob(v.to_vec()),
        Value::Date(Some(v)) => types::Value::Text(v.format(DATE_FORMAT)?),
        Value::Time(Some(v)) => types::Value::Text(v.format(TIME_FORMAT)?),
        Value::Timestamp(Some(v)) => types::Value::Text(v.format(TIMESTAMP_FORMAT)?),
        Value::TimestampWithTimezone(Some(v)) => types::Value::Text(v.format(&Rfc3339)?),
        Value::Uuid(Some(v)) => types::Value::Text(v.hyphenated().to_string()),
        _ => types::Value::Null,
    })
}
