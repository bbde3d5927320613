#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
    use uuid::Uuid;
    use vessel_core::{AsValue, Codec, Value, WireType};

    fn round_trip<T: AsValue + Clone + PartialEq + std::fmt::Debug + 'static>(values: &[T]) {
        let codec = Codec::<T>::new();
        for value in values {
            let encoded = codec.encode(Some(value));
            assert_eq!(encoded.wire_type(), Some(T::wire_type()));
            assert_eq!(&codec.decode(encoded).unwrap(), value);
        }
        let null = codec.encode(None);
        assert!(null.is_null());
        assert_eq!(null, Value::null_of(T::wire_type()));
    }

    #[test]
    fn value_none() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
        assert!(Value::Int32(None).is_null());
        assert!(Value::Int32(None).same_type(&Value::Int32(Some(1))));
    }

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(Some(false)));
        assert_ne!(val, Value::Varchar(Some("true".into())));
        assert!(bool::try_from_value(Value::Int8(Some(1))).unwrap());
        assert!(!bool::try_from_value(Value::Int64(Some(0))).unwrap());
        assert!(bool::try_from_value(Value::Varchar(Some("t".into()))).unwrap());
        assert!(bool::try_from_value(Value::Float32(Some(0.5))).is_err());
        assert!(bool::try_from_value(Value::Boolean(None)).is_err());
        round_trip(&[true, false]);
    }

    #[test]
    fn value_integers() {
        assert_eq!(Value::from(127_i8), Value::Int8(Some(127)));
        assert_eq!(i8::try_from_value(Value::UInt8(Some(99))).unwrap(), 99);
        assert!(i8::try_from_value(Value::Int16(Some(300))).is_err());
        assert!(u16::try_from_value(Value::Int32(Some(-1))).is_err());
        assert_eq!(i32::try_from_value(Value::Int64(Some(42))).unwrap(), 42);
        assert_eq!(
            i64::try_from_value(Value::Decimal(Some(Decimal::from(7)))).unwrap(),
            7
        );
        assert!(i64::try_from_value(Value::Decimal(Some(Decimal::from_str("7.5").unwrap()))).is_err());
        assert_eq!(i64::try_from_value(Value::Varchar(Some(" 12 ".into()))).unwrap(), 12);
        assert!(i32::try_from_value(Value::Float64(Some(0.1))).is_err());
        round_trip(&[0_i8, i8::MIN, i8::MAX]);
        round_trip(&[0_i16, i16::MIN, i16::MAX]);
        round_trip(&[0_i32, i32::MIN, i32::MAX]);
        round_trip(&[0_i64, i64::MIN, i64::MAX]);
        round_trip(&[0_u8, u8::MAX]);
        round_trip(&[0_u16, u16::MAX]);
        round_trip(&[0_u32, u32::MAX]);
        round_trip(&[0_u64, u64::MAX]);
    }

    #[test]
    fn value_floats() {
        assert_eq!(f64::try_from_value(Value::Int32(Some(3))).unwrap(), 3.0);
        assert_eq!(f32::try_from_value(Value::Varchar(Some("1.5".into()))).unwrap(), 1.5);
        assert!(f64::try_from_value(Value::Varchar(Some("one".into()))).is_err());
        round_trip(&[0.0_f32, -1.25, f32::MAX]);
        round_trip(&[0.0_f64, 3.5e100, f64::MIN_POSITIVE]);
    }

    #[test]
    fn value_decimal() {
        let value = Decimal::from_str("1234.5678").unwrap();
        assert_eq!(
            Decimal::try_from_value(Value::Varchar(Some("1234.5678".into()))).unwrap(),
            value
        );
        assert_eq!(Decimal::try_from_value(Value::Int64(Some(5))).unwrap(), Decimal::from(5));
        round_trip(&[Decimal::ZERO, value, -value]);
    }

    #[test]
    fn value_varchar_and_blob() {
        assert_eq!(Value::from("hello"), Value::Varchar(Some("hello".into())));
        assert_eq!(
            String::try_from_value(Value::Blob(Some(b"abc".to_vec().into()))).unwrap(),
            "abc"
        );
        assert!(String::try_from_value(Value::Int32(Some(1))).is_err());
        round_trip(&[String::new(), "l'été".to_string()]);
        round_trip(&[Vec::<u8>::new(), vec![0, 1, 254, 255]]);
    }

    #[test]
    fn value_temporal() {
        let date = Date::from_calendar_date(2024, Month::February, 29).unwrap();
        let time = Time::from_hms_micro(13, 45, 7, 250_000).unwrap();
        let timestamp = PrimitiveDateTime::new(date, time);
        assert_eq!(
            Date::try_from_value(Value::Varchar(Some("2024-02-29".into()))).unwrap(),
            date
        );
        assert_eq!(
            Time::try_from_value(Value::Varchar(Some("13:45:07.25".into()))).unwrap(),
            time
        );
        assert_eq!(
            PrimitiveDateTime::try_from_value(Value::Varchar(Some(
                "2024-02-29T13:45:07.25".into()
            )))
            .unwrap(),
            timestamp
        );
        assert_eq!(
            Date::try_from_value(Value::Timestamp(Some(timestamp))).unwrap(),
            date
        );
        let zoned = timestamp.assume_offset(UtcOffset::from_hms(2, 0, 0).unwrap());
        assert_eq!(
            PrimitiveDateTime::try_from_value(Value::TimestampWithTimezone(Some(zoned))).unwrap(),
            PrimitiveDateTime::new(date, Time::from_hms_micro(11, 45, 7, 250_000).unwrap())
        );
        assert!(Date::try_from_value(Value::Varchar(Some("29/02/2024".into()))).is_err());
        round_trip(&[date, Date::MIN]);
        round_trip(&[time, Time::MIDNIGHT]);
        round_trip(&[timestamp]);
        round_trip(&[zoned, OffsetDateTime::UNIX_EPOCH]);
    }

    #[test]
    fn value_uuid() {
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(Some(
                "67e55044-10b1-426f-9247-bb680e5fe0c8".into()
            )))
            .unwrap(),
            uuid
        );
        assert_eq!(
            Uuid::try_from_value(Value::Blob(Some(uuid.as_bytes().to_vec().into()))).unwrap(),
            uuid
        );
        round_trip(&[uuid, Uuid::nil()]);
    }

    #[test]
    fn value_option() {
        assert_eq!(Value::from(Some(5_i32)), Value::Int32(Some(5)));
        assert_eq!(Value::from(None::<i32>), Value::Int32(None));
        assert_eq!(Value::from(None::<String>).wire_type(), Some(WireType::Varchar));
    }

    #[test]
    fn wire_type_names() {
        assert_eq!(WireType::Int64.to_string(), "BIGINT");
        assert_eq!(WireType::Varchar.to_string(), "VARCHAR");
        assert!(WireType::ALL.contains(&WireType::Uuid));
    }
}
