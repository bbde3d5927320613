use crate::{AsValue, Failure, Prepared, Result, Row, Value, WireType};
use std::{
    any,
    collections::BTreeSet,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// Identity of a codec. Two codecs are interchangeable iff their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodecId {
    pub wire_type: WireType,
    pub native_type: &'static str,
}

type Encode<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;
type Decode<T> = Arc<dyn Fn(Value) -> Result<T> + Send + Sync>;

/// Bidirectional conversion between a native `T` and its wire [`Value`].
///
/// Null never reaches `encode`/`decode`: binding routes a missing value
/// through [`Prepared::bind_null`] keyed by the wire type, and extraction
/// returns `None` whenever the row reports a NULL field.
pub struct Codec<T> {
    id: CodecId,
    encode: Encode<T>,
    decode: Decode<T>,
}

impl<T> Clone for Codec<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            encode: self.encode.clone(),
            decode: self.decode.clone(),
        }
    }
}

impl<T> Debug for Codec<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("wire_type", &self.id.wire_type)
            .field("native_type", &self.id.native_type)
            .finish()
    }
}

impl<T: AsValue + Clone + 'static> Codec<T> {
    /// Codec backed by the `AsValue` implementation of `T`.
    pub fn new() -> Self {
        Self::from_fns(
            T::wire_type(),
            |v: &T| v.clone().as_value(),
            T::try_from_value,
        )
    }
}

impl<T: AsValue + Clone + 'static> Default for Codec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Codec<T> {
    pub fn from_fns(
        wire_type: WireType,
        encode: impl Fn(&T) -> Value + Send + Sync + 'static,
        decode: impl Fn(Value) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: CodecId {
                wire_type,
                native_type: any::type_name::<T>(),
            },
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    pub fn id(&self) -> CodecId {
        self.id
    }

    pub fn wire_type(&self) -> WireType {
        self.id.wire_type
    }

    /// Encode an optional native value, `None` becomes the typed null of the wire type.
    pub fn encode(&self, value: Option<&T>) -> Value {
        match value {
            Some(v) => (self.encode)(v),
            None => Value::null_of(self.id.wire_type),
        }
    }

    /// Decode a non null wire value.
    pub fn decode(&self, value: Value) -> Result<T> {
        (self.decode)(value)
    }

    pub fn bind(&self, statement: &mut dyn Prepared, index: usize, value: Option<&T>) -> Result<()> {
        bind_value(statement, index, self.id.wire_type, &self.encode(value))
    }

    /// Read the field at `index`, the row null indicator wins over the raw value.
    pub fn extract(&self, row: &dyn Row, index: usize) -> Result<Option<T>> {
        let raw = row.value(index)?;
        if row.was_null(index) {
            return Ok(None);
        }
        self.decode(raw).map(Some)
    }

    /// New codec for `U` over the same wire type, mapping through `T`.
    pub fn derive<U: 'static>(
        &self,
        to_native: impl Fn(T) -> U + Send + Sync + 'static,
        to_wire: impl Fn(&U) -> T + Send + Sync + 'static,
    ) -> Codec<U> {
        let encode = self.encode.clone();
        let decode = self.decode.clone();
        Codec::from_fns(
            self.id.wire_type,
            move |v: &U| encode(&to_wire(v)),
            move |v| decode(v).map(&to_native),
        )
    }
}

/// Bind a wire value, nulls go through the driver NULL encoding of `wire_type`.
pub fn bind_value(
    statement: &mut dyn Prepared,
    index: usize,
    wire_type: WireType,
    value: &Value,
) -> Result<()> {
    if value.is_null() {
        statement.bind_null(index, wire_type)
    } else {
        statement.bind(index, value)
    }
}

/// Codecs accepted by a database, checked against the wire types its driver handles.
#[derive(Debug, Clone, Default)]
pub struct CodecRegistry {
    supported: BTreeSet<WireType>,
    registered: Vec<CodecId>,
}

impl CodecRegistry {
    pub fn new(supported: impl IntoIterator<Item = WireType>) -> Self {
        Self {
            supported: supported.into_iter().collect(),
            registered: Vec::new(),
        }
    }

    pub fn register(&mut self, codec: CodecId) -> Result<()> {
        if !self.supported.contains(&codec.wire_type) {
            let error = Failure::Configuration(format!(
                "Codec for `{}` declares wire type {} which the driver does not handle",
                codec.native_type, codec.wire_type
            ));
            log::error!("{}", error);
            return Err(error.into());
        }
        if !self.registered.contains(&codec) {
            self.registered.push(codec);
        }
        Ok(())
    }

    pub fn supports(&self, wire_type: WireType) -> bool {
        self.supported.contains(&wire_type)
    }

    pub fn registered(&self) -> &[CodecId] {
        &self.registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Failure;

    struct OneField(Value);
    impl Row for OneField {
        fn len(&self) -> usize {
            1
        }
        fn label(&self, _index: usize) -> &str {
            "field"
        }
        fn value(&self, _index: usize) -> Result<Value> {
            Ok(self.0.clone())
        }
        fn was_null(&self, _index: usize) -> bool {
            self.0.is_null()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Celsius(f64);

    #[test]
    fn extract_respects_null_indicator() {
        let codec = Codec::<i64>::new();
        assert_eq!(codec.extract(&OneField(Value::Int64(Some(0))), 0).unwrap(), Some(0));
        assert_eq!(codec.extract(&OneField(Value::Int64(None)), 0).unwrap(), None);
        assert_eq!(codec.extract(&OneField(Value::Null), 0).unwrap(), None);
    }

    #[test]
    fn derived_codec_keeps_wire_type() {
        let base = Codec::<f64>::new();
        let derived = base.derive(Celsius, |c: &Celsius| c.0);
        assert_eq!(derived.wire_type(), WireType::Float64);
        assert_ne!(derived.id(), base.id());
        assert_eq!(
            derived.encode(Some(&Celsius(21.5))),
            Value::Float64(Some(21.5))
        );
        assert_eq!(
            derived
                .extract(&OneField(Value::Float64(Some(-3.0))), 0)
                .unwrap(),
            Some(Celsius(-3.0))
        );
        assert_eq!(derived.encode(None), Value::Float64(None));
    }

    #[test]
    fn interchangeable_codecs() {
        assert_eq!(Codec::<String>::new().id(), Codec::<String>::default().id());
        assert_ne!(Codec::<i32>::new().id(), Codec::<i64>::new().id());
    }

    #[test]
    fn registry_rejects_unhandled_wire_type() {
        let mut registry = CodecRegistry::new([WireType::Int64, WireType::Varchar]);
        registry.register(Codec::<i64>::new().id()).unwrap();
        let error = registry.register(Codec::<uuid::Uuid>::new().id()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Failure>(),
            Some(Failure::Configuration(..))
        ));
        assert_eq!(registry.registered().len(), 1);
    }
}
