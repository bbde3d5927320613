use crate::{AsValue, Codec, CodecId, Expression, Value};

/// A positional placeholder and the value bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub value: Value,
    pub codec: CodecId,
}

impl Parameter {
    pub fn new<T: AsValue + Clone + 'static>(value: Option<T>) -> Self {
        let codec = Codec::<T>::new();
        Self {
            value: codec.encode(value.as_ref()),
            codec: codec.id(),
        }
    }
}

/// Parameter bound through the default codec of `T`.
pub fn param<T: AsValue + Clone + 'static>(value: T) -> Expression {
    Parameter::new(Some(value)).into()
}

/// Value written inline in the SQL text instead of being bound.
pub fn literal(value: impl Into<Value>) -> Expression {
    Expression::Literal(value.into())
}

/// Sub-expression of an operator, with its own parenthesization flag.
#[derive(Debug, Clone)]
pub struct Operand {
    pub expression: Expression,
    pub parenthesized: bool,
}

impl Operand {
    /// Non leaf expressions are parenthesized unless told otherwise.
    pub fn new(expression: Expression) -> Self {
        Self {
            parenthesized: !expression.is_leaf(),
            expression,
        }
    }

    pub fn parenthesized(self, parenthesized: bool) -> Self {
        Self {
            parenthesized,
            ..self
        }
    }
}

impl From<Expression> for Operand {
    fn from(value: Expression) -> Self {
        Operand::new(value)
    }
}
