use crate::{Expression, Failure, Operand, Result, WireType};
use std::borrow::Cow;

/// Operator made of one or more keyword or symbol tokens, for example `NOT LIKE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    tokens: Vec<Cow<'static, str>>,
}

impl Operator {
    pub fn new<T: Into<Cow<'static, str>>>(tokens: impl IntoIterator<Item = T>) -> Result<Self> {
        let tokens: Vec<_> = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t: &Cow<'static, str>| !t.trim().is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(Failure::construction("An operator needs at least one token"));
        }
        Ok(Self { tokens })
    }

    pub(crate) fn of(tokens: &[&'static str]) -> Self {
        debug_assert!(!tokens.is_empty());
        Self {
            tokens: tokens.iter().map(|t| Cow::Borrowed(*t)).collect(),
        }
    }

    pub fn tokens(&self) -> &[Cow<'static, str>] {
        &self.tokens
    }
}

/// `left OP right`
#[derive(Debug, Clone)]
pub struct BinaryOp {
    pub left: Operand,
    pub operator: Operator,
    pub right: Operand,
    pub value_type: Option<WireType>,
}

impl BinaryOp {
    pub fn new(
        left: impl Into<Operand>,
        operator: Operator,
        right: impl Into<Operand>,
        value_type: Option<WireType>,
    ) -> Self {
        Self {
            left: left.into(),
            operator,
            right: right.into(),
            value_type,
        }
    }
}

/// `first OP second OP2 third`, for example `BETWEEN .. AND ..`.
#[derive(Debug, Clone)]
pub struct TernaryOp {
    pub first: Operand,
    pub operator: Operator,
    pub second: Operand,
    pub operator2: Operator,
    pub third: Operand,
    pub value_type: Option<WireType>,
}

impl TernaryOp {
    pub fn new(
        first: impl Into<Operand>,
        operator: Operator,
        second: impl Into<Operand>,
        operator2: Operator,
        third: impl Into<Operand>,
        value_type: Option<WireType>,
    ) -> Self {
        Self {
            first: first.into(),
            operator,
            second: second.into(),
            operator2,
            third: third.into(),
            value_type,
        }
    }
}

pub(crate) fn binary(
    left: Expression,
    tokens: &[&'static str],
    right: Expression,
    value_type: Option<WireType>,
) -> Expression {
    BinaryOp::new(left, Operator::of(tokens), right, value_type).into()
}

pub(crate) fn ternary(
    first: Expression,
    tokens: &[&'static str],
    second: Expression,
    tokens2: &[&'static str],
    third: Expression,
    value_type: Option<WireType>,
) -> Expression {
    TernaryOp::new(
        first,
        Operator::of(tokens),
        second,
        Operator::of(tokens2),
        third,
        value_type,
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_needs_tokens() {
        assert!(Operator::new(Vec::<&'static str>::new()).is_err());
        assert!(Operator::new([" "]).is_err());
        let op = Operator::new(["not", "like"]).unwrap();
        assert_eq!(op.tokens(), ["not", "like"]);
    }
}
