use crate::{Expression, Operand, Operator, WireType};

/// Operator applied to a single operand, written before (`NOT x`) or after (`x IS NULL`) it.
#[derive(Debug, Clone)]
pub struct UnaryOp {
    pub operator: Operator,
    pub operand: Operand,
    pub postfix: bool,
    pub value_type: Option<WireType>,
}

impl UnaryOp {
    pub fn new(
        operator: Operator,
        operand: impl Into<Operand>,
        postfix: bool,
        value_type: Option<WireType>,
    ) -> Self {
        Self {
            operator,
            operand: operand.into(),
            postfix,
            value_type,
        }
    }

    pub(crate) fn prefix(
        tokens: &[&'static str],
        operand: Expression,
        value_type: Option<WireType>,
    ) -> Self {
        Self::new(Operator::of(tokens), operand, false, value_type)
    }

    pub(crate) fn postfix(
        tokens: &[&'static str],
        operand: Expression,
        value_type: Option<WireType>,
    ) -> Self {
        Self::new(Operator::of(tokens), operand, true, value_type)
    }
}
