use crate::{
    BinaryOp, Case, ColumnRef, FunctionCall, InList, OrderBy, Parameter, Result, Select,
    SelectItem, TernaryOp, Tuple, UnaryOp, Value, WireType, binary,
    writer::{Context, SqlWriter},
};
use std::sync::Arc;

/// A SQL expression node.
///
/// Nodes are immutable once built, invalid shapes are rejected by the
/// constructors of the variants. Parenthesization is never inferred from the
/// operators: every operand carries its own flag, see [`crate::Operand`].
#[derive(Debug, Clone)]
pub enum Expression {
    Column(ColumnRef),
    Parameter(Parameter),
    /// Value written inline in the SQL text.
    Literal(Value),
    Unary(Box<UnaryOp>),
    Binary(Box<BinaryOp>),
    Ternary(Box<TernaryOp>),
    Function(Box<FunctionCall>),
    Case(Box<Case>),
    In(Box<InList>),
    Tuple(Tuple),
    /// Scalar sub-select.
    Select(Box<Select>),
}

impl Expression {
    /// Result type of the expression, when known.
    pub fn value_type(&self) -> Option<WireType> {
        match self {
            Expression::Column(v) => Some(v.wire_type()),
            Expression::Parameter(v) => Some(v.codec.wire_type),
            Expression::Literal(v) => v.wire_type(),
            Expression::Unary(v) => v.value_type,
            Expression::Binary(v) => v.value_type,
            Expression::Ternary(v) => v.value_type,
            Expression::Function(v) => v.value_type,
            Expression::Case(v) => v.value_type,
            Expression::In(..) => Some(WireType::Boolean),
            Expression::Tuple(v) => match v.elements() {
                [single] => single.value_type(),
                _ => None,
            },
            Expression::Select(v) => v
                .columns
                .first()
                .and_then(|c| c.expression.value_type()),
        }
    }

    /// Leaves render as a single token or a self delimited construct.
    pub fn is_leaf(&self) -> bool {
        match self {
            Expression::Column(..)
            | Expression::Parameter(..)
            | Expression::Literal(..)
            | Expression::Function(..)
            | Expression::Case(..)
            | Expression::Tuple(..)
            | Expression::Select(..) => true,
            Expression::Unary(..)
            | Expression::Binary(..)
            | Expression::Ternary(..)
            | Expression::In(..) => false,
        }
    }

    /// Literal NULL or a parameter bound to NULL.
    pub fn is_null_literal(&self) -> bool {
        match self {
            Expression::Literal(v) => v.is_null(),
            Expression::Parameter(v) => v.value.is_null(),
            _ => false,
        }
    }

    pub fn write_query(
        &self,
        writer: &dyn SqlWriter,
        context: &mut Context,
        out: &mut String,
    ) -> Result<()> {
        match self {
            Expression::Column(v) => writer.write_column_ref(context, out, v),
            Expression::Parameter(v) => writer.write_placeholder(context, out, v),
            Expression::Literal(v) => writer.write_value(context, out, v),
            Expression::Unary(v) => writer.write_expression_unary_op(context, out, v)?,
            Expression::Binary(v) => writer.write_expression_binary_op(context, out, v)?,
            Expression::Ternary(v) => writer.write_expression_ternary_op(context, out, v)?,
            Expression::Function(v) => writer.write_expression_function(context, out, v)?,
            Expression::Case(v) => writer.write_expression_case(context, out, v)?,
            Expression::In(v) => writer.write_expression_in(context, out, v)?,
            Expression::Tuple(v) => writer.write_expression_tuple(context, out, v)?,
            Expression::Select(v) => writer.write_subquery(context, out, v)?,
        }
        Ok(())
    }

    pub fn and(self, rhs: impl Into<Expression>) -> Expression {
        binary(self, &["and"], rhs.into(), Some(WireType::Boolean))
    }

    pub fn or(self, rhs: impl Into<Expression>) -> Expression {
        binary(self, &["or"], rhs.into(), Some(WireType::Boolean))
    }

    pub fn not(self) -> Expression {
        UnaryOp::prefix(&["not"], self, Some(WireType::Boolean)).into()
    }

    pub fn eq(self, rhs: impl Into<Expression>) -> Expression {
        binary(self, &["="], rhs.into(), Some(WireType::Boolean))
    }

    pub fn not_eq(self, rhs: impl Into<Expression>) -> Expression {
        binary(self, &["<>"], rhs.into(), Some(WireType::Boolean))
    }

    pub fn lt(self, rhs: impl Into<Expression>) -> Expression {
        binary(self, &["<"], rhs.into(), Some(WireType::Boolean))
    }

    pub fn lte(self, rhs: impl Into<Expression>) -> Expression {
        binary(self, &["<="], rhs.into(), Some(WireType::Boolean))
    }

    pub fn gt(self, rhs: impl Into<Expression>) -> Expression {
        binary(self, &[">"], rhs.into(), Some(WireType::Boolean))
    }

    pub fn gte(self, rhs: impl Into<Expression>) -> Expression {
        binary(self, &[">="], rhs.into(), Some(WireType::Boolean))
    }

    pub fn is_null(self) -> Expression {
        UnaryOp::postfix(&["is", "null"], self, Some(WireType::Boolean)).into()
    }

    pub fn is_not_null(self) -> Expression {
        UnaryOp::postfix(&["is", "not", "null"], self, Some(WireType::Boolean)).into()
    }

    pub fn asc(self) -> OrderBy {
        OrderBy::new(self, false)
    }

    pub fn desc(self) -> OrderBy {
        OrderBy::new(self, true)
    }

    pub fn labeled(self, label: impl Into<Arc<str>>) -> SelectItem {
        SelectItem::labeled(self, label)
    }
}

impl From<Parameter> for Expression {
    fn from(value: Parameter) -> Self {
        Expression::Parameter(value)
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Literal(value)
    }
}

impl From<UnaryOp> for Expression {
    fn from(value: UnaryOp) -> Self {
        Expression::Unary(value.into())
    }
}

impl From<BinaryOp> for Expression {
    fn from(value: BinaryOp) -> Self {
        Expression::Binary(value.into())
    }
}

impl From<TernaryOp> for Expression {
    fn from(value: TernaryOp) -> Self {
        Expression::Ternary(value.into())
    }
}

impl From<FunctionCall> for Expression {
    fn from(value: FunctionCall) -> Self {
        Expression::Function(value.into())
    }
}

impl From<Case> for Expression {
    fn from(value: Case) -> Self {
        Expression::Case(value.into())
    }
}

impl From<InList> for Expression {
    fn from(value: InList) -> Self {
        Expression::In(value.into())
    }
}

impl From<Tuple> for Expression {
    fn from(value: Tuple) -> Self {
        Expression::Tuple(value)
    }
}

impl From<Select> for Expression {
    fn from(value: Select) -> Self {
        Expression::Select(value.into())
    }
}
