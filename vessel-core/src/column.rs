use crate::{
    Assignment, Codec, CodecId, Expression, FunctionCall, InList, OrderBy, Parameter, Result,
    Select, SelectItem, TableRef, UnaryOp, WireType, binary, ternary,
};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// Untyped reference to a table column, as carried by expressions and result rows.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    pub table: TableRef,
    pub name: Arc<str>,
    pub codec: CodecId,
    pub primary_key: bool,
    pub not_null: bool,
}

impl ColumnRef {
    pub fn wire_type(&self) -> WireType {
        self.codec.wire_type
    }

    /// The same column seen through another reference of its table (for example an alias).
    pub fn with_table(&self, table: &TableRef) -> ColumnRef {
        ColumnRef {
            table: table.clone(),
            ..self.clone()
        }
    }
}

/// Columns are identified by name and table reference, alias included.
impl PartialEq for ColumnRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.table == other.table
    }
}

/// Typed handle to a column, produced by `Table::column`.
pub struct Column<T> {
    column_ref: ColumnRef,
    codec: Codec<T>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            column_ref: self.column_ref.clone(),
            codec: self.codec.clone(),
        }
    }
}

impl<T> Debug for Column<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.column_ref, f)
    }
}

/// Right hand side of a typed column operation.
pub enum Argument<T> {
    /// Bound as a parameter through the column codec, `None` binds a typed NULL.
    Value(Option<T>),
    Expression(Expression),
}

impl<T: crate::AsValue> From<T> for Argument<T> {
    fn from(value: T) -> Self {
        Argument::Value(Some(value))
    }
}

impl<T: crate::AsValue> From<Option<T>> for Argument<T> {
    fn from(value: Option<T>) -> Self {
        Argument::Value(value)
    }
}

impl From<&str> for Argument<String> {
    fn from(value: &str) -> Self {
        Argument::Value(Some(value.to_owned()))
    }
}

impl<T> From<&Column<T>> for Argument<T> {
    fn from(value: &Column<T>) -> Self {
        Argument::Expression(value.expression())
    }
}

impl<T> From<Expression> for Argument<T> {
    fn from(value: Expression) -> Self {
        Argument::Expression(value)
    }
}

impl<T: 'static> Argument<T> {
    fn resolve(self, codec: &Codec<T>) -> Expression {
        match self {
            Argument::Value(v) => Expression::Parameter(Parameter {
                value: codec.encode(v.as_ref()),
                codec: codec.id(),
            }),
            Argument::Expression(e) => e,
        }
    }
}

impl<T> Column<T> {
    pub fn column_ref(&self) -> &ColumnRef {
        &self.column_ref
    }

    pub fn name(&self) -> &str {
        &self.column_ref.name
    }

    pub fn codec(&self) -> &Codec<T> {
        &self.codec
    }

    pub fn expression(&self) -> Expression {
        Expression::Column(self.column_ref.clone())
    }
}

impl<T: 'static> Column<T> {
    pub fn new(column_ref: ColumnRef, codec: Codec<T>) -> Self {
        Self { column_ref, codec }
    }

    /// This column as part of `table`, which must be the same table possibly aliased.
    pub fn of(&self, table: &TableRef) -> Column<T> {
        Column {
            column_ref: self.column_ref.with_table(table),
            codec: self.codec.clone(),
        }
    }

    /// A parameter bound through this column codec.
    pub fn param(&self, value: Option<T>) -> Expression {
        Argument::Value(value).resolve(&self.codec)
    }

    fn compare(&self, tokens: &[&'static str], rhs: impl Into<Argument<T>>) -> Expression {
        binary(
            self.expression(),
            tokens,
            rhs.into().resolve(&self.codec),
            Some(WireType::Boolean),
        )
    }

    fn arithmetic(&self, symbol: &'static str, rhs: impl Into<Argument<T>>) -> Expression {
        binary(
            self.expression(),
            &[symbol],
            rhs.into().resolve(&self.codec),
            Some(self.codec.wire_type()),
        )
    }

    pub fn eq(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.compare(&["="], rhs)
    }

    pub fn not_eq(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.compare(&["<>"], rhs)
    }

    pub fn lt(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.compare(&["<"], rhs)
    }

    pub fn lte(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.compare(&["<="], rhs)
    }

    pub fn gt(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.compare(&[">"], rhs)
    }

    pub fn gte(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.compare(&[">="], rhs)
    }

    pub fn like(&self, pattern: impl Into<Argument<T>>) -> Expression {
        self.compare(&["like"], pattern)
    }

    pub fn not_like(&self, pattern: impl Into<Argument<T>>) -> Expression {
        self.compare(&["not", "like"], pattern)
    }

    pub fn between(&self, low: impl Into<Argument<T>>, high: impl Into<Argument<T>>) -> Expression {
        ternary(
            self.expression(),
            &["between"],
            low.into().resolve(&self.codec),
            &["and"],
            high.into().resolve(&self.codec),
            Some(WireType::Boolean),
        )
    }

    pub fn not_between(
        &self,
        low: impl Into<Argument<T>>,
        high: impl Into<Argument<T>>,
    ) -> Expression {
        ternary(
            self.expression(),
            &["not", "between"],
            low.into().resolve(&self.codec),
            &["and"],
            high.into().resolve(&self.codec),
            Some(WireType::Boolean),
        )
    }

    pub fn is_null(&self) -> Expression {
        UnaryOp::postfix(&["is", "null"], self.expression(), Some(WireType::Boolean)).into()
    }

    pub fn is_not_null(&self) -> Expression {
        UnaryOp::postfix(&["is", "not", "null"], self.expression(), Some(WireType::Boolean))
            .into()
    }

    fn list<A: Into<Argument<T>>>(&self, values: impl IntoIterator<Item = A>) -> Vec<Expression> {
        values
            .into_iter()
            .map(|v| v.into().resolve(&self.codec))
            .collect()
    }

    /// `column IN (values...)`, an empty list is rejected.
    pub fn in_list<A: Into<Argument<T>>>(
        &self,
        values: impl IntoIterator<Item = A>,
    ) -> Result<Expression> {
        InList::new(self.expression(), Some(self.list(values)), None, false).map(Into::into)
    }

    pub fn not_in_list<A: Into<Argument<T>>>(
        &self,
        values: impl IntoIterator<Item = A>,
    ) -> Result<Expression> {
        InList::new(self.expression(), Some(self.list(values)), None, true).map(Into::into)
    }

    pub fn in_query(&self, query: Select) -> Result<Expression> {
        InList::new(self.expression(), None, Some(query), false).map(Into::into)
    }

    pub fn not_in_query(&self, query: Select) -> Result<Expression> {
        InList::new(self.expression(), None, Some(query), true).map(Into::into)
    }

    pub fn plus(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.arithmetic("+", rhs)
    }

    pub fn minus(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.arithmetic("-", rhs)
    }

    pub fn times(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.arithmetic("*", rhs)
    }

    pub fn div(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.arithmetic("/", rhs)
    }

    pub fn rem(&self, rhs: impl Into<Argument<T>>) -> Expression {
        self.arithmetic("%", rhs)
    }

    pub fn neg(&self) -> Expression {
        UnaryOp::prefix(&["-"], self.expression(), Some(self.codec.wire_type())).into()
    }

    pub fn asc(&self) -> OrderBy {
        OrderBy::new(self.expression(), false)
    }

    pub fn desc(&self) -> OrderBy {
        OrderBy::new(self.expression(), true)
    }

    /// `column = value` for insert and update statements.
    pub fn set(&self, value: impl Into<Argument<T>>) -> Result<Assignment> {
        Assignment::new(self.column_ref.clone(), value.into().resolve(&self.codec))
    }

    pub fn labeled(&self, label: impl Into<Arc<str>>) -> SelectItem {
        SelectItem::labeled(self.expression(), label)
    }

    pub fn count(&self) -> Expression {
        FunctionCall::new("count", [self.expression()], Some(WireType::Int64)).into()
    }

    pub fn sum(&self) -> Expression {
        FunctionCall::new("sum", [self.expression()], Some(self.codec.wire_type())).into()
    }

    pub fn avg(&self) -> Expression {
        FunctionCall::new("avg", [self.expression()], Some(WireType::Float64)).into()
    }

    pub fn min(&self) -> Expression {
        FunctionCall::new("min", [self.expression()], Some(self.codec.wire_type())).into()
    }

    pub fn max(&self) -> Expression {
        FunctionCall::new("max", [self.expression()], Some(self.codec.wire_type())).into()
    }

    pub fn lower(&self) -> Expression {
        FunctionCall::new("lower", [self.expression()], Some(WireType::Varchar)).into()
    }

    pub fn upper(&self) -> Expression {
        FunctionCall::new("upper", [self.expression()], Some(WireType::Varchar)).into()
    }

    pub fn length(&self) -> Expression {
        FunctionCall::new("length", [self.expression()], Some(WireType::Int64)).into()
    }
}

impl<T> From<&Column<T>> for Expression {
    fn from(value: &Column<T>) -> Self {
        value.expression()
    }
}

impl<T> From<&Column<T>> for SelectItem {
    fn from(value: &Column<T>) -> Self {
        SelectItem::new(value.expression())
    }
}
