use crate::{Expression, Failure, Result, Select, WireType, literal};
use std::borrow::Cow;

/// `NAME(args...)`
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub name: Cow<'static, str>,
    pub args: Vec<Expression>,
    /// Write `NAME()` instead of `NAME` when there are no arguments.
    pub parens_when_empty: bool,
    pub value_type: Option<WireType>,
}

impl FunctionCall {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        args: impl IntoIterator<Item = Expression>,
        value_type: Option<WireType>,
    ) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
            parens_when_empty: true,
            value_type,
        }
    }

    /// Niladic form, for example `CURRENT_TIMESTAMP`.
    pub fn without_parens(self) -> Self {
        Self {
            parens_when_empty: false,
            ..self
        }
    }
}

/// `COUNT(1)`
pub fn count_all() -> Expression {
    FunctionCall::new("count", [literal(1_i64)], Some(WireType::Int64)).into()
}

pub fn exists(query: Select) -> Expression {
    FunctionCall::new("exists", [query.into()], Some(WireType::Boolean)).into()
}

pub fn not_exists(query: Select) -> Expression {
    FunctionCall::new("not exists", [query.into()], Some(WireType::Boolean)).into()
}

/// First non null argument, typed after the first argument.
pub fn coalesce(args: impl IntoIterator<Item = Expression>) -> Result<Expression> {
    let args: Vec<_> = args.into_iter().collect();
    let Some(first) = args.first() else {
        return Err(Failure::construction("coalesce needs at least one argument"));
    };
    let value_type = first.value_type();
    Ok(FunctionCall::new("coalesce", args, value_type).into())
}
