use crate::{Expression, Failure, Operand, Result, Select};

/// `operand [NOT] IN (list)` or `operand [NOT] IN (subquery)`.
#[derive(Debug, Clone)]
pub struct InList {
    pub operand: Operand,
    pub values: Vec<Expression>,
    pub query: Option<Box<Select>>,
    pub negated: bool,
}

impl InList {
    /// Exactly one of `values` and `query` must be given, a list can not be empty.
    pub fn new(
        operand: impl Into<Operand>,
        values: Option<Vec<Expression>>,
        query: Option<Select>,
        negated: bool,
    ) -> Result<Self> {
        let (values, query) = match (values, query) {
            (Some(..), Some(..)) => {
                return Err(Failure::construction(
                    "An in expression takes either a list of values or a subquery, not both",
                ));
            }
            (None, None) => {
                return Err(Failure::construction(
                    "An in expression needs a list of values or a subquery",
                ));
            }
            (Some(values), None) if values.is_empty() => {
                return Err(Failure::construction(
                    "An in expression needs at least one value",
                ));
            }
            (Some(values), None) => (values, None),
            (None, Some(query)) => (Vec::new(), Some(Box::new(query))),
        };
        Ok(Self {
            operand: operand.into(),
            values,
            query,
            negated,
        })
    }
}
