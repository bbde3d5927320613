use crate::Expression;

/// Sort key of an ORDER BY clause.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub expression: Expression,
    pub descending: bool,
}

impl OrderBy {
    pub fn new(expression: Expression, descending: bool) -> Self {
        Self {
            expression,
            descending,
        }
    }
}
