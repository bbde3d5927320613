use crate::{ColumnRef, Expression, Failure, Result};

/// `column = value` in insert and update statements.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub column: ColumnRef,
    pub value: Expression,
}

impl Assignment {
    /// Fails when a NULL literal is assigned to a not null column.
    pub fn new(column: ColumnRef, value: impl Into<Expression>) -> Result<Self> {
        let value = value.into();
        check_not_null(&column, &value)?;
        Ok(Self { column, value })
    }
}

pub(crate) fn check_not_null(column: &ColumnRef, value: &Expression) -> Result<()> {
    if column.not_null && value.is_null_literal() {
        return Err(Failure::construction(format!(
            "Column `{}.{}` is not null and can not be assigned NULL",
            column.table.name, column.name
        )));
    }
    Ok(())
}
