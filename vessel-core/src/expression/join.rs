use crate::{CodecId, ColumnRef, Expression, Failure, Query, Result, ResultColumn, TableRef};
use std::sync::Arc;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// `left [TYPE] JOIN right ON condition`
#[derive(Debug, Clone)]
pub struct Join {
    pub join_type: JoinType,
    pub left: QuerySource,
    pub right: QuerySource,
    pub on: Option<Expression>,
}

impl Join {
    /// Every join but a cross join needs a condition.
    pub fn new(
        join_type: JoinType,
        left: QuerySource,
        right: QuerySource,
        on: Option<Expression>,
    ) -> Result<Self> {
        if on.is_none() && join_type != JoinType::Cross {
            return Err(Failure::construction(format!(
                "A {:?} join needs a condition",
                join_type
            )));
        }
        Ok(Self {
            join_type,
            left,
            right,
            on,
        })
    }
}

/// Origin of the rows of a select.
#[derive(Debug, Clone)]
pub enum QuerySource {
    Table {
        table: TableRef,
        columns: Arc<[ColumnRef]>,
    },
    Join(Box<Join>),
    /// `(query) alias`, columns are exposed under the alias.
    Derived { query: Box<Query>, alias: Arc<str> },
}

impl QuerySource {
    /// Columns produced by the source, in order.
    pub fn columns(&self) -> Vec<ColumnRef> {
        match self {
            QuerySource::Table { columns, .. } => columns.to_vec(),
            QuerySource::Join(join) => {
                let mut result = join.left.columns();
                result.extend(join.right.columns());
                result
            }
            QuerySource::Derived { query, alias } => {
                let table = TableRef::new(alias.clone()).aliased(alias.clone());
                query
                    .result_columns()
                    .into_iter()
                    .filter_map(|c: ResultColumn| match (c.column, c.label) {
                        (Some(column), None) => Some(column.with_table(&table)),
                        (Some(column), Some(label)) => Some(ColumnRef {
                            name: label,
                            ..column.with_table(&table)
                        }),
                        (None, Some(label)) => Some(ColumnRef {
                            table: table.clone(),
                            name: label,
                            codec: CodecId {
                                wire_type: c.value_type?,
                                native_type: "expression",
                            },
                            primary_key: false,
                            not_null: false,
                        }),
                        (None, None) => None,
                    })
                    .collect()
            }
        }
    }

    /// Whether columns must be qualified to be unambiguous.
    pub fn is_join(&self) -> bool {
        matches!(self, QuerySource::Join(..))
    }

    fn join(self, join_type: JoinType, right: QuerySource, on: Option<Expression>) -> Result<Self> {
        Ok(QuerySource::Join(Box::new(Join::new(
            join_type, self, right, on,
        )?)))
    }

    pub fn inner_join(self, right: QuerySource, on: Expression) -> Result<Self> {
        self.join(JoinType::Inner, right, Some(on))
    }

    pub fn left_join(self, right: QuerySource, on: Expression) -> Result<Self> {
        self.join(JoinType::Left, right, Some(on))
    }

    pub fn right_join(self, right: QuerySource, on: Expression) -> Result<Self> {
        self.join(JoinType::Right, right, Some(on))
    }

    pub fn full_join(self, right: QuerySource, on: Expression) -> Result<Self> {
        self.join(JoinType::Full, right, Some(on))
    }

    pub fn cross_join(self, right: QuerySource) -> Result<Self> {
        self.join(JoinType::Cross, right, None)
    }
}
