use crate::{
    AsValue, Assignment, ColumnRef, Expression, Failure, OrderBy, Parameter, QuerySource, Result,
    ResultColumn, TableRef, check_not_null, count_all,
};
use std::{
    fmt::{self, Display, Formatter},
    sync::Arc,
};

/// Compiled statement: SQL text and the parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlAndParams {
    pub sql: String,
    pub params: Vec<Parameter>,
}

impl Display for SqlAndParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Projected expression, optionally labeled with `AS`.
#[derive(Debug, Clone)]
pub struct SelectItem {
    pub expression: Expression,
    pub label: Option<Arc<str>>,
}

impl SelectItem {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            label: None,
        }
    }

    pub fn labeled(expression: Expression, label: impl Into<Arc<str>>) -> Self {
        Self {
            expression,
            label: Some(label.into()),
        }
    }

    fn result_column(&self) -> ResultColumn {
        ResultColumn {
            column: match &self.expression {
                Expression::Column(c) => Some(c.clone()),
                _ => None,
            },
            label: self.label.clone(),
            value_type: self.expression.value_type(),
        }
    }
}

impl From<Expression> for SelectItem {
    fn from(value: Expression) -> Self {
        SelectItem::new(value)
    }
}

#[derive(Debug, Clone)]
pub struct Select {
    /// Empty selects every column of the source.
    pub columns: Vec<SelectItem>,
    pub from: Option<QuerySource>,
    pub filter: Option<Expression>,
    pub distinct: bool,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl From<QuerySource> for Select {
    fn from(value: QuerySource) -> Self {
        Select::with_source(Some(value))
    }
}

impl Select {
    fn with_source(from: Option<QuerySource>) -> Self {
        Select {
            columns: Vec::new(),
            from,
            filter: None,
            distinct: false,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Select without a source, for example `SELECT 1`. Fails without columns.
    pub fn new<I: Into<SelectItem>>(columns: impl IntoIterator<Item = I>) -> Result<Self> {
        let select = Select::with_source(None).columns(columns);
        select.validate()?;
        Ok(select)
    }

    pub fn columns<I: Into<SelectItem>>(mut self, items: impl IntoIterator<Item = I>) -> Self {
        self.columns.extend(items.into_iter().map(Into::into));
        self
    }

    pub fn column(mut self, item: impl Into<SelectItem>) -> Self {
        self.columns.push(item.into());
        self
    }

    /// Add a WHERE condition, joined with AND to the existing one.
    pub fn filter(mut self, condition: Expression) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(current) => current.and(condition),
            None => condition,
        });
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn group_by(mut self, expressions: impl IntoIterator<Item = Expression>) -> Self {
        self.group_by.extend(expressions);
        self
    }

    pub fn having(mut self, condition: Expression) -> Self {
        self.having = Some(condition);
        self
    }

    pub fn order_by(mut self, order: impl IntoIterator<Item = OrderBy>) -> Self {
        self.order_by.extend(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() && self.from.is_none() {
            return Err(Failure::construction(
                "A select needs explicit columns or a source to take them from",
            ));
        }
        Ok(())
    }

    /// Columns of the result rows, in order.
    pub fn result_columns(&self) -> Vec<ResultColumn> {
        if self.columns.is_empty() {
            return self
                .from
                .iter()
                .flat_map(QuerySource::columns)
                .map(ResultColumn::from)
                .collect();
        }
        self.columns.iter().map(SelectItem::result_column).collect()
    }

    /// `SELECT COUNT(1)` over the same rows, ignoring ordering and pagination.
    pub fn count_query(&self) -> Result<Select> {
        self.validate()?;
        let stripped = Select {
            order_by: Vec::new(),
            limit: None,
            offset: None,
            ..self.clone()
        };
        if self.distinct || !self.group_by.is_empty() || self.from.is_none() {
            return Ok(Select::from(QuerySource::Derived {
                query: Box::new(stripped.into()),
                alias: "count_source".into(),
            })
            .column(count_all()));
        }
        Ok(Select {
            columns: vec![count_all().into()],
            ..stripped
        })
    }
}

/// Statement producing rows: a select or a union of queries.
#[derive(Debug, Clone)]
pub enum Query {
    Select(Select),
    Union(Union),
}

impl Query {
    pub fn result_columns(&self) -> Vec<ResultColumn> {
        match self {
            Query::Select(v) => v.result_columns(),
            Query::Union(v) => v.left.result_columns(),
        }
    }

    /// Expose the query as a derived source named `alias`.
    pub fn aliased(self, alias: impl Into<Arc<str>>) -> QuerySource {
        QuerySource::Derived {
            query: Box::new(self),
            alias: alias.into(),
        }
    }
}

impl From<Select> for Query {
    fn from(value: Select) -> Self {
        Query::Select(value)
    }
}

impl From<Union> for Query {
    fn from(value: Union) -> Self {
        Query::Union(value)
    }
}

/// `left UNION [ALL] right`
#[derive(Debug, Clone)]
pub struct Union {
    pub left: Box<Query>,
    pub right: Box<Query>,
    pub all: bool,
    /// Wrap each side in parentheses.
    pub parenthesized: bool,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Union {
    /// Both sides must produce the same number of columns.
    pub fn new(left: impl Into<Query>, right: impl Into<Query>, all: bool) -> Result<Self> {
        let (left, right) = (left.into(), right.into());
        let (l, r) = (left.result_columns().len(), right.result_columns().len());
        if l != r {
            return Err(Failure::construction(format!(
                "Both sides of a union must have the same number of columns, found {} and {}",
                l, r
            )));
        }
        Ok(Self {
            left: Box::new(left),
            right: Box::new(right),
            all,
            parenthesized: false,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        })
    }

    pub fn parenthesized(mut self, parenthesized: bool) -> Self {
        self.parenthesized = parenthesized;
        self
    }

    pub fn order_by(mut self, order: impl IntoIterator<Item = OrderBy>) -> Self {
        self.order_by.extend(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// `INSERT INTO table (columns) VALUES (...), ...` or `INSERT INTO table (columns) SELECT ...`.
#[derive(Debug, Clone)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<ColumnRef>,
    pub rows: Vec<Vec<Expression>>,
    pub query: Option<Box<Select>>,
}

impl Insert {
    /// Exactly one of `rows` and `query` must be given.
    pub fn new(
        table: TableRef,
        columns: Vec<ColumnRef>,
        rows: Option<Vec<Vec<Expression>>>,
        query: Option<Select>,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(Failure::construction("An insert needs at least one column"));
        }
        match (rows, query) {
            (Some(..), Some(..)) => Err(Failure::construction(
                "An insert takes either values or a select, not both",
            )),
            (None, None) => Err(Failure::construction(
                "An insert needs values or a select",
            )),
            (Some(rows), None) => {
                if rows.is_empty() {
                    return Err(Failure::construction("An insert needs at least one row"));
                }
                for row in &rows {
                    if row.len() != columns.len() {
                        return Err(Failure::construction(format!(
                            "Insert into `{}` declares {} columns but a row has {} values",
                            table.name,
                            columns.len(),
                            row.len()
                        )));
                    }
                    for (column, value) in columns.iter().zip(row) {
                        check_not_null(column, value)?;
                    }
                }
                Ok(Self {
                    table,
                    columns,
                    rows,
                    query: None,
                })
            }
            (None, Some(query)) => {
                query.validate()?;
                let produced = query.result_columns().len();
                if produced != columns.len() {
                    return Err(Failure::construction(format!(
                        "Insert into `{}` declares {} columns but the select produces {}",
                        table.name,
                        columns.len(),
                        produced
                    )));
                }
                Ok(Self {
                    table,
                    columns,
                    rows: Vec::new(),
                    query: Some(Box::new(query)),
                })
            }
        }
    }

    /// Single row insert from `column = value` assignments.
    pub fn assignments(
        table: TableRef,
        assignments: impl IntoIterator<Item = Assignment>,
    ) -> Result<Self> {
        let (columns, row) = assignments
            .into_iter()
            .map(|v| (v.column, v.value))
            .unzip();
        Self::new(table, columns, Some(vec![row]), None)
    }

    pub fn values(
        table: TableRef,
        columns: Vec<ColumnRef>,
        rows: Vec<Vec<Expression>>,
    ) -> Result<Self> {
        Self::new(table, columns, Some(rows), None)
    }

    pub fn select(table: TableRef, columns: Vec<ColumnRef>, query: Select) -> Result<Self> {
        Self::new(table, columns, None, Some(query))
    }
}

/// `UPDATE table SET assignments [WHERE filter]`
#[derive(Debug, Clone)]
pub struct Update {
    pub table: TableRef,
    pub assignments: Vec<Assignment>,
    pub filter: Option<Expression>,
}

impl Update {
    pub fn new(table: TableRef, assignments: impl IntoIterator<Item = Assignment>) -> Result<Self> {
        let assignments: Vec<_> = assignments.into_iter().collect();
        if assignments.is_empty() {
            return Err(Failure::construction("An update needs at least one assignment"));
        }
        Ok(Self {
            table,
            assignments,
            filter: None,
        })
    }

    pub fn filter(mut self, condition: Expression) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(current) => current.and(condition),
            None => condition,
        });
        self
    }
}

/// `DELETE FROM table [WHERE filter]`
#[derive(Debug, Clone)]
pub struct Delete {
    pub table: TableRef,
    pub filter: Option<Expression>,
}

impl Delete {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            filter: None,
        }
    }

    pub fn filter(mut self, condition: Expression) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(current) => current.and(condition),
            None => condition,
        });
        self
    }
}

/// SQL text written by hand, with `?` placeholders matching `params`.
#[derive(Debug, Clone)]
pub struct Raw {
    pub sql: String,
    pub params: Vec<Parameter>,
}

impl Raw {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.params.push(parameter);
        self
    }

    pub fn bind<T: AsValue + Clone + 'static>(self, value: impl Into<Option<T>>) -> Self {
        self.param(Parameter::new(value.into()))
    }
}

/// Any statement the writers can compile.
#[derive(Debug, Clone)]
pub enum Statement {
    Select(Select),
    Union(Union),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    Raw(Raw),
}

impl Statement {
    /// Columns of the produced rows, `None` for raw SQL and effect producing statements.
    pub fn result_columns(&self) -> Option<Vec<ResultColumn>> {
        match self {
            Statement::Select(v) => Some(v.result_columns()),
            Statement::Union(v) => Some(v.left.result_columns()),
            _ => None,
        }
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Select(value)
    }
}

impl From<Union> for Statement {
    fn from(value: Union) -> Self {
        Statement::Union(value)
    }
}

impl From<Query> for Statement {
    fn from(value: Query) -> Self {
        match value {
            Query::Select(v) => Statement::Select(v),
            Query::Union(v) => Statement::Union(v),
        }
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}

impl From<Raw> for Statement {
    fn from(value: Raw) -> Self {
        Statement::Raw(value)
    }
}

impl From<&str> for Statement {
    fn from(value: &str) -> Self {
        Statement::Raw(Raw::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Codec, Failure, Table, literal};

    #[derive(Default)]
    struct Item {
        id: i64,
    }

    fn failure(error: crate::Error) -> Failure {
        error.downcast::<Failure>().unwrap()
    }

    #[test]
    fn select_without_columns_and_source() {
        let error = Select::new(Vec::<Expression>::new()).unwrap_err();
        assert!(matches!(failure(error), Failure::Construction(..)));
        let select = Select::new([literal(1_i64)]).unwrap();
        assert!(select.validate().is_ok());
        let emptied = Select {
            columns: Vec::new(),
            ..select
        };
        assert!(matches!(failure(emptied.validate().unwrap_err()), Failure::Construction(..)));
    }

    #[test]
    fn insert_values_and_select_are_exclusive() {
        let mut items = Table::<Item>::new("items");
        let id = items
            .column("id", Codec::<i64>::new())
            .accessor(|v| v.id, |v, id| v.id = id)
            .build();
        let error = Insert::new(
            items.table_ref().clone(),
            vec![id.column_ref().clone()],
            Some(vec![vec![id.param(Some(1))]]),
            Some(items.select().column(&id)),
        )
        .unwrap_err();
        assert!(matches!(failure(error), Failure::Construction(..)));
        let error = Insert::values(
            items.table_ref().clone(),
            vec![id.column_ref().clone()],
            vec![vec![id.param(Some(1)), id.param(Some(2))]],
        )
        .unwrap_err();
        assert!(matches!(failure(error), Failure::Construction(..)));
    }

    #[test]
    fn union_column_count() {
        let mut items = Table::<Item>::new("items");
        let id = items.column("id", Codec::<i64>::new()).build();
        let name = items.column("name", Codec::<String>::new()).build();
        assert!(Union::new(items.select(), items.select(), false).is_ok());
        let error =
            Union::new(items.select().column(&id), items.select(), true).unwrap_err();
        assert!(matches!(failure(error), Failure::Construction(..)));
        assert!(Union::new(items.select().column(&id), items.select().column(&name), true).is_ok());
    }

    #[test]
    fn count_query_drops_pagination() {
        let mut items = Table::<Item>::new("items");
        let id = items.column("id", Codec::<i64>::new()).build();
        let select = items
            .select()
            .filter(id.gt(5))
            .order_by([id.desc()])
            .limit(10);
        let count = select.count_query().unwrap();
        assert_eq!(count.columns.len(), 1);
        assert!(count.filter.is_some());
        assert!(count.order_by.is_empty());
        assert_eq!(count.limit, None);
        let grouped = items.select().column(&id).group_by([id.expression()]);
        let count = grouped.count_query().unwrap();
        assert!(matches!(count.from, Some(QuerySource::Derived { .. })));
    }
}
