use crate::{AsValue, Codec, Column, ColumnRef, Failure, Result, Row, Value, WireType};
use std::sync::Arc;

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Store assigned keys, in the order the rows were inserted.
    pub generated_keys: Vec<Value>,
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            self.generated_keys.extend(elem.generated_keys);
        }
    }
}

/// Describes a field of the result rows as declared by the statement.
#[derive(Debug, Clone)]
pub struct ResultColumn {
    /// The table column, when the field selects one directly.
    pub column: Option<ColumnRef>,
    pub label: Option<Arc<str>>,
    pub value_type: Option<WireType>,
}

impl ResultColumn {
    /// Whether this field carries `column`.
    pub fn is(&self, column: &ColumnRef) -> bool {
        self.column.as_ref() == Some(column)
    }
}

impl From<ColumnRef> for ResultColumn {
    fn from(value: ColumnRef) -> Self {
        Self {
            value_type: Some(value.wire_type()),
            column: Some(value),
            label: None,
        }
    }
}

/// Shared reference-counted column label list.
pub type RowNames = Arc<[String]>;

/// A materialized result row with its labels.
#[derive(Debug, Clone)]
pub struct RowLabeled {
    pub labels: RowNames,
    pub columns: Arc<[ResultColumn]>,
    pub values: Box<[Value]>,
    nulls: Box<[bool]>,
}

impl RowLabeled {
    /// Copy every field of a driver row.
    pub fn read(row: &dyn Row, labels: RowNames, columns: Arc<[ResultColumn]>) -> Result<Self> {
        let mut values = Vec::with_capacity(row.len());
        let mut nulls = Vec::with_capacity(row.len());
        for i in 0..row.len() {
            values.push(row.value(i)?);
            nulls.push(row.was_null(i));
        }
        Ok(Self {
            labels,
            columns,
            values: values.into(),
            nulls: nulls.into(),
        })
    }

    pub fn names(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v.eq_ignore_ascii_case(name))
            .map(|i| &self.values[i])
    }

    fn position(&self, column: &ColumnRef) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.is(column))
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.label.as_deref() == Some(&*column.name))
            })
            .or_else(|| {
                self.labels
                    .iter()
                    .position(|v| v.eq_ignore_ascii_case(&column.name))
            })
    }

    /// Decode the field carrying `column` with its codec.
    pub fn get<T: 'static>(&self, column: &Column<T>) -> Result<Option<T>> {
        let Some(index) = self.position(column.column_ref()) else {
            return Err(Failure::usage(format!(
                "Column `{}` is not part of the result",
                column.name()
            )));
        };
        column.codec().extract(self, index)
    }

    /// Decode the field at `index` with the default codec of `T`.
    pub fn get_index<T: AsValue + Clone + 'static>(&self, index: usize) -> Result<Option<T>> {
        if index >= self.values.len() {
            return Err(Failure::usage(format!(
                "Field {} is out of bounds, the row has {} fields",
                index,
                self.values.len()
            )));
        }
        Codec::<T>::new().extract(self, index)
    }

    /// Decode the field labeled `label` with the default codec of `T`.
    pub fn get_label<T: AsValue + Clone + 'static>(&self, label: &str) -> Result<Option<T>> {
        let Some(index) = self.labels.iter().position(|v| v.eq_ignore_ascii_case(label)) else {
            return Err(Failure::usage(format!("No field labeled `{}`", label)));
        };
        Codec::<T>::new().extract(self, index)
    }
}

impl Row for RowLabeled {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn label(&self, index: usize) -> &str {
        self.labels.get(index).map(String::as_str).unwrap_or_default()
    }

    fn value(&self, index: usize) -> Result<Value> {
        self.values.get(index).cloned().ok_or_else(|| {
            Failure::usage(format!(
                "Field {} is out of bounds, the row has {} fields",
                index,
                self.values.len()
            ))
        })
    }

    fn was_null(&self, index: usize) -> bool {
        self.nulls.get(index).copied().unwrap_or(true)
    }
}

/// Every row of a query, read into memory.
#[derive(Default, Debug, Clone)]
pub struct QueryResult {
    pub rows: Vec<RowLabeled>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&RowLabeled> {
        self.rows.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowLabeled> {
        self.rows.iter()
    }
}

impl IntoIterator for QueryResult {
    type Item = RowLabeled;
    type IntoIter = std::vec::IntoIter<RowLabeled>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a RowLabeled;
    type IntoIter = std::slice::Iter<'a, RowLabeled>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Table, WireType};

    #[derive(Default)]
    struct Book {
        title: String,
    }

    #[test]
    fn fields_by_column_label_and_index() {
        let mut books = Table::<Book>::new("books");
        let title = books
            .column("title", Codec::<String>::new())
            .accessor(|b| b.title.clone(), |b, v| b.title = v)
            .build();
        let pages = books.column("pages", Codec::<i32>::new()).build();
        let columns: Arc<[ResultColumn]> = books
            .columns()
            .iter()
            .cloned()
            .map(ResultColumn::from)
            .collect();
        let row = RowLabeled {
            labels: ["title".to_string(), "pages".to_string()].into(),
            columns,
            values: [Value::Varchar(Some("Dune".into())), Value::Int32(Some(0))].into(),
            nulls: [false, false].into(),
        };
        assert_eq!(row.get(&title).unwrap(), Some("Dune".to_string()));
        assert_eq!(row.get(&pages).unwrap(), Some(0));
        assert_eq!(row.get_index::<i64>(1).unwrap(), Some(0));
        assert_eq!(row.get_label::<String>("TITLE").unwrap().as_deref(), Some("Dune"));
        assert!(row.get_index::<i64>(2).is_err());
        let book = books.decode(&row, &row.columns).unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(Value::null_of(WireType::Int32), Value::Int32(None));
    }

    #[test]
    fn null_indicator_wins() {
        let row = RowLabeled {
            labels: ["n".to_string()].into(),
            columns: Arc::new([]),
            values: [Value::Int64(Some(0))].into(),
            nulls: [true].into(),
        };
        assert_eq!(row.get_index::<i64>(0).unwrap(), None);
    }
}
