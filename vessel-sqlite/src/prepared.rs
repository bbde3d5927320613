use crate::extract::{extract_value, to_sqlite};
use rusqlite::types::{Null, ValueRef};
use vessel_core::{Prepared, Result, Row, RowsAffected, Value, WireType};

pub struct SqlitePrepared<'c> {
    statement: rusqlite::Statement<'c>,
    generated_keys: bool,
}

impl<'c> SqlitePrepared<'c> {
    pub(crate) fn new(statement: rusqlite::Statement<'c>, generated_keys: bool) -> Self {
        Self {
            statement,
            generated_keys,
        }
    }
}

impl Prepared for SqlitePrepared<'_> {
    fn bind(&mut self, index: usize, value: &Value) -> Result<()> {
        self.statement
            .raw_bind_parameter(index + 1, to_sqlite(value)?)?;
        Ok(())
    }

    fn bind_null(&mut self, index: usize, _wire_type: WireType) -> Result<()> {
        self.statement.raw_bind_parameter(index + 1, Null)?;
        Ok(())
    }

    fn execute_update(&mut self) -> Result<RowsAffected> {
        if !self.generated_keys {
            let rows_affected = self.statement.raw_execute()?;
            return Ok(RowsAffected {
                rows_affected: rows_affected as u64,
                ..Default::default()
            });
        }
        let mut result = RowsAffected::default();
        let mut rows = self.statement.raw_query();
        while let Some(row) = rows.next()? {
            result.rows_affected += 1;
            result.generated_keys.push(extract_value(row.get_ref(0)?)?);
        }
        Ok(result)
    }

    fn execute_query(&mut self, row: &mut dyn FnMut(&dyn Row) -> Result<()>) -> Result<()> {
        let labels: Vec<String> = self
            .statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let mut rows = self.statement.raw_query();
        while let Some(current) = rows.next()? {
            row(&SqliteRow {
                row: current,
                labels: &labels,
            })?;
        }
        Ok(())
    }
}

struct SqliteRow<'a, 'stmt> {
    row: &'a rusqlite::Row<'stmt>,
    labels: &'a [String],
}

impl Row for SqliteRow<'_, '_> {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn label(&self, index: usize) -> &str {
        self.labels.get(index).map(String::as_str).unwrap_or_default()
    }

    fn value(&self, index: usize) -> Result<Value> {
        extract_value(self.row.get_ref(index)?)
    }

    fn was_null(&self, index: usize) -> bool {
        matches!(self.row.get_ref(index), Ok(ValueRef::Null) | Err(..))
    }
}
