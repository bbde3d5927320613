use crate::{Result, RowsAffected, Value, WireType};

/// A statement prepared on a connection.
///
/// # Binding Semantics
/// * Indexes start from 0 and follow the placeholder order of the SQL text.
/// * `bind` never receives a null value, nulls go through `bind_null` with the
///   wire type of the parameter so the driver can pick the right NULL encoding.
pub trait Prepared {
    fn bind(&mut self, index: usize, value: &Value) -> Result<()>;

    fn bind_null(&mut self, index: usize, wire_type: WireType) -> Result<()>;

    /// Run an effect producing statement.
    fn execute_update(&mut self) -> Result<RowsAffected>;

    /// Run a result producing statement, `row` is called once per row in store order.
    fn execute_query(&mut self, row: &mut dyn FnMut(&dyn Row) -> Result<()>) -> Result<()>;
}

/// Positional access to the fields of a result row.
pub trait Row {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label the store assigned to the field.
    fn label(&self, index: usize) -> &str;

    fn value(&self, index: usize) -> Result<Value>;

    /// Whether the store reported NULL for the field, independently from the extracted value.
    fn was_null(&self, index: usize) -> bool;
}
