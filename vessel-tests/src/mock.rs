use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use vessel::{
    Connection, Driver, Error, Isolation, Prepared, Result, Row, RowsAffected, StoreMetadata,
    Value, WireType,
};

/// Error the mock returns for statements scripted to violate a unique constraint.
#[derive(Debug, thiserror::Error)]
#[error("UNIQUE constraint failed: {constraint}")]
pub struct UniqueViolation {
    pub constraint: String,
}

/// Everything a [`MockDriver`] was asked to do, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Open(usize),
    Prepare { sql: String, generated_keys: bool },
    Bind(usize, Value),
    BindNull(usize, WireType),
    Execute(String),
    Commit(usize),
    Rollback(usize),
    SetIsolation(usize, Isolation),
    SetAutocommit(usize, bool),
    Close(usize),
}

#[derive(Debug, Clone)]
struct Rows {
    labels: Vec<String>,
    rows: Vec<Vec<Value>>,
}

#[derive(Debug)]
struct State {
    metadata: StoreMetadata,
    events: Vec<Event>,
    connections: usize,
    isolation: Option<Isolation>,
    unique_violations: Vec<(String, String)>,
    fail_autocommit: bool,
    responses: VecDeque<Rows>,
    next_key: i64,
}

/// Driver that records every call and answers with scripted results.
///
/// Clones share the same recording, keep one to inspect what a `Database` did.
#[derive(Debug, Clone)]
pub struct MockDriver {
    state: Arc<Mutex<State>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                metadata: StoreMetadata {
                    product_name: "MockDB".into(),
                    product_version: "1.0".into(),
                    ..Default::default()
                },
                events: Vec::new(),
                connections: 0,
                isolation: Some(Isolation::ReadCommitted),
                unique_violations: Vec::new(),
                fail_autocommit: false,
                responses: VecDeque::new(),
                next_key: 1,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_metadata(self, metadata: StoreMetadata) -> Self {
        self.state().metadata = metadata;
        self
    }

    /// Statements starting with `prefix` fail with a [`UniqueViolation`] on `constraint`.
    pub fn fail_with_unique_violation(&self, prefix: &str, constraint: &str) {
        self.state()
            .unique_violations
            .push((prefix.into(), constraint.into()));
    }

    /// Disabling autocommit fails, as if the store dropped the session.
    pub fn fail_autocommit(&self) {
        self.state().fail_autocommit = true;
    }

    /// Rows returned by the next query.
    pub fn respond(&self, labels: &[&str], rows: Vec<Vec<Value>>) {
        self.state().responses.push_back(Rows {
            labels: labels.iter().map(ToString::to_string).collect(),
            rows,
        });
    }

    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    pub fn clear(&self) {
        self.state().events.clear();
    }

    pub fn count(&self, matches: impl Fn(&Event) -> bool) -> usize {
        self.state().events.iter().filter(|e| matches(e)).count()
    }

    pub fn commits(&self) -> usize {
        self.count(|e| matches!(e, Event::Commit(..)))
    }

    pub fn rollbacks(&self) -> usize {
        self.count(|e| matches!(e, Event::Rollback(..)))
    }

    pub fn opened(&self) -> usize {
        self.count(|e| matches!(e, Event::Open(..)))
    }

    pub fn closed(&self) -> usize {
        self.count(|e| matches!(e, Event::Close(..)))
    }

    /// SQL text of every prepared statement.
    pub fn statements(&self) -> Vec<String> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Prepare { sql, .. } => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Driver for MockDriver {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn connect(&self) -> Result<Box<dyn Connection>> {
        let mut state = self.state();
        state.connections += 1;
        let id = state.connections;
        state.events.push(Event::Open(id));
        Ok(Box::new(MockConnection {
            id,
            driver: self.clone(),
            autocommit: true,
            isolation: state.isolation,
        }))
    }
}

pub struct MockConnection {
    id: usize,
    driver: MockDriver,
    autocommit: bool,
    isolation: Option<Isolation>,
}

impl MockConnection {
    fn record(&self, event: Event) {
        self.driver.state().events.push(event);
    }
}

impl Connection for MockConnection {
    fn prepare<'c>(
        &'c mut self,
        sql: &str,
        generated_keys: bool,
    ) -> Result<Box<dyn Prepared + 'c>> {
        self.record(Event::Prepare {
            sql: sql.into(),
            generated_keys,
        });
        Ok(Box::new(MockPrepared {
            driver: self.driver.clone(),
            sql: sql.into(),
            generated_keys,
        }))
    }

    fn commit(&mut self) -> Result<()> {
        self.record(Event::Commit(self.id));
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.record(Event::Rollback(self.id));
        Ok(())
    }

    fn isolation(&mut self) -> Result<Option<Isolation>> {
        Ok(self.isolation)
    }

    fn set_isolation(&mut self, isolation: Isolation) -> Result<()> {
        self.record(Event::SetIsolation(self.id, isolation));
        self.isolation = Some(isolation);
        Ok(())
    }

    fn autocommit(&mut self) -> Result<bool> {
        Ok(self.autocommit)
    }

    fn set_autocommit(&mut self, autocommit: bool) -> Result<()> {
        if !autocommit && self.driver.state().fail_autocommit {
            return Err(Error::msg("The session was closed by the store"));
        }
        self.record(Event::SetAutocommit(self.id, autocommit));
        self.autocommit = autocommit;
        Ok(())
    }

    fn metadata(&mut self) -> Result<StoreMetadata> {
        Ok(self.driver.state().metadata.clone())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.record(Event::Close(self.id));
        Ok(())
    }
}

struct MockPrepared {
    driver: MockDriver,
    sql: String,
    generated_keys: bool,
}

impl MockPrepared {
    fn run(&mut self) -> Result<()> {
        let mut state = self.driver.state();
        state.events.push(Event::Execute(self.sql.clone()));
        let violation = state
            .unique_violations
            .iter()
            .find(|(prefix, _)| self.sql.starts_with(prefix.as_str()))
            .map(|(_, constraint)| constraint.clone());
        match violation {
            Some(constraint) => Err(UniqueViolation { constraint }.into()),
            None => Ok(()),
        }
    }
}

impl Prepared for MockPrepared {
    fn bind(&mut self, index: usize, value: &Value) -> Result<()> {
        self.driver
            .state()
            .events
            .push(Event::Bind(index, value.clone()));
        Ok(())
    }

    fn bind_null(&mut self, index: usize, wire_type: WireType) -> Result<()> {
        self.driver
            .state()
            .events
            .push(Event::BindNull(index, wire_type));
        Ok(())
    }

    fn execute_update(&mut self) -> Result<RowsAffected> {
        self.run()?;
        let mut result = RowsAffected {
            rows_affected: 1,
            ..Default::default()
        };
        if self.generated_keys {
            let mut state = self.driver.state();
            result.generated_keys.push(Value::Int64(Some(state.next_key)));
            state.next_key += 1;
        }
        Ok(result)
    }

    fn execute_query(&mut self, row: &mut dyn FnMut(&dyn Row) -> Result<()>) -> Result<()> {
        self.run()?;
        let response = self.driver.state().responses.pop_front();
        let Some(response) = response else {
            return Ok(());
        };
        for values in &response.rows {
            row(&MockRow {
                labels: &response.labels,
                values,
            })?;
        }
        Ok(())
    }
}

struct MockRow<'a> {
    labels: &'a [String],
    values: &'a [Value],
}

impl Row for MockRow<'_> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn label(&self, index: usize) -> &str {
        self.labels.get(index).map(String::as_str).unwrap_or_default()
    }

    fn value(&self, index: usize) -> Result<Value> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| Error::msg(format!("No field {}", index)))
    }

    fn was_null(&self, index: usize) -> bool {
        self.values.get(index).is_none_or(Value::is_null)
    }
}
