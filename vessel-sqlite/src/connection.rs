use crate::SqlitePrepared;
use vessel_core::{Connection, IdentifierCase, Isolation, Prepared, Result, StoreMetadata};

/// Keywords SQLite reserves on top of the standard ones.
const SQLITE_KEYWORDS: &[&str] = &[
    "abort", "analyze", "attach", "autoincrement", "conflict", "database", "detach",
    "exclusive", "explain", "fail", "glob", "ignore", "indexed", "instead", "isnull", "notnull",
    "offset", "plan", "pragma", "raise", "regexp", "reindex", "rename", "replace", "temp",
    "vacuum", "virtual", "without",
];

/// A rusqlite connection following the autocommit model.
///
/// With autocommit off the first statement opens a deferred transaction,
/// `commit` and `rollback` end it and the next statement opens another one.
pub struct SqliteConnection {
    connection: rusqlite::Connection,
    autocommit: bool,
}

impl SqliteConnection {
    pub fn new(connection: rusqlite::Connection) -> Self {
        Self {
            connection,
            autocommit: true,
        }
    }

    pub fn inner(&self) -> &rusqlite::Connection {
        &self.connection
    }

    fn begin_if_needed(&mut self) -> Result<()> {
        if !self.autocommit && self.connection.is_autocommit() {
            self.connection.execute_batch("BEGIN")?;
        }
        Ok(())
    }
}

impl Connection for SqliteConnection {
    fn prepare<'c>(
        &'c mut self,
        sql: &str,
        generated_keys: bool,
    ) -> Result<Box<dyn Prepared + 'c>> {
        self.begin_if_needed()?;
        let statement = if generated_keys {
            let sql = sql.trim_end().trim_end_matches(';');
            self.connection.prepare(&format!("{} RETURNING rowid", sql))?
        } else {
            self.connection.prepare(sql)?
        };
        Ok(Box::new(SqlitePrepared::new(statement, generated_keys)))
    }

    fn commit(&mut self) -> Result<()> {
        if !self.connection.is_autocommit() {
            self.connection.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.connection.is_autocommit() {
            self.connection.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    fn isolation(&mut self) -> Result<Option<Isolation>> {
        let read_uncommitted: i64 =
            self.connection
                .query_row("PRAGMA read_uncommitted", [], |row| row.get(0))?;
        Ok(Some(if read_uncommitted != 0 {
            Isolation::ReadUncommitted
        } else {
            Isolation::Serializable
        }))
    }

    fn set_isolation(&mut self, isolation: Isolation) -> Result<()> {
        let read_uncommitted = isolation == Isolation::ReadUncommitted;
        self.connection.execute_batch(&format!(
            "PRAGMA read_uncommitted = {}",
            read_uncommitted as i32
        ))?;
        Ok(())
    }

    fn autocommit(&mut self) -> Result<bool> {
        Ok(self.autocommit)
    }

    fn set_autocommit(&mut self, autocommit: bool) -> Result<()> {
        if autocommit && !self.connection.is_autocommit() {
            self.connection.execute_batch("COMMIT")?;
        }
        self.autocommit = autocommit;
        Ok(())
    }

    fn metadata(&mut self) -> Result<StoreMetadata> {
        Ok(StoreMetadata {
            product_name: "SQLite".into(),
            product_version: rusqlite::version().into(),
            keywords: SQLITE_KEYWORDS.iter().map(ToString::to_string).collect(),
            identifier_quote: "\"".into(),
            identifier_case: IdentifierCase::Mixed,
        })
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.connection.close().map_err(|(_, e)| e.into())
    }
}
