use crate::SqliteConnection;
use std::{
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use vessel_core::{Connection, Context, Driver, Error, Result};

static MEMORY_ID: AtomicUsize = AtomicUsize::new(0);

/// Opens connections to the database named by a `sqlite://` url.
///
/// `sqlite://:memory:` is a private in memory database shared by every
/// connection of this driver, it lives as long as the driver does.
#[derive(Debug)]
pub struct SqliteDriver {
    url: String,
    memory: String,
    anchor: Mutex<Option<rusqlite::Connection>>,
}

impl SqliteDriver {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            memory: format!(
                "file:vessel-memory-{}?mode=memory&cache=shared",
                MEMORY_ID.fetch_add(1, Ordering::Relaxed)
            ),
            anchor: Mutex::new(None),
        }
    }

    /// `file:` uri for rusqlite and whether it names the in memory database.
    fn location(&self) -> Result<(String, bool)> {
        let Some(path) = self.url.strip_prefix("sqlite://") else {
            let error = Error::msg(format!(
                "Expected an url like `sqlite://path`, got `{}`",
                self.url
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        if path == ":memory:" {
            return Ok((self.memory.clone(), true));
        }
        if path.is_empty() {
            return Err(Error::msg("The sqlite url does not name a database"));
        }
        Ok((format!("file:{}", path), false))
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self) -> Result<Box<dyn Connection>> {
        let (location, memory) = self.location()?;
        if memory {
            let mut anchor = self.anchor.lock().unwrap_or_else(PoisonError::into_inner);
            if anchor.is_none() {
                *anchor = Some(rusqlite::Connection::open(&location)?);
            }
        }
        let connection = rusqlite::Connection::open(&location)
            .with_context(|| format!("Could not open `{}`", self.url))?;
        connection.busy_timeout(Duration::from_secs(5))?;
        Ok(Box::new(SqliteConnection::new(connection)))
    }
}
