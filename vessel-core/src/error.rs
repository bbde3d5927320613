use crate::{Error, truncate_long};
use std::{
    error,
    fmt::{self, Debug, Display, Formatter},
    sync::Arc,
};

/// Failure categories raised by vessel itself, carried inside `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// An expression or statement was built with invalid parts.
    #[error("Invalid construction: {0}")]
    Construction(String),
    /// The API was called in a state that does not allow the operation.
    #[error("Invalid usage: {0}")]
    Usage(String),
    /// The configuration can not be satisfied by the driver.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("The {dialect} dialect does not support {capability}")]
    Unsupported {
        dialect: &'static str,
        capability: &'static str,
    },
}

impl Failure {
    pub fn construction(message: impl Into<String>) -> Error {
        Failure::Construction(message.into()).into()
    }

    pub fn usage(message: impl Into<String>) -> Error {
        Failure::Usage(message.into()).into()
    }

    pub fn unsupported(dialect: &'static str, capability: &'static str) -> Error {
        Failure::Unsupported {
            dialect,
            capability,
        }
        .into()
    }
}

/// Error returned by the driver while running a statement, wrapped with the SQL text.
pub struct DriverError {
    pub sql: String,
    pub source: Error,
}

impl DriverError {
    pub fn new(sql: impl Into<String>, source: Error) -> Self {
        Self {
            sql: sql.into(),
            source,
        }
    }

    /// Search the cause chain of the driver failure for a specific error type.
    pub fn find_cause<E: error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.source.chain().find_map(|e| e.downcast_ref::<E>())
    }
}

impl Display for DriverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Error while executing: {}", truncate_long!(self.sql))?;
        write!(f, "{}", self.source)
    }
}

impl Debug for DriverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverError")
            .field("sql", &self.sql)
            .field("source", &self.source)
            .finish()
    }
}

impl error::Error for DriverError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&*self.source)
    }
}

/// Optional hook replacing a driver failure with a richer domain failure.
pub type Translator = Arc<dyn Fn(&DriverError) -> Option<Error> + Send + Sync>;

/// Wrap a driver failure and pass it through the translator, if any.
pub fn translate(translator: Option<&Translator>, sql: &str, source: Error) -> Error {
    let error = DriverError::new(sql, source);
    if let Some(translator) = translator {
        if let Some(translated) = translator(&error) {
            return translated;
        }
    }
    error.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn translator_replaces_or_passes_through() {
        let translator: Translator = Arc::new(|e: &DriverError| {
            e.sql
                .starts_with("INSERT")
                .then(|| Failure::usage(format!("duplicate: {}", e.source)))
        });
        let replaced = translate(Some(&translator), "INSERT INTO t", anyhow!("unique"));
        assert!(matches!(
            replaced.downcast_ref::<Failure>(),
            Some(Failure::Usage(m)) if m == "duplicate: unique"
        ));
        let kept = translate(Some(&translator), "DELETE FROM t", anyhow!("locked"));
        let driver = kept.downcast_ref::<DriverError>().unwrap();
        assert_eq!(driver.sql, "DELETE FROM t");
        assert_eq!(driver.source.to_string(), "locked");
    }
}
