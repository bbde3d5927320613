use crate::{
    Failure, Result, StoreMetadata,
    writer::{GenericSqlWriter, MySqlSqlWriter, PostgresSqlWriter, SqlWriter, WriterConfig},
};
use std::{fmt::Debug, sync::Arc};

/// Rendering rules of one database product.
pub trait Dialect: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this dialect renders for the store described by `metadata`.
    fn accepts(&self, metadata: &StoreMetadata) -> bool;

    /// Writer configured with the keywords and casing of the database.
    fn sql_writer(&self, config: WriterConfig) -> Box<dyn SqlWriter>;
}

/// Standard SQL, selected when no other dialect recognizes the store.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericDialect;

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn accepts(&self, _metadata: &StoreMetadata) -> bool {
        false
    }

    fn sql_writer(&self, config: WriterConfig) -> Box<dyn SqlWriter> {
        Box::new(GenericSqlWriter::new(config))
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn accepts(&self, metadata: &StoreMetadata) -> bool {
        metadata.product_name.to_lowercase().contains("postgres")
    }

    fn sql_writer(&self, config: WriterConfig) -> Box<dyn SqlWriter> {
        Box::new(PostgresSqlWriter::new(config))
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn accepts(&self, metadata: &StoreMetadata) -> bool {
        let name = metadata.product_name.to_lowercase();
        name.contains("mysql") || name.contains("mariadb")
    }

    fn sql_writer(&self, config: WriterConfig) -> Box<dyn SqlWriter> {
        Box::new(MySqlSqlWriter::new(config))
    }
}

/// Dialects available for detection, populated explicitly at startup.
#[derive(Default, Debug, Clone)]
pub struct DialectRegistry {
    dialects: Vec<Arc<dyn Dialect>>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the dialects shipped by this crate.
    pub fn with_builtin() -> Self {
        Self::new().register(PostgresDialect).register(MySqlDialect)
    }

    pub fn register(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialects.push(Arc::new(dialect));
        self
    }

    pub fn dialects(&self) -> &[Arc<dyn Dialect>] {
        &self.dialects
    }

    /// The single dialect accepting `metadata`, the generic one when none does.
    pub fn detect(&self, metadata: &StoreMetadata) -> Result<Arc<dyn Dialect>> {
        let candidates: Vec<_> = self
            .dialects
            .iter()
            .filter(|d| d.accepts(metadata))
            .collect();
        match candidates.as_slice() {
            [] => {
                log::debug!(
                    "No dialect recognizes `{}`, falling back to generic SQL",
                    metadata.product_name
                );
                Ok(Arc::new(GenericDialect))
            }
            [dialect] => Ok(Arc::clone(dialect)),
            _ => Err(Failure::usage(format!(
                "More than one dialect recognizes `{}`: {}",
                metadata.product_name,
                candidates
                    .iter()
                    .map(|d| d.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(product_name: &str) -> StoreMetadata {
        StoreMetadata {
            product_name: product_name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn detection() {
        let registry = DialectRegistry::with_builtin();
        assert_eq!(registry.detect(&metadata("PostgreSQL")).unwrap().name(), "postgres");
        assert_eq!(registry.detect(&metadata("MariaDB")).unwrap().name(), "mysql");
        assert_eq!(registry.detect(&metadata("H2")).unwrap().name(), "generic");
    }

    #[test]
    fn ambiguous_detection_fails() {
        let registry = DialectRegistry::with_builtin().register(PostgresDialect);
        let error = registry.detect(&metadata("PostgreSQL")).unwrap_err();
        assert!(matches!(error.downcast_ref::<Failure>(), Some(Failure::Usage(..))));
    }
}
