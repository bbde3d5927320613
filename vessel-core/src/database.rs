use crate::{
    Assignment, CodecId, CodecRegistry, Connection, ConnectionProvider, Delete, Dialect,
    DialectRegistry, Driver, DriverError, Error, ExternalTransactionManager, Expression, Failure,
    Insert, Isolation, LocalTransactionManager, Parameter, Prepared, QueryResult, Result,
    ResultColumn, Row, RowLabeled, RowNames, RowsAffected, Select, SqlAndParams, Statement,
    StoreMetadata, Table, Transaction, TransactionManager, Translator, Update, Value, bind_value,
    ensure_logger, reserved_keywords, rollback_on_any, translate,
    writer::{KeywordCasing, SqlWriter, WriterConfig},
};
use anyhow::anyhow;
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// Collects the configuration of a [`Database`].
pub struct DatabaseBuilder {
    driver: Arc<dyn Driver>,
    dialect: Option<Arc<dyn Dialect>>,
    registry: DialectRegistry,
    keyword_casing: Option<KeywordCasing>,
    always_quote: bool,
    keywords: Vec<String>,
    translator: Option<Translator>,
    provider: Option<ConnectionProvider>,
    isolation: Option<Isolation>,
    codecs: Vec<CodecId>,
    fallback_logger: bool,
}

impl DatabaseBuilder {
    /// Use `dialect` instead of detecting one from the store metadata.
    pub fn dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Some(Arc::new(dialect));
        self
    }

    /// Dialects considered for detection, the builtin ones by default.
    pub fn dialects(mut self, registry: DialectRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn keyword_casing(mut self, casing: KeywordCasing) -> Self {
        self.keyword_casing = Some(casing);
        self
    }

    pub fn always_quote_identifiers(mut self, always_quote: bool) -> Self {
        self.always_quote = always_quote;
        self
    }

    /// Words quoted when used as identifiers, on top of the standard and store ones.
    pub fn keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn translator(
        mut self,
        translator: impl Fn(&DriverError) -> Option<Error> + Send + Sync + 'static,
    ) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    /// Transactions are owned by someone else, connections come from `provider`.
    pub fn external_transactions(mut self, provider: ConnectionProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Isolation of transactions that do not ask for one.
    pub fn isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = Some(isolation);
        self
    }

    pub fn codec(mut self, codec: CodecId) -> Self {
        self.codecs.push(codec);
        self
    }

    /// Register the codecs of every column of `table`.
    pub fn table<E: 'static>(mut self, table: &Table<E>) -> Self {
        self.codecs.extend(table.columns().iter().map(|c| c.codec));
        self
    }

    /// Install a stderr logger when the application has none, enabled by default.
    pub fn fallback_logger(mut self, enabled: bool) -> Self {
        self.fallback_logger = enabled;
        self
    }

    /// Query the store metadata once and assemble the database.
    pub fn build(self) -> Result<Database> {
        if self.fallback_logger {
            ensure_logger();
        }
        let metadata = {
            let mut connection = match &self.provider {
                Some(provider) => provider()?,
                None => self.driver.connect()?,
            };
            let metadata = connection.metadata();
            if let Err(e) = connection.close() {
                log::warn!("Could not close the metadata connection: {:#}", e);
            }
            metadata?
        };
        let dialect = match self.dialect {
            Some(dialect) => dialect,
            None => self.registry.detect(&metadata)?,
        };
        let mut config = WriterConfig::from_metadata(&metadata);
        config.keywords = Arc::new(reserved_keywords(
            metadata.keywords.iter().chain(&self.keywords),
        ));
        if let Some(casing) = self.keyword_casing {
            config.keyword_casing = casing;
        }
        config.always_quote = self.always_quote;
        let mut codecs = CodecRegistry::new(self.driver.wire_types().iter().copied());
        for codec in self.codecs {
            codecs.register(codec)?;
        }
        let manager: Arc<dyn TransactionManager> = match self.provider {
            Some(provider) => Arc::new(ExternalTransactionManager::new(provider)),
            None => Arc::new(LocalTransactionManager::new(
                self.driver.clone(),
                self.isolation,
            )),
        };
        log::debug!(
            "Database on {} {} through {}, {} dialect",
            metadata.product_name,
            metadata.product_version,
            self.driver.name(),
            dialect.name()
        );
        Ok(Database {
            shared: Arc::new(Shared {
                driver: self.driver,
                manager,
                metadata,
            }),
            codecs: Arc::new(codecs),
            writer: Arc::from(dialect.sql_writer(config.clone())),
            dialect,
            config,
            translator: self.translator,
        })
    }
}

struct Shared {
    driver: Arc<dyn Driver>,
    manager: Arc<dyn TransactionManager>,
    metadata: StoreMetadata,
}

/// Entry point: compiles statements with its dialect and runs them on its driver.
///
/// Cloning is cheap, clones share the driver and the transaction manager.
/// The `with_*` methods return a reconfigured copy and leave `self` untouched.
#[derive(Clone)]
pub struct Database {
    shared: Arc<Shared>,
    codecs: Arc<CodecRegistry>,
    dialect: Arc<dyn Dialect>,
    writer: Arc<dyn SqlWriter>,
    config: WriterConfig,
    translator: Option<Translator>,
}

impl Database {
    pub fn builder(driver: impl Driver + 'static) -> DatabaseBuilder {
        DatabaseBuilder {
            driver: Arc::new(driver),
            dialect: None,
            registry: DialectRegistry::with_builtin(),
            keyword_casing: None,
            always_quote: false,
            keywords: Vec::new(),
            translator: None,
            provider: None,
            isolation: None,
            codecs: Vec::new(),
            fallback_logger: true,
        }
    }

    pub fn driver(&self) -> &dyn Driver {
        &*self.shared.driver
    }

    pub fn metadata(&self) -> &StoreMetadata {
        &self.shared.metadata
    }

    pub fn dialect(&self) -> &dyn Dialect {
        &*self.dialect
    }

    pub fn sql_writer(&self) -> &dyn SqlWriter {
        &*self.writer
    }

    pub fn transaction_manager(&self) -> &dyn TransactionManager {
        &*self.shared.manager
    }

    pub fn with_keyword_casing(&self, casing: KeywordCasing) -> Database {
        let mut config = self.config.clone();
        config.keyword_casing = casing;
        Database {
            writer: Arc::from(self.dialect.sql_writer(config.clone())),
            config,
            ..self.clone()
        }
    }

    pub fn with_dialect(&self, dialect: impl Dialect + 'static) -> Database {
        Database {
            writer: Arc::from(dialect.sql_writer(self.config.clone())),
            dialect: Arc::new(dialect),
            ..self.clone()
        }
    }

    pub fn with_translator(
        &self,
        translator: impl Fn(&DriverError) -> Option<Error> + Send + Sync + 'static,
    ) -> Database {
        Database {
            translator: Some(Arc::new(translator)),
            ..self.clone()
        }
    }

    /// Copy accepting `codec` too, failing when the driver can not carry its wire type.
    pub fn with_codec(&self, codec: CodecId) -> Result<Database> {
        let mut codecs = (*self.codecs).clone();
        codecs.register(codec)?;
        Ok(Database {
            codecs: Arc::new(codecs),
            ..self.clone()
        })
    }

    /// Copy accepting the codecs of every column of `table`.
    pub fn with_table<E: 'static>(&self, table: &Table<E>) -> Result<Database> {
        let mut codecs = (*self.codecs).clone();
        for column in table.columns() {
            codecs.register(column.codec)?;
        }
        Ok(Database {
            codecs: Arc::new(codecs),
            ..self.clone()
        })
    }

    pub fn registered_codecs(&self) -> &[CodecId] {
        self.codecs.registered()
    }

    /// Render `statement`, the same statement always renders the same way.
    pub fn compile(&self, statement: &Statement) -> Result<SqlAndParams> {
        self.writer.write_statement(statement)
    }

    /// Run `f` inside a transaction, rolling back on any failure.
    pub fn use_transaction<T>(&self, f: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
        self.transaction_manager()
            .use_transaction(None, &rollback_on_any, f)
    }

    /// Run `f` inside a transaction with `isolation`, rolling back only when `rollback_for` matches.
    pub fn use_transaction_with<T>(
        &self,
        isolation: Option<Isolation>,
        rollback_for: impl Fn(&Error) -> bool,
        f: impl FnOnce(&Transaction) -> Result<T>,
    ) -> Result<T> {
        self.transaction_manager()
            .use_transaction(isolation, &rollback_for, f)
    }

    /// Run `f` on the connection of the current transaction or on a standalone one.
    pub fn use_connection<T>(&self, f: impl FnOnce(&mut dyn Connection) -> Result<T>) -> Result<T> {
        self.transaction_manager().use_connection(f)
    }

    fn log_statement(&self, query: &SqlAndParams) {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("SQL: {}", query.sql);
            for (i, param) in query.params.iter().enumerate() {
                log::debug!("Parameter {}: {}({})", i, param.value, param.codec.wire_type);
            }
        }
    }

    fn bind(&self, prepared: &mut dyn Prepared, params: &[Parameter]) -> Result<()> {
        for (i, param) in params.iter().enumerate() {
            bind_value(prepared, i, param.codec.wire_type, &param.value)?;
        }
        Ok(())
    }

    fn update(&self, query: &SqlAndParams, generated_keys: bool) -> Result<RowsAffected> {
        self.log_statement(query);
        let result = self.use_connection(|connection| {
            let mut prepared = connection
                .prepare(&query.sql, generated_keys)
                .map_err(|e| translate(self.translator.as_ref(), &query.sql, e))?;
            self.bind(prepared.as_mut(), &query.params)
                .and_then(|_| prepared.execute_update())
                .map_err(|e| translate(self.translator.as_ref(), &query.sql, e))
        })?;
        log::debug!("Rows affected: {}", result.rows_affected);
        Ok(result)
    }

    /// Run an effect producing statement.
    pub fn execute_update(&self, statement: impl Into<Statement>) -> Result<RowsAffected> {
        let query = self.compile(&statement.into())?;
        self.update(&query, false)
    }

    /// Run a result producing statement, `f` sees every row while it streams from the driver.
    pub fn query_with(
        &self,
        statement: impl Into<Statement>,
        mut f: impl FnMut(&dyn Row) -> Result<()>,
    ) -> Result<u64> {
        let query = self.compile(&statement.into())?;
        self.log_statement(&query);
        let mut count = 0_u64;
        let mut failure = None;
        self.use_connection(|connection| {
            let mut prepared = connection
                .prepare(&query.sql, false)
                .map_err(|e| translate(self.translator.as_ref(), &query.sql, e))?;
            let result = self.bind(prepared.as_mut(), &query.params).and_then(|_| {
                prepared.execute_query(&mut |row| {
                    count += 1;
                    f(row).map_err(|e| {
                        failure = Some(e);
                        anyhow!("Row callback failed")
                    })
                })
            });
            match failure.take() {
                Some(e) => Err(e),
                None => result.map_err(|e| translate(self.translator.as_ref(), &query.sql, e)),
            }
        })?;
        log::debug!("Rows returned: {}", count);
        Ok(count)
    }

    /// Run a result producing statement and read every row into memory.
    pub fn query(&self, statement: impl Into<Statement>) -> Result<QueryResult> {
        let statement = statement.into();
        let columns: Arc<[ResultColumn]> = statement.result_columns().unwrap_or_default().into();
        let mut labels: Option<RowNames> = None;
        let mut rows = Vec::new();
        self.query_with(statement, |row| {
            let labels = labels
                .get_or_insert_with(|| (0..row.len()).map(|i| row.label(i).to_string()).collect())
                .clone();
            rows.push(RowLabeled::read(row, labels, columns.clone())?);
            Ok(())
        })?;
        Ok(QueryResult { rows })
    }

    /// Run `select` and build one entity per row through the setters of `table`.
    pub fn query_as<E: Default + 'static>(
        &self,
        table: &Table<E>,
        select: Select,
    ) -> Result<Vec<E>> {
        let columns = select.result_columns();
        let mut result = Vec::new();
        self.query_with(select, |row| {
            result.push(table.decode(row, &columns)?);
            Ok(())
        })?;
        Ok(result)
    }

    /// Insert every entity with one statement each.
    ///
    /// Primary keys the entity leaves NULL are assigned by the store and written
    /// back through their setter, in request order.
    pub fn insert_entities<E: 'static>(
        &self,
        table: &Table<E>,
        entities: &mut [E],
    ) -> Result<RowsAffected> {
        let mut total = RowsAffected::default();
        for entity in entities.iter_mut() {
            let mut generated = Vec::new();
            let mut assignments = Vec::new();
            for (column, value) in table.values(entity) {
                if column.primary_key && value.is_null() {
                    generated.push(column.clone());
                    continue;
                }
                assignments.push(Assignment::new(
                    column.clone(),
                    Parameter {
                        value,
                        codec: column.codec,
                    },
                )?);
            }
            let insert = Insert::assignments(table.table_ref().clone(), assignments)?;
            let query = self.compile(&insert.into())?;
            let result = self.update(&query, !generated.is_empty())?;
            if let ([column], Some(key)) = (generated.as_slice(), result.generated_keys.first()) {
                table.set(entity, column, &GeneratedKey(key), 0)?;
            }
            total.extend([result]);
        }
        Ok(total)
    }

    fn key_filter<E: 'static>(&self, table: &Table<E>, entity: &E) -> Result<Expression> {
        let mut filter: Option<Expression> = None;
        for column in table.primary_keys()? {
            let condition = Expression::Column(column.clone()).eq(Parameter {
                value: table.get(entity, column)?,
                codec: column.codec,
            });
            filter = Some(match filter {
                Some(current) => current.and(condition),
                None => condition,
            });
        }
        filter.ok_or_else(|| Failure::usage("No primary key to filter on"))
    }

    /// Write every non key column of `entity`, matching the row by primary key.
    pub fn update_entity<E: 'static>(
        &self,
        table: &Table<E>,
        entity: &E,
    ) -> Result<RowsAffected> {
        let filter = self.key_filter(table, entity)?;
        let assignments = table
            .values(entity)
            .into_iter()
            .filter(|(column, _)| !column.primary_key)
            .map(|(column, value)| {
                Assignment::new(
                    column.clone(),
                    Parameter {
                        value,
                        codec: column.codec,
                    },
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let update = Update::new(table.table_ref().clone(), assignments)?.filter(filter);
        self.execute_update(update)
    }

    /// Delete the row of `entity`, matched by primary key.
    pub fn delete_entity<E: 'static>(
        &self,
        table: &Table<E>,
        entity: &E,
    ) -> Result<RowsAffected> {
        let filter = self.key_filter(table, entity)?;
        self.execute_update(Delete::new(table.table_ref().clone()).filter(filter))
    }
}

impl Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("driver", &self.shared.driver)
            .field("product", &self.shared.metadata.product_name)
            .field("dialect", &self.dialect.name())
            .field("transaction_manager", &self.shared.manager)
            .finish()
    }
}

/// A store assigned key seen as a single field row, so setters can decode it.
struct GeneratedKey<'a>(&'a Value);

impl Row for GeneratedKey<'_> {
    fn len(&self) -> usize {
        1
    }

    fn label(&self, _index: usize) -> &str {
        ""
    }

    fn value(&self, _index: usize) -> Result<Value> {
        Ok(self.0.clone())
    }

    fn was_null(&self, _index: usize) -> bool {
        self.0.is_null()
    }
}
