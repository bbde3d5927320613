use crate::{Prepared, Result, StoreMetadata};
use std::fmt::{self, Display, Formatter};

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Isolation {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl Display for Isolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Isolation::ReadUncommitted => "READ UNCOMMITTED",
            Isolation::ReadCommitted => "READ COMMITTED",
            Isolation::RepeatableRead => "REPEATABLE READ",
            Isolation::Serializable => "SERIALIZABLE",
        })
    }
}

/// A single session with the store.
///
/// Transaction control follows the autocommit model: while autocommit is
/// disabled every statement belongs to the current transaction, which ends
/// with `commit` or `rollback`.
pub trait Connection {
    /// Prepare a statement, `generated_keys` asks the driver to report store assigned keys.
    fn prepare<'c>(
        &'c mut self,
        sql: &str,
        generated_keys: bool,
    ) -> Result<Box<dyn Prepared + 'c>>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// Current isolation level, `None` when the store does not report one.
    fn isolation(&mut self) -> Result<Option<Isolation>>;

    fn set_isolation(&mut self, isolation: Isolation) -> Result<()>;

    fn autocommit(&mut self) -> Result<bool>;

    fn set_autocommit(&mut self, autocommit: bool) -> Result<()>;

    /// Product and naming information, queried once when the database is built.
    fn metadata(&mut self) -> Result<StoreMetadata>;

    fn close(self: Box<Self>) -> Result<()>;
}
