use crate::{Connection, Driver, Error, Failure, Isolation, Result};
use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    rc::Rc,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

thread_local! {
    /// Transactions bound to the current thread, by manager.
    static BOUND: RefCell<HashMap<usize, Rc<Transaction>>> = RefCell::new(HashMap::new());
}

static MANAGER_ID: AtomicUsize = AtomicUsize::new(0);

/// Source of connections for the externally managed mode.
pub type ConnectionProvider = Arc<dyn Fn() -> Result<Box<dyn Connection>> + Send + Sync>;

/// Decides whether a failure escaping a transactional scope rolls it back.
pub type RollbackFor<'a> = &'a dyn Fn(&Error) -> bool;

/// Rolls back on any failure.
pub fn rollback_on_any(_error: &Error) -> bool {
    true
}

/// Owner of the transactions of a database.
pub trait TransactionManager: Debug + Send + Sync {
    /// Isolation used when a scope does not ask for one.
    fn default_isolation(&self) -> Option<Isolation>;

    /// Transaction bound to the calling thread, if any.
    fn current_transaction(&self) -> Option<Rc<Transaction>>;

    /// Begin a transaction and bind it to the calling thread.
    ///
    /// Fails when one is already bound, transactions never queue.
    fn new_transaction(&self, isolation: Option<Isolation>) -> Result<Rc<Transaction>>;

    /// Connection outside of any transaction.
    fn new_connection(&self) -> Result<Box<dyn Connection>>;
}

impl<'m> dyn TransactionManager + 'm {
    /// Run `f` inside a transaction.
    ///
    /// A scope entered while a transaction is bound to the thread joins it and
    /// leaves commit and rollback to the scope that began it. The outer scope
    /// commits, or rolls back when `rollback_for` matches the failure returned by `f`.
    pub fn use_transaction<T>(
        &self,
        isolation: Option<Isolation>,
        rollback_for: RollbackFor<'_>,
        f: impl FnOnce(&Transaction) -> Result<T>,
    ) -> Result<T> {
        if let Some(current) = self.current_transaction() {
            return f(&current);
        }
        let mut scope = Scope {
            transaction: self.new_transaction(isolation.or(self.default_isolation()))?,
            finished: false,
        };
        let result = f(&scope.transaction);
        let ended = match &result {
            Err(e) if rollback_for(e) => scope.transaction.rollback(),
            _ => scope.transaction.commit(),
        };
        scope.finished = true;
        drop(scope);
        match (result, ended) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(..), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(ended)) => {
                log::error!("Could not end the transaction: {:#}", ended);
                Err(e)
            }
        }
    }

    /// Run `f` with the connection of the bound transaction, or with a
    /// standalone connection released right after.
    pub fn use_connection<T>(&self, f: impl FnOnce(&mut dyn Connection) -> Result<T>) -> Result<T> {
        if let Some(transaction) = self.current_transaction() {
            return transaction.with_connection(f);
        }
        let mut standalone = Standalone(None);
        let connection = standalone.0.insert(self.new_connection()?);
        let result = f(connection.as_mut());
        drop(standalone);
        result
    }
}

/// Closes a standalone connection on every exit path, unwinding included.
struct Standalone(Option<Box<dyn Connection>>);

impl Drop for Standalone {
    fn drop(&mut self) {
        if let Some(connection) = self.0.take()
            && let Err(e) = connection.close()
        {
            log::warn!("Could not close the connection: {:#}", e);
        }
    }
}

/// Ends the transaction it owns on every exit path, unwinding included.
struct Scope {
    transaction: Rc<Transaction>,
    finished: bool,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !self.finished
            && let Err(e) = self.transaction.rollback()
        {
            log::error!("Could not roll back the transaction: {:#}", e);
        }
        self.transaction.close();
    }
}

/// Transactions bound to the thread that begins them, with connections from a driver.
#[derive(Debug)]
pub struct LocalTransactionManager {
    id: usize,
    driver: Arc<dyn Driver>,
    default_isolation: Option<Isolation>,
}

impl LocalTransactionManager {
    pub fn new(driver: Arc<dyn Driver>, default_isolation: Option<Isolation>) -> Self {
        Self {
            id: MANAGER_ID.fetch_add(1, Ordering::Relaxed),
            driver,
            default_isolation,
        }
    }
}

impl TransactionManager for LocalTransactionManager {
    fn default_isolation(&self) -> Option<Isolation> {
        self.default_isolation
    }

    fn current_transaction(&self) -> Option<Rc<Transaction>> {
        BOUND.with(|bound| bound.borrow().get(&self.id).cloned())
    }

    fn new_transaction(&self, isolation: Option<Isolation>) -> Result<Rc<Transaction>> {
        BOUND.with(|bound| {
            let mut bound = bound.try_borrow_mut().map_err(|_| {
                Failure::usage("The transaction registry of this thread is busy")
            })?;
            if bound.contains_key(&self.id) {
                return Err(Failure::usage(
                    "A transaction is already active on this thread, nested scopes must join it",
                ));
            }
            let transaction = Rc::new(Transaction {
                manager: self.id,
                driver: self.driver.clone(),
                isolation,
                state: RefCell::new(None),
            });
            bound.insert(self.id, transaction.clone());
            log::debug!("Transaction began on {}", self.driver.name());
            Ok(transaction)
        })
    }

    fn new_connection(&self) -> Result<Box<dyn Connection>> {
        self.driver.connect()
    }
}

/// Transactions are owned by someone else, this manager only hands out connections.
///
/// It always reports no current transaction, even while the external owner has one open.
pub struct ExternalTransactionManager {
    provider: ConnectionProvider,
}

impl ExternalTransactionManager {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self { provider }
    }
}

impl Debug for ExternalTransactionManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalTransactionManager").finish_non_exhaustive()
    }
}

impl TransactionManager for ExternalTransactionManager {
    fn default_isolation(&self) -> Option<Isolation> {
        None
    }

    fn current_transaction(&self) -> Option<Rc<Transaction>> {
        None
    }

    fn new_transaction(&self, _isolation: Option<Isolation>) -> Result<Rc<Transaction>> {
        Err(Failure::usage(
            "Transactions are managed externally, begin them through their owner",
        ))
    }

    fn new_connection(&self) -> Result<Box<dyn Connection>> {
        (self.provider)()
    }
}

struct Opened {
    connection: Box<dyn Connection>,
    original_isolation: Option<Isolation>,
    original_autocommit: bool,
}

impl Opened {
    /// Restore the captured settings and close, failures are logged and dropped.
    fn release(self, isolation: Option<Isolation>) {
        let Opened {
            mut connection,
            original_isolation,
            original_autocommit,
        } = self;
        if let Some(original) = original_isolation
            && isolation.is_some_and(|v| v != original)
            && let Err(e) = connection.set_isolation(original)
        {
            log::warn!("Could not restore isolation {}: {:#}", original, e);
        }
        if original_autocommit && let Err(e) = connection.set_autocommit(true) {
            log::warn!("Could not restore autocommit: {:#}", e);
        }
        if let Err(e) = connection.close() {
            log::warn!("Could not close the transaction connection: {:#}", e);
        }
    }
}

/// A transaction bound to the thread that began it.
///
/// The connection is opened on first use, a transaction that never runs a
/// statement never touches the store.
pub struct Transaction {
    manager: usize,
    driver: Arc<dyn Driver>,
    isolation: Option<Isolation>,
    state: RefCell<Option<Opened>>,
}

impl Transaction {
    /// Isolation requested when the transaction began.
    pub fn isolation(&self) -> Option<Isolation> {
        self.isolation
    }

    /// Whether a connection was opened.
    pub fn is_open(&self) -> bool {
        self.state.try_borrow().map(|v| v.is_some()).unwrap_or(true)
    }

    fn open(&self) -> Result<Opened> {
        let mut connection = self.driver.connect()?;
        match setup(connection.as_mut(), self.isolation) {
            Ok((original_isolation, original_autocommit)) => Ok(Opened {
                connection,
                original_isolation,
                original_autocommit,
            }),
            Err(e) => {
                if let Err(close) = connection.close() {
                    log::warn!("Could not close the connection after a failed setup: {:#}", close);
                }
                Err(e)
            }
        }
    }

    fn state(&self) -> Result<std::cell::RefMut<'_, Option<Opened>>> {
        self.state
            .try_borrow_mut()
            .map_err(|_| Failure::usage("The transaction connection is already in use"))
    }

    /// Run `f` with the transaction connection, opening it on first use.
    ///
    /// The connection stays in the transaction while `f` runs, so a panic
    /// leaves it there for the owning scope to roll back and release.
    pub fn with_connection<T>(&self, f: impl FnOnce(&mut dyn Connection) -> Result<T>) -> Result<T> {
        let mut state = self.state()?;
        let opened = match state.take() {
            Some(opened) => opened,
            None => self.open()?,
        };
        let opened = state.insert(opened);
        f(opened.connection.as_mut())
    }

    /// Commit, nothing happens when the connection was never opened.
    pub fn commit(&self) -> Result<()> {
        match self.state()?.as_mut() {
            Some(opened) => {
                log::debug!("Commit");
                opened.connection.commit()
            }
            None => Ok(()),
        }
    }

    /// Roll back, nothing happens when the connection was never opened.
    pub fn rollback(&self) -> Result<()> {
        match self.state()?.as_mut() {
            Some(opened) => {
                log::debug!("Rollback");
                opened.connection.rollback()
            }
            None => Ok(()),
        }
    }

    /// Release the connection and unbind from the thread, never fails.
    pub fn close(&self) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => {
                if let Some(opened) = state.take() {
                    opened.release(self.isolation);
                }
            }
            Err(..) => log::error!("Could not close the transaction, its connection is in use"),
        }
        let _ = BOUND.try_with(|bound| {
            if let Ok(mut bound) = bound.try_borrow_mut()
                && bound.get(&self.manager).is_some_and(|v| std::ptr::eq(&**v, self))
            {
                bound.remove(&self.manager);
            }
        });
    }
}

impl Debug for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("isolation", &self.isolation)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Capture isolation and autocommit, then switch to the transaction settings.
fn setup(
    connection: &mut dyn Connection,
    isolation: Option<Isolation>,
) -> Result<(Option<Isolation>, bool)> {
    let original_isolation = connection.isolation()?;
    if let Some(isolation) = isolation
        && original_isolation != Some(isolation)
    {
        connection.set_isolation(isolation)?;
    }
    let original_autocommit = connection.autocommit()?;
    if original_autocommit {
        connection.set_autocommit(false)?;
    }
    Ok((original_isolation, original_autocommit))
}
