use anyhow::anyhow;
use std::sync::{LazyLock, Mutex, PoisonError};
use vessel::{Codec, Column, Database, Failure, Isolation, Table};

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
}

pub struct AccountTable {
    pub table: Table<Account>,
    pub id: Column<i64>,
    pub owner: Column<String>,
    pub balance: Column<i64>,
}

impl AccountTable {
    pub fn new() -> Self {
        let mut table = Table::<Account>::new("accounts");
        let id = table
            .column("id", Codec::<i64>::new())
            .primary_key()
            .accessor(|a| a.id, |a, v| a.id = v)
            .build();
        let owner = table
            .column("owner", Codec::<String>::new())
            .not_null()
            .accessor(|a| a.owner.clone(), |a, v| a.owner = v)
            .build();
        let balance = table
            .column("balance", Codec::<i64>::new())
            .not_null()
            .accessor(|a| a.balance, |a, v| a.balance = v)
            .build();
        Self {
            table,
            id,
            owner,
            balance,
        }
    }
}

impl Default for AccountTable {
    fn default() -> Self {
        Self::new()
    }
}

fn balances(database: &Database, accounts: &AccountTable) -> Vec<i64> {
    database
        .query_as(
            &accounts.table,
            accounts.table.select().order_by([accounts.id.asc()]),
        )
        .expect("Failed to read the balances")
        .into_iter()
        .map(|a| a.balance)
        .collect()
}

fn transfer(database: &Database, accounts: &AccountTable, from: i64, to: i64, amount: i64) {
    for (id, delta) in [(from, -amount), (to, amount)] {
        let update = vessel::Update::new(
            accounts.table.table_ref().clone(),
            [accounts
                .balance
                .set(accounts.balance.plus(delta))
                .expect("Failed to build the assignment")],
        )
        .expect("Failed to build the update")
        .filter(accounts.id.eq(id));
        let result = database
            .execute_update(update)
            .expect("Failed to move the money");
        assert_eq!(result.rows_affected, 1);
    }
}

pub fn transactions(database: &Database) {
    let _lock = MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    let accounts = AccountTable::new();

    // Setup
    database
        .execute_update("DROP TABLE IF EXISTS accounts")
        .expect("Failed to drop the accounts table");
    database
        .execute_update(
            "CREATE TABLE IF NOT EXISTS accounts (id INTEGER PRIMARY KEY, owner VARCHAR NOT NULL, balance INTEGER NOT NULL)",
        )
        .expect("Failed to create the accounts table");
    let mut created = [
        Account {
            id: 1,
            owner: "alice".into(),
            balance: 100,
        },
        Account {
            id: 2,
            owner: "bob".into(),
            balance: 50,
        },
    ];
    database
        .insert_entities(&accounts.table, &mut created)
        .expect("Failed to open the accounts");

    // Commit
    database
        .use_transaction(|transaction| {
            assert!(!transaction.is_open());
            transfer(database, &accounts, 1, 2, 30);
            assert!(transaction.is_open());
            assert_eq!(balances(database, &accounts), [70, 80]);
            Ok(())
        })
        .expect("The transfer should commit");
    assert_eq!(balances(database, &accounts), [70, 80]);
    assert!(database.transaction_manager().current_transaction().is_none());

    // Rollback
    let error = database
        .use_transaction(|_| {
            transfer(database, &accounts, 2, 1, 80);
            assert_eq!(balances(database, &accounts), [150, 0]);
            Err::<(), _>(anyhow!("insufficient funds"))
        })
        .expect_err("The transfer should fail");
    assert_eq!(error.to_string(), "insufficient funds");
    assert_eq!(balances(database, &accounts), [70, 80]);

    // Nested scopes join the outer transaction
    let error = database
        .use_transaction(|outer| {
            transfer(database, &accounts, 1, 2, 10);
            database.use_transaction(|inner| {
                assert!(std::ptr::eq(outer, inner));
                transfer(database, &accounts, 1, 2, 10);
                Ok(())
            })?;
            assert_eq!(balances(database, &accounts), [50, 100]);
            database.use_transaction(|_| Err::<(), _>(Failure::usage("inner failure")))
        })
        .expect_err("The inner failure should reach the outer scope");
    assert!(matches!(
        error.downcast_ref::<Failure>(),
        Some(Failure::Usage(m)) if m == "inner failure"
    ));
    assert_eq!(balances(database, &accounts), [70, 80]);

    // Failures that do not match the rollback rule still commit
    let error = database
        .use_transaction_with(
            Some(Isolation::Serializable),
            |e| e.downcast_ref::<Failure>().is_some(),
            |transaction| {
                assert_eq!(transaction.isolation(), Some(Isolation::Serializable));
                transfer(database, &accounts, 2, 1, 5);
                Err::<(), _>(anyhow!("reported after the transfer"))
            },
        )
        .expect_err("The failure should be returned");
    assert_eq!(error.to_string(), "reported after the transfer");
    assert_eq!(balances(database, &accounts), [75, 75]);

    // A scope that never touches the store commits nothing
    let value = database
        .use_transaction(|transaction| {
            assert!(!transaction.is_open());
            Ok(42)
        })
        .expect("An empty transaction should succeed");
    assert_eq!(value, 42);
}
