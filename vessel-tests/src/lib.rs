mod books;
mod mock;
mod transactions;
mod users;

pub use books::*;
pub use mock::*;
pub use transactions::*;
pub use users::*;

use log::LevelFilter;
use std::env;
use vessel::Database;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the whole suite against a database backed by a real store.
///
/// The store must accept `CREATE TABLE IF NOT EXISTS` and `DROP TABLE IF EXISTS`.
pub fn execute_tests(database: &Database) {
    users(database);
    books(database);
    transactions(database);
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
