#[cfg(test)]
mod tests {
    use std::{fs, path::Path, sync::Mutex};
    use vessel::Database;
    use vessel_sqlite::{SqliteDialect, SqliteDriver};
    use vessel_tests::{execute_tests, init_logs};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn sqlite_memory() {
        init_logs();
        let database = Database::builder(SqliteDriver::new("sqlite://:memory:"))
            .dialect(SqliteDialect)
            .build()
            .expect("Could not open the database");
        execute_tests(&database);
    }

    #[test]
    fn sqlite_file() {
        init_logs();
        const DB_PATH: &str = "../target/debug/tests.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH).unwrap_or_else(|e| {
                panic!("Failed to remove existing test database file {}: {}", DB_PATH, e)
            });
        }
        let database = Database::builder(SqliteDriver::new(format!("sqlite://{}?mode=rwc", DB_PATH)))
            .dialect(SqliteDialect)
            .build()
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        execute_tests(&database);
    }
}
