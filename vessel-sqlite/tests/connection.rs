#[cfg(test)]
mod tests {
    use vessel::{Database, DialectRegistry, DriverError, Failure, Parameter, Raw, WireType};
    use vessel_sqlite::{SqliteDialect, SqliteDriver, is_unique_violation};
    use vessel_tests::{init_logs, silent_logs};

    fn memory() -> Database {
        Database::builder(SqliteDriver::new("sqlite://:memory:"))
            .dialect(SqliteDialect)
            .build()
            .expect("Could not open the database")
    }

    #[test]
    fn wrong_url() {
        init_logs();
        silent_logs! {
            assert!(
                Database::builder(SqliteDriver::new("duckdb://some_value"))
                    .build()
                    .is_err(),
                "Should not accept an url of another driver"
            );
        }
    }

    #[test]
    fn detect_dialect() {
        init_logs();
        let database = Database::builder(SqliteDriver::new("sqlite://:memory:"))
            .dialects(DialectRegistry::with_builtin().register(SqliteDialect))
            .build()
            .expect("Could not open the database");
        assert_eq!(database.dialect().name(), "sqlite");
        assert_eq!(database.metadata().product_name, "SQLite");
        assert!(
            database
                .metadata()
                .keywords
                .iter()
                .any(|k| k.eq_ignore_ascii_case("pragma"))
        );

        // Without the sqlite dialect the generic writer is used
        let database = Database::builder(SqliteDriver::new("sqlite://:memory:"))
            .build()
            .expect("Could not open the database");
        assert_eq!(database.dialect().name(), "generic");
    }

    #[test]
    fn memory_is_shared_by_connections() {
        init_logs();
        let database = memory();
        database
            .execute_update("CREATE TABLE notes (body VARCHAR)")
            .expect("Failed to create the table");
        database
            .execute_update(Raw::new("INSERT INTO notes (body) VALUES (?)").bind("first".to_string()))
            .expect("Failed to insert");
        let rows = database
            .query("SELECT body FROM notes")
            .expect("Failed to query from another connection");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows.first().unwrap().get_label::<String>("body").unwrap(),
            Some("first".to_string())
        );

        // Another driver sees another database
        let other = memory();
        assert!(other.query("SELECT body FROM notes").is_err());
    }

    #[test]
    fn nulls_and_storage_classes() {
        init_logs();
        let database = memory();
        database
            .execute_update("CREATE TABLE samples (a INTEGER, b REAL, c TEXT, d BLOB)")
            .expect("Failed to create the table");
        database
            .execute_update(
                Raw::new("INSERT INTO samples VALUES (?, ?, ?, ?)")
                    .bind(7_i32)
                    .param(Parameter::new(None::<f64>))
                    .bind("x".to_string())
                    .bind(vec![1_u8, 2, 3]),
            )
            .expect("Failed to insert");
        let rows = database
            .query("SELECT a, b, c, d FROM samples")
            .expect("Failed to query");
        let row = rows.first().unwrap();
        assert_eq!(row.get_index::<i32>(0).unwrap(), Some(7));
        assert_eq!(row.get_index::<f64>(1).unwrap(), None);
        assert_eq!(row.get_index::<String>(2).unwrap().as_deref(), Some("x"));
        assert_eq!(row.get_index::<Vec<u8>>(3).unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(row.values()[0].wire_type(), Some(WireType::Int64));
    }

    #[test]
    fn unique_violation() {
        init_logs();
        let database = memory();
        database
            .execute_update("CREATE TABLE tags (name VARCHAR PRIMARY KEY)")
            .expect("Failed to create the table");
        let insert = Raw::new("INSERT INTO tags (name) VALUES (?)").bind("rust".to_string());
        database
            .execute_update(insert.clone())
            .expect("Failed to insert the first tag");

        let error = database
            .execute_update(insert.clone())
            .expect_err("The same tag twice should fail");
        let driver = error.downcast_ref::<DriverError>().unwrap();
        assert!(is_unique_violation(driver));
        assert_eq!(driver.sql, "INSERT INTO tags (name) VALUES (?)");

        let translated = database.with_translator(|e: &DriverError| {
            is_unique_violation(e).then(|| Failure::usage("The tag already exists"))
        });
        let error = translated
            .execute_update(insert)
            .expect_err("The same tag twice should still fail");
        assert!(matches!(
            error.downcast_ref::<Failure>(),
            Some(Failure::Usage(m)) if m == "The tag already exists"
        ));
        let error = translated
            .execute_update("INSERT INTO missing VALUES (1)")
            .expect_err("The table does not exist");
        assert!(error.downcast_ref::<DriverError>().is_some());
    }
}
