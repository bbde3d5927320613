#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::macros::{date, datetime, time};
    use uuid::Uuid;
    use vessel::{
        Case, Codec, Column, Delete, Expression, Failure, GenericSqlWriter, Insert, KeywordCasing,
        MySqlSqlWriter, PostgresSqlWriter, Raw, Select, SqlWriter, Statement, Table, Union,
        Update, Value, WriterConfig, literal,
    };

    #[derive(Default)]
    struct User {
        id: i64,
        username: String,
    }

    struct Users {
        table: Table<User>,
        id: Column<i64>,
        username: Column<String>,
    }

    fn users() -> Users {
        let mut table = Table::<User>::new("users");
        let id = table
            .column("id", Codec::<i64>::new())
            .primary_key()
            .accessor(|u| u.id, |u, v| u.id = v)
            .build();
        let username = table
            .column("username", Codec::<String>::new())
            .not_null()
            .accessor(|u| u.username.clone(), |u, v| u.username = v)
            .build();
        Users {
            table,
            id,
            username,
        }
    }

    fn values(statement: &vessel::SqlAndParams) -> Vec<Value> {
        statement.params.iter().map(|p| p.value.clone()).collect()
    }

    fn compile(writer: &dyn SqlWriter, statement: impl Into<Statement>) -> vessel::SqlAndParams {
        writer
            .write_statement(&statement.into())
            .expect("Failed to compile the statement")
    }

    #[test]
    fn select_with_disjunction() {
        let users = users();
        let select = users
            .table
            .select()
            .filter(users.id.eq(101).or(users.username.like("%x%")));
        let query = compile(&GenericSqlWriter::default(), select);
        assert_eq!(
            query.sql,
            "SELECT * FROM users WHERE (id = ?) OR (username LIKE ?)"
        );
        assert_eq!(
            values(&query),
            [Value::Int64(Some(101)), Value::Varchar(Some("%x%".into()))]
        );
    }

    #[test]
    fn compiling_twice_gives_the_same_result() {
        let users = users();
        let select = users
            .table
            .select()
            .column(&users.id)
            .column(&users.username)
            .filter(users.username.not_eq("root"))
            .order_by([users.username.desc(), users.id.asc()]);
        let writer = GenericSqlWriter::default();
        let first = compile(&writer, select.clone());
        let second = compile(&writer, select);
        assert_eq!(first, second);
        assert_eq!(
            first.sql,
            "SELECT id, username FROM users WHERE username <> ? ORDER BY username DESC, id"
        );
    }

    #[test]
    fn keyword_casing() {
        let users = users();
        let select = users.table.select().filter(users.id.is_not_null());
        let writer = GenericSqlWriter::new(WriterConfig {
            keyword_casing: KeywordCasing::Lower,
            ..Default::default()
        });
        assert_eq!(
            compile(&writer, select).sql,
            "select * from users where id is not null"
        );
    }

    #[test]
    fn case_without_else() {
        let users = users();
        let sign = Case::when(users.id.gt(0), literal("positive"))
            .when(users.id.lt(0), literal("negative"))
            .build()
            .unwrap();
        let select = users.table.select().column(sign.labeled("sign"));
        let query = compile(&GenericSqlWriter::default(), select);
        assert_eq!(
            query.sql,
            "SELECT CASE WHEN id > ? THEN 'positive' WHEN id < ? THEN 'negative' END AS sign FROM users"
        );
        assert_eq!(
            values(&query),
            [Value::Int64(Some(0)), Value::Int64(Some(0))]
        );

        let kind = Case::value(users.username.expression())
            .when(literal("root"), literal(true))
            .otherwise(literal(false))
            .build()
            .unwrap();
        let query = compile(
            &GenericSqlWriter::default(),
            users.table.select().column(kind.labeled("admin")),
        );
        assert_eq!(
            query.sql,
            "SELECT CASE username WHEN 'root' THEN TRUE ELSE FALSE END AS admin FROM users"
        );
        assert!(Case::new(None, Vec::new(), None).is_err());
    }

    #[test]
    fn pagination_is_a_dialect_capability() {
        let users = users();
        let select = users.table.select().order_by([users.id.asc()]).limit(10).offset(20);
        let error = GenericSqlWriter::default()
            .write_statement(&select.clone().into())
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Failure>(),
            Some(Failure::Unsupported {
                dialect: "generic",
                capability: "pagination"
            })
        ));

        let query = compile(&PostgresSqlWriter::default(), select.clone());
        assert_eq!(
            query.sql,
            "SELECT * FROM users ORDER BY id LIMIT $1 OFFSET $2"
        );
        assert_eq!(
            values(&query),
            [Value::Int64(Some(10)), Value::Int64(Some(20))]
        );

        let query = compile(&MySqlSqlWriter::default(), select);
        assert_eq!(query.sql, "SELECT * FROM users ORDER BY id LIMIT ?, ?");
        assert_eq!(
            values(&query),
            [Value::Int64(Some(20)), Value::Int64(Some(10))]
        );
    }

    #[test]
    fn postgres_numbers_every_placeholder() {
        let users = users();
        let select = users
            .table
            .select()
            .filter(users.id.between(1, 9))
            .filter(users.username.in_list(["a", "b"]).unwrap())
            .limit(5);
        let query = compile(&PostgresSqlWriter::default(), select);
        assert_eq!(
            query.sql,
            "SELECT * FROM users WHERE (id BETWEEN $1 AND $2) AND (username IN ($3, $4)) LIMIT $5"
        );
        assert_eq!(query.params.len(), 5);
    }

    #[test]
    fn identifiers() {
        let mut table = Table::<()>::new("order");
        let select_column = table.column("select", Codec::<String>::new()).build();
        let spaced = table.column("first name", Codec::<String>::new()).build();
        let quoted = table.column("say \"hi\"", Codec::<String>::new()).build();
        let plain = table.column("Total", Codec::<i64>::new()).build();
        let select = table
            .select()
            .columns([&select_column, &spaced, &quoted])
            .column(&plain);
        let query = compile(&GenericSqlWriter::default(), select.clone());
        assert_eq!(
            query.sql,
            r#"SELECT "select", "first name", "say ""hi""", Total FROM "order""#
        );

        let always = GenericSqlWriter::new(WriterConfig {
            always_quote: true,
            ..Default::default()
        });
        assert_eq!(
            compile(&always, users().table.select()).sql,
            r#"SELECT * FROM "users""#
        );

        let upper = GenericSqlWriter::new(WriterConfig {
            identifier_case: vessel::IdentifierCase::Upper,
            ..Default::default()
        });
        assert_eq!(
            compile(&upper, table.select().column(&plain)).sql,
            r#"SELECT "Total" FROM "order""#
        );

        let mysql = compile(&MySqlSqlWriter::default(), select);
        assert_eq!(
            mysql.sql,
            r#"SELECT `select`, `first name`, `say "hi"`, Total FROM `order`"#
        );
    }

    #[test]
    fn extra_keywords_are_quoted() {
        let users = users();
        let writer = GenericSqlWriter::new(WriterConfig {
            keywords: std::sync::Arc::new(vessel::reserved_keywords(["USERNAME"])),
            ..Default::default()
        });
        assert_eq!(
            compile(&writer, users.table.select().column(&users.username)).sql,
            r#"SELECT "username" FROM users"#
        );
    }

    #[test]
    fn literals() {
        let writer = GenericSqlWriter::default();
        let select = Select::new([
            literal(Value::Null),
            literal(true),
            literal(-7_i8),
            literal(u64::MAX),
            literal(1.5_f64),
            literal(f64::INFINITY),
            literal(f32::NAN),
            literal(Decimal::from_str("12.340").unwrap()),
            literal("l'été"),
            literal(vec![0x0a_u8, 0xff]),
            literal(date!(2024 - 02 - 29)),
            literal(time!(12:30)),
            literal(time!(08:05:03.25)),
            literal(datetime!(2024-02-29 13:45:07)),
            literal(datetime!(2024-01-01 01:00 +02:00)),
            literal(Uuid::nil()),
            literal(Value::Varchar(None)),
        ])
        .unwrap();
        let query = compile(&writer, select);
        assert_eq!(
            query.sql,
            indoc! {"
                SELECT NULL, TRUE, -7, 18446744073709551615, 1.5, \
                CAST('Infinity' AS DOUBLE PRECISION), CAST('NaN' AS DOUBLE PRECISION), 12.340, \
                'l''été', X'0AFF', '2024-02-29', '12:30:00.0', '08:05:03.25', \
                '2024-02-29 13:45:07.0', '2023-12-31 23:00:00.0', \
                '00000000-0000-0000-0000-000000000000', NULL
            "}
            .trim()
        );
        assert!(query.params.is_empty());
    }

    #[test]
    fn modifications() {
        let users = users();
        let insert = Insert::values(
            users.table.table_ref().clone(),
            users.table.columns().to_vec(),
            vec![
                vec![users.id.param(Some(1)), users.username.param(Some("ann".into()))],
                vec![users.id.param(Some(2)), literal("bea")],
            ],
        )
        .unwrap();
        let query = compile(&GenericSqlWriter::default(), insert);
        assert_eq!(
            query.sql,
            "INSERT INTO users (id, username) VALUES (?, ?), (?, 'bea')"
        );
        assert_eq!(query.params.len(), 3);

        let archive = users.table.aliased("u");
        let copy = Insert::select(
            users.table.table_ref().clone(),
            users.table.columns().to_vec(),
            archive.select().filter(users.id.of(archive.table_ref()).gt(100)),
        )
        .unwrap();
        assert_eq!(
            compile(&GenericSqlWriter::default(), copy).sql,
            "INSERT INTO users (id, username) SELECT * FROM users u WHERE u.id > ?"
        );

        let update = Update::new(
            users.table.table_ref().clone(),
            [
                users.username.set(users.username.upper()).unwrap(),
                users.id.set(users.id.plus(1)).unwrap(),
            ],
        )
        .unwrap()
        .filter(users.id.lte(10));
        assert_eq!(
            compile(&GenericSqlWriter::default(), update).sql,
            "UPDATE users SET username = UPPER(username), id = id + ? WHERE id <= ?"
        );

        let delete = Delete::new(users.table.table_ref().clone());
        assert_eq!(
            compile(&GenericSqlWriter::default(), delete.clone()).sql,
            "DELETE FROM users"
        );
        assert_eq!(
            compile(
                &GenericSqlWriter::default(),
                delete.filter(users.username.like("tmp%")).filter(users.id.gt(5))
            )
            .sql,
            "DELETE FROM users WHERE (username LIKE ?) AND (id > ?)"
        );
    }

    #[test]
    fn not_null_columns_refuse_null() {
        let users = users();
        let error = users.username.set(None::<String>).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Failure>(),
            Some(Failure::Construction(..))
        ));
        let error = Insert::values(
            users.table.table_ref().clone(),
            users.table.columns().to_vec(),
            vec![vec![users.id.param(Some(1)), literal(Value::Varchar(None))]],
        )
        .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Failure>(),
            Some(Failure::Construction(..))
        ));
        assert!(Update::new(users.table.table_ref().clone(), Vec::new()).is_err());
    }

    #[test]
    fn unions() {
        let users = users();
        let low = users.table.select().column(&users.id).filter(users.id.lt(10));
        let high = users.table.select().column(&users.id).filter(users.id.gt(90));
        let union = Union::new(low.clone(), high.clone(), true)
            .unwrap()
            .order_by([users.id.desc()]);
        assert_eq!(
            compile(&GenericSqlWriter::default(), union).sql,
            "SELECT id FROM users WHERE id < ? UNION ALL SELECT id FROM users WHERE id > ? ORDER BY id DESC"
        );
        let union = Union::new(low, high, false).unwrap().parenthesized(true);
        let query = compile(&PostgresSqlWriter::default(), union.limit(3));
        assert_eq!(
            query.sql,
            "(SELECT id FROM users WHERE id < $1) UNION (SELECT id FROM users WHERE id > $2) LIMIT $3"
        );
    }

    #[test]
    fn count_queries() {
        let users = users();
        let writer = PostgresSqlWriter::default();
        let select = users
            .table
            .select()
            .filter(users.id.gt(3))
            .order_by([users.id.asc()])
            .limit(2);
        assert_eq!(
            compile(&writer, select.count_query().unwrap()).sql,
            "SELECT COUNT(1) FROM users WHERE id > $1"
        );
        let distinct = users.table.select().column(&users.username).distinct();
        assert_eq!(
            compile(&writer, distinct.count_query().unwrap()).sql,
            "SELECT COUNT(1) FROM (SELECT DISTINCT username FROM users) count_source"
        );
    }

    #[test]
    fn raw_statements() {
        let raw = Raw::new("SELECT ? + ?").bind(1_i32).bind(2_i64);
        let query = compile(&GenericSqlWriter::default(), raw);
        assert_eq!(query.sql, "SELECT ? + ?");
        assert_eq!(values(&query), [Value::Int32(Some(1)), Value::Int64(Some(2))]);
        let raw = Raw::new("SELECT '?', \"a?\" FROM t WHERE x = ? AND y = ?")
            .bind(1_i64)
            .bind(2_i64);
        assert_eq!(
            compile(&PostgresSqlWriter::default(), raw.clone()).sql,
            "SELECT '?', \"a?\" FROM t WHERE x = $1 AND y = $2"
        );
        assert_eq!(
            compile(&GenericSqlWriter::default(), raw).sql,
            "SELECT '?', \"a?\" FROM t WHERE x = ? AND y = ?"
        );
        let writer = GenericSqlWriter::default();
        for raw in [
            Raw::new("SELECT ?"),
            Raw::new("SELECT 1").bind(1_i64),
        ] {
            let error = writer.write_statement(&raw.into()).unwrap_err();
            assert!(matches!(
                error.downcast_ref::<Failure>(),
                Some(Failure::Construction(..))
            ));
        }
    }

    #[test]
    fn sourceless_select_needs_columns() {
        let error = Select::new(Vec::<Expression>::new()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Failure>(),
            Some(Failure::Construction(..))
        ));
        let select = Select::new([literal(1_i64)]).unwrap();
        assert_eq!(
            compile(&GenericSqlWriter::default(), select.clone()).sql,
            "SELECT 1"
        );
        let emptied = Select {
            columns: Vec::new(),
            ..select
        };
        assert!(
            GenericSqlWriter::default()
                .write_statement(&emptied.into())
                .is_err()
        );
    }
}
