use std::sync::{LazyLock, Mutex, PoisonError};
use time::{PrimitiveDateTime, macros::datetime};
use vessel::{Codec, Column, Database, DriverError, Expression, Failure, Table};

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Default, Debug, Clone, PartialEq)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub email: Option<String>,
    pub age: i32,
    pub active: bool,
    pub joined: Option<PrimitiveDateTime>,
}

/// The `users` table and a typed handle for each of its columns.
pub struct UserTable {
    pub table: Table<User>,
    pub id: Column<i64>,
    pub username: Column<String>,
    pub email: Column<String>,
    pub age: Column<i32>,
    pub active: Column<bool>,
    pub joined: Column<PrimitiveDateTime>,
}

impl Default for UserTable {
    fn default() -> Self {
        Self::new()
    }
}

impl UserTable {
    pub fn new() -> Self {
        let mut table = Table::<User>::new("users");
        let id = table
            .column("id", Codec::<i64>::new())
            .primary_key()
            .nullable_accessor(|u| u.id, |u, v| u.id = v)
            .build();
        let username = table
            .column("username", Codec::<String>::new())
            .not_null()
            .accessor(|u| u.username.clone(), |u, v| u.username = v)
            .build();
        let email = table
            .column("email", Codec::<String>::new())
            .nullable_accessor(|u| u.email.clone(), |u, v| u.email = v)
            .build();
        let age = table
            .column("age", Codec::<i32>::new())
            .not_null()
            .accessor(|u| u.age, |u, v| u.age = v)
            .build();
        let active = table
            .column("active", Codec::<bool>::new())
            .not_null()
            .accessor(|u| u.active, |u, v| u.active = v)
            .build();
        let joined = table
            .column("joined", Codec::<PrimitiveDateTime>::new())
            .nullable_accessor(|u| u.joined, |u, v| u.joined = v)
            .build();
        Self {
            table,
            id,
            username,
            email,
            age,
            active,
            joined,
        }
    }
}

pub const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (\
    id INTEGER PRIMARY KEY, \
    username VARCHAR NOT NULL UNIQUE, \
    email VARCHAR, \
    age INTEGER NOT NULL, \
    active BOOLEAN NOT NULL, \
    joined TIMESTAMP)";

fn user(username: &str, email: Option<&str>, age: i32, active: bool) -> User {
    User {
        id: None,
        username: username.into(),
        email: email.map(Into::into),
        age,
        active,
        joined: None,
    }
}

pub fn users(database: &Database) {
    let _lock = MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    let users = UserTable::new();

    // Setup
    database
        .execute_update("DROP TABLE IF EXISTS users")
        .expect("Failed to drop the users table");
    database
        .execute_update(CREATE_USERS)
        .expect("Failed to create the users table");
    let database = &database
        .with_table(&users.table)
        .expect("The driver does not handle the users columns");
    assert!(!database.registered_codecs().is_empty());

    // Insert
    let mut created = vec![
        user("alice", Some("alice@example.com"), 34, true),
        user("bob", None, 27, true),
        user("carol", Some("carol@example.com"), 51, false),
        user("dave", Some("dave@example.net"), 19, true),
        User {
            joined: Some(datetime!(2024-02-29 13:45:07.25)),
            ..user("erin", Some("erin@example.com"), 42, true)
        },
    ];
    let result = database
        .insert_entities(&users.table, &mut created)
        .expect("Failed to insert the users");
    assert_eq!(result.rows_affected, 5);
    assert_eq!(result.generated_keys.len(), 5);
    assert!(
        created.iter().all(|u| u.id.is_some()),
        "Every user should have received its key: {:?}",
        created
    );
    let ids: Vec<_> = created.iter().filter_map(|u| u.id).collect();
    let mut unique = ids.clone();
    unique.dedup();
    assert_eq!(ids, unique);

    // Query every user
    let found = database
        .query_as(&users.table, users.table.select().order_by([users.id.asc()]))
        .expect("Failed to query the users");
    assert_eq!(found, created);

    // Filter
    let found = database
        .query_as(
            &users.table,
            users
                .table
                .select()
                .filter(users.age.gt(30).and(users.active.eq(true)))
                .order_by([users.username.asc()]),
        )
        .expect("Failed to filter the users");
    let names: Vec<_> = found.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["alice", "erin"]);

    let found = database
        .query_as(
            &users.table,
            users
                .table
                .select()
                .filter(users.email.is_null().or(users.email.like("%.net"))),
        )
        .expect("Failed to filter the users by email");
    let mut names: Vec<_> = found.iter().map(|u| u.username.clone()).collect();
    names.sort();
    assert_eq!(names, ["bob", "dave"]);

    let found = database
        .query_as(
            &users.table,
            users
                .table
                .select()
                .filter(
                    users
                        .username
                        .in_list(["carol", "dave", "zed"])
                        .expect("Failed to build the in list"),
                )
                .order_by([users.age.desc()]),
        )
        .expect("Failed to filter the users by name");
    let names: Vec<_> = found.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["carol", "dave"]);

    let found = database
        .query_as(
            &users.table,
            users.table.select().filter(users.age.between(20, 40)),
        )
        .expect("Failed to filter the users by age");
    assert_eq!(found.len(), 2);

    // Temporal values survive the round trip
    let erin = database
        .query_as(
            &users.table,
            users.table.select().filter(users.username.eq("erin")),
        )
        .expect("Failed to query erin")
        .pop()
        .expect("erin should exist");
    assert_eq!(erin.joined, Some(datetime!(2024-02-29 13:45:07.25)));

    // Projection and labels
    let rows = database
        .query(
            users
                .table
                .select()
                .column(&users.username)
                .column(users.age.plus(1).labeled("next_age"))
                .filter(users.username.eq("bob")),
        )
        .expect("Failed to project bob");
    let row = rows.first().expect("bob should exist");
    assert_eq!(row.get(&users.username).unwrap(), Some("bob".to_string()));
    assert_eq!(row.get_label::<i64>("next_age").unwrap(), Some(28));

    // Count
    let select = users
        .table
        .select()
        .filter(users.active.eq(true))
        .order_by([users.id.asc()])
        .limit(2);
    let count = database
        .query(select.count_query().expect("Failed to build the count"))
        .expect("Failed to count the active users");
    assert_eq!(count.first().unwrap().get_index::<i64>(0).unwrap(), Some(4));

    // Pagination
    let page = database
        .query_as(
            &users.table,
            users
                .table
                .select()
                .order_by([users.username.asc()])
                .limit(2)
                .offset(1),
        )
        .expect("Failed to read the second page");
    let names: Vec<_> = page.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["bob", "carol"]);

    let rest = database
        .query_as(
            &users.table,
            users
                .table
                .select()
                .order_by([users.username.asc()])
                .offset(3),
        )
        .expect("Failed to skip the first users");
    let names: Vec<_> = rest.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["dave", "erin"]);

    // Update
    let mut bob = created[1].clone();
    bob.email = Some("bob@example.org".into());
    bob.age += 1;
    let result = database
        .update_entity(&users.table, &bob)
        .expect("Failed to update bob");
    assert_eq!(result.rows_affected, 1);
    let found = database
        .query_as(&users.table, users.table.select().filter(users.id.eq(bob.id)))
        .expect("Failed to query bob");
    assert_eq!(found, [bob.clone()]);

    let result = database
        .execute_update(
            vessel::Update::new(
                users.table.table_ref().clone(),
                [users.age.set(users.age.plus(10)).unwrap()],
            )
            .unwrap()
            .filter(users.active.eq(false)),
        )
        .expect("Failed to age the inactive users");
    assert_eq!(result.rows_affected, 1);

    // Delete
    let result = database
        .delete_entity(&users.table, &bob)
        .expect("Failed to delete bob");
    assert_eq!(result.rows_affected, 1);
    let result = database
        .execute_update(
            vessel::Delete::new(users.table.table_ref().clone())
                .filter(users.age.lt(20)),
        )
        .expect("Failed to delete the youngest users");
    assert_eq!(result.rows_affected, 1);
    let left = database
        .query(users.table.select().count_query().unwrap())
        .expect("Failed to count the users left");
    assert_eq!(left.first().unwrap().get_index::<i64>(0).unwrap(), Some(3));

    // Not null columns refuse NULL before reaching the store
    let error = users
        .username
        .set(None::<String>)
        .expect_err("Assigning NULL to username should fail");
    assert!(matches!(
        error.downcast_ref::<Failure>(),
        Some(Failure::Construction(..))
    ));

    // Driver failures carry the statement
    let mut duplicate = [user("alice", None, 1, true)];
    let error = database
        .insert_entities(&users.table, &mut duplicate)
        .expect_err("A second alice should violate the unique constraint");
    let driver = error
        .downcast_ref::<DriverError>()
        .expect("The failure should come from the driver");
    assert!(driver.sql.to_uppercase().starts_with("INSERT INTO USERS"));

    // The translator sees the failure and the statement
    let translated = database.with_translator(|e: &DriverError| {
        e.sql
            .to_uppercase()
            .starts_with("INSERT")
            .then(|| Failure::usage(format!("duplicate user: {}", e.source)))
    });
    let error = translated
        .insert_entities(&users.table, &mut duplicate)
        .expect_err("A second alice should still fail");
    assert!(matches!(
        error.downcast_ref::<Failure>(),
        Some(Failure::Usage(m)) if m.starts_with("duplicate user")
    ));

    // Scalar subquery
    let oldest: Expression = users.table.select().column(users.age.max()).into();
    let found = database
        .query_as(&users.table, users.table.select().filter(users.age.eq(oldest)))
        .expect("Failed to find the oldest user");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "carol");
}
