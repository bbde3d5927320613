use std::sync::{LazyLock, Mutex, PoisonError};
use vessel::{
    Case, Codec, Column, Database, Expression, Insert, Query, Select, SelectItem, Table, Union,
    count_all, exists, literal, not_exists,
};

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub year: i32,
}

pub struct AuthorTable {
    pub table: Table<Author>,
    pub id: Column<i64>,
    pub name: Column<String>,
    pub country: Column<String>,
}

impl AuthorTable {
    pub fn new() -> Self {
        let mut table = Table::<Author>::new("authors");
        let id = table
            .column("id", Codec::<i64>::new())
            .primary_key()
            .accessor(|a| a.id, |a, v| a.id = v)
            .build();
        let name = table
            .column("name", Codec::<String>::new())
            .not_null()
            .accessor(|a| a.name.clone(), |a, v| a.name = v)
            .build();
        let country = table
            .column("country", Codec::<String>::new())
            .nullable_accessor(|a| a.country.clone(), |a, v| a.country = v)
            .build();
        Self {
            table,
            id,
            name,
            country,
        }
    }

    /// The same table under `alias`.
    pub fn aliased(&self, alias: &str) -> Self {
        let table = self.table.aliased(alias);
        Self {
            id: self.id.of(table.table_ref()),
            name: self.name.of(table.table_ref()),
            country: self.country.of(table.table_ref()),
            table,
        }
    }
}

impl Default for AuthorTable {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BookTable {
    pub table: Table<Book>,
    pub id: Column<i64>,
    pub title: Column<String>,
    pub author_id: Column<i64>,
    pub year: Column<i32>,
}

impl BookTable {
    pub fn new() -> Self {
        let mut table = Table::<Book>::new("books");
        let id = table
            .column("id", Codec::<i64>::new())
            .primary_key()
            .accessor(|b| b.id, |b, v| b.id = v)
            .build();
        let title = table
            .column("title", Codec::<String>::new())
            .not_null()
            .accessor(|b| b.title.clone(), |b, v| b.title = v)
            .build();
        let author_id = table
            .column("author_id", Codec::<i64>::new())
            .not_null()
            .accessor(|b| b.author_id, |b, v| b.author_id = v)
            .build();
        let year = table
            .column("year", Codec::<i32>::new())
            .not_null()
            .accessor(|b| b.year, |b, v| b.year = v)
            .build();
        Self {
            table,
            id,
            title,
            author_id,
            year,
        }
    }

    pub fn aliased(&self, alias: &str) -> Self {
        let table = self.table.aliased(alias);
        Self {
            id: self.id.of(table.table_ref()),
            title: self.title.of(table.table_ref()),
            author_id: self.author_id.of(table.table_ref()),
            year: self.year.of(table.table_ref()),
            table,
        }
    }
}

impl Default for BookTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn books(database: &Database) {
    let _lock = MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    let authors = AuthorTable::new();
    let books = BookTable::new();

    // Setup
    for sql in [
        "DROP TABLE IF EXISTS books",
        "DROP TABLE IF EXISTS authors",
        "CREATE TABLE IF NOT EXISTS authors (id INTEGER PRIMARY KEY, name VARCHAR NOT NULL, country VARCHAR)",
        "CREATE TABLE IF NOT EXISTS books (id INTEGER PRIMARY KEY, title VARCHAR NOT NULL, author_id INTEGER NOT NULL REFERENCES authors(id), year INTEGER NOT NULL)",
    ] {
        database
            .execute_update(sql)
            .unwrap_or_else(|e| panic!("Failed to run `{}`: {:?}", sql, e));
    }

    // Insert with a multi row statement
    let rows = [
        (1_i64, "J.R.R. Tolkien", Some("UK")),
        (2, "Ursula K. Le Guin", Some("US")),
        (3, "Italo Calvino", Some("IT")),
        (4, "Anonymous", None),
    ]
    .into_iter()
    .map(|(id, name, country)| {
        vec![
            authors.id.param(Some(id)),
            authors.name.param(Some(name.to_string())),
            authors.country.param(country.map(String::from)),
        ]
    })
    .collect();
    let insert = Insert::values(
        authors.table.table_ref().clone(),
        authors.table.columns().to_vec(),
        rows,
    )
    .expect("Failed to build the authors insert");
    let result = database
        .execute_update(insert)
        .expect("Failed to insert the authors");
    assert_eq!(result.rows_affected, 4);

    let catalog = [
        Book {
            id: 1,
            title: "The Hobbit".into(),
            author_id: 1,
            year: 1937,
        },
        Book {
            id: 2,
            title: "The Lord of the Rings".into(),
            author_id: 1,
            year: 1954,
        },
        Book {
            id: 3,
            title: "A Wizard of Earthsea".into(),
            author_id: 2,
            year: 1968,
        },
        Book {
            id: 4,
            title: "The Left Hand of Darkness".into(),
            author_id: 2,
            year: 1969,
        },
        Book {
            id: 5,
            title: "The Dispossessed".into(),
            author_id: 2,
            year: 1974,
        },
        Book {
            id: 6,
            title: "Invisible Cities".into(),
            author_id: 3,
            year: 1972,
        },
    ];
    let mut inserted = catalog.clone();
    let result = database
        .insert_entities(&books.table, &mut inserted)
        .expect("Failed to insert the books");
    assert_eq!(result.rows_affected, 6);
    assert!(result.generated_keys.is_empty());
    assert_eq!(inserted, catalog);

    // Join with aliases
    let a = authors.aliased("a");
    let b = books.aliased("b");
    let select = Select::from(
        a.table
            .source()
            .inner_join(b.table.source(), b.author_id.eq(&a.id))
            .expect("Failed to build the join"),
    )
    .columns([SelectItem::from(&a.name), SelectItem::from(&b.title)])
    .filter(a.country.eq("US"))
    .order_by([b.year.asc()]);
    let rows = database.query(select).expect("Failed to query the join");
    let titles: Vec<_> = rows
        .iter()
        .map(|r| r.get(&b.title).unwrap().unwrap())
        .collect();
    assert_eq!(
        titles,
        [
            "A Wizard of Earthsea",
            "The Left Hand of Darkness",
            "The Dispossessed"
        ]
    );
    assert!(
        rows.iter()
            .all(|r| r.get(&a.name).unwrap().as_deref() == Some("Ursula K. Le Guin"))
    );

    // Left join keeps the authors without books
    let select = Select::from(
        a.table
            .source()
            .left_join(b.table.source(), b.author_id.eq(&a.id))
            .expect("Failed to build the left join"),
    )
    .columns([
        SelectItem::from(&a.name),
        b.id.count().labeled("written"),
    ])
    .group_by([a.name.expression()])
    .order_by([a.name.asc()]);
    let rows = database.query(select).expect("Failed to count the books");
    let counts: Vec<_> = rows
        .iter()
        .map(|r| {
            (
                r.get(&a.name).unwrap().unwrap(),
                r.get_label::<i64>("written").unwrap().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        counts,
        [
            ("Anonymous".to_string(), 0),
            ("Italo Calvino".to_string(), 1),
            ("J.R.R. Tolkien".to_string(), 2),
            ("Ursula K. Le Guin".to_string(), 3),
        ]
    );

    // Group by with having
    let select = books
        .table
        .select()
        .columns([
            SelectItem::from(&books.author_id),
            count_all().labeled("total"),
        ])
        .group_by([books.author_id.expression()])
        .having(count_all().gt(literal(1_i64)))
        .order_by([books.author_id.asc()]);
    let rows = database.query(select).expect("Failed to group the books");
    let prolific: Vec<_> = rows
        .iter()
        .map(|r| r.get(&books.author_id).unwrap().unwrap())
        .collect();
    assert_eq!(prolific, [1, 2]);

    // Case
    let era: Expression = Case::when(books.year.lt(1950), literal("classic"))
        .when(books.year.lt(1970), literal("golden"))
        .otherwise(literal("modern"))
        .build()
        .expect("Failed to build the case");
    let select = books
        .table
        .select()
        .columns([SelectItem::from(&books.title), era.labeled("era")])
        .order_by([books.id.asc()]);
    let rows = database.query(select).expect("Failed to query the eras");
    let eras: Vec<_> = rows
        .iter()
        .map(|r| r.get_label::<String>("era").unwrap().unwrap())
        .collect();
    assert_eq!(
        eras,
        ["classic", "golden", "golden", "golden", "modern", "modern"]
    );

    // Union as a derived source
    let old = books
        .table
        .select()
        .column(&books.title)
        .filter(books.year.lt(1940));
    let recent = books
        .table
        .select()
        .column(&books.title)
        .filter(books.year.gt(1970));
    let union = Union::new(old.clone(), recent.clone(), false).expect("Failed to build the union");
    let rows = database
        .query(Select::from(Query::from(union).aliased("picked")).column(count_all()))
        .expect("Failed to count the union");
    assert_eq!(rows.first().unwrap().get_index::<i64>(0).unwrap(), Some(3));

    let union = Union::new(old, recent, true)
        .expect("Failed to build the union")
        .order_by([books.title.asc()])
        .limit(2);
    let rows = database.query(union).expect("Failed to query the union");
    let titles: Vec<_> = rows
        .iter()
        .map(|r| r.get_index::<String>(0).unwrap().unwrap())
        .collect();
    assert_eq!(titles, ["Invisible Cities", "The Dispossessed"]);

    // Exists
    let wrote = |since: i32| {
        Select::from(b.table.source())
            .column(literal(1_i64))
            .filter(b.author_id.eq(&a.id))
            .filter(b.year.gte(since))
    };
    let select = Select::from(a.table.source())
        .column(&a.name)
        .filter(exists(wrote(1970)))
        .order_by([a.name.asc()]);
    let rows = database.query(select).expect("Failed to query exists");
    let names: Vec<_> = rows
        .iter()
        .map(|r| r.get(&a.name).unwrap().unwrap())
        .collect();
    assert_eq!(names, ["Italo Calvino", "Ursula K. Le Guin"]);

    let found = database
        .query_as(
            &a.table,
            Select::from(a.table.source()).filter(not_exists(wrote(0))),
        )
        .expect("Failed to query not exists");
    assert_eq!(
        found,
        [Author {
            id: 4,
            name: "Anonymous".into(),
            country: None,
        }]
    );

    // In subquery
    let select = authors
        .table
        .select()
        .column(&authors.name)
        .filter(
            authors
                .id
                .in_query(books.table.select().column(&books.author_id).distinct())
                .expect("Failed to build the in subquery"),
        )
        .filter(authors.country.not_eq("UK"));
    let rows = database.query(select).expect("Failed to query in subquery");
    let mut names: Vec<_> = rows
        .iter()
        .map(|r| r.get(&authors.name).unwrap().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["Italo Calvino", "Ursula K. Le Guin"]);
}
