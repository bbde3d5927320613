use crate::{
    Codec, Column, ColumnRef, Failure, QuerySource, Result, ResultColumn, Row, Select, Value,
};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

/// Name of a table, the alias only changes how it renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub name: Arc<str>,
    pub schema: Option<Arc<str>>,
    pub alias: Option<Arc<str>>,
}

impl TableRef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            alias: None,
        }
    }

    pub fn with_schema(self, schema: impl Into<Arc<str>>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..self
        }
    }

    pub fn aliased(&self, alias: impl Into<Arc<str>>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }

    /// The name columns are qualified with: the alias when present, the table name otherwise.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

type Getter<E> = Arc<dyn Fn(&E) -> Value + Send + Sync>;
type Setter<E> = Arc<dyn Fn(&mut E, &dyn Row, usize) -> Result<()> + Send + Sync>;

struct Binding<E> {
    getter: Option<Getter<E>>,
    setter: Option<Setter<E>>,
}

impl<E> Clone for Binding<E> {
    fn clone(&self) -> Self {
        Self {
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }
}

/// A table whose rows map to entities of type `E`.
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct User {
///     id: i64,
///     username: String,
/// }
///
/// let mut users = Table::<User>::new("users");
/// let id = users
///     .column("id", Codec::<i64>::new())
///     .primary_key()
///     .accessor(|u| u.id, |u, v| u.id = v)
///     .build();
/// ```
pub struct Table<E> {
    table: TableRef,
    columns: Vec<ColumnRef>,
    bindings: Vec<Binding<E>>,
}

impl<E> Clone for Table<E> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            columns: self.columns.clone(),
            bindings: self.bindings.clone(),
        }
    }
}

impl<E> Debug for Table<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("table", &self.table)
            .field("columns", &self.columns)
            .finish()
    }
}

impl<E: 'static> Table<E> {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            table: TableRef::new(name),
            columns: Vec::new(),
            bindings: Vec::new(),
        }
    }

    pub fn with_schema(self, schema: impl Into<Arc<str>>) -> Self {
        let table = self.table.with_schema(schema);
        Self {
            columns: self.columns.iter().map(|c| c.with_table(&table)).collect(),
            table,
            bindings: self.bindings,
        }
    }

    /// The same table under `alias`, columns are rebound to the alias.
    pub fn aliased(&self, alias: impl Into<Arc<str>>) -> Self {
        let table = self.table.aliased(alias);
        Self {
            columns: self.columns.iter().map(|c| c.with_table(&table)).collect(),
            table,
            bindings: self.bindings.clone(),
        }
    }

    pub fn table_ref(&self) -> &TableRef {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    /// Declare a new column.
    pub fn column<T: 'static>(
        &mut self,
        name: impl Into<Arc<str>>,
        codec: Codec<T>,
    ) -> ColumnBuilder<'_, E, T> {
        let column = ColumnRef {
            table: self.table.clone(),
            name: name.into(),
            codec: codec.id(),
            primary_key: false,
            not_null: false,
        };
        ColumnBuilder {
            table: self,
            column,
            codec,
            binding: Binding {
                getter: None,
                setter: None,
            },
        }
    }

    pub fn primary_keys(&self) -> Result<Vec<&ColumnRef>> {
        let result: Vec<_> = self.columns.iter().filter(|c| c.primary_key).collect();
        if result.is_empty() {
            return Err(Failure::usage(format!(
                "Table `{}` does not declare a primary key",
                self.table.name
            )));
        }
        Ok(result)
    }

    pub fn source(&self) -> QuerySource {
        QuerySource::Table {
            table: self.table.clone(),
            columns: self.columns.clone().into(),
        }
    }

    /// `SELECT * FROM table`, to be refined with filters, ordering and pagination.
    pub fn select(&self) -> Select {
        Select::from(self.source())
    }

    fn position(&self, column: &ColumnRef) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == column.name)
            .ok_or_else(|| {
                Failure::usage(format!(
                    "Column `{}` does not belong to table `{}`",
                    column.name, self.table.name
                ))
            })
    }

    /// Read the value of `column` from `entity` through its getter.
    pub fn get(&self, entity: &E, column: &ColumnRef) -> Result<Value> {
        let index = self.position(column)?;
        match &self.bindings[index].getter {
            Some(getter) => Ok(getter(entity)),
            None => Err(Failure::usage(format!(
                "Column `{}.{}` has no getter",
                self.table.name, column.name
            ))),
        }
    }

    /// Values of the columns bound to a getter, in declaration order.
    pub fn values(&self, entity: &E) -> Vec<(&ColumnRef, Value)> {
        self.columns
            .iter()
            .zip(&self.bindings)
            .filter_map(|(c, b)| b.getter.as_ref().map(|get| (c, get(entity))))
            .collect()
    }

    /// Write field `field` of `row` into `entity` through the setter of `column`.
    pub fn set(&self, entity: &mut E, column: &ColumnRef, row: &dyn Row, field: usize) -> Result<()> {
        let index = self.position(column)?;
        match &self.bindings[index].setter {
            Some(setter) => setter(entity, row, field),
            None => Err(Failure::usage(format!(
                "Column `{}.{}` has no setter",
                self.table.name, column.name
            ))),
        }
    }

    /// Build an entity from a result row, columns without a setter are skipped.
    pub fn decode(&self, row: &dyn Row, columns: &[ResultColumn]) -> Result<E>
    where
        E: Default,
    {
        let mut entity = E::default();
        for (column, binding) in self.columns.iter().zip(&self.bindings) {
            let Some(setter) = &binding.setter else {
                continue;
            };
            if let Some(field) = columns.iter().position(|c| c.is(column)) {
                setter(&mut entity, row, field)?;
            }
        }
        Ok(entity)
    }
}

/// Configures a column before adding it to its table.
pub struct ColumnBuilder<'t, E, T> {
    table: &'t mut Table<E>,
    column: ColumnRef,
    codec: Codec<T>,
    binding: Binding<E>,
}

impl<'t, E: 'static, T: 'static> ColumnBuilder<'t, E, T> {
    pub fn primary_key(mut self) -> Self {
        self.column.primary_key = true;
        self.column.not_null = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.column.not_null = true;
        self
    }

    /// Bind the column to an entity field that is never NULL.
    ///
    /// When the store returns NULL the field keeps the value the entity factory gave it.
    pub fn accessor(
        mut self,
        get: impl Fn(&E) -> T + Send + Sync + 'static,
        set: impl Fn(&mut E, T) + Send + Sync + 'static,
    ) -> Self {
        let codec = self.codec.clone();
        self.binding.getter = Some(Arc::new(move |e: &E| codec.encode(Some(&get(e)))));
        let codec = self.codec.clone();
        self.binding.setter = Some(Arc::new(move |e: &mut E, row: &dyn Row, i: usize| -> Result<()> {
            if let Some(v) = codec.extract(row, i)? {
                set(e, v);
            }
            Ok(())
        }));
        self
    }

    /// Bind the column to an optional entity field.
    pub fn nullable_accessor(
        mut self,
        get: impl Fn(&E) -> Option<T> + Send + Sync + 'static,
        set: impl Fn(&mut E, Option<T>) + Send + Sync + 'static,
    ) -> Self {
        let codec = self.codec.clone();
        self.binding.getter = Some(Arc::new(move |e: &E| codec.encode(get(e).as_ref())));
        let codec = self.codec.clone();
        self.binding.setter = Some(Arc::new(move |e: &mut E, row: &dyn Row, i: usize| -> Result<()> {
            set(e, codec.extract(row, i)?);
            Ok(())
        }));
        self
    }

    pub fn build(self) -> Column<T> {
        self.table.columns.push(self.column.clone());
        self.table.bindings.push(self.binding);
        Column::new(self.column, self.codec)
    }
}
