use vessel_core::{
    Dialect, Result, SqlWriter, StoreMetadata,
    writer::{Context, WriterConfig, pagination_param},
};

/// SQLite flavour: `LIMIT ? OFFSET ?`, an offset alone needs `LIMIT -1`.
#[derive(Default, Debug, Clone)]
pub struct SqliteSqlWriter {
    pub config: WriterConfig,
}

impl SqliteSqlWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }
}

impl SqlWriter for SqliteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn config(&self) -> &WriterConfig {
        &self.config
    }

    fn dialect_name(&self) -> &'static str {
        "sqlite"
    }

    fn write_value_infinity(&self, _context: &mut Context, out: &mut String, negative: bool) {
        if negative {
            out.push('-');
        }
        out.push_str("1.0e+10000");
    }

    fn write_pagination(
        &self,
        context: &mut Context,
        out: &mut String,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<()> {
        out.push(' ');
        self.write_keyword(context, out, "limit");
        out.push(' ');
        match limit {
            Some(limit) => self.write_placeholder(context, out, &pagination_param(limit)),
            None => out.push_str("-1"),
        }
        if let Some(offset) = offset {
            out.push(' ');
            self.write_keyword(context, out, "offset");
            out.push(' ');
            self.write_placeholder(context, out, &pagination_param(offset));
        }
        Ok(())
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn accepts(&self, metadata: &StoreMetadata) -> bool {
        metadata.product_name.eq_ignore_ascii_case("sqlite")
    }

    fn sql_writer(&self, config: WriterConfig) -> Box<dyn SqlWriter> {
        Box::new(SqliteSqlWriter::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vessel_core::{Codec, Statement, Table};

    #[test]
    fn offset_without_limit() {
        let mut items = Table::<()>::new("items");
        let id = items.column("id", Codec::<i64>::new()).build();
        let select = items.select().column(&id).order_by([id.desc()]).offset(5);
        let query = SqliteSqlWriter::default()
            .write_statement(&Statement::from(select))
            .unwrap();
        assert_eq!(query.sql, "SELECT id FROM items ORDER BY id DESC LIMIT -1 OFFSET ?");
        assert_eq!(query.params.len(), 1);
    }
}
