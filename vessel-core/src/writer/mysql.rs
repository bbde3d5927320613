use crate::{
    Result, SqlWriter,
    writer::{Context, WriterConfig, pagination_param},
};

/// MySQL flavour: backtick quoting and `LIMIT offset, count`.
#[derive(Debug, Clone)]
pub struct MySqlSqlWriter {
    pub config: WriterConfig,
}

impl MySqlSqlWriter {
    pub fn new(mut config: WriterConfig) -> Self {
        if &*config.identifier_quote == "\"" {
            config.identifier_quote = "`".into();
        }
        Self { config }
    }
}

impl Default for MySqlSqlWriter {
    fn default() -> Self {
        Self::new(WriterConfig::default())
    }
}

impl SqlWriter for MySqlSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn config(&self) -> &WriterConfig {
        &self.config
    }

    fn dialect_name(&self) -> &'static str {
        "mysql"
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
        if let Some(offset) = offset {
            self.write_placeholder(context, out, &pagination_param(offset));
            out.push_str(", ");
        }
        self.write_placeholder(context, out, &pagination_param(limit.unwrap_or(u64::MAX)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Codec, Statement, Table, Value};

    #[test]
    fn offset_comes_first() {
        let mut users = Table::<()>::new("users");
        let name = users.column("select", Codec::<String>::new()).build();
        let select = users.select().column(&name).offset(20).limit(10);
        let query = MySqlSqlWriter::default()
            .write_statement(&Statement::from(select))
            .unwrap();
        assert_eq!(query.sql, "SELECT `select` FROM users LIMIT ?, ?");
        assert_eq!(query.params[0].value, Value::Int64(Some(20)));
        assert_eq!(query.params[1].value, Value::Int64(Some(10)));
    }
}
