use crate::{
    Parameter, Result, SqlWriter,
    writer::{Context, WriterConfig},
};
use std::fmt::Write;

/// PostgreSQL flavour: numbered placeholders and `LIMIT` / `OFFSET`.
#[derive(Default, Debug, Clone)]
pub struct PostgresSqlWriter {
    pub config: WriterConfig,
}

impl PostgresSqlWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }
}

impl SqlWriter for PostgresSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn config(&self) -> &WriterConfig {
        &self.config
    }

    fn dialect_name(&self) -> &'static str {
        "postgres"
    }

    fn write_placeholder(&self, context: &mut Context, out: &mut String, value: &Parameter) {
        context.params.push(value.clone());
        let _ = write!(out, "${}", context.counter());
    }

    fn write_pagination(
        &self,
        context: &mut Context,
        out: &mut String,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<()> {
        if let Some(limit) = limit {
            out.push(' ');
            self.write_keyword(context, out, "limit");
            out.push(' ');
            self.write_placeholder(context, out, &pagination_param(limit));
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

/// Row counts travel as BIGINT parameters.
pub fn pagination_param(value: u64) -> Parameter {
    Parameter::new(Some(i64::try_from(value).unwrap_or(i64::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Codec, Statement, Table};

    #[test]
    fn numbered_placeholders() {
        let mut users = Table::<()>::new("users");
        let id = users.column("id", Codec::<i64>::new()).build();
        let select = users
            .select()
            .filter(id.gt(5_i64))
            .limit(10)
            .offset(20);
        let query = PostgresSqlWriter::default()
            .write_statement(&Statement::from(select))
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT * FROM users WHERE id > $1 LIMIT $2 OFFSET $3"
        );
        assert_eq!(query.params.len(), 3);
    }
}
