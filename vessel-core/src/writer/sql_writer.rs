use crate::{
    BinaryOp, Case, ColumnRef, Delete, Expression, Failure, FunctionCall, IdentifierCase, InList,
    Insert, Join, JoinType, Operand, Operator, OrderBy, Parameter, Query, QuerySource, Raw,
    Result, Select, SelectItem, SqlAndParams, Statement, StoreMetadata, TableRef, TernaryOp,
    Tuple, UnaryOp, Union, Update, Value, is_plain_identifier, possibly_parenthesized,
    reserved_keywords, separated_by, try_separated_by,
    writer::{Context, Fragment},
};
use std::{collections::HashSet, fmt::Write, sync::Arc};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $context:ident, $out:ident, $value:expr) => {{
        if $value.is_infinite() {
            $this.write_value_infinity($context, $out, $value.is_sign_negative());
        } else if $value.is_nan() {
            $this.write_value_nan($context, $out);
        } else {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        }
    }};
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCasing {
    #[default]
    Upper,
    Lower,
}

/// Formatting rules shared by every writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Reserved words, lower case.
    pub keywords: Arc<HashSet<String>>,
    pub keyword_casing: KeywordCasing,
    pub identifier_quote: Arc<str>,
    /// Quote every identifier, not only the ones that need it.
    pub always_quote: bool,
    pub identifier_case: IdentifierCase,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            keywords: Arc::new(reserved_keywords::<&str>([])),
            keyword_casing: KeywordCasing::Upper,
            identifier_quote: "\"".into(),
            always_quote: false,
            identifier_case: IdentifierCase::Mixed,
        }
    }
}

impl WriterConfig {
    /// Configuration matching what the store reported about itself.
    pub fn from_metadata(metadata: &StoreMetadata) -> Self {
        Self {
            keywords: Arc::new(reserved_keywords(&metadata.keywords)),
            keyword_casing: match metadata.identifier_case {
                IdentifierCase::Upper => KeywordCasing::Upper,
                _ => KeywordCasing::Lower,
            },
            identifier_quote: if metadata.identifier_quote.trim().is_empty() {
                "\"".into()
            } else {
                metadata.identifier_quote.trim().into()
            },
            always_quote: false,
            identifier_case: metadata.identifier_case,
        }
    }
}

/// Dialect printer converting the statement tree into SQL text and parameters.
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    fn config(&self) -> &WriterConfig;

    /// Name used in unsupported capability errors.
    fn dialect_name(&self) -> &'static str {
        "generic"
    }

    /// Whether the current fragment context allows alias declaration.
    fn alias_declaration(&self, context: &mut Context) -> bool {
        matches!(context.fragment, Fragment::SqlSelectFrom | Fragment::SqlJoin)
    }

    /// Render a keyword applying the configured casing.
    fn write_keyword(&self, _context: &mut Context, out: &mut String, keyword: &str) {
        match self.config().keyword_casing {
            KeywordCasing::Upper => out.extend(keyword.chars().map(|c| c.to_ascii_uppercase())),
            KeywordCasing::Lower => out.extend(keyword.chars().map(|c| c.to_ascii_lowercase())),
        }
    }

    /// Escape occurrences of `search` with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: &str,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, _) in value.match_indices(search) {
            out.push_str(&value[position..i]);
            out.push_str(replace);
            position = i + search.len();
        }
        out.push_str(&value[position..]);
    }

    /// Whether `value` must be quoted to be read back as the same identifier.
    fn should_quote(&self, value: &str) -> bool {
        let config = self.config();
        if config.always_quote
            || !is_plain_identifier(value)
            || config.keywords.contains(&value.to_lowercase())
        {
            return true;
        }
        let mixed = value.chars().any(|c| c.is_ascii_uppercase())
            && value.chars().any(|c| c.is_ascii_lowercase());
        mixed && config.identifier_case != IdentifierCase::Mixed
    }

    /// Quote identifiers doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        let quote = self.config().identifier_quote.clone();
        out.push_str(&quote);
        self.write_escaped(context, out, value, &quote, &quote.repeat(2));
        out.push_str(&quote);
    }

    fn write_identifier(&self, context: &mut Context, out: &mut String, value: &str) {
        if self.should_quote(value) {
            self.write_identifier_quoted(context, out, value);
        } else {
            out.push_str(value);
        }
    }

    /// Render a table reference, declaring its alias in FROM and JOIN.
    fn write_table_ref(&self, context: &mut Context, out: &mut String, value: &TableRef) {
        if let Some(schema) = &value.schema {
            self.write_identifier(context, out, schema);
            out.push('.');
        }
        self.write_identifier(context, out, &value.name);
        if let Some(alias) = &value.alias
            && self.alias_declaration(context)
        {
            out.push(' ');
            self.write_identifier(context, out, alias);
        }
    }

    /// Render a column reference, `[alias.]name`.
    fn write_column_ref(&self, context: &mut Context, out: &mut String, value: &ColumnRef) {
        if context.allows_qualified_columns() {
            if let Some(alias) = &value.table.alias {
                self.write_identifier(context, out, alias);
                out.push('.');
            } else if context.qualify_columns {
                if let Some(schema) = &value.table.schema {
                    self.write_identifier(context, out, schema);
                    out.push('.');
                }
                self.write_identifier(context, out, &value.table.name);
                out.push('.');
            }
        }
        self.write_identifier(context, out, &value.name);
    }

    /// Render a positional placeholder and collect its parameter.
    fn write_placeholder(&self, context: &mut Context, out: &mut String, value: &Parameter) {
        context.params.push(value.clone());
        out.push('?');
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, context: &mut Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, context, out, *v),
            Value::Float64(Some(v)) => write_float!(self, context, out, *v),
            Value::Decimal(Some(v)) => drop(write!(out, "{}", v)),
            Value::Varchar(Some(v)) => self.write_value_string(context, out, v),
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v),
            Value::Date(Some(v)) => self.write_value_date(context, out, v, false),
            Value::Time(Some(v)) => self.write_value_time(context, out, v, false),
            Value::Timestamp(Some(v)) => self.write_value_timestamp(context, out, v),
            Value::TimestampWithTimezone(Some(v)) => {
                self.write_value_timestamptz(context, out, v)
            }
            Value::Uuid(Some(v)) => drop(write!(out, "'{}'", v)),
            _ => self.write_value_none(context, out),
        };
    }

    /// Render NULL literal.
    fn write_value_none(&self, context: &mut Context, out: &mut String) {
        self.write_keyword(context, out, "null");
    }

    /// Render boolean literal.
    fn write_value_bool(&self, context: &mut Context, out: &mut String, value: bool) {
        self.write_keyword(context, out, ["false", "true"][value as usize]);
    }

    /// Render +/- INF via CAST for dialect portability.
    fn write_value_infinity(&self, context: &mut Context, out: &mut String, negative: bool) {
        self.write_keyword(context, out, "cast");
        out.push_str(if negative { "('-Infinity' " } else { "('Infinity' " });
        self.write_keyword(context, out, "as double precision");
        out.push(')');
    }

    /// Render NaN via CAST for dialect portability.
    fn write_value_nan(&self, context: &mut Context, out: &mut String) {
        self.write_keyword(context, out, "cast");
        out.push_str("('NaN' ");
        self.write_keyword(context, out, "as double precision");
        out.push(')');
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(context, out, value, "'", "''");
        out.push('\'');
    }

    /// Render a blob literal, `X'0A1B'`.
    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    /// Render a DATE literal (optionally as part of TIMESTAMP composition).
    fn write_value_date(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &Date,
        timestamp: bool,
    ) {
        let b = if timestamp { "" } else { "'" };
        let _ = write!(
            out,
            "{b}{:04}-{:02}-{:02}{b}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    /// Render a TIME literal (optionally as part of TIMESTAMP composition).
    fn write_value_time(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &Time,
        timestamp: bool,
    ) {
        let mut subsecond = value.nanosecond();
        let mut width = 9;
        while width > 1 && subsecond % 10 == 0 {
            subsecond /= 10;
            width -= 1;
        }
        let b = if timestamp { "" } else { "'" };
        let _ = write!(
            out,
            "{b}{:02}:{:02}:{:02}.{:0width$}{b}",
            value.hour(),
            value.minute(),
            value.second(),
            subsecond
        );
    }

    /// Render a TIMESTAMP literal.
    fn write_value_timestamp(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &PrimitiveDateTime,
    ) {
        out.push('\'');
        self.write_value_date(context, out, &value.date(), true);
        out.push(' ');
        self.write_value_time(context, out, &value.time(), true);
        out.push('\'');
    }

    /// Render a TIMESTAMPTZ literal, normalized to UTC.
    fn write_value_timestamptz(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &OffsetDateTime,
    ) {
        let date_time = value.to_offset(UtcOffset::UTC);
        self.write_value_timestamp(
            context,
            out,
            &PrimitiveDateTime::new(date_time.date(), date_time.time()),
        );
    }

    /// Render the tokens of an operator separated by spaces.
    fn write_operator(&self, context: &mut Context, out: &mut String, value: &Operator) {
        separated_by(
            out,
            value.tokens(),
            |out, v| self.write_keyword(context, out, v),
            " ",
        );
    }

    /// Render an operand honoring its parenthesization flag.
    fn write_operand(&self, context: &mut Context, out: &mut String, value: &Operand) -> Result<()> {
        possibly_parenthesized!(
            out,
            value.parenthesized,
            value.expression.write_query(self.as_dyn(), context, out)?
        );
        Ok(())
    }

    /// Render unary operator expression, `KEYWORD(expr)`, `KEYWORD expr` or `expr KEYWORD`.
    fn write_expression_unary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &UnaryOp,
    ) -> Result<()> {
        if value.postfix {
            self.write_operand(context, out, &value.operand)?;
            out.push(' ');
            self.write_operator(context, out, &value.operator);
            return Ok(());
        }
        self.write_operator(context, out, &value.operator);
        let symbolic = value
            .operator
            .tokens()
            .last()
            .is_some_and(|v| !v.chars().any(char::is_alphanumeric));
        if !value.operand.parenthesized && !symbolic {
            out.push(' ');
        }
        self.write_operand(context, out, &value.operand)
    }

    /// Render binary operator expression, `left OP right`.
    fn write_expression_binary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &BinaryOp,
    ) -> Result<()> {
        self.write_operand(context, out, &value.left)?;
        out.push(' ');
        self.write_operator(context, out, &value.operator);
        out.push(' ');
        self.write_operand(context, out, &value.right)
    }

    /// Render ternary operator expression, `first OP second OP2 third`.
    fn write_expression_ternary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &TernaryOp,
    ) -> Result<()> {
        self.write_operand(context, out, &value.first)?;
        out.push(' ');
        self.write_operator(context, out, &value.operator);
        out.push(' ');
        self.write_operand(context, out, &value.second)?;
        out.push(' ');
        self.write_operator(context, out, &value.operator2);
        out.push(' ');
        self.write_operand(context, out, &value.third)
    }

    /// Render a function call, a sub-select argument is delimited by the call parentheses.
    fn write_expression_function(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &FunctionCall,
    ) -> Result<()> {
        self.write_keyword(context, out, &value.name);
        if value.args.is_empty() && !value.parens_when_empty {
            return Ok(());
        }
        out.push('(');
        try_separated_by(
            out,
            &value.args,
            |out, v| match v {
                Expression::Select(select) => self.write_select(context, out, select),
                _ => v.write_query(self.as_dyn(), context, out),
            },
            ", ",
        )?;
        out.push(')');
        Ok(())
    }

    fn write_expression_case(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Case,
    ) -> Result<()> {
        self.write_keyword(context, out, "case");
        if let Some(operand) = &value.operand {
            out.push(' ');
            operand.write_query(self.as_dyn(), context, out)?;
        }
        for (condition, result) in &value.branches {
            out.push(' ');
            self.write_keyword(context, out, "when");
            out.push(' ');
            condition.write_query(self.as_dyn(), context, out)?;
            out.push(' ');
            self.write_keyword(context, out, "then");
            out.push(' ');
            result.write_query(self.as_dyn(), context, out)?;
        }
        if let Some(otherwise) = &value.otherwise {
            out.push(' ');
            self.write_keyword(context, out, "else");
            out.push(' ');
            otherwise.write_query(self.as_dyn(), context, out)?;
        }
        out.push(' ');
        self.write_keyword(context, out, "end");
        Ok(())
    }

    fn write_expression_in(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &InList,
    ) -> Result<()> {
        self.write_operand(context, out, &value.operand)?;
        out.push(' ');
        self.write_keyword(context, out, if value.negated { "not in" } else { "in" });
        out.push_str(" (");
        if let Some(query) = &value.query {
            self.write_select(context, out, query)?;
        } else {
            try_separated_by(
                out,
                &value.values,
                |out, v| v.write_query(self.as_dyn(), context, out),
                ", ",
            )?;
        }
        out.push(')');
        Ok(())
    }

    fn write_expression_tuple(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Tuple,
    ) -> Result<()> {
        let elements = value.elements();
        possibly_parenthesized!(
            out,
            elements.len() > 1,
            try_separated_by(
                out,
                elements,
                |out, v| v.write_query(self.as_dyn(), context, out),
                ", ",
            )?
        );
        Ok(())
    }

    /// Render a select nested in an expression.
    fn write_subquery(&self, context: &mut Context, out: &mut String, value: &Select) -> Result<()> {
        out.push('(');
        self.write_select(context, out, value)?;
        out.push(')');
        Ok(())
    }

    /// Render a sort key, `DESC` is written only for descending order.
    fn write_order_by(&self, context: &mut Context, out: &mut String, value: &OrderBy) -> Result<()> {
        value.expression.write_query(self.as_dyn(), context, out)?;
        if value.descending {
            out.push(' ');
            self.write_keyword(context, out, "desc");
        }
        Ok(())
    }

    fn write_select_item(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &SelectItem,
    ) -> Result<()> {
        value.expression.write_query(self.as_dyn(), context, out)?;
        if let Some(label) = &value.label {
            out.push(' ');
            self.write_keyword(context, out, "as");
            out.push(' ');
            self.write_identifier(context, out, label);
        }
        Ok(())
    }

    fn write_source(&self, context: &mut Context, out: &mut String, value: &QuerySource) -> Result<()> {
        match value {
            QuerySource::Table { table, .. } => {
                self.write_table_ref(context, out, table);
                Ok(())
            }
            QuerySource::Join(join) => self.write_join(context, out, join),
            QuerySource::Derived { query, alias } => {
                out.push('(');
                self.write_query(context, out, query)?;
                out.push_str(") ");
                self.write_identifier(context, out, alias);
                Ok(())
            }
        }
    }

    /// Render join keyword(s) for the given join type.
    fn write_join_type(&self, context: &mut Context, out: &mut String, join_type: &JoinType) {
        self.write_keyword(
            context,
            out,
            match join_type {
                JoinType::Inner => "inner join",
                JoinType::Left => "left join",
                JoinType::Right => "right join",
                JoinType::Full => "full join",
                JoinType::Cross => "cross join",
            },
        );
    }

    /// Render a JOIN clause.
    fn write_join(&self, context: &mut Context, out: &mut String, join: &Join) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlJoin);
        context.current.qualify_columns = true;
        self.write_source(&mut context.current, out, &join.left)?;
        out.push(' ');
        self.write_join_type(&mut context.current, out, &join.join_type);
        out.push(' ');
        self.write_source(&mut context.current, out, &join.right)?;
        if let Some(on) = &join.on {
            out.push(' ');
            self.write_keyword(&mut context.current, out, "on");
            out.push(' ');
            on.write_query(self.as_dyn(), &mut context.current, out)?;
        }
        Ok(())
    }

    /// Render LIMIT / OFFSET, not every dialect can.
    fn write_pagination(
        &self,
        _context: &mut Context,
        _out: &mut String,
        _limit: Option<u64>,
        _offset: Option<u64>,
    ) -> Result<()> {
        Err(Failure::unsupported(self.dialect_name(), "pagination"))
    }

    /// Emit SELECT statement (projection, FROM, WHERE, GROUP BY, HAVING, ORDER BY, pagination).
    fn write_select(&self, context: &mut Context, out: &mut String, value: &Select) -> Result<()> {
        value.validate()?;
        let mut context = context.switch_fragment(Fragment::SqlSelect);
        let context = &mut context.current;
        context.qualify_columns = context.qualify_columns
            || value.from.as_ref().is_some_and(QuerySource::is_join);
        self.write_keyword(context, out, "select");
        out.push(' ');
        if value.distinct {
            self.write_keyword(context, out, "distinct");
            out.push(' ');
        }
        if value.columns.is_empty() {
            out.push('*');
        } else {
            try_separated_by(
                out,
                &value.columns,
                |out, v| self.write_select_item(context, out, v),
                ", ",
            )?;
        }
        if let Some(from) = &value.from {
            out.push(' ');
            self.write_keyword(context, out, "from");
            out.push(' ');
            self.write_source(
                &mut context.switch_fragment(Fragment::SqlSelectFrom).current,
                out,
                from,
            )?;
        }
        if let Some(filter) = &value.filter {
            out.push(' ');
            self.write_keyword(context, out, "where");
            out.push(' ');
            filter.write_query(
                self.as_dyn(),
                &mut context.switch_fragment(Fragment::SqlSelectWhere).current,
                out,
            )?;
        }
        if !value.group_by.is_empty() {
            out.push(' ');
            self.write_keyword(context, out, "group by");
            out.push(' ');
            let mut context = context.switch_fragment(Fragment::SqlSelectGroupBy);
            try_separated_by(
                out,
                &value.group_by,
                |out, v| v.write_query(self.as_dyn(), &mut context.current, out),
                ", ",
            )?;
        }
        if let Some(having) = &value.having {
            out.push(' ');
            self.write_keyword(context, out, "having");
            out.push(' ');
            having.write_query(
                self.as_dyn(),
                &mut context.switch_fragment(Fragment::SqlSelectHaving).current,
                out,
            )?;
        }
        if !value.order_by.is_empty() {
            out.push(' ');
            self.write_keyword(context, out, "order by");
            out.push(' ');
            let mut context = context.switch_fragment(Fragment::SqlSelectOrderBy);
            try_separated_by(
                out,
                &value.order_by,
                |out, v| self.write_order_by(&mut context.current, out, v),
                ", ",
            )?;
        }
        if value.limit.is_some() || value.offset.is_some() {
            self.write_pagination(context, out, value.limit, value.offset)?;
        }
        Ok(())
    }

    /// Emit `left UNION [ALL] right` with the optional trailing ORDER BY and pagination.
    fn write_union(&self, context: &mut Context, out: &mut String, value: &Union) -> Result<()> {
        let side = |context: &mut Context, out: &mut String, query: &Query| -> Result<()> {
            possibly_parenthesized!(
                out,
                value.parenthesized,
                self.write_query(context, out, query)?
            );
            Ok(())
        };
        side(context, out, &*value.left)?;
        out.push(' ');
        self.write_keyword(context, out, if value.all { "union all" } else { "union" });
        out.push(' ');
        side(context, out, &*value.right)?;
        if !value.order_by.is_empty() {
            out.push(' ');
            self.write_keyword(context, out, "order by");
            out.push(' ');
            let mut context = context.switch_fragment(Fragment::SqlUnionOrderBy);
            try_separated_by(
                out,
                &value.order_by,
                |out, v| self.write_order_by(&mut context.current, out, v),
                ", ",
            )?;
        }
        if value.limit.is_some() || value.offset.is_some() {
            self.write_pagination(context, out, value.limit, value.offset)?;
        }
        Ok(())
    }

    fn write_query(&self, context: &mut Context, out: &mut String, value: &Query) -> Result<()> {
        match value {
            Query::Select(v) => self.write_select(context, out, v),
            Query::Union(v) => self.write_union(context, out, v),
        }
    }

    /// Emit INSERT with either a VALUES list or a select.
    fn write_insert(&self, context: &mut Context, out: &mut String, value: &Insert) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlInsertInto);
        self.write_keyword(&mut context.current, out, "insert into");
        out.push(' ');
        self.write_table_ref(&mut context.current, out, &value.table);
        out.push_str(" (");
        separated_by(
            out,
            &value.columns,
            |out, v| self.write_identifier(&mut context.current, out, &v.name),
            ", ",
        );
        out.push_str(") ");
        if let Some(query) = &value.query {
            return self.write_select(&mut context.current, out, query);
        }
        self.write_keyword(&mut context.current, out, "values");
        out.push(' ');
        let mut context = context.current.switch_fragment(Fragment::SqlInsertIntoValues);
        try_separated_by(
            out,
            &value.rows,
            |out, row| {
                out.push('(');
                try_separated_by(
                    out,
                    row,
                    |out, v| v.write_query(self.as_dyn(), &mut context.current, out),
                    ", ",
                )?;
                out.push(')');
                Ok(())
            },
            ", ",
        )
    }

    /// Emit UPDATE with its assignments and optional WHERE.
    fn write_update(&self, context: &mut Context, out: &mut String, value: &Update) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlUpdate);
        self.write_keyword(&mut context.current, out, "update");
        out.push(' ');
        self.write_table_ref(&mut context.current, out, &value.table);
        out.push(' ');
        self.write_keyword(&mut context.current, out, "set");
        out.push(' ');
        {
            let mut context = context.current.switch_fragment(Fragment::SqlUpdateSet);
            try_separated_by(
                out,
                &value.assignments,
                |out, v| {
                    self.write_identifier(&mut context.current, out, &v.column.name);
                    out.push_str(" = ");
                    v.value.write_query(self.as_dyn(), &mut context.current, out)
                },
                ", ",
            )?;
        }
        if let Some(filter) = &value.filter {
            out.push(' ');
            self.write_keyword(&mut context.current, out, "where");
            out.push(' ');
            filter.write_query(
                self.as_dyn(),
                &mut context.current.switch_fragment(Fragment::SqlUpdateWhere).current,
                out,
            )?;
        }
        Ok(())
    }

    /// Emit DELETE statement with optional WHERE clause.
    fn write_delete(&self, context: &mut Context, out: &mut String, value: &Delete) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlDeleteFrom);
        self.write_keyword(&mut context.current, out, "delete from");
        out.push(' ');
        self.write_table_ref(&mut context.current, out, &value.table);
        if let Some(filter) = &value.filter {
            out.push(' ');
            self.write_keyword(&mut context.current, out, "where");
            out.push(' ');
            filter.write_query(
                self.as_dyn(),
                &mut context
                    .current
                    .switch_fragment(Fragment::SqlDeleteFromWhere)
                    .current,
                out,
            )?;
        }
        Ok(())
    }

    /// Copy hand written SQL, every `?` outside quotes becomes the placeholder of
    /// the next parameter in this dialect.
    fn write_raw(&self, context: &mut Context, out: &mut String, value: &Raw) -> Result<()> {
        let mut params = value.params.iter();
        let mut quote = None;
        for c in value.sql.chars() {
            match (quote, c) {
                (None, '\'' | '"' | '`') => quote = Some(c),
                (Some(q), c) if q == c => quote = None,
                (None, '?') => {
                    let Some(param) = params.next() else {
                        return Err(Failure::construction(format!(
                            "Raw SQL has more placeholders than its {} parameters",
                            value.params.len()
                        )));
                    };
                    self.write_placeholder(context, out, param);
                    continue;
                }
                _ => {}
            }
            out.push(c);
        }
        if params.next().is_some() {
            return Err(Failure::construction(format!(
                "Raw SQL has fewer placeholders than its {} parameters",
                value.params.len()
            )));
        }
        Ok(())
    }

    /// Trailing decoration of a complete statement.
    fn finish(&self, _context: &mut Context, _out: &mut String) {}

    /// Compile a statement into SQL text and parameters.
    fn write_statement(&self, statement: &Statement) -> Result<SqlAndParams> {
        let mut context = Context::default();
        let mut out = String::with_capacity(128);
        match statement {
            Statement::Select(v) => self.write_select(&mut context, &mut out, v)?,
            Statement::Union(v) => self.write_union(&mut context, &mut out, v)?,
            Statement::Insert(v) => self.write_insert(&mut context, &mut out, v)?,
            Statement::Update(v) => self.write_update(&mut context, &mut out, v)?,
            Statement::Delete(v) => self.write_delete(&mut context, &mut out, v)?,
            Statement::Raw(v) => self.write_raw(&mut context, &mut out, v)?,
        }
        self.finish(&mut context, &mut out);
        Ok(SqlAndParams {
            sql: out,
            params: context.params,
        })
    }
}

/// Baseline writer, standard SQL without pagination.
#[derive(Default, Debug, Clone)]
pub struct GenericSqlWriter {
    pub config: WriterConfig,
}

impl GenericSqlWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn config(&self) -> &WriterConfig {
        &self.config
    }
}
