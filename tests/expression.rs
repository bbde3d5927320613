#[cfg(test)]
mod tests {
    use vessel::{
        Argument, BinaryOp, Codec, Column, Expression, FunctionCall, GenericSqlWriter, KeywordCasing,
        Operand, Operator, Select, SqlWriter, Table, Tuple, UnaryOp, Value, WireType, coalesce,
        count_all, exists, literal, not_exists, param, writer::Context,
    };

    struct Sample {
        table: Table<()>,
        a: Column<i64>,
        name: Column<String>,
        flag: Column<bool>,
    }

    fn sample() -> Sample {
        let mut table = Table::<()>::new("t");
        let a = table.column("a", Codec::<i64>::new()).build();
        let name = table.column("name", Codec::<String>::new()).build();
        let flag = table.column("flag", Codec::<bool>::new()).build();
        Sample {
            table,
            a,
            name,
            flag,
        }
    }

    fn render_with(writer: &dyn SqlWriter, expression: &Expression) -> (String, Vec<Value>) {
        let mut context = Context::default();
        let mut out = String::new();
        expression
            .write_query(writer, &mut context, &mut out)
            .expect("Failed to render the expression");
        (out, context.params.into_iter().map(|p| p.value).collect())
    }

    fn render(expression: &Expression) -> String {
        render_with(&GenericSqlWriter::default(), expression).0
    }

    #[test]
    fn comparisons() {
        let s = sample();
        let (sql, params) = render_with(&GenericSqlWriter::default(), &s.a.gte(3));
        assert_eq!(sql, "a >= ?");
        assert_eq!(params, [Value::Int64(Some(3))]);
        assert_eq!(render(&s.a.not_eq(&s.a)), "a <> a");
        assert_eq!(render(&s.name.not_like("x%")), "name NOT LIKE ?");
        assert_eq!(render(&s.a.not_between(1, 2)), "a NOT BETWEEN ? AND ?");
        assert_eq!(render(&s.name.is_null()), "name IS NULL");
        assert_eq!(render(&s.name.is_not_null()), "name IS NOT NULL");
    }

    #[test]
    fn logical_operators() {
        let s = sample();
        let condition = s.a.eq(1).and(s.name.eq("x")).not();
        assert_eq!(render(&condition), "NOT((a = ?) AND (name = ?))");
        assert_eq!(render(&s.flag.expression().not()), "NOT flag");
        let condition = s.a.lt(0).or(s.a.gt(10).and(s.flag.eq(true)));
        assert_eq!(
            render(&condition),
            "(a < ?) OR ((a > ?) AND (flag = ?))"
        );
        let lower = GenericSqlWriter::new(vessel::WriterConfig {
            keyword_casing: KeywordCasing::Lower,
            ..Default::default()
        });
        assert_eq!(
            render_with(&lower, &s.a.eq(1).not()).0,
            "not(a = ?)"
        );
    }

    #[test]
    fn arithmetic() {
        let s = sample();
        assert_eq!(render(&s.a.neg()), "-a");
        assert_eq!(render(&s.a.times(s.a.plus(2))), "a * (a + ?)");
        assert_eq!(render(&s.a.rem(2).eq(param(0_i64))), "(a % ?) = ?");
        let nested = s.a.minus(1).eq(s.a.div(s.a.plus(1)));
        assert_eq!(render(&nested), "(a - ?) = (a / (a + ?))");
        assert_eq!(render(&s.a.plus(1).is_null()), "(a + ?) IS NULL");
    }

    #[test]
    fn typed_parameters() {
        let s = sample();
        let (_, params) = render_with(&GenericSqlWriter::default(), &s.a.param(None));
        assert_eq!(params, [Value::Int64(None)]);
        let (sql, params) = render_with(&GenericSqlWriter::default(), &param(2.5_f64));
        assert_eq!(sql, "?");
        assert_eq!(params, [Value::Float64(Some(2.5))]);
        assert_eq!(s.a.param(None).value_type(), Some(WireType::Int64));
    }

    #[test]
    fn in_lists() {
        let s = sample();
        let (sql, params) = render_with(
            &GenericSqlWriter::default(),
            &s.a.not_in_list([1, 2, 3]).unwrap(),
        );
        assert_eq!(sql, "a NOT IN (?, ?, ?)");
        assert_eq!(params.len(), 3);
        assert!(s.a.in_list(Vec::<i64>::new()).is_err());
        let subquery = s.table.select().column(&s.a).filter(s.flag.eq(true));
        assert_eq!(
            render(&s.a.in_query(subquery).unwrap()),
            "a IN (SELECT a FROM t WHERE flag = ?)"
        );
        let values = s
            .name
            .in_list([
                Argument::<String>::Expression(literal("x")),
                Argument::Value(None),
            ])
            .unwrap();
        assert_eq!(render(&values), "name IN ('x', ?)");
    }

    #[test]
    fn subqueries() {
        let s = sample();
        let probe = Select::from(s.table.source()).column(literal(1_i64));
        assert_eq!(render(&exists(probe.clone())), "EXISTS(SELECT 1 FROM t)");
        assert_eq!(render(&not_exists(probe)), "NOT EXISTS(SELECT 1 FROM t)");
        let highest: Expression = s.table.select().column(s.a.max()).into();
        assert_eq!(render(&s.a.eq(highest)), "a = (SELECT MAX(a) FROM t)");
    }

    #[test]
    fn functions() {
        let s = sample();
        assert_eq!(render(&count_all()), "COUNT(1)");
        assert_eq!(render(&s.name.lower()), "LOWER(name)");
        assert_eq!(render(&s.name.length().gt(param(3_i64))), "LENGTH(name) > ?");
        assert_eq!(render(&s.a.sum()), "SUM(a)");
        let fallback = coalesce([s.name.expression(), literal("none")]).unwrap();
        assert_eq!(render(&fallback), "COALESCE(name, 'none')");
        assert_eq!(fallback.value_type(), Some(WireType::Varchar));
        assert!(coalesce(Vec::new()).is_err());
        let now: Expression =
            FunctionCall::new("current_timestamp", Vec::new(), Some(WireType::Timestamp))
                .without_parens()
                .into();
        assert_eq!(render(&now), "CURRENT_TIMESTAMP");
        let random: Expression = FunctionCall::new("random", Vec::new(), None).into();
        assert_eq!(render(&random), "RANDOM()");
    }

    #[test]
    fn tuples() {
        let s = sample();
        let pair: Expression = Tuple::new([s.a.expression(), s.name.expression()])
            .unwrap()
            .into();
        let values: Expression = Tuple::new([param(1_i64), param("x".to_string())])
            .unwrap()
            .into();
        assert_eq!(render(&pair.eq(values)), "(a, name) = (?, ?)");
        let single: Expression = Tuple::new([s.a.expression()]).unwrap().into();
        assert_eq!(render(&single), "a");
        assert!(Tuple::new(Vec::new()).is_err());
    }

    #[test]
    fn operand_parentheses_can_be_overridden() {
        let s = sample();
        let flat: Expression = BinaryOp::new(
            Operand::new(s.a.plus(1)).parenthesized(false),
            Operator::new(["*"]).unwrap(),
            literal(2_i64),
            Some(WireType::Int64),
        )
        .into();
        assert_eq!(render(&flat), "a + ? * 2");
        let wrapped: Expression = BinaryOp::new(
            Operand::new(s.a.expression()).parenthesized(true),
            Operator::new(["||"]).unwrap(),
            s.name.expression(),
            Some(WireType::Varchar),
        )
        .into();
        assert_eq!(render(&wrapped), "(a) || name");
        let custom: Expression = UnaryOp::new(
            Operator::new(["is", "true"]).unwrap(),
            s.flag.expression(),
            true,
            Some(WireType::Boolean),
        )
        .into();
        assert_eq!(render(&custom), "flag IS TRUE");
        assert!(Operator::new([""]).is_err());
    }
}
