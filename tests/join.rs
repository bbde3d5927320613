#[cfg(test)]
mod tests {
    use vessel::{
        Codec, Column, Delete, GenericSqlWriter, PostgresSqlWriter, Query, Select, SelectItem,
        SqlWriter, Statement, Table, Union, Update, count_all,
    };

    #[derive(Default)]
    struct Order;

    struct Tables {
        customers: Table<()>,
        customer_id: Column<i64>,
        customer_name: Column<String>,
        orders: Table<Order>,
        order_id: Column<i64>,
        order_customer: Column<i64>,
        total: Column<i64>,
    }

    fn tables() -> Tables {
        let mut customers = Table::<()>::new("customers");
        let customer_id = customers.column("id", Codec::<i64>::new()).build();
        let customer_name = customers.column("name", Codec::<String>::new()).build();
        let mut orders = Table::<Order>::new("orders").with_schema("sales");
        let order_id = orders.column("id", Codec::<i64>::new()).build();
        let order_customer = orders.column("customer_id", Codec::<i64>::new()).build();
        let total = orders.column("total", Codec::<i64>::new()).build();
        Tables {
            customers,
            customer_id,
            customer_name,
            orders,
            order_id,
            order_customer,
            total,
        }
    }

    fn sql(statement: impl Into<Statement>) -> String {
        GenericSqlWriter::default()
            .write_statement(&statement.into())
            .expect("Failed to compile the statement")
            .sql
    }

    #[test]
    fn joins_qualify_columns() {
        let t = tables();
        let select = Select::from(
            t.customers
                .source()
                .inner_join(t.orders.source(), t.order_customer.eq(&t.customer_id))
                .unwrap(),
        )
        .column(&t.customer_name)
        .column(&t.total)
        .filter(t.total.gt(100));
        assert_eq!(
            sql(select),
            "SELECT customers.name, sales.orders.total \
             FROM customers INNER JOIN sales.orders ON sales.orders.customer_id = customers.id \
             WHERE sales.orders.total > ?"
        );
    }

    #[test]
    fn aliases_are_declared_once() {
        let t = tables();
        let c = t.customers.aliased("c");
        let o = t.orders.aliased("o");
        let (c_id, c_name) = (t.customer_id.of(c.table_ref()), t.customer_name.of(c.table_ref()));
        let (o_customer, o_total) = (t.order_customer.of(o.table_ref()), t.total.of(o.table_ref()));
        let select = Select::from(
            c.source()
                .left_join(o.source(), o_customer.eq(&c_id))
                .unwrap(),
        )
        .columns([SelectItem::from(&c_name), o_total.sum().labeled("spent")])
        .group_by([c_name.expression()])
        .having(o_total.sum().gt(o_total.param(Some(10))))
        .order_by([c_name.asc()]);
        assert_eq!(
            sql(select),
            "SELECT c.name, SUM(o.total) AS spent \
             FROM customers c LEFT JOIN sales.orders o ON o.customer_id = c.id \
             GROUP BY c.name HAVING SUM(o.total) > ? ORDER BY c.name"
        );
    }

    #[test]
    fn every_join_type() {
        let t = tables();
        let on = || t.order_customer.eq(&t.customer_id);
        let right = Select::from(
            t.customers
                .source()
                .right_join(t.orders.source(), on())
                .unwrap(),
        )
        .column(&t.order_id);
        assert!(sql(right).contains(" RIGHT JOIN sales.orders ON "));
        let full = Select::from(
            t.customers
                .source()
                .full_join(t.orders.source(), on())
                .unwrap(),
        )
        .column(&t.order_id);
        assert!(sql(full).contains(" FULL JOIN sales.orders ON "));
        let cross = Select::from(t.customers.source().cross_join(t.orders.source()).unwrap())
            .column(count_all());
        assert_eq!(
            sql(cross),
            "SELECT COUNT(1) FROM customers CROSS JOIN sales.orders"
        );
        let three = t
            .customers
            .source()
            .inner_join(t.orders.source(), on())
            .unwrap()
            .left_join(
                t.customers.aliased("referrer").source(),
                t.customer_id
                    .of(&t.customers.table_ref().aliased("referrer"))
                    .eq(&t.customer_id),
            )
            .unwrap();
        assert_eq!(
            sql(Select::from(three).column(&t.order_id)),
            "SELECT sales.orders.id FROM customers \
             INNER JOIN sales.orders ON sales.orders.customer_id = customers.id \
             LEFT JOIN customers referrer ON referrer.id = customers.id"
        );
    }

    #[test]
    fn derived_sources() {
        let t = tables();
        let big = t
            .orders
            .select()
            .column(&t.order_customer)
            .column(t.total.max().labeled("largest"))
            .group_by([t.order_customer.expression()]);
        let select = Select::from(Query::from(big).aliased("big"))
            .filter(t.order_customer.of(&vessel::TableRef::new("big").aliased("big")).gt(1));
        assert_eq!(
            sql(select.clone()),
            "SELECT * FROM (SELECT customer_id, MAX(total) AS largest FROM sales.orders GROUP BY customer_id) big \
             WHERE big.customer_id > ?"
        );
        let columns: Vec<_> = select
            .result_columns()
            .into_iter()
            .filter_map(|c| c.column.map(|c| c.name.to_string()))
            .collect();
        assert_eq!(columns, ["customer_id", "largest"]);
    }

    #[test]
    fn modifications_never_qualify() {
        let t = tables();
        let o = t.orders.aliased("o");
        let update = Update::new(
            o.table_ref().clone(),
            [t.total.of(o.table_ref()).set(t.total.of(o.table_ref()).times(2)).unwrap()],
        )
        .unwrap()
        .filter(t.order_id.of(o.table_ref()).eq(5));
        assert_eq!(
            sql(update),
            "UPDATE sales.orders SET total = total * ? WHERE id = ?"
        );
        let delete = Delete::new(o.table_ref().clone()).filter(t.total.of(o.table_ref()).lt(1));
        assert_eq!(sql(delete), "DELETE FROM sales.orders WHERE total < ?");
    }

    #[test]
    fn union_order_is_unqualified() {
        let t = tables();
        let c = t.customers.aliased("c");
        let name = t.customer_name.of(c.table_ref());
        let left = c.select().column(&name).filter(name.like("A%"));
        let right = c.select().column(&name).filter(name.like("B%"));
        let union = Union::new(left, right, false)
            .unwrap()
            .order_by([name.desc()])
            .limit(4)
            .offset(8);
        let query = PostgresSqlWriter::default()
            .write_statement(&union.into())
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT c.name FROM customers c WHERE c.name LIKE $1 \
             UNION SELECT c.name FROM customers c WHERE c.name LIKE $2 \
             ORDER BY name DESC LIMIT $3 OFFSET $4"
        );
    }
}
