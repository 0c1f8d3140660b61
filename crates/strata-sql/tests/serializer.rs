mod fixtures;

use fixtures::*;
use pretty_assertions::assert_eq;
use strata_core::schema::db::{DefaultSqlTypeMapping, Tables};
use strata_core::schema::SqlIdentifier;
use strata_core::stmt::Value;
use strata_sql::stmt::{Assignment, Expr, Insert, Select, TableRef, Update};
use strata_sql::{ddl, Serializer, Statement};

fn ident(name: &str) -> SqlIdentifier {
    SqlIdentifier::unquoted(name)
}

fn render(serializer: Serializer, stmt: impl Into<Statement>) -> String {
    serializer.serialize(&stmt.into()).to_string()
}

#[test]
fn update_with_literals() {
    let update = Update {
        table: ident("mytable"),
        assignments: vec![
            Assignment {
                column: ident("foo"),
                value: Expr::literal("baz"),
            },
            Assignment {
                column: ident("bar"),
                value: Expr::literal(42),
            },
        ],
        filter: None,
    };

    assert_eq!(
        render(Serializer::postgresql(), update),
        "UPDATE mytable SET foo = 'baz', bar = 42"
    );
}

#[test]
fn string_literals_double_quotes() {
    let select = Select::new(
        vec![Expr::literal("it's")],
        TableRef::new(&ident("t")),
    );
    assert_eq!(
        render(Serializer::postgresql(), select),
        "SELECT 'it''s' FROM t"
    );
}

#[test]
fn or_inside_and_keeps_grouping() {
    let a = Expr::column(&ident("t"), &ident("a"));
    let b = Expr::column(&ident("t"), &ident("b"));
    let c = Expr::column(&ident("t"), &ident("c"));

    let mut select = Select::new(vec![Expr::Asterisk], TableRef::new(&ident("t")));
    select.and_where(Expr::or([
        a.equals(Expr::literal(1)),
        b.equals(Expr::literal(2)),
    ]));
    select.and_where(c.is_null());

    assert_eq!(
        render(Serializer::postgresql(), select),
        "SELECT * FROM t WHERE (t.a = 1 OR t.b = 2) AND t.c IS NULL"
    );
}

#[test]
fn single_operand_and_is_unwrapped() {
    let a = Expr::column(&ident("t"), &ident("a"));
    assert_eq!(
        Expr::and([a.clone().is_not_null()]),
        a.is_not_null()
    );
}

#[test]
fn empty_insert_per_dialect() {
    let insert = || Insert {
        table: SqlIdentifier::derived("Thing", true),
        columns: vec![],
        values: vec![],
    };

    assert_eq!(
        render(Serializer::postgresql(), insert()),
        r#"INSERT INTO "thing" DEFAULT VALUES"#
    );
    assert_eq!(
        render(Serializer::mysql(), insert()),
        "INSERT INTO `thing` VALUES ()"
    );
    assert_eq!(
        render(Serializer::h2(), insert()),
        r#"INSERT INTO "THING" DEFAULT VALUES"#
    );
    assert_eq!(
        render(Serializer::sqlite(), insert()),
        r#"INSERT INTO "Thing" DEFAULT VALUES"#
    );
}

#[test]
fn literal_values() {
    let serializer = Serializer::postgresql();
    let render_expr = |value: Value| serializer.serialize_expr(&Expr::literal(value)).to_string();

    assert_eq!(render_expr(Value::Bool(true)), "TRUE");
    assert_eq!(render_expr(Value::Null), "NULL");
    assert_eq!(render_expr(Value::Bytes(vec![0xca, 0xfe])), "X'CAFE'");
    assert_eq!(
        render_expr(Value::List(vec![Value::I32(1), Value::I32(2)])),
        "(1, 2)"
    );
}

#[test]
fn create_and_drop_tables() {
    let ctx = context(three_levels());
    let tables = Tables::from_context(&ctx, ["Root"], &DefaultSqlTypeMapping).unwrap();
    let serializer = Serializer::postgresql();

    let create = ddl::render(&serializer, &ddl::create_tables(&tables));
    assert_eq!(create.len(), 3);
    assert_eq!(
        create[0].to_string(),
        "CREATE TABLE \"root\" (\n    \"id\" BIGINT NOT NULL,\n    PRIMARY KEY (\"id\")\n)"
    );

    let child = create[1].to_string();
    assert!(child.starts_with("CREATE TABLE \"child\" ("), "{child}");
    assert!(child.contains("\n    PRIMARY KEY (\"root\", \"root_key\")"));
    assert!(child.contains(
        "\n    CONSTRAINT root_id_fk FOREIGN KEY (\"root\") REFERENCES \"root\" (\"id\")"
    ));

    let drop: Vec<_> = ddl::render(&serializer, &ddl::drop_tables(&tables, true))
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        drop,
        [
            r#"DROP TABLE IF EXISTS "grand_child""#,
            r#"DROP TABLE IF EXISTS "child""#,
            r#"DROP TABLE IF EXISTS "root""#,
        ]
    );
}
