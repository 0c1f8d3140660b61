mod fixtures;

use fixtures::*;
use pretty_assertions::assert_eq;
use std_util::prelude::*;
use strata_core::stmt::{Record, Value};
use strata_sql::query::{Comparator, CriteriaValue, Order, Sort};
use strata_sql::{Criteria, Dialect, Query, SqlGenerator};

const PERSON_COLUMNS: &str = concat!(
    r#"SELECT "person"."id" AS "id", "person"."name" AS "name", "#,
    r#""person"."active" AS "active", "person"."addr_street" AS "addr_street", "#,
    r#""person"."addr_city" AS "addr_city" FROM "person""#,
);

fn person_generator(dialect: Dialect) -> SqlGenerator {
    SqlGenerator::new(&context(person()), "Person", dialect).unwrap()
}

fn where_clause(gen: &SqlGenerator, criteria: Criteria) -> String {
    let query = gen.select_by_query(&Query::new(criteria)).unwrap();
    let sql = query.sql.to_string();
    sql.strip_prefix(PERSON_COLUMNS)
        .unwrap_or_else(|| panic!("unexpected select list: {sql}"))
        .to_string()
}

#[test]
fn empty_criteria_selects_everything() {
    let gen = person_generator(Dialect::postgres());
    let query = gen.select_by_query(&Query::default()).unwrap();

    assert_eq!(query.sql.to_string(), PERSON_COLUMNS);
    assert!(query.parameters.is_empty());
}

#[test]
fn conditions_combine_left_to_right() {
    let gen = person_generator(Dialect::postgres());

    let criteria = Criteria::where_("name")
        .is("Alfred")
        .and("id")
        .greater_than(3i64)
        .or("active")
        .is_true();

    assert_eq!(
        where_clause(&gen, criteria),
        concat!(
            r#" WHERE "person"."name" = :name AND "person"."id" > :id "#,
            r#"OR "person"."active" = TRUE"#,
        )
    );
}

#[test]
fn groups_are_parenthesized() {
    let gen = person_generator(Dialect::postgres());

    let criteria = Criteria::where_("name").is("Alfred").and_group(
        Criteria::where_("id")
            .less_than(3i64)
            .or("id")
            .greater_than(10i64),
    );

    let query = gen.select_by_query(&Query::new(criteria)).unwrap();
    assert!(query.sql.to_string().ends_with(concat!(
        r#" WHERE "person"."name" = :name "#,
        r#"AND ("person"."id" < :id OR "person"."id" > :id1)"#,
    )));
    assert_eq!(query.parameters.get("id"), Some(&Value::I64(3)));
    assert_eq!(query.parameters.get("id1"), Some(&Value::I64(10)));
}

#[test]
fn in_lists_bind_one_parameter_per_value() {
    let gen = person_generator(Dialect::postgres());
    let criteria = Criteria::where_("name").in_(["a", "b"]);

    let query = gen.select_by_query(&Query::new(criteria)).unwrap();
    assert!(query
        .sql
        .to_string()
        .ends_with(r#" WHERE "person"."name" IN (:name, :name1)"#));

    let bound = query.bind(&Dialect::postgres()).unwrap();
    assert!(bound.sql.ends_with(r#" WHERE "person"."name" IN ($1, $2)"#));
    assert_eq!(bound.values, vec![Value::from("a"), Value::from("b")]);
}

#[test]
fn empty_in_list_matches_nothing() {
    let gen = person_generator(Dialect::postgres());
    let criteria = Criteria::where_("name").in_(Vec::<Value>::new());

    assert_eq!(
        where_clause(&gen, criteria),
        r#" WHERE "person"."name" IN (NULL)"#
    );
}

#[test]
fn like_patterns_are_escaped() {
    let gen = person_generator(Dialect::postgres());
    let query = gen
        .select_by_query(&Query::new(Criteria::where_("name").containing("10%")))
        .unwrap();

    assert!(query
        .sql
        .to_string()
        .ends_with(r#" WHERE "person"."name" LIKE :name"#));
    assert_eq!(query.parameters.get("name"), Some(&Value::from("%10\\%%")));

    let gen = person_generator(Dialect::sqlite());
    let query = gen
        .select_by_query(&Query::new(Criteria::where_("name").starting_with("a_b")))
        .unwrap();

    assert!(query
        .sql
        .to_string()
        .ends_with(r#" WHERE "person"."name" LIKE :name ESCAPE '\'"#));
    assert_eq!(query.parameters.get("name"), Some(&Value::from("a\\_b%")));
}

#[test]
fn ignore_case_wraps_both_sides() {
    let gen = person_generator(Dialect::postgres());
    let criteria = Criteria::where_("name").is("alfred").ignore_case(true);

    assert_eq!(
        where_clause(&gen, criteria),
        r#" WHERE UPPER("person"."name") = UPPER(:name)"#
    );
}

#[test]
fn between_requires_a_pair() {
    let gen = person_generator(Dialect::postgres());
    let criteria =
        Criteria::where_("id").with(Comparator::Between, CriteriaValue::Single(Value::I64(1)));

    let err = assert_err!(
        gen.select_by_query(&Query::new(criteria)),
        is_unsupported_feature
    );
    assert_eq!(
        err.to_string(),
        "mapping criteria on `id`: unsupported feature: Between requires a pair of values"
    );

    let criteria = Criteria::where_("id").between(1i64, 5i64);
    assert_eq!(
        where_clause(&gen, criteria),
        r#" WHERE "person"."id" BETWEEN :id AND :id1"#
    );
}

#[test]
fn embedded_values_compare_column_by_column() {
    let gen = person_generator(Dialect::postgres());
    let address = Record::new("Address")
        .with_value("street", "Main")
        .with_value("city", Value::Null);

    let query = gen
        .select_by_query(&Query::new(Criteria::where_("address").is_object(address)))
        .unwrap();

    assert!(query.sql.to_string().ends_with(concat!(
        r#" WHERE ("person"."addr_street" = :addr_street "#,
        r#"AND "person"."addr_city" IS NULL)"#,
    )));
    assert_eq!(query.parameters.len(), 1);
    assert_eq!(
        query.parameters.get("addr_street"),
        Some(&Value::from("Main"))
    );

    let criteria = Criteria::where_("address").is_null();
    assert_eq!(
        where_clause(&gen, criteria),
        r#" WHERE ("person"."addr_street" IS NULL AND "person"."addr_city" IS NULL)"#
    );

    let criteria = Criteria::where_("address").greater_than(1i64);
    assert_err!(
        gen.select_by_query(&Query::new(criteria)),
        is_unsupported_feature
    );
}

#[test]
fn embedded_properties_are_addressed_by_path() {
    let gen = person_generator(Dialect::postgres());
    let criteria = Criteria::where_("address.city").is("Oslo");

    assert_eq!(
        where_clause(&gen, criteria),
        r#" WHERE "person"."addr_city" = :addr_city"#
    );
}

#[test]
fn unknown_columns_are_used_verbatim() {
    let gen = person_generator(Dialect::postgres());
    let criteria = Criteria::where_("legacy_flag").is_not_null();

    assert_eq!(
        where_clause(&gen, criteria),
        r#" WHERE "person".legacy_flag IS NOT NULL"#
    );
}

#[test]
fn collections_cannot_be_queried() {
    let gen = SqlGenerator::new(&context(three_levels()), "Root", Dialect::postgres()).unwrap();
    let criteria = Criteria::where_("children.name").is("x");

    assert_err!(
        gen.select_by_query(&Query::new(criteria)),
        is_unsupported_feature
    );
}

#[test]
fn count_and_exists_by_query() {
    let gen = person_generator(Dialect::postgres());
    let query = Query::new(Criteria::where_("name").is("Alfred"));

    assert_eq!(
        gen.count_by_criteria(&query).unwrap().sql.to_string(),
        r#"SELECT COUNT(*) FROM "person" WHERE "person"."name" = :name"#
    );
    assert_eq!(
        gen.exists_by_query(&query).unwrap().sql.to_string(),
        r#"SELECT 1 FROM "person" WHERE "person"."name" = :name LIMIT 1"#
    );
}

#[test]
fn query_sort_limit_and_offset() {
    let gen = person_generator(Dialect::postgres());
    let query = Query::new(Criteria::empty())
        .sort(Sort::by([Order::asc("name").ignore_case(), Order::desc("id")]))
        .limit(5)
        .offset(10);

    assert_eq!(
        gen.select_by_query(&query).unwrap().sql.to_string(),
        format!(
            "{PERSON_COLUMNS}{}",
            r#" ORDER BY UPPER("person"."name") ASC, "person"."id" DESC LIMIT 5 OFFSET 10"#
        )
    );
}
