mod support;

use support::*;

use pretty_assertions::assert_eq;
use std_util::prelude::*;
use strata::{AggregatePath, EntityReader, Identifier, Object, ReadScope, Record, RelationResolver, RowDocument, Value};
use strata_core::schema::app::OnEmpty;

use std::cell::RefCell;
use std::collections::VecDeque;

/// Answers collection queries from a script, remembering what was asked.
#[derive(Default)]
struct ScriptedResolver {
    rows: RefCell<VecDeque<Vec<RowDocument>>>,
    calls: RefCell<Vec<(String, Vec<(String, Value)>)>>,
}

impl ScriptedResolver {
    fn push(&self, rows: impl IntoIterator<Item = RowDocument>) {
        self.rows.borrow_mut().push_back(rows.into_iter().collect());
    }
}

impl RelationResolver for ScriptedResolver {
    fn find_all_by_path(
        &self,
        identifier: &Identifier,
        path: &AggregatePath,
    ) -> strata::Result<Vec<RowDocument>> {
        let parts = identifier
            .parts()
            .iter()
            .map(|part| (part.name.reference(), part.value.clone()))
            .collect();
        self.calls.borrow_mut().push((path.dot_path().to_string(), parts));
        Ok(self.rows.borrow_mut().pop_front().unwrap_or_default())
    }
}

#[test]
fn to_one_entities_are_present_when_their_key_is() {
    let ctx = context(book());
    let root = assert_ok!(ctx.root_path("Book"));
    let resolver = ScriptedResolver::default();
    let reader = EntityReader::new(&resolver);

    let full = row([
        ("id", Value::I64(1)),
        ("title", Value::from("Dune")),
        ("author__author_id", Value::I64(5)),
        ("author__name", Value::from("Herbert")),
        ("cover__book", Value::I64(1)),
        ("cover__color", Value::from("sand")),
    ]);

    let book = assert_ok!(reader.read(&root, &full, &ReadScope::new()));
    assert_eq!(
        book,
        Object::Record(
            Record::new("Book")
                .with_value("id", 1i64)
                .with_value("title", "Dune")
                .with(
                    "author",
                    Record::new("Author")
                        .with_value("author_id", 5i64)
                        .with_value("name", "Herbert")
                )
                .with("cover", Record::new("Cover").with_value("color", "sand"))
        )
    );

    // the author's name is set but its key is not; the cover has no
    // columns besides the stand-in back reference
    let sparse = row([
        ("id", Value::I64(2)),
        ("title", Value::from("Emma")),
        ("author__author_id", Value::Null),
        ("author__name", Value::from("ghost")),
        ("cover__book", Value::Null),
        ("cover__color", Value::Null),
    ]);

    let book = assert_ok!(reader.read(&root, &sparse, &ReadScope::new()));
    let book = assert_some!(book.into_record());
    assert!(assert_some!(book.get("author")).is_null());
    assert!(assert_some!(book.get("cover")).is_null());
    assert_empty!(resolver.calls.borrow());
}

#[test]
fn embedded_values_follow_their_on_empty_setting() {
    let row = row([
        ("id", Value::I64(1)),
        ("name", Value::from("Ada")),
        ("active", Value::Bool(true)),
        ("addr_street", Value::Null),
        ("addr_city", Value::from("London")),
    ]);

    for on_empty in [OnEmpty::UseNull, OnEmpty::UseEmpty] {
        let ctx = context(person(on_empty));
        let root = assert_ok!(ctx.root_path("Person"));
        let resolver = ScriptedResolver::default();

        let person = assert_ok!(EntityReader::new(&resolver).read(&root, &row, &ReadScope::new()));
        let person = assert_some!(person.into_record());

        // a single non-null column is enough for the value to exist
        assert_eq!(
            person.get("address"),
            Some(&Object::Record(
                Record::new("Address")
                    .with_value("street", Value::Null)
                    .with_value("city", "London")
            ))
        );
    }
}

#[test]
fn nested_collections_receive_every_back_reference() {
    let ctx = context(three_levels());
    let root = assert_ok!(ctx.root_path("Root"));
    let resolver = ScriptedResolver::default();

    resolver.push([
        row([
            ("children__name", Value::from("second")),
            ("children__root_key", Value::I32(1)),
        ]),
        row([
            ("children__name", Value::from("first")),
            ("children__root_key", Value::I32(0)),
        ]),
    ]);
    resolver.push([
        row([
            ("children__grand_children__name", Value::from("b1")),
            ("children__grand_children__child_key", Value::I32(0)),
        ]),
    ]);
    resolver.push([]);

    let read = assert_ok!(EntityReader::new(&resolver).read(
        &root,
        &row([("id", Value::I32(7))]),
        &ReadScope::new()
    ));

    assert_eq!(
        *resolver.calls.borrow(),
        [
            (
                "children".to_string(),
                vec![("root".to_string(), Value::I64(7))]
            ),
            (
                "children.grand_children".to_string(),
                vec![
                    ("root".to_string(), Value::I64(7)),
                    ("root_key".to_string(), Value::I32(1)),
                ]
            ),
            (
                "children.grand_children".to_string(),
                vec![
                    ("root".to_string(), Value::I64(7)),
                    ("root_key".to_string(), Value::I32(0)),
                ]
            ),
        ]
    );

    let child = |name: &str, grand_children: Vec<&str>| {
        Object::Record(
            Record::new("Child").with_value("name", name).with(
                "grand_children",
                Object::List(
                    grand_children
                        .into_iter()
                        .map(|name| {
                            Object::Record(Record::new("GrandChild").with_value("name", name))
                        })
                        .collect(),
                ),
            ),
        )
    };

    assert_eq!(
        read,
        Object::Record(Record::new("Root").with_value("id", 7i64).with(
            "children",
            Object::List(vec![child("first", vec![]), child("second", vec!["b1"])])
        ))
    );
}

#[test]
fn missing_parent_key_is_reported() {
    let ctx = context(three_levels());
    let children = assert_ok!(ctx.aggregate_path("Root", "children"));

    // reading a collection without having entered its parent
    let err = assert_err!(
        ReadScope::new().identifier_for(&children),
        is_invalid_path
    );
    assert!(err.to_string().contains("no key of"), "{err}");
}
