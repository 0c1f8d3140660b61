#![allow(dead_code)]

use strata::{AggregateTemplate, Dialect, Driver, ExecKind, Response};
use strata_core::schema::app::{EntityDef, OnEmpty, PropertyDef};
use strata_core::schema::MappingContext;
use strata_core::stmt::{RowDocument, Value, ValueType};
use strata_sql::{BindMarkers, BoundSql};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Records every statement and answers from scripted results.
///
/// Queries pop the next scripted row set (no rows once exhausted), updates
/// pop the next scripted count (1 once exhausted) and inserts asking for a
/// generated key receive 1, 2, 3, ...
#[derive(Debug, Default)]
pub struct RecordingDriver {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    executed: Vec<(BoundSql, ExecKind)>,
    rows: VecDeque<Vec<RowDocument>>,
    counts: VecDeque<u64>,
    last_key: i64,
}

impl RecordingDriver {
    pub fn push_rows(&self, rows: impl IntoIterator<Item = RowDocument>) {
        self.state
            .lock()
            .unwrap()
            .rows
            .push_back(rows.into_iter().collect());
    }

    pub fn push_count(&self, count: u64) {
        self.state.lock().unwrap().counts.push_back(count);
    }

    pub fn executed(&self) -> Vec<(BoundSql, ExecKind)> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.executed()
            .into_iter()
            .map(|(bound, _)| bound.sql)
            .collect()
    }

    pub fn values(&self, index: usize) -> Vec<Value> {
        self.executed()[index].0.values.clone()
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    async fn exec(&self, sql: BoundSql, kind: ExecKind) -> strata::Result<Response> {
        let mut state = self.state.lock().unwrap();
        state.executed.push((sql, kind.clone()));

        Ok(match kind {
            ExecKind::Query => Response::rows(state.rows.pop_front().unwrap_or_default()),
            ExecKind::Update => Response::count(state.counts.pop_front().unwrap_or(1)),
            ExecKind::Insert {
                generated_key: Some(_),
            } => {
                state.last_key += 1;
                Response::generated_key(state.last_key)
            }
            ExecKind::Insert {
                generated_key: None,
            } => Response::count(1),
        })
    }
}

pub fn context(defs: Vec<EntityDef>) -> MappingContext {
    let mut builder = MappingContext::builder();
    for def in defs {
        builder.register(def);
    }
    builder.build().unwrap()
}

/// A template over a recording driver, rendering `:name` parameters so
/// statements read like their templates.
pub fn template(
    defs: Vec<EntityDef>,
) -> (AggregateTemplate<Arc<RecordingDriver>>, Arc<RecordingDriver>) {
    let driver = Arc::new(RecordingDriver::default());
    let dialect = Dialect::postgres().with_bind_markers(BindMarkers::Named);
    let template = AggregateTemplate::new(context(defs), dialect, driver.clone());
    (template, driver)
}

pub fn row<const N: usize>(columns: [(&str, Value); N]) -> RowDocument {
    columns.into_iter().collect()
}

/// A person with an embedded address, columns prefixed `addr_`.
pub fn person(on_empty: OnEmpty) -> Vec<EntityDef> {
    vec![
        EntityDef::new("Person")
            .property(PropertyDef::id("id", ValueType::I64))
            .property(PropertyDef::simple("name", ValueType::String))
            .property(PropertyDef::simple("active", ValueType::Bool))
            .property(PropertyDef::embedded("address", "Address", "addr_").on_empty(on_empty)),
        EntityDef::new("Address")
            .property(PropertyDef::simple("street", ValueType::String))
            .property(PropertyDef::simple("city", ValueType::String)),
    ]
}

/// A versioned root without relations.
pub fn versioned() -> Vec<EntityDef> {
    vec![EntityDef::new("VersionedEntity")
        .property(PropertyDef::id("id", ValueType::I64))
        .property(PropertyDef::version("version", ValueType::I64))
        .property(PropertyDef::simple("name", ValueType::String))]
}

/// Parent → list of kids with ids → set of toys.
pub fn parent_kid_toy() -> Vec<EntityDef> {
    vec![
        EntityDef::new("Parent")
            .property(PropertyDef::id("id", ValueType::I64))
            .property(PropertyDef::list("kids", "Kid")),
        EntityDef::new("Kid")
            .property(PropertyDef::id("kid_id", ValueType::I64))
            .property(PropertyDef::simple("name", ValueType::String))
            .property(PropertyDef::set("toys", "Toy")),
        EntityDef::new("Toy").property(PropertyDef::simple("name", ValueType::String)),
    ]
}

/// A root keyed by an embedded composite id with a list of items.
pub fn keyed_parent() -> Vec<EntityDef> {
    vec![
        EntityDef::new("Parent")
            .property(PropertyDef::embedded("id", "ParentKey", "").as_id())
            .property(PropertyDef::simple("name", ValueType::String))
            .property(PropertyDef::list("items", "Item")),
        EntityDef::new("ParentKey")
            .property(PropertyDef::simple("tenant", ValueType::String))
            .property(PropertyDef::simple("number", ValueType::I64)),
        EntityDef::new("Item").property(PropertyDef::simple("label", ValueType::String)),
    ]
}

/// Playlist → list of songs without ids → set of tags.
pub fn playlist() -> Vec<EntityDef> {
    vec![
        EntityDef::new("Playlist")
            .property(PropertyDef::id("id", ValueType::I64))
            .property(PropertyDef::simple("name", ValueType::String))
            .property(PropertyDef::list("songs", "Song")),
        EntityDef::new("Song")
            .property(PropertyDef::simple("title", ValueType::String))
            .property(PropertyDef::set("tags", "Tag")),
        EntityDef::new("Tag").property(PropertyDef::simple("label", ValueType::String)),
    ]
}

/// Root → list of children → list of grandchildren, none of the nested
/// levels having ids.
pub fn three_levels() -> Vec<EntityDef> {
    vec![
        EntityDef::new("Root")
            .property(PropertyDef::id("id", ValueType::I64))
            .property(PropertyDef::list("children", "Child")),
        EntityDef::new("Child")
            .property(PropertyDef::simple("name", ValueType::String))
            .property(PropertyDef::list("grand_children", "GrandChild")),
        EntityDef::new("GrandChild").property(PropertyDef::simple("name", ValueType::String)),
    ]
}

/// A book with a to-one author that has an id and a to-one cover that has
/// none.
pub fn book() -> Vec<EntityDef> {
    vec![
        EntityDef::new("Book")
            .property(PropertyDef::id("id", ValueType::I64))
            .property(PropertyDef::simple("title", ValueType::String))
            .property(PropertyDef::entity("author", "Author"))
            .property(PropertyDef::entity("cover", "Cover")),
        EntityDef::new("Author")
            .property(PropertyDef::id("author_id", ValueType::I64))
            .property(PropertyDef::simple("name", ValueType::String)),
        EntityDef::new("Cover").property(PropertyDef::simple("color", ValueType::String)),
    ]
}

/// Ids drawn from a sequence.
pub fn ticket() -> Vec<EntityDef> {
    vec![EntityDef::new("Ticket")
        .property(PropertyDef::id("id", ValueType::I64).sequence("ticket_seq"))
        .property(PropertyDef::simple("title", ValueType::String))]
}

/// Tags keyed by language.
pub fn labelled() -> Vec<EntityDef> {
    vec![
        EntityDef::new("Labelled")
            .property(PropertyDef::id("id", ValueType::I64))
            .property(PropertyDef::map("labels", ValueType::String, "Label")),
        EntityDef::new("Label").property(PropertyDef::simple("text", ValueType::String)),
    ]
}
