use std::sync::Arc;

use addonkit::codec::Node;
use addonkit::data::{DataEntity, DataState, DataTable, Row};
use addonkit::runtime::Runtime;
use addonkit::view::{DataFeed, DataReceiver, DataSource, DataView, Filter};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Invoice {
    id: String,
    total: f64,
    #[serde(default)]
    lines: Vec<String>,
}

addonkit::addon!(Invoice {
    name: "Invoice",
    label: "Invoice",
    id: id,
});

fn row(pairs: Value) -> Row {
    pairs.as_object().cloned().unwrap_or_default()
}

#[test]
fn registered_types_survive_a_round_trip() {
    let runtime = Runtime::start();
    runtime.register_type::<Invoice>();

    let invoice = Invoice {
        id: "inv-1".into(),
        total: 12.5,
        lines: vec!["tea".into(), "cake".into()],
    };
    let mut root = Node::object();
    root.insert("owner", Node::from("ada"));
    root.insert("invoices", Node::Array(vec![Node::typed(invoice.clone())]));

    let text = runtime.serialize(&root).unwrap();
    let tagged: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(tagged["invoices"][0]["$type"], json!("Invoice"));

    let back = runtime.deserialize(&text).unwrap().unwrap();
    assert_eq!(back, root);
    let invoices = back.get("invoices").and_then(Node::as_array).unwrap();
    assert_eq!(invoices[0].downcast_ref::<Invoice>(), Some(&invoice));
}

#[test]
fn unknown_tags_degrade_to_plain_objects() {
    let runtime = Runtime::start();
    let node = runtime
        .deserialize(r#"{"$type": "Missing", "inner": {"$type": "DataSet", "id": "s", "name": "n"}}"#)
        .unwrap()
        .unwrap();

    assert!(!node.is_typed());
    assert_eq!(node.get("$type").and_then(Node::as_str), Some("Missing"));
    assert!(node.get("inner").unwrap().is_typed());
}

#[test]
fn record_lifecycle() {
    let mut entity = DataEntity::from_row(row(json!({"name": "a"})));
    assert_eq!(entity.state(), DataState::Detached);
    entity.set_added();
    entity.accept_changes();
    assert_eq!(entity.state(), DataState::Unchanged);

    entity.set_value("name", "b").unwrap();
    assert_eq!(entity.state(), DataState::Modified);
    assert_eq!(entity.get_value("name", true), Some(&json!("a")));
    assert_eq!(entity.get_value("name", false), Some(&json!("b")));

    entity.reject_changes();
    assert_eq!(entity.state(), DataState::Unchanged);
    assert_eq!(entity.get_value("name", false), Some(&json!("a")));

    entity.set_value("name", "c").unwrap();
    entity.accept_changes();
    assert_eq!(entity.state(), DataState::Unchanged);
    assert_eq!(entity.get_value("name", true), Some(&json!("c")));

    entity.set_deleted();
    assert_eq!(entity.state(), DataState::Deleted);
    assert!(entity.set_value("name", "d").unwrap_err().is_invalid_state());
}

#[test]
fn new_record_commits_its_writes() {
    let mut entity = DataEntity::new();
    assert_eq!(entity.state(), DataState::Detached);

    entity.set_value("x", 1).unwrap();
    entity.set_added();
    entity.accept_changes();
    assert_eq!(entity.state(), DataState::Unchanged);
    assert_eq!(entity.get_value("x", true), Some(&json!(1)));
}

#[test]
fn duplicate_keys_are_suppressed() {
    let mut table = DataTable::new("people").with_primary_key(["id"]);
    assert!(table.add_row(DataEntity::from_row(row(json!({"id": 1, "name": "a"})))));
    assert!(!table.add_row(DataEntity::from_row(row(json!({"id": 1, "name": "b"})))));
    assert!(table.add_row(DataEntity::from_row(row(json!({"id": 2, "name": "c"})))));

    assert_eq!(table.len(), 2);
    let found = table.find_row_by_key(&row(json!({"id": 1}))).unwrap();
    assert_eq!(found.get_value("name", false), Some(&json!("a")));
}

#[test]
fn commit_prunes_deleted_rows() {
    let runtime = Runtime::start();
    let mut table = runtime
        .convert_table(&json!([{"id": 1}, {"id": 2}, {"id": 3}]), Some("t"), ["id"])
        .unwrap()
        .unwrap();

    table.row_mut(1).unwrap().set_deleted();
    assert!(table.has_changes());
    table.accept_changes();

    assert_eq!(table.len(), 2);
    assert!(table.rows().iter().all(|r| r.state() == DataState::Unchanged));
    assert!(table.find_row_by_key(&row(json!({"id": 2}))).is_none());

    let mut single = runtime
        .convert_table(&json!([{"id": 5}]), None, ["id"])
        .unwrap()
        .unwrap();
    single.row_mut(0).unwrap().set_deleted();
    single.accept_changes();
    assert!(single.is_empty());
}

#[test]
fn converted_table_serializes_and_restores() {
    let runtime = Runtime::start();
    let records = json!([
        {"id": 1, "name": "ada", "age": 36},
        {"id": 2, "name": "alan", "age": 41},
        {"id": 1, "name": "dup", "age": 0}
    ]);
    let table = runtime
        .convert_table(&records, Some("people"), ["id"])
        .unwrap()
        .unwrap();

    assert_eq!(table.name(), "people");
    assert_eq!(table.schema(), &["id".to_string(), "name".into(), "age".into()]);
    assert_eq!(table.len(), 2);

    let text = runtime.serialize(&Node::typed(table.clone())).unwrap();
    let back = runtime.deserialize_as::<DataTable>(&text).unwrap().unwrap();
    assert_eq!(back, table);
    assert_eq!(
        DataSource::get_data_list(&back),
        vec![
            json!({"id": 1, "name": "ada", "age": 36}),
            json!({"id": 2, "name": "alan", "age": 41}),
        ]
    );
}

#[test]
fn views_filter_pulled_and_pushed_rows() {
    let runtime = Runtime::start();
    let table = runtime
        .convert_table(&json!([{"v": 1}, {"v": 2}, {"v": 3}]), Some("nums"), ["v"])
        .unwrap()
        .unwrap();

    let view = runtime.view(Arc::new(table), "row.v > 1").unwrap();
    assert_eq!(view.get_data_list(), vec![json!({"v": 2}), json!({"v": 3})]);

    let feed = Arc::new(DataFeed::new("feed"));
    let reactive = DataView::reactive(None, Filter::parse("row.v > 1").unwrap(), Arc::clone(&feed));

    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    reactive.channel().subscribe(move |batch: &[Value]| sink.lock().push(batch.to_vec()));

    feed.on_data_received(vec![json!({"v": 0}), json!({"v": 5})]);
    assert_eq!(*seen.lock(), vec![vec![json!({"v": 5})]]);
}

#[test]
fn schema_order_survives_a_round_trip() {
    let runtime = Runtime::start();
    let table = runtime
        .convert_table(&json!([{"zeta": 1, "alpha": 2}]), Some("t"), ["zeta"])
        .unwrap()
        .unwrap();

    let text = runtime.serialize(&Node::typed(table)).unwrap();
    let back = runtime.deserialize_as::<DataTable>(&text).unwrap().unwrap();
    assert_eq!(back.schema(), &["zeta".to_string(), "alpha".to_string()]);

    let fields: Vec<&String> = back.rows()[0].current().keys().collect();
    assert_eq!(fields, ["alpha", "zeta"]);
}

#[test]
fn keyless_tables_hold_one_row() {
    let runtime = Runtime::start();
    let table = runtime
        .convert_table(&json!([{"v": 1}, {"v": 2}]), None, Vec::<String>::new())
        .unwrap()
        .unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(DataSource::get_data_list(&table), vec![json!({"v": 1})]);
}

#[test]
fn dropped_views_unsubscribe() {
    let feed = Arc::new(DataFeed::new("feed"));
    for _ in 0..10 {
        let _view = DataView::reactive(None, Filter::None, Arc::clone(&feed));
    }
    assert_eq!(feed.channel().subscriber_count(), 0);
}
