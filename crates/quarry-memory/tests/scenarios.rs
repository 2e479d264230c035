//! End-to-end query scenarios against the in-memory store.

use quarry_memory::{MemoryCollection, MemoryError, MemoryStore};
use quarry_query::{Document, Fragments, Predicate, QueryBuilder, QueryError, WritableCollection};
use serde_json::{json, Value};

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("not an object"),
    }
}

fn users() -> MemoryCollection {
    let users = MemoryStore::new().table("users");
    users.insert(doc(json!({"name": "L", "age": 32}))).unwrap();
    users.insert(doc(json!({"name": "MG", "age": 31}))).unwrap();
    users
}

fn names(docs: &[Document]) -> Vec<&str> {
    docs.iter()
        .filter_map(|doc| doc.get("name").and_then(Value::as_str))
        .collect()
}

// ============================================================================
// Filtering and ordering
// ============================================================================

#[test]
fn where_on_empty_collection() {
    let query = QueryBuilder::new(MemoryStore::new().table("users"))
        .where_(("id", 23))
        .unwrap();
    assert!(query.all().unwrap().is_empty());
}

#[test]
fn order_ascending_and_descending() {
    let query = QueryBuilder::new(users());
    assert_eq!(names(&query.clone().order(["age"]).all().unwrap()), vec!["MG", "L"]);
    assert_eq!(names(&query.desc(["age"]).all().unwrap()), vec!["L", "MG"]);
}

#[test]
fn last_sort_directive_wins() {
    let query = QueryBuilder::new(users());

    let all = query.clone().order(["age"]).order(["name"]).all().unwrap();
    assert_eq!(names(&all), vec!["L", "MG"]);

    let all = query.clone().desc(["age"]).desc(["name"]).all().unwrap();
    assert_eq!(names(&all), vec!["MG", "L"]);

    let all = query.clone().desc(["age"]).asc(["age"]).all().unwrap();
    assert_eq!(names(&all), vec!["MG", "L"]);

    let all = query.asc(["age"]).desc(["age"]).all().unwrap();
    assert_eq!(names(&all), vec!["L", "MG"]);
}

#[test]
fn filters_commute_but_pluck_shapes() {
    let query = QueryBuilder::new(users());

    let a = query
        .clone()
        .where_eq("name", "L")
        .where_(Predicate::field("age").gt(30))
        .unwrap();
    let b = query
        .clone()
        .where_(Predicate::field("age").gt(30))
        .unwrap()
        .where_eq("name", "L");
    assert_eq!(a.all().unwrap(), b.all().unwrap());

    let plucked_first = query.pluck(["age"]).where_eq("name", "L");
    assert!(plucked_first.all().unwrap().is_empty());
}

#[test]
fn limit_zero_is_empty() {
    let query = QueryBuilder::new(users()).where_eq("name", "L").limit(0);
    assert!(query.all().unwrap().is_empty());
    assert!(query.is_empty().unwrap());
}

#[test]
fn pluck_omits_missing_fields() {
    let users = users();
    users.insert(doc(json!({"name": "S"}))).unwrap();

    let all = QueryBuilder::new(users)
        .where_eq("name", "S")
        .pluck(["age"])
        .all()
        .unwrap();
    assert_eq!(all, vec![Document::new()]);
}

// ============================================================================
// Aggregates
// ============================================================================

#[test]
fn aggregates_ignore_documents_without_the_field() {
    let users = users();
    users.insert(doc(json!({"name": "S"}))).unwrap();
    let query = QueryBuilder::new(users);

    assert_eq!(query.count().unwrap(), 3);
    assert_eq!(query.sum("age").unwrap(), 63.0);
    assert_eq!(query.average("age").unwrap(), Some(31.5));
    assert_eq!(query.max("age").unwrap(), Some(json!(32)));
    assert_eq!(query.min("age").unwrap(), Some(json!(31)));
}

#[test]
fn null_fields_count_as_absent() {
    let users = users();
    users.insert(doc(json!({"name": "S", "age": null}))).unwrap();
    let query = QueryBuilder::new(users);

    assert_eq!(query.clone().has_fields(["age"]).count().unwrap(), 2);
    assert_eq!(query.average("age").unwrap(), Some(31.5));
    assert_eq!(query.min("age").unwrap(), Some(json!(31)));
}

#[test]
fn aggregates_after_clear() {
    let users = users();
    assert_eq!(users.delete().unwrap(), 2);

    let query = QueryBuilder::new(users);
    assert_eq!(query.count().unwrap(), 0);
    assert_eq!(query.sum("age").unwrap(), 0.0);
    assert_eq!(query.average("age").unwrap(), None);
    assert_eq!(query.max("age").unwrap(), None);
    assert_eq!(query.min("age").unwrap(), None);
}

#[test]
fn sum_over_strings_fails() {
    let err = QueryBuilder::new(users()).sum("name").unwrap_err();
    assert!(matches!(err, MemoryError::NotNumeric { .. }));
    assert_eq!(
        err.to_string(),
        "expected type NUMBER but found string in field 'name'"
    );
}

// ============================================================================
// Fragments
// ============================================================================

fn articles() -> MemoryCollection {
    let articles = MemoryStore::new().table("articles");
    for (id, author, comments) in [(1, 1, 3), (2, 2, 9), (3, 1, 7), (4, 1, 1)] {
        articles
            .insert(doc(json!({
                "id": id,
                "author_id": author,
                "comments_count": comments,
            })))
            .unwrap();
    }
    articles
}

#[test]
fn merged_fragments_filter_then_sort() {
    let registry = Fragments::builder(articles())
        .fragment("rank", |q, _| Ok(q.desc(["comments_count"])))
        .fragment("by_author", |q, args| {
            q.call("where", &[json!({"author_id": args.first().cloned()})])
        })
        .build();

    let query = registry
        .invoke("rank", &[])
        .unwrap()
        .call("by_author", &[json!(1)])
        .unwrap();

    assert_eq!(query.conditions().tags(), vec!["order_by", "filter"]);
    let ids: Vec<Value> = query
        .all()
        .unwrap()
        .iter()
        .map(|doc| doc["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!(3), json!(1), json!(4)]);

    let err = registry.query().call("by_title", &[]).unwrap_err();
    assert!(matches!(err, QueryError::UnknownOperation { name } if name == "by_title"));
}
