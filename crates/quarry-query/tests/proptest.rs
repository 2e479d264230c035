//! Property-based tests for query resolution using proptest.

mod common;

use common::VecCollection;
use proptest::prelude::*;
use quarry_query::{Predicate, QueryBuilder, QueryError};
use serde_json::{json, Value};

// ============================================================================
// Test helpers
// ============================================================================

// Strategy to generate documents, some of them without an age
fn doc_strategy() -> impl Strategy<Value = Value> {
    (
        "[a-z]{1,6}",
        prop::option::of(-100i64..100),
        any::<bool>(),
    )
        .prop_map(|(name, age, active)| match age {
            Some(age) => json!({"name": name, "age": age, "active": active}),
            None => json!({"name": name, "active": active}),
        })
}

fn collection_strategy() -> impl Strategy<Value = VecCollection> {
    prop::collection::vec(doc_strategy(), 0..40).prop_map(VecCollection::new)
}

fn ages(query: &QueryBuilder<VecCollection>) -> Vec<Option<i64>> {
    query
        .all()
        .unwrap()
        .iter()
        .map(|doc| doc.get("age").and_then(Value::as_i64))
        .collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Resolving the same builder twice yields the same documents.
    #[test]
    fn resolution_is_deterministic(
        collection in collection_strategy(),
        threshold in -100i64..100,
        limit in 0usize..20,
    ) {
        let query = QueryBuilder::new(collection)
            .where_(Predicate::field("age").gte(threshold))
            .unwrap()
            .order(["name"])
            .limit(limit);

        prop_assert_eq!(query.all().unwrap(), query.all().unwrap());
        prop_assert_eq!(query.count().unwrap(), query.count().unwrap());
    }

    /// Two filters select the same documents in either order.
    #[test]
    fn filters_commute(
        collection in collection_strategy(),
        threshold in -100i64..100,
        active in any::<bool>(),
    ) {
        let base = QueryBuilder::new(collection);
        let a = base
            .clone()
            .where_(Predicate::field("age").lt(threshold))
            .unwrap()
            .where_eq("active", active);
        let b = base
            .where_eq("active", active)
            .where_(Predicate::field("age").lt(threshold))
            .unwrap();

        prop_assert_eq!(a.all().unwrap(), b.all().unwrap());
    }

    /// Limit never returns more documents than asked for.
    #[test]
    fn limit_respects_bound(
        collection in collection_strategy(),
        limit in 0usize..50,
    ) {
        let query = QueryBuilder::new(collection).limit(limit);
        let count = query.count().unwrap() as usize;
        prop_assert!(count <= limit);
        if limit == 0 {
            prop_assert!(query.is_empty().unwrap());
        }
    }

    /// Merged condition lists are the receiver's followed by the other's.
    #[test]
    fn merge_concatenates(
        left in prop::collection::vec(0usize..10, 0..8),
        right in prop::collection::vec(0usize..10, 0..8),
    ) {
        let build = |limits: &[usize]| {
            limits
                .iter()
                .fold(QueryBuilder::new(()), |q, n| q.limit(*n))
        };
        let a = build(&left);
        let b = build(&right);

        let merged = a.merge(&b);
        prop_assert_eq!(merged.conditions().len(), left.len() + right.len());
        prop_assert_eq!(a.conditions().len(), left.len());
        prop_assert_eq!(b.conditions().len(), right.len());

        let limits: Vec<usize> = merged
            .conditions()
            .iter()
            .filter_map(|c| match c {
                quarry_query::Condition::Limit(n) => Some(*n),
                _ => None,
            })
            .collect();
        let expected: Vec<usize> = left.iter().chain(right.iter()).copied().collect();
        prop_assert_eq!(limits, expected);
    }

    /// Names that are not condition methods fail without a context.
    #[test]
    fn unknown_names_are_rejected(name in "[a-z_]{1,12}") {
        prop_assume!(!matches!(
            name.as_str(),
            "where" | "and" | "pluck" | "has_fields" | "limit" | "order" | "asc" | "desc"
        ));
        let err = QueryBuilder::new(()).call(&name, &[]).unwrap_err();
        let is_unknown = matches!(err, QueryError::UnknownOperation { .. });
        prop_assert!(is_unknown);
    }

    /// The last descending order sorts present ages largest first.
    #[test]
    fn last_desc_wins(collection in collection_strategy()) {
        let query = QueryBuilder::new(collection)
            .has_fields(["age"])
            .order(["name"])
            .desc(["age"]);

        let ages = ages(&query);
        prop_assert!(ages.windows(2).all(|w| w[0] >= w[1]));
    }
}
