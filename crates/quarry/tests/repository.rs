//! Repositories and their named queries.

use std::sync::Arc;

use quarry::{Adapter, AdapterError, Entity, Mapper, MemoryStore, QueryError, Repository};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Article {
    id: Option<String>,
    title: String,
    author_id: u32,
    comments_count: u32,
}

impl Article {
    fn new(title: &str, author_id: u32, comments_count: u32) -> Self {
        Article {
            id: None,
            title: title.to_string(),
            author_id,
            comments_count,
        }
    }
}

impl Entity for Article {
    type Id = String;

    fn id(&self) -> Option<&String> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

fn articles() -> Repository<Article, MemoryStore> {
    let adapter = Arc::new(Adapter::new(
        Mapper::new().collection("articles"),
        MemoryStore::new(),
    ));
    let repo = Repository::builder(adapter, "articles")
        .unwrap()
        .fragment("rank", |q, _| Ok(q.desc(["comments_count"])))
        .fragment("by_author", |q, args| {
            let author = args.first().cloned().unwrap_or(Value::Null);
            q.where_(json!({ "author_id": author }))
        })
        .fragment("popular", |q, args| {
            let count = args.first().and_then(Value::as_u64).unwrap_or(0) as usize;
            Ok(q.desc(["comments_count"]).limit(count))
        })
        .build();

    for (title, author, comments) in [("a", 1, 4), ("b", 2, 9), ("c", 1, 7), ("d", 1, 1)] {
        repo.create(Article::new(title, author, comments)).unwrap();
    }
    repo
}

fn titles(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.title.as_str()).collect()
}

#[test]
fn fragments_chain_by_name() {
    let repo = articles();

    let query = repo
        .fragment("rank", &[])
        .unwrap()
        .call("by_author", &[json!(1)])
        .unwrap();
    assert_eq!(query.conditions().tags(), vec!["order_by", "filter"]);
    assert_eq!(titles(&repo.fetch(&query).unwrap()), vec!["c", "a", "d"]);

    let query = repo
        .fragment("by_author", &[json!(1)])
        .unwrap()
        .call("rank", &[])
        .unwrap();
    assert_eq!(query.conditions().tags(), vec!["filter", "order_by"]);
    assert_eq!(titles(&repo.fetch(&query).unwrap()), vec!["c", "a", "d"]);
}

#[test]
fn fragments_receive_arguments() {
    let repo = articles();

    let query = repo.fragment("popular", &[json!(2)]).unwrap();
    assert_eq!(titles(&repo.fetch(&query).unwrap()), vec!["b", "c"]);

    let query = repo.fragment("by_author", &[json!(2)]).unwrap();
    assert_eq!(titles(&repo.fetch(&query).unwrap()), vec!["b"]);
}

#[test]
fn query_blocks_can_call_fragments() {
    let repo = articles();

    let query = repo
        .query(|q| q.where_(("author_id", 1))?.call("rank", &[]))
        .unwrap();
    assert_eq!(titles(&repo.fetch(&query).unwrap()), vec!["c", "a", "d"]);
    assert_eq!(query.sum("comments_count").unwrap(), 12.0);
}

#[test]
fn unknown_fragments_fail() {
    let repo = articles();

    let err = repo.fragment("trending", &[]).unwrap_err();
    assert!(matches!(
        err,
        AdapterError::Query(QueryError::UnknownOperation { ref name }) if name == "trending"
    ));

    let err = repo.query(|q| q.call("trending", &[])).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"undefined operation 'trending' for query");
}

#[test]
fn repository_crud() {
    let repo = articles();
    assert_eq!(repo.collection(), "articles");
    assert_eq!(repo.all().unwrap().len(), 4);

    let mut article = repo.persist(Article::new("e", 3, 0)).unwrap();
    let found = repo.find(article.id()).unwrap();
    assert_eq!(found.as_ref(), Some(&article));

    article.comments_count = 5;
    assert_eq!(repo.update(&article).unwrap(), 1);
    assert_eq!(repo.find(article.id()).unwrap().unwrap().comments_count, 5);

    assert_eq!(repo.delete(&article).unwrap(), 1);
    assert_eq!(repo.find(article.id()).unwrap(), None);

    assert_eq!(repo.clear().unwrap(), 4);
    assert!(repo.all().unwrap().is_empty());
}

#[test]
fn repositories_require_a_mapped_collection() {
    let adapter = Arc::new(Adapter::new(Mapper::new(), MemoryStore::new()));
    let err = Repository::<Article, _>::new(adapter, "articles").unwrap_err();
    assert!(matches!(err, AdapterError::UnmappedCollection { .. }));
}
