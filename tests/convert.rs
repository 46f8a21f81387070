//! End-to-end tests for the iteration protocol: custom sources, walks,
//! projections, cancellation.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, anyhow};
use pairstream::prelude::*;

/// A user-defined keyed source with its own producer task, the way a library
/// would expose "iterate my internal map".
struct Inventory {
    stock: HashMap<String, i64>,
}

impl map::Source<String, i64> for Inventory {
    fn iterate(&self, cancel: &CancellationToken) -> map::MapIter<String, i64> {
        let (tx, iter) = map::MapIter::channel();
        let stock = self.stock.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            for (key, value) in stock {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    sent = tx.send(map::Pair { key, value }) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                }
            }
        });
        iter
    }
}

// ---------------------------------------------------------------------------
// Projections from custom sources
// ---------------------------------------------------------------------------

#[tokio::test]
async fn custom_source_projects_into_map() {
    let src = Inventory {
        stock: HashMap::from([
            ("bolts".to_string(), 40),
            ("nuts".to_string(), 25),
            ("washers".to_string(), 0),
        ]),
    };
    let cancel = CancellationToken::new();

    let mut dest = HashMap::new();
    map::as_map(&cancel, &src, &mut dest).await.unwrap();
    assert_eq!(dest, src.stock);
}

#[tokio::test]
async fn custom_source_projects_into_btree_map() {
    let src = Inventory {
        stock: HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]),
    };
    let cancel = CancellationToken::new();

    let mut dest = BTreeMap::new();
    map::as_map(&cancel, &src, &mut dest).await.unwrap();
    assert_eq!(
        dest,
        BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 2)])
    );
}

#[tokio::test]
async fn slice_source_fills_fixed_array() {
    let src = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    let cancel = CancellationToken::new();

    let mut dest: [String; 5] = Default::default();
    array::as_slice(&cancel, &src[..], &mut dest).await.unwrap();
    assert_eq!(&dest[..3], &src[..]);
    assert_eq!(&dest[3..], ["", ""]);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pre_cancelled_token_yields_empty_projection() {
    let src = HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut dest = HashMap::new();
    map::as_map(&cancel, &src, &mut dest).await.unwrap();
    // Cancellation is not an error; it just looks like an exhausted source.
    assert!(dest.is_empty());
    assert!(cancel.is_cancelled());
}

#[tokio::test]
async fn cancelling_mid_walk_stops_delivery() {
    // Deterministic order so the cutoff point is predictable.
    let src = BTreeMap::from([
        ("a".to_string(), 1),
        ("b".to_string(), 2),
        ("c".to_string(), 3),
        ("d".to_string(), 4),
        ("e".to_string(), 5),
    ]);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    let mut visited = Vec::new();
    let mut visitor = |key: String, _value: i64| -> anyhow::Result<()> {
        if key == "b" {
            trigger.cancel();
        }
        visited.push(key);
        Ok(())
    };
    map::walk(&cancel, &src, &mut visitor).await.unwrap();

    // The cancelled-over-pending bias makes the cutoff exact: nothing after
    // "b" is delivered. The walk still ends cleanly; the token is how the
    // caller tells it was cut short rather than exhausted.
    assert_eq!(visited, vec!["a", "b"]);
    assert!(cancel.is_cancelled());
}

// ---------------------------------------------------------------------------
// Visitor failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn visitor_error_chain_is_preserved() {
    let src = BTreeMap::from([("k".to_string(), 1)]);
    let cancel = CancellationToken::new();

    let mut visitor = |_key: String, _value: i64| -> anyhow::Result<()> {
        Err(anyhow!("disk full")).context("writing entry")
    };
    let err = map::walk(&cancel, &src, &mut visitor).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to visit key \"k\": writing entry: disk full"
    );
}

// ---------------------------------------------------------------------------
// Runtime-validated projections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn heterogeneous_entries_project_to_string_keyed_map() {
    let src = map::Values(vec![
        ("count", Value::Int(5)),
        ("label", Value::Str("ready".into())),
        ("note", Value::Null),
    ]);
    let cancel = CancellationToken::new();

    let out = map::as_str_value_map(&cancel, &src).await.unwrap();
    assert_eq!(
        out,
        HashMap::from([
            ("count".to_string(), Value::Int(5)),
            ("label".to_string(), Value::Str("ready".into())),
            ("note".to_string(), Value::Null),
        ])
    );
}

#[tokio::test]
async fn failed_projection_leaves_partial_destination() {
    // Ordered source: the first entry converts, the second does not.
    let src = map::Values(vec![
        ("a".to_string(), Value::Int(1)),
        ("b".to_string(), Value::Str("x".into())),
        ("c".to_string(), Value::Int(3)),
    ]);
    let cancel = CancellationToken::new();

    let mut dest: HashMap<String, i64> = HashMap::new();
    let err = map::as_value_map(&cancel, &src, &mut dest)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ValueType { .. }));
    // No rollback: entries written before the failing pair stay.
    assert_eq!(dest, HashMap::from([("a".to_string(), 1)]));
}

// ---------------------------------------------------------------------------
// Stream interop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cursor_converts_into_stream() {
    use futures::StreamExt;

    let cancel = CancellationToken::new();
    let iter = array::iterate(&cancel, vec![10i64, 20, 30]);

    let pairs: Vec<array::Pair<i64>> = iter.into_stream().collect().await;
    assert_eq!(
        pairs,
        vec![
            array::Pair {
                index: 0,
                value: 10
            },
            array::Pair {
                index: 1,
                value: 20
            },
            array::Pair {
                index: 2,
                value: 30
            },
        ]
    );
}
