//! Keyed iteration: map-like sources, walks, and map projections.
//!
//! Traversal order over map-like sources is unspecified. Projections only
//! guarantee set-equality of the resulting entries, never arrival order.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::iter::{Iter, spawn_producer};
use crate::value::{FromValue, Value};

/// One key/value element produced by a keyed source.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair<K, V> {
    pub key: K,
    pub value: V,
}

/// Cursor over keyed pairs.
pub type MapIter<K, V> = Iter<Pair<K, V>>;

/// A map-like container that knows how to produce a cursor over its entries.
///
/// Each `iterate` call may spawn a fresh producer; implementors are
/// responsible for honoring the token promptly and for letting their sender
/// drop on every exit path so the consumer is never left blocked.
pub trait Source<K, V> {
    fn iterate(&self, cancel: &CancellationToken) -> MapIter<K, V>;
}

impl<K, V, H> Source<K, V> for HashMap<K, V, H>
where
    K: Clone + Send + 'static,
    V: Clone + Send + 'static,
    H: Clone + Send + 'static,
{
    fn iterate(&self, cancel: &CancellationToken) -> MapIter<K, V> {
        iterate(cancel, self.clone())
    }
}

impl<K, V> Source<K, V> for BTreeMap<K, V>
where
    K: Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    fn iterate(&self, cancel: &CancellationToken) -> MapIter<K, V> {
        iterate(cancel, self.clone())
    }
}

/// Spawns a producer over any owned collection of entries and returns the
/// cursor pulling from it. Must be called from within a tokio runtime.
pub fn iterate<M, K, V>(cancel: &CancellationToken, entries: M) -> MapIter<K, V>
where
    M: IntoIterator<Item = (K, V)>,
    M::IntoIter: Send + 'static,
    K: Send + 'static,
    V: Send + 'static,
{
    spawn_producer(
        cancel,
        entries.into_iter().map(|(key, value)| Pair { key, value }),
    )
}

/// Per-pair callback driven by [`walk`].
pub trait Visitor<K, V> {
    fn visit(&mut self, key: K, value: V) -> anyhow::Result<()>;
}

impl<K, V, F> Visitor<K, V> for F
where
    F: FnMut(K, V) -> anyhow::Result<()>,
{
    fn visit(&mut self, key: K, value: V) -> anyhow::Result<()> {
        self(key, value)
    }
}

/// Walks every entry of `source`, invoking `visitor` once per pair.
///
/// The first visitor error aborts the walk and is returned wrapped with the
/// offending key. Cancellation ends the walk early with `Ok(())`, exactly as
/// if the source were exhausted.
pub async fn walk<S, K, V, T>(
    cancel: &CancellationToken,
    source: &S,
    visitor: &mut T,
) -> Result<()>
where
    S: Source<K, V> + ?Sized,
    T: Visitor<K, V> + ?Sized,
    K: Clone + Debug,
    V: Clone,
{
    let iter = source.iterate(cancel);
    while iter.advance(cancel).await {
        let Some(Pair { key, value }) = iter.current().await else {
            break;
        };
        if let Err(err) = visitor.visit(key.clone(), value) {
            return Err(Error::Visit {
                key: format!("{key:?}"),
                err,
            });
        }
    }
    Ok(())
}

/// Drains `source` to exhaustion into `dest`, which is mutated in place and
/// never replaced wholesale.
///
/// Key and value types are fixed by the destination at compile time, so this
/// path needs no runtime validation. If a cancellation cuts the stream short
/// the destination keeps whatever was already written.
pub async fn as_map<S, K, V, D>(
    cancel: &CancellationToken,
    source: &S,
    dest: &mut D,
) -> Result<()>
where
    S: Source<K, V> + ?Sized,
    D: Extend<(K, V)>,
    K: Clone,
    V: Clone,
{
    let iter = source.iterate(cancel);
    while iter.advance(cancel).await {
        let Some(Pair { key, value }) = iter.current().await else {
            break;
        };
        dest.extend([(key, value)]);
    }
    Ok(())
}

/// Adapts a raw container of loosely typed entries into a heterogeneous
/// [`Source`], the dynamic counterpart of passing a concrete map directly.
pub struct Values<M>(pub M);

impl<M, K, V> Source<Value, Value> for Values<M>
where
    M: Clone + IntoIterator<Item = (K, V)>,
    M::IntoIter: Send + 'static,
    K: Into<Value> + Send + 'static,
    V: Into<Value> + Send + 'static,
{
    fn iterate(&self, cancel: &CancellationToken) -> MapIter<Value, Value> {
        spawn_producer(
            cancel,
            self.0.clone().into_iter().map(|(key, value)| Pair {
                key: key.into(),
                value: value.into(),
            }),
        )
    }
}

/// Drains a heterogeneous source into a typed map, validating every pair at
/// runtime.
///
/// The first key or value that is not assignable to the destination's
/// declared types aborts the projection with an error naming both types;
/// nothing is coerced or skipped, and entries written before the failure stay
/// in place. A [`Value::Null`] value bypasses validation and is written as
/// `V::default()`.
pub async fn as_value_map<S, K, V, D>(
    cancel: &CancellationToken,
    source: &S,
    dest: &mut D,
) -> Result<()>
where
    S: Source<Value, Value> + ?Sized,
    K: FromValue,
    V: FromValue + Default,
    D: Extend<(K, V)>,
{
    let iter = source.iterate(cancel);
    while iter.advance(cancel).await {
        let Some(Pair { key, value }) = iter.current().await else {
            break;
        };
        let key = K::from_value(key).map_err(Error::key_type)?;
        let value = if value.is_null() {
            V::default()
        } else {
            V::from_value(value).map_err(Error::value_type)?
        };
        dest.extend([(key, value)]);
    }
    Ok(())
}

/// Projects a heterogeneous source into the common string-keyed form.
pub async fn as_str_value_map<S>(
    cancel: &CancellationToken,
    source: &S,
) -> Result<HashMap<String, Value>>
where
    S: Source<Value, Value> + ?Sized,
{
    let mut out = HashMap::new();
    as_value_map(cancel, source, &mut out).await?;
    Ok(out)
}
