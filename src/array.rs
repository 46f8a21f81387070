//! Indexed iteration: array-like sources, walks, and slice/vector
//! projections.
//!
//! Unlike the keyed variant, destinations here are written by index, not by
//! arrival order, so the final content is correct regardless of producer
//! order as long as indices are valid.

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::iter::{Iter, spawn_producer};
use crate::value::{FromValue, Value};

/// One index/value element produced by an indexed source.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair<V> {
    pub index: usize,
    pub value: V,
}

/// Cursor over indexed pairs.
pub type ArrayIter<V> = Iter<Pair<V>>;

/// An array-like container able to produce a cursor over its elements.
///
/// Implementors assign the indices; the crate-provided implementations emit
/// them in enumeration order starting at zero. The same producer obligations
/// as for the keyed [`Source`](crate::map::Source) apply.
pub trait Source<V> {
    fn iterate(&self, cancel: &CancellationToken) -> ArrayIter<V>;
}

impl<V> Source<V> for Vec<V>
where
    V: Clone + Send + 'static,
{
    fn iterate(&self, cancel: &CancellationToken) -> ArrayIter<V> {
        iterate(cancel, self.clone())
    }
}

impl<V> Source<V> for [V]
where
    V: Clone + Send + 'static,
{
    fn iterate(&self, cancel: &CancellationToken) -> ArrayIter<V> {
        iterate(cancel, self.to_vec())
    }
}

/// Spawns a producer over any owned sequence of elements and returns the
/// cursor pulling from it. Must be called from within a tokio runtime.
pub fn iterate<C, V>(cancel: &CancellationToken, items: C) -> ArrayIter<V>
where
    C: IntoIterator<Item = V>,
    C::IntoIter: Send + 'static,
    V: Send + 'static,
{
    spawn_producer(
        cancel,
        items
            .into_iter()
            .enumerate()
            .map(|(index, value)| Pair { index, value }),
    )
}

/// Per-pair callback driven by [`walk`].
pub trait Visitor<V> {
    fn visit(&mut self, index: usize, value: V) -> anyhow::Result<()>;
}

impl<V, F> Visitor<V> for F
where
    F: FnMut(usize, V) -> anyhow::Result<()>,
{
    fn visit(&mut self, index: usize, value: V) -> anyhow::Result<()> {
        self(index, value)
    }
}

/// Walks every element of `source`, invoking `visitor` once per pair.
///
/// The first visitor error aborts the walk and is returned wrapped with the
/// offending index. Cancellation ends the walk early with `Ok(())`.
pub async fn walk<S, V, T>(cancel: &CancellationToken, source: &S, visitor: &mut T) -> Result<()>
where
    S: Source<V> + ?Sized,
    T: Visitor<V> + ?Sized,
    V: Clone,
{
    let iter = source.iterate(cancel);
    while iter.advance(cancel).await {
        let Some(Pair { index, value }) = iter.current().await else {
            break;
        };
        if let Err(err) = visitor.visit(index, value) {
            return Err(Error::VisitIndex { index, err });
        }
    }
    Ok(())
}

/// Drains `source` into a growable vector, writing each pair at its index.
///
/// The vector is extended with default elements whenever a pair's index lies
/// past the current length, so a fresh empty vector ends up exactly as long
/// as the highest index written plus one. Existing elements are overwritten
/// in place; the vector is never replaced wholesale.
pub async fn as_vec<S, V>(cancel: &CancellationToken, source: &S, dest: &mut Vec<V>) -> Result<()>
where
    S: Source<V> + ?Sized,
    V: Clone + Default,
{
    let iter = source.iterate(cancel);
    while iter.advance(cancel).await {
        let Some(Pair { index, value }) = iter.current().await else {
            break;
        };
        if index >= dest.len() {
            dest.resize_with(index + 1, V::default);
        }
        dest[index] = value;
    }
    Ok(())
}

/// Drains `source` into a fixed-size destination.
///
/// Fixed-size arrays coerce via `&mut arr[..]`. Slots no pair lands on keep
/// their prior contents; an index past the end aborts the projection with
/// [`Error::OutOfBounds`], leaving earlier writes in place.
pub async fn as_slice<S, V>(cancel: &CancellationToken, source: &S, dest: &mut [V]) -> Result<()>
where
    S: Source<V> + ?Sized,
    V: Clone,
{
    let len = dest.len();
    let iter = source.iterate(cancel);
    while iter.advance(cancel).await {
        let Some(Pair { index, value }) = iter.current().await else {
            break;
        };
        let slot = dest
            .get_mut(index)
            .ok_or(Error::OutOfBounds { index, len })?;
        *slot = value;
    }
    Ok(())
}

/// Adapts a raw sequence of loosely typed elements into a heterogeneous
/// [`Source`], the dynamic counterpart of passing a concrete slice directly.
pub struct Values<C>(pub C);

impl<C, V> Source<Value> for Values<C>
where
    C: Clone + IntoIterator<Item = V>,
    C::IntoIter: Send + 'static,
    V: Into<Value> + Send + 'static,
{
    fn iterate(&self, cancel: &CancellationToken) -> ArrayIter<Value> {
        iterate(cancel, self.0.clone().into_iter().map(Into::into))
    }
}

/// Runtime-validated counterpart of [`as_vec`]: every element must be
/// assignable to `V`, with [`Value::Null`] written as `V::default()`.
pub async fn as_value_vec<S, V>(
    cancel: &CancellationToken,
    source: &S,
    dest: &mut Vec<V>,
) -> Result<()>
where
    S: Source<Value> + ?Sized,
    V: FromValue + Default,
{
    let iter = source.iterate(cancel);
    while iter.advance(cancel).await {
        let Some(Pair { index, value }) = iter.current().await else {
            break;
        };
        let value = if value.is_null() {
            V::default()
        } else {
            V::from_value(value).map_err(Error::value_type)?
        };
        if index >= dest.len() {
            dest.resize_with(index + 1, V::default);
        }
        dest[index] = value;
    }
    Ok(())
}

/// Runtime-validated counterpart of [`as_slice`].
pub async fn as_value_slice<S, V>(
    cancel: &CancellationToken,
    source: &S,
    dest: &mut [V],
) -> Result<()>
where
    S: Source<Value> + ?Sized,
    V: FromValue + Default,
{
    let len = dest.len();
    let iter = source.iterate(cancel);
    while iter.advance(cancel).await {
        let Some(Pair { index, value }) = iter.current().await else {
            break;
        };
        let value = if value.is_null() {
            V::default()
        } else {
            V::from_value(value).map_err(Error::value_type)?
        };
        let slot = dest
            .get_mut(index)
            .ok_or(Error::OutOfBounds { index, len })?;
        *slot = value;
    }
    Ok(())
}
