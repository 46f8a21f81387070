//! Cancellable pull-style iteration over map- and array-like sources.
//!
//! A [`map::Source`] or [`array::Source`] spawns a producer task that pushes
//! pairs through a capacity-one channel; an [`Iter`] pulls them one at a time
//! under an explicit [`CancellationToken`]. On top of the cursor sit walk and
//! projection helpers that drain a source into a caller-supplied container,
//! either statically typed ([`map::as_map`], [`array::as_vec`],
//! [`array::as_slice`]) or validated at runtime against dynamic [`Value`]s
//! ([`map::as_value_map`], [`array::as_value_vec`]).
//!
//! Concrete containers (`HashMap`, `BTreeMap`, `Vec`, slices) implement the
//! `Source` traits directly, so they can be walked and projected without any
//! wrapping.
//!
//! Two caveats carried by design:
//!
//! - Cancellation is indistinguishable from exhaustion at the cursor: both
//!   make [`Iter::advance`] return `false`. Callers that need to tell the
//!   two apart check their own token after the loop.
//! - Projections abort on the first error without rolling back, so the
//!   destination may be left partially populated.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod array;
pub mod error;
pub mod iter;
pub mod map;
pub mod prelude;
pub mod value;

pub use error::{Error, Result};
pub use iter::Iter;
pub use value::{FromValue, TypeMismatch, Value};
