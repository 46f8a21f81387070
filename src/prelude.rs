#![allow(unused_imports)]

pub use crate::error::{Error, Result};
pub use crate::iter::Iter;
pub use crate::value::{FromValue, TypeMismatch, Value};
pub use crate::{array, map};

pub use tokio_util::sync::CancellationToken;
