//! Nesting depth guard shared by comparison and serialization

use std::cell::Cell;
use std::marker::PhantomData;

use crate::config::config;
use crate::error::{ArrayError, Result};

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// RAII token for one level of nested array traversal on this thread.
///
/// Entering past [`ArrayConfig::recursion_limit`](crate::ArrayConfig) fails
/// with [`ArrayError::RecursionLimit`], which turns runaway recursion through
/// circular references into a deterministic error.
pub(crate) struct RecursionGuard {
    // Depth is tracked per thread, so the guard must stay on it.
    _not_send: PhantomData<*const ()>,
}

impl RecursionGuard {
    pub(crate) fn enter() -> Result<Self> {
        let limit = config().recursion_limit;
        DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > limit {
                return Err(ArrayError::RecursionLimit(limit));
            }
            depth.set(next);
            Ok(Self {
                _not_send: PhantomData,
            })
        })
    }

    #[cfg(test)]
    pub(crate) fn depth() -> usize {
        DEPTH.with(Cell::get)
    }
}

impl Drop for RecursionGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}
