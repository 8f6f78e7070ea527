//! Copy-on-write array values for dynamic-language runtimes.
//!
//! An [`Array`] is an ordered map from [`Key`]s (integers or strings) to
//! [`Value`]s. Handles are cheap to clone and share one instance until a
//! write, which copies first. Each instance is backed by one of several
//! representations (see [`ArrayKind`]); a write the current representation
//! cannot express escalates the instance to a more general one.
//!
//! Static arrays are interned once per process by the scalar cache, see
//! [`intern_or_get`].
#![forbid(unsafe_code)]

mod algorithms;
mod array;
mod config;
mod error;
mod key;
mod kind;
mod recursion;
mod scalar_cache;
mod serialize;
mod strong_iter;
mod value;

pub mod repr;

pub use array::{Array, ArrayData, ArrayId, Iter};
pub use config::{init_array_runtime, ArrayConfig};
pub use error::{ArrayError, Result};
pub use key::Key;
pub use kind::{ArrayKind, KindInfo, SortFlags, SortKind, WriteOp};
pub use repr::VarTable;
pub use scalar_cache::{init_scalar_cache, intern_or_get, scalar_cache, ScalarCache};
pub use serialize::{ArraySerializer, NestingGuard, PhpSerializer, SerializeMode, VarDumpSerializer};
pub use strong_iter::StrongIter;
pub use value::{Reference, Value};

#[cfg(test)]
#[global_allocator]
static ALLOCATOR: mockalloc::Mockalloc<std::alloc::System> = mockalloc::Mockalloc(std::alloc::System);
