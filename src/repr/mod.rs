//! The dispatch contract shared by every array representation
//!
//! Each representation implements [`Representation`]. Rows a representation
//! does not override fall back to the trait defaults, which either alias a
//! related row or fail with [`ArrayError::Unimplemented`]. Call sites select
//! the implementation through the [`Body`] tag with [`dispatch!`], so every
//! call is a direct, inlinable call into the concrete type.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::array::ArrayData;
use crate::error::{ArrayError, Result};
use crate::key::Key;
use crate::kind::{ArrayKind, SortFlags, WriteOp};
use crate::scalar_cache::ScalarCache;
use crate::value::{Reference, Value};

mod dense;
mod general;
mod immutable;
mod table;

pub use dense::DenseArray;
pub use general::GeneralArray;
pub use immutable::ImmutableArray;
pub use table::{TableAdapter, VarTable};

/// User supplied key comparator.
pub type KeyComparator<'a> = dyn FnMut(&Key, &Key) -> Ordering + 'a;
/// User supplied value comparator.
pub type ValueComparator<'a> = dyn FnMut(&Value, &Value) -> Ordering + 'a;

/// Storage of one array instance, tagged by kind.
#[derive(Debug)]
pub enum Body {
    Dense(DenseArray),
    General(GeneralArray),
    Immutable(ImmutableArray),
    Table(TableAdapter),
}

/// Routes a call to the representation behind a [`Body`].
macro_rules! dispatch {
    ($body:expr, $r:ident => $e:expr) => {
        match $body {
            $crate::repr::Body::Dense($r) => $e,
            $crate::repr::Body::General($r) => $e,
            $crate::repr::Body::Immutable($r) => $e,
            $crate::repr::Body::Table($r) => $e,
        }
    };
}
pub(crate) use dispatch;

impl Body {
    /// Kind tag of this body.
    #[must_use]
    pub fn kind(&self) -> ArrayKind {
        dispatch!(self, r => r.kind())
    }
}

/// The operation surface every representation provides.
///
/// Positions are indices into iteration order, `0..size()`.
pub trait Representation {
    /// Tag of this representation.
    const KIND: ArrayKind;

    fn kind(&self) -> ArrayKind {
        Self::KIND
    }

    fn size(&self) -> usize;
    fn find_int(&self, k: i64) -> Option<usize>;
    fn find_str(&self, k: &str) -> Option<usize>;
    fn key_at(&self, pos: usize) -> Option<Key>;
    fn value_at(&self, pos: usize) -> Option<Value>;

    fn get_int(&self, k: i64) -> Option<Value> {
        self.find_int(k).and_then(|pos| self.value_at(pos))
    }

    fn get_str(&self, k: &str) -> Option<Value> {
        self.find_str(k).and_then(|pos| self.value_at(pos))
    }

    fn exists_int(&self, k: i64) -> bool {
        self.find_int(k).is_some()
    }

    fn exists_str(&self, k: &str) -> bool {
        self.find_str(k).is_some()
    }

    /// Whether reading a missing key should raise a notice.
    fn notices_missing(&self) -> bool {
        true
    }

    /// `true` if the keys are exactly `0..size()` in order.
    fn is_vector_data(&self) -> bool {
        (0..self.size()).all(|pos| matches!(self.key_at(pos), Some(Key::Int(i)) if i == pos as i64))
    }

    /// Whether `op` needs a more general representation first.
    fn escalation_needed(&self, _op: &WriteOp<'_>) -> bool {
        false
    }

    fn set_int(&mut self, k: i64, v: Value) -> Result<()>;
    fn set_str(&mut self, k: Arc<str>, v: Value) -> Result<()>;

    fn add_int(&mut self, k: i64, v: Value) -> Result<()> {
        self.set_int(k, v)
    }

    fn add_str(&mut self, k: Arc<str>, v: Value) -> Result<()> {
        self.set_str(k, v)
    }

    fn set_ref_int(&mut self, _k: i64, _r: Reference) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "set_ref_int"))
    }

    fn set_ref_str(&mut self, _k: Arc<str>, _r: Reference) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "set_ref_str"))
    }

    /// Removes a key, returning the position it occupied.
    fn remove_int(&mut self, k: i64) -> Result<Option<usize>>;
    fn remove_str(&mut self, k: &str) -> Result<Option<usize>>;

    fn append(&mut self, v: Value) -> Result<()>;

    fn append_ref(&mut self, _r: Reference) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "append_ref"))
    }

    /// Appends, keeping a reference as a reference.
    fn append_with_ref(&mut self, v: Value) -> Result<()> {
        match v {
            Value::Ref(r) => self.append_ref(r),
            v => self.append(v),
        }
    }

    /// Inserts at the front, renumbering integer keys.
    fn prepend(&mut self, _v: Value) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "prepend"))
    }

    /// Union: keys already present keep their value.
    fn plus(&mut self, _other: &ArrayData) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "plus"))
    }

    /// Merge: integer keys are appended, string keys overwrite.
    fn merge(&mut self, _other: &ArrayData) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "merge"))
    }

    /// Re-keys integer keys densely from zero.
    fn renumber(&mut self) -> Result<()> {
        Ok(())
    }

    fn ksort(&mut self, _flags: SortFlags, _ascending: bool) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "ksort"))
    }

    fn sort(&mut self, _flags: SortFlags, _ascending: bool) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "sort"))
    }

    fn asort(&mut self, _flags: SortFlags, _ascending: bool) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "asort"))
    }

    fn uksort(&mut self, _cmp: &mut KeyComparator<'_>) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "uksort"))
    }

    fn usort(&mut self, _cmp: &mut ValueComparator<'_>) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "usort"))
    }

    fn uasort(&mut self, _cmp: &mut ValueComparator<'_>) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "uasort"))
    }

    /// Shallow structural copy.
    fn copy(&self) -> Body;

    /// Copy used by copy-on-write, which carries strong iterators along.
    fn copy_with_strong_iterators(&self) -> Result<Body> {
        Err(ArrayError::unimplemented(Self::KIND, "copy_with_strong_iterators"))
    }

    /// Copy into the read-only form used by the scalar cache.
    fn non_smart_copy(&self) -> Result<Body> {
        Err(ArrayError::unimplemented(Self::KIND, "non_smart_copy"))
    }

    /// Converts to the next more general representation.
    fn escalate(&self) -> Option<Body> {
        None
    }

    /// Interns nested arrays so the contents are fit for the scalar cache.
    fn on_set_eval_scalar(&mut self, _cache: &ScalarCache) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "on_set_eval_scalar"))
    }

    fn bind_int(&mut self, _k: i64, _r: Reference) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "bind_int"))
    }

    fn bind_str(&mut self, _k: Arc<str>, _r: Reference) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "bind_str"))
    }

    fn bind_append(&mut self, _r: Reference) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "bind_append"))
    }

    /// Called once when the owning instance is destroyed.
    fn release(&mut self) {}

    fn iter_begin(&self) -> Option<usize> {
        (self.size() > 0).then_some(0)
    }

    fn iter_end(&self) -> Option<usize> {
        self.size().checked_sub(1)
    }

    fn iter_advance(&self, pos: usize) -> Option<usize> {
        let next = pos + 1;
        (next < self.size()).then_some(next)
    }

    fn iter_rewind(&self, pos: usize) -> Option<usize> {
        pos.checked_sub(1).filter(|&p| p < self.size())
    }

    fn valid_full_pos(&self, pos: usize) -> bool {
        pos < self.size()
    }
}

/// Value ordering used by `sort` and `asort`. Every flag gives a total order.
pub(crate) fn value_sort_cmp(a: &Value, b: &Value, flags: SortFlags) -> Result<Ordering> {
    match flags {
        SortFlags::Regular => a.sort_cmp(b),
        SortFlags::Numeric => Ok(a.to_f64().total_cmp(&b.to_f64())),
        SortFlags::String => Ok(a.to_text().cmp(&b.to_text())),
    }
}

/// Fails if some value cannot be ordered at all, such as an array nested past
/// the recursion limit or one that contains itself.
///
/// Comparing a value with itself walks all of it, and comparing two values
/// never nests deeper than the shallower of them, so once this passes no
/// comparison made by the sort can fail.
pub(crate) fn check_sortable<'a>(
    mut values: impl Iterator<Item = &'a Value>,
    flags: SortFlags,
) -> Result<()> {
    match flags {
        SortFlags::Regular => values.try_for_each(|v| v.sort_cmp(v).map(drop)),
        SortFlags::Numeric | SortFlags::String => Ok(()),
    }
}

/// Folds a fallible comparison into a sort, remembering the first failure.
pub(crate) fn sort_order(
    first_err: &mut Option<ArrayError>,
    ord: Result<Ordering>,
    ascending: bool,
) -> Ordering {
    let ord = match ord {
        Ok(ord) => ord,
        Err(e) => {
            first_err.get_or_insert(e);
            Ordering::Equal
        }
    };
    if ascending {
        ord
    } else {
        ord.reverse()
    }
}

/// Interns a nested array in place, rejecting references.
pub(crate) fn scalarize_value(cache: &ScalarCache, value: &mut Value) -> Result<()> {
    match value {
        Value::Ref(_) => Err(ArrayError::NotScalar),
        Value::Array(a) => {
            *a = cache.intern_or_get(a, None)?;
            Ok(())
        }
        _ => Ok(()),
    }
}
