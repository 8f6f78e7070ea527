//! Shared read-only arrays

use std::sync::Arc;

use indexmap::IndexMap;

use super::{scalarize_value, Body, GeneralArray, Representation};
use crate::error::{ArrayError, Result};
use crate::key::{Key, KeyRef};
use crate::kind::{ArrayKind, WriteOp};
use crate::scalar_cache::ScalarCache;
use crate::value::Value;

/// A read-only ordered map whose storage is shared between copies.
///
/// This is the form arrays take once interned in the scalar cache. Every
/// write escalates to a [`GeneralArray`] first.
#[derive(Clone, Debug, Default)]
pub struct ImmutableArray {
    map: Arc<IndexMap<Key, Value>>,
}

impl From<IndexMap<Key, Value>> for ImmutableArray {
    fn from(map: IndexMap<Key, Value>) -> Self {
        Self { map: Arc::new(map) }
    }
}

impl ImmutableArray {
    fn read_only() -> ArrayError {
        ArrayError::internal("write reached an immutable array without escalation")
    }
}

impl Representation for ImmutableArray {
    const KIND: ArrayKind = ArrayKind::Immutable;

    fn size(&self) -> usize {
        self.map.len()
    }

    fn find_int(&self, k: i64) -> Option<usize> {
        self.map.get_index_of(&KeyRef::Int(k))
    }

    fn find_str(&self, k: &str) -> Option<usize> {
        self.map.get_index_of(&KeyRef::Str(k))
    }

    fn key_at(&self, pos: usize) -> Option<Key> {
        self.map.get_index(pos).map(|(k, _)| k.clone())
    }

    fn value_at(&self, pos: usize) -> Option<Value> {
        self.map.get_index(pos).map(|(_, v)| v.clone())
    }

    fn escalation_needed(&self, op: &WriteOp<'_>) -> bool {
        !matches!(op, WriteOp::Position)
    }

    fn set_int(&mut self, _k: i64, _v: Value) -> Result<()> {
        Err(Self::read_only())
    }

    fn set_str(&mut self, _k: Arc<str>, _v: Value) -> Result<()> {
        Err(Self::read_only())
    }

    fn remove_int(&mut self, _k: i64) -> Result<Option<usize>> {
        Err(Self::read_only())
    }

    fn remove_str(&mut self, _k: &str) -> Result<Option<usize>> {
        Err(Self::read_only())
    }

    fn append(&mut self, _v: Value) -> Result<()> {
        Err(Self::read_only())
    }

    fn copy(&self) -> Body {
        Body::Immutable(self.clone())
    }

    fn copy_with_strong_iterators(&self) -> Result<Body> {
        Ok(self.copy())
    }

    fn non_smart_copy(&self) -> Result<Body> {
        Ok(self.copy())
    }

    fn escalate(&self) -> Option<Body> {
        Some(Body::General(GeneralArray::from((*self.map).clone())))
    }

    fn on_set_eval_scalar(&mut self, cache: &ScalarCache) -> Result<()> {
        Arc::make_mut(&mut self.map)
            .values_mut()
            .try_for_each(|v| scalarize_value(cache, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::SortKind;

    #[mockalloc::test]
    fn copies_share_storage() {
        let arr = ImmutableArray::from(IndexMap::from([(Key::from("a"), Value::Int(1))]));
        match arr.copy() {
            Body::Immutable(copy) => assert!(Arc::ptr_eq(&arr.map, &copy.map)),
            other => panic!("unexpected copy {:?}", other),
        }
    }

    #[mockalloc::test]
    fn every_write_escalates() {
        let arr = ImmutableArray::default();
        assert!(arr.escalation_needed(&WriteOp::Append));
        assert!(arr.escalation_needed(&WriteOp::SetStr("k")));
        assert!(arr.escalation_needed(&WriteOp::Sort(SortKind::Ksort)));
        assert!(!arr.escalation_needed(&WriteOp::Position));
        assert!(matches!(arr.escalate(), Some(Body::General(_))));
    }
}
