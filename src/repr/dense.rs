//! Vector-backed arrays keyed `0..n`

use std::sync::Arc;

use indexmap::IndexMap;

use super::{
    check_sortable, scalarize_value, sort_order, value_sort_cmp, Body, GeneralArray, ImmutableArray,
    Representation, ValueComparator,
};
use crate::error::{ArrayError, Result};
use crate::key::Key;
use crate::kind::{ArrayKind, SortFlags, WriteOp};
use crate::scalar_cache::ScalarCache;
use crate::value::Value;

/// An array whose keys are exactly `0..len`, in order.
#[derive(Clone, Debug, Default)]
pub struct DenseArray {
    items: Vec<Value>,
}

impl DenseArray {
    /// Creates an empty dense array with room for `cap` elements.
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            items: Vec::with_capacity(cap),
        }
    }

    fn index(&self, k: i64) -> Option<usize> {
        usize::try_from(k).ok().filter(|&i| i < self.items.len())
    }

    fn needs_escalation() -> ArrayError {
        ArrayError::internal("dense array asked to perform a write that requires escalation")
    }

    fn to_map(&self) -> IndexMap<Key, Value> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, v)| (Key::Int(i as i64), v.clone()))
            .collect()
    }
}

impl From<Vec<Value>> for DenseArray {
    fn from(items: Vec<Value>) -> Self {
        Self { items }
    }
}

impl Representation for DenseArray {
    const KIND: ArrayKind = ArrayKind::Dense;

    fn size(&self) -> usize {
        self.items.len()
    }

    fn find_int(&self, k: i64) -> Option<usize> {
        self.index(k)
    }

    fn find_str(&self, _k: &str) -> Option<usize> {
        None
    }

    fn key_at(&self, pos: usize) -> Option<Key> {
        (pos < self.items.len()).then(|| Key::Int(pos as i64))
    }

    fn value_at(&self, pos: usize) -> Option<Value> {
        self.items.get(pos).cloned()
    }

    fn is_vector_data(&self) -> bool {
        true
    }

    fn escalation_needed(&self, op: &WriteOp<'_>) -> bool {
        let len = self.items.len();
        match *op {
            WriteOp::SetInt(k) => usize::try_from(k).map_or(true, |i| i > len),
            // Removal would let `append` reuse the freed key.
            WriteOp::RemoveInt(k) => self.index(k).is_some(),
            WriteOp::Sort(kind) => kind.preserves_keys(),
            WriteOp::SetStr(_)
            | WriteOp::SetRefInt(_)
            | WriteOp::SetRefStr(_)
            | WriteOp::AppendRef
            | WriteOp::Union(_)
            | WriteOp::Bind => true,
            WriteOp::Append
            | WriteOp::RemoveStr(_)
            | WriteOp::Prepend
            | WriteOp::Renumber
            | WriteOp::Position => false,
        }
    }

    fn set_int(&mut self, k: i64, v: Value) -> Result<()> {
        match usize::try_from(k) {
            Ok(i) if i < self.items.len() => self.items[i] = v,
            Ok(i) if i == self.items.len() => self.items.push(v),
            _ => return Err(Self::needs_escalation()),
        }
        Ok(())
    }

    fn set_str(&mut self, _k: Arc<str>, _v: Value) -> Result<()> {
        Err(Self::needs_escalation())
    }

    fn remove_int(&mut self, k: i64) -> Result<Option<usize>> {
        match self.index(k) {
            None => Ok(None),
            Some(_) => Err(Self::needs_escalation()),
        }
    }

    fn remove_str(&mut self, _k: &str) -> Result<Option<usize>> {
        Ok(None)
    }

    fn append(&mut self, v: Value) -> Result<()> {
        self.items.push(v);
        Ok(())
    }

    fn prepend(&mut self, v: Value) -> Result<()> {
        self.items.insert(0, v);
        Ok(())
    }

    fn sort(&mut self, flags: SortFlags, ascending: bool) -> Result<()> {
        check_sortable(self.items.iter(), flags)?;
        let mut err = None;
        self.items
            .sort_by(|a, b| sort_order(&mut err, value_sort_cmp(a, b, flags), ascending));
        err.map_or(Ok(()), Err)
    }

    fn usort(&mut self, cmp: &mut ValueComparator<'_>) -> Result<()> {
        self.items.sort_by(|a, b| cmp(a, b));
        Ok(())
    }

    fn copy(&self) -> Body {
        Body::Dense(self.clone())
    }

    fn copy_with_strong_iterators(&self) -> Result<Body> {
        Ok(self.copy())
    }

    fn non_smart_copy(&self) -> Result<Body> {
        Ok(Body::Immutable(ImmutableArray::from(self.to_map())))
    }

    fn escalate(&self) -> Option<Body> {
        Some(Body::General(GeneralArray::from(self.to_map())))
    }

    fn on_set_eval_scalar(&mut self, cache: &ScalarCache) -> Result<()> {
        self.items
            .iter_mut()
            .try_for_each(|v| scalarize_value(cache, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::SortKind;

    fn ints(values: &[i64]) -> DenseArray {
        values.iter().copied().map(Value::Int).collect::<Vec<_>>().into()
    }

    #[mockalloc::test]
    fn writes_inside_the_vector_stay_dense() {
        let arr = ints(&[1, 2, 3]);
        assert!(!arr.escalation_needed(&WriteOp::SetInt(0)));
        assert!(!arr.escalation_needed(&WriteOp::SetInt(3)));
        assert!(!arr.escalation_needed(&WriteOp::Append));
        assert!(!arr.escalation_needed(&WriteOp::RemoveInt(3)));
        assert!(!arr.escalation_needed(&WriteOp::Sort(SortKind::Sort)));
    }

    #[mockalloc::test]
    fn holes_and_strings_escalate() {
        let arr = ints(&[1, 2, 3]);
        assert!(arr.escalation_needed(&WriteOp::SetInt(4)));
        assert!(arr.escalation_needed(&WriteOp::SetInt(-1)));
        assert!(arr.escalation_needed(&WriteOp::SetStr("a")));
        assert!(arr.escalation_needed(&WriteOp::RemoveInt(0)));
        assert!(arr.escalation_needed(&WriteOp::RemoveInt(2)));
        assert!(arr.escalation_needed(&WriteOp::AppendRef));
        assert!(arr.escalation_needed(&WriteOp::Sort(SortKind::Asort)));
    }

    #[mockalloc::test]
    fn set_append_remove() {
        let mut arr = ints(&[1, 2]);
        arr.set_int(0, Value::Int(10)).unwrap();
        arr.set_int(2, Value::Int(30)).unwrap();
        arr.append(Value::Int(40)).unwrap();
        assert_eq!(arr.size(), 4);
        assert_eq!(arr.get_int(0), Some(Value::Int(10)));
        assert_eq!(arr.remove_int(9).unwrap(), None);
        assert!(arr.remove_int(3).is_err());
        assert!(arr.set_int(7, Value::Null).is_err());
        assert_eq!(arr.get_str("0"), None);
    }

    #[mockalloc::test]
    fn sorts_in_place() {
        let mut arr = ints(&[3, 1, 2]);
        arr.sort(SortFlags::Regular, true).unwrap();
        assert_eq!(arr.items, ints(&[1, 2, 3]).items);
        arr.usort(&mut |a: &Value, b: &Value| b.to_f64().total_cmp(&a.to_f64()))
            .unwrap();
        assert_eq!(arr.items, ints(&[3, 2, 1]).items);
    }

    #[mockalloc::test]
    fn escalates_to_general() {
        let arr = ints(&[5, 6]);
        match arr.escalate() {
            Some(Body::General(general)) => {
                assert_eq!(general.size(), 2);
                assert_eq!(general.get_int(1), Some(Value::Int(6)));
            }
            other => panic!("unexpected escalation result {:?}", other),
        }
    }
}
