//! Ordered hash map arrays over arbitrary keys

use std::sync::Arc;

use indexmap::IndexMap;

use super::{
    check_sortable, scalarize_value, sort_order, value_sort_cmp, Body, ImmutableArray, KeyComparator,
    Representation, ValueComparator,
};
use crate::array::ArrayData;
use crate::error::Result;
use crate::key::{Key, KeyRef};
use crate::kind::{ArrayKind, SortFlags};
use crate::scalar_cache::ScalarCache;
use crate::value::{Reference, Value};

/// The most general representation: an insertion-ordered map from [`Key`] to
/// [`Value`], plus the next integer key `append` will use.
#[derive(Clone, Debug)]
pub struct GeneralArray {
    map: IndexMap<Key, Value>,
    // `None` once the largest integer key is `i64::MAX`.
    next_free: Option<i64>,
}

impl Default for GeneralArray {
    fn default() -> Self {
        Self {
            map: IndexMap::new(),
            next_free: Some(0),
        }
    }
}

impl From<IndexMap<Key, Value>> for GeneralArray {
    fn from(map: IndexMap<Key, Value>) -> Self {
        let next_free = match map.keys().filter_map(Key::as_int).max() {
            Some(max) => max.checked_add(1).map(|n| n.max(0)),
            None => Some(0),
        };
        Self { map, next_free }
    }
}

impl GeneralArray {
    pub(crate) fn map(&self) -> &IndexMap<Key, Value> {
        &self.map
    }

    fn bump(&mut self, k: i64) {
        if let Some(next) = self.next_free {
            if k >= next {
                self.next_free = k.checked_add(1);
            }
        }
    }

    fn insert(&mut self, key: Key, v: Value) {
        if let Key::Int(k) = key {
            self.bump(k);
        }
        self.map.insert(key, v);
    }

    /// Replaces the contents with `entries`, giving integer keys the values
    /// `0, 1, 2, ...` in order.
    fn rebuild(&mut self, entries: impl IntoIterator<Item = (Key, Value)>) {
        let mut next = 0;
        let map: IndexMap<Key, Value> = entries
            .into_iter()
            .map(|(k, v)| match k {
                Key::Int(_) => {
                    let key = Key::Int(next);
                    next += 1;
                    (key, v)
                }
                key => (key, v),
            })
            .collect();
        self.map = map;
        self.next_free = Some(next);
    }

    fn sort_values_renumbering(
        &mut self,
        mut cmp: impl FnMut(&Value, &Value) -> std::cmp::Ordering,
    ) {
        let mut values: Vec<Value> = self.map.drain(..).map(|(_, v)| v).collect();
        values.sort_by(|a, b| cmp(a, b));
        self.rebuild(values.into_iter().map(|v| (Key::Int(0), v)));
    }
}

impl Representation for GeneralArray {
    const KIND: ArrayKind = ArrayKind::General;

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

    fn set_int(&mut self, k: i64, v: Value) -> Result<()> {
        self.insert(Key::Int(k), v);
        Ok(())
    }

    fn set_str(&mut self, k: Arc<str>, v: Value) -> Result<()> {
        self.insert(Key::Str(k), v);
        Ok(())
    }

    fn add_int(&mut self, k: i64, v: Value) -> Result<()> {
        debug_assert!(!self.exists_int(k), "add_int on existing key {}", k);
        self.set_int(k, v)
    }

    fn add_str(&mut self, k: Arc<str>, v: Value) -> Result<()> {
        debug_assert!(!self.exists_str(&k), "add_str on existing key {:?}", k);
        self.set_str(k, v)
    }

    fn set_ref_int(&mut self, k: i64, r: Reference) -> Result<()> {
        self.set_int(k, Value::Ref(r))
    }

    fn set_ref_str(&mut self, k: Arc<str>, r: Reference) -> Result<()> {
        self.set_str(k, Value::Ref(r))
    }

    fn remove_int(&mut self, k: i64) -> Result<Option<usize>> {
        Ok(self
            .map
            .shift_remove_full(&KeyRef::Int(k))
            .map(|(pos, _, _)| pos))
    }

    fn remove_str(&mut self, k: &str) -> Result<Option<usize>> {
        Ok(self
            .map
            .shift_remove_full(&KeyRef::Str(k))
            .map(|(pos, _, _)| pos))
    }

    fn append(&mut self, v: Value) -> Result<()> {
        match self.next_free {
            Some(k) => self.insert(Key::Int(k), v),
            None => tracing::warn!(
                target: "polyarray::notice",
                "cannot add element to the array as the next element is already occupied"
            ),
        }
        Ok(())
    }

    fn append_ref(&mut self, r: Reference) -> Result<()> {
        self.append(Value::Ref(r))
    }

    fn prepend(&mut self, v: Value) -> Result<()> {
        let rest: Vec<(Key, Value)> = self.map.drain(..).collect();
        self.rebuild(std::iter::once((Key::Int(0), v)).chain(rest));
        Ok(())
    }

    fn plus(&mut self, other: &ArrayData) -> Result<()> {
        for (k, v) in other.iter() {
            if !self.map.contains_key(&k.as_key_ref()) {
                self.insert(k, v);
            }
        }
        Ok(())
    }

    fn merge(&mut self, other: &ArrayData) -> Result<()> {
        for (k, v) in other.iter() {
            match k {
                Key::Int(_) => self.append(v)?,
                key => self.insert(key, v),
            }
        }
        Ok(())
    }

    fn renumber(&mut self) -> Result<()> {
        let entries: Vec<(Key, Value)> = self.map.drain(..).collect();
        self.rebuild(entries);
        Ok(())
    }

    fn ksort(&mut self, flags: SortFlags, ascending: bool) -> Result<()> {
        self.map.sort_by(|a, _, b, _| {
            let ord = a.sort_cmp(b, flags);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        Ok(())
    }

    fn sort(&mut self, flags: SortFlags, ascending: bool) -> Result<()> {
        check_sortable(self.map.values(), flags)?;
        let mut err = None;
        self.sort_values_renumbering(|a, b| {
            sort_order(&mut err, value_sort_cmp(a, b, flags), ascending)
        });
        err.map_or(Ok(()), Err)
    }

    fn asort(&mut self, flags: SortFlags, ascending: bool) -> Result<()> {
        check_sortable(self.map.values(), flags)?;
        let mut err = None;
        self.map.sort_by(|_, a, _, b| {
            sort_order(&mut err, value_sort_cmp(a, b, flags), ascending)
        });
        err.map_or(Ok(()), Err)
    }

    fn uksort(&mut self, cmp: &mut KeyComparator<'_>) -> Result<()> {
        self.map.sort_by(|a, _, b, _| cmp(a, b));
        Ok(())
    }

    fn usort(&mut self, cmp: &mut ValueComparator<'_>) -> Result<()> {
        self.sort_values_renumbering(|a, b| cmp(a, b));
        Ok(())
    }

    fn uasort(&mut self, cmp: &mut ValueComparator<'_>) -> Result<()> {
        self.map.sort_by(|_, a, _, b| cmp(a, b));
        Ok(())
    }

    fn copy(&self) -> Body {
        Body::General(self.clone())
    }

    fn copy_with_strong_iterators(&self) -> Result<Body> {
        Ok(self.copy())
    }

    fn non_smart_copy(&self) -> Result<Body> {
        Ok(Body::Immutable(ImmutableArray::from(self.map.clone())))
    }

    fn on_set_eval_scalar(&mut self, cache: &ScalarCache) -> Result<()> {
        self.map
            .values_mut()
            .try_for_each(|v| scalarize_value(cache, v))
    }

    fn bind_int(&mut self, k: i64, r: Reference) -> Result<()> {
        self.set_ref_int(k, r)
    }

    fn bind_str(&mut self, k: Arc<str>, r: Reference) -> Result<()> {
        self.set_ref_str(k, r)
    }

    fn bind_append(&mut self, r: Reference) -> Result<()> {
        self.append_ref(r)
    }
}
