//! Representation-agnostic algorithms built on the dispatch rows: structural
//! comparison, the internal-position protocol, stack and queue operations

use std::cmp::Ordering;

use hashbrown::HashSet;

use crate::array::{Array, ArrayData};
use crate::error::{ArrayError, Result};
use crate::key::Key;
use crate::kind::{SortFlags, WriteOp};
use crate::recursion::RecursionGuard;
use crate::value::{Reference, Value};

impl ArrayData {
    /// Loose equality: same size, and every key of `self` maps to a loosely
    /// equal value in `other`. Order is ignored.
    pub fn equal(&self, other: &ArrayData) -> Result<bool> {
        if self.len() != other.len() {
            return Ok(false);
        }
        let _guard = RecursionGuard::enter()?;
        for (k, v) in self.iter() {
            match other.try_get(&k) {
                Some(w) if v.loose_eq(&w)? => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Strict identity: same keys in the same order, with values that are
    /// [`Value::same`].
    pub fn same(&self, other: &ArrayData) -> Result<bool> {
        if self.len() != other.len() {
            return Ok(false);
        }
        let _guard = RecursionGuard::enter()?;
        for ((k, v), (l, w)) in self.iter().zip(other.iter()) {
            if k != l || !v.same(&w)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Orders arrays by size, then by the first differing value in `self`'s
    /// iteration order. A key missing from `other` makes `self` greater.
    pub fn compare(&self, other: &ArrayData) -> Result<Ordering> {
        match self.len().cmp(&other.len()) {
            Ordering::Equal => {}
            ord => return Ok(ord),
        }
        let _guard = RecursionGuard::enter()?;
        for (k, v) in self.iter() {
            let w = match other.try_get(&k) {
                Some(w) => w,
                None => return Ok(Ordering::Greater),
            };
            match v.loose_cmp(&w)? {
                Ordering::Equal => {}
                ord => return Ok(ord),
            }
        }
        Ok(Ordering::Equal)
    }

    /// Total order used when arrays are sorted as values: by size, then entry
    /// by entry in iteration order, key before value.
    pub(crate) fn sort_cmp_entries(&self, other: &ArrayData) -> Result<Ordering> {
        match self.len().cmp(&other.len()) {
            Ordering::Equal => {}
            ord => return Ok(ord),
        }
        let _guard = RecursionGuard::enter()?;
        for ((k, v), (l, w)) in self.iter().zip(other.iter()) {
            let ord = match k.sort_cmp(&l, SortFlags::Regular) {
                Ordering::Equal => v.sort_cmp(&w)?,
                ord => ord,
            };
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }

    /// Value at the internal position, or `false` when it is invalid.
    #[must_use]
    pub fn current(&self) -> Value {
        self.value_at_pos(self.pos)
    }

    /// Key at the internal position, or null when it is invalid.
    #[must_use]
    pub fn key(&self) -> Value {
        self.pos
            .and_then(|pos| self.key_at(pos))
            .map_or(Value::Null, Value::from)
    }

    /// Value at `pos`, or `false` when `pos` is invalid.
    #[must_use]
    pub fn value_at_pos(&self, pos: Option<usize>) -> Value {
        pos.and_then(|pos| self.value_at(pos))
            .unwrap_or(Value::Bool(false))
    }

    /// Value of the last element. Fails if the internal position is invalid.
    pub fn last(&self) -> Result<Value> {
        if self.pos.is_none() {
            return Err(ArrayError::internal("last() on an array with no valid position"));
        }
        self.iter_end()
            .and_then(|pos| self.value_at(pos))
            .ok_or_else(|| ArrayError::internal("valid position in an empty array"))
    }

    /// Returns `true` if some reference cell is reachable from this array
    /// twice, including through a cycle.
    #[must_use]
    pub fn has_internal_reference(&self) -> bool {
        let mut seen = HashSet::new();
        self.reaches_seen_reference(&mut seen)
    }

    fn reaches_seen_reference(&self, seen: &mut HashSet<usize>) -> bool {
        self.iter().any(|(_, v)| value_reaches_seen_reference(&v, seen))
    }
}

fn value_reaches_seen_reference(value: &Value, seen: &mut HashSet<usize>) -> bool {
    match value {
        Value::Ref(r) => {
            if !seen.insert(r.addr()) {
                return true;
            }
            r.with(|inner| value_reaches_seen_reference(inner, seen))
        }
        Value::Array(a) => a.reaches_seen_reference(seen),
        _ => false,
    }
}

impl Array {
    fn move_pos(&mut self, f: impl FnOnce(&ArrayData) -> Option<usize>) -> Result<Value> {
        let data = self.prepare(&WriteOp::Position)?;
        let pos = f(data);
        data.pos = pos;
        Ok(data.current())
    }

    /// Moves the internal position to the first element and returns it.
    pub fn reset(&mut self) -> Result<Value> {
        self.move_pos(ArrayData::iter_begin)
    }

    /// Moves the internal position to the last element and returns it.
    pub fn end(&mut self) -> Result<Value> {
        self.move_pos(ArrayData::iter_end)
    }

    /// Advances the internal position and returns the new element.
    pub fn next(&mut self) -> Result<Value> {
        self.move_pos(|data| data.pos.and_then(|pos| data.iter_advance(pos)))
    }

    /// Rewinds the internal position and returns the new element.
    pub fn prev(&mut self) -> Result<Value> {
        self.move_pos(|data| data.pos.and_then(|pos| data.iter_rewind(pos)))
    }

    /// Returns `[1 => value, "value" => value, 0 => key, "key" => key]` for
    /// the current element and advances, or `false` at the end.
    pub fn each(&mut self) -> Result<Value> {
        let data = self.prepare(&WriteOp::Position)?;
        let pos = match data.pos {
            Some(pos) => pos,
            None => return Ok(Value::Bool(false)),
        };
        let (key, value) = match (data.key_at(pos), data.value_at(pos)) {
            (Some(k), Some(v)) => (Value::from(k), v),
            _ => return Ok(Value::Bool(false)),
        };
        data.pos = data.iter_advance(pos);
        Ok(Array::from_pairs([
            (Key::Int(1), value.clone()),
            (Key::from("value"), value),
            (Key::Int(0), key.clone()),
            (Key::from("key"), key),
        ])
        .into())
    }

    /// Removes and returns the last element, or null if the array is empty.
    /// Resets the internal position.
    pub fn pop(&mut self) -> Result<Value> {
        let pos = match self.iter_end() {
            Some(pos) => pos,
            None => return Ok(Value::Null),
        };
        self.take_at(pos)
    }

    /// Removes and returns the first element, or null if the array is empty.
    /// Integer keys are renumbered from zero and the internal position reset.
    pub fn dequeue(&mut self) -> Result<Value> {
        let pos = match self.iter_begin() {
            Some(pos) => pos,
            None => return Ok(Value::Null),
        };
        let value = self.take_at(pos)?;
        self.renumber()?;
        Ok(value)
    }

    fn take_at(&mut self, pos: usize) -> Result<Value> {
        let (key, value) = match (self.key_at(pos), self.value_at(pos)) {
            (Some(k), Some(v)) => (k, v),
            _ => return Err(ArrayError::internal("iteration position without an element")),
        };
        self.remove(&key)?;
        self.prepare(&WriteOp::Position)?.reset_pos();
        Ok(value.unref())
    }

    /// Returns the reference cell bound to `key`, first turning the slot into
    /// one (created as null if absent).
    pub fn lval_ref(&mut self, key: impl Into<Key>) -> Result<Reference> {
        let key = key.into();
        let current = self.try_get(&key);
        if let Some(Value::Ref(r)) = current {
            return Ok(r);
        }
        let r = Reference::new(current.unwrap_or_default());
        self.set_ref(key, r.clone())?;
        Ok(r)
    }
}
