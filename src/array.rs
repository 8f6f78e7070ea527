//! Functionality relating to the array value type
//!
//! An [`Array`] is a cheaply cloned handle to one [`ArrayData`] instance.
//! Every mutating method goes through the copy-on-write controller: if the
//! current representation cannot perform the write it is escalated to a more
//! general one, otherwise a shared instance is copied first. Strong iterators
//! follow the handle to whichever instance it ends up pointing at.

use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::iter::FromIterator;
use std::ops::Deref;
use std::sync::atomic::{self, AtomicU64};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap};

use crate::config::config;
use crate::error::{ArrayError, Result};
use crate::key::Key;
use crate::kind::{ArrayKind, SortFlags, SortKind, WriteOp};
use crate::recursion::RecursionGuard;
use crate::repr::{
    dispatch, Body, DenseArray, GeneralArray, ImmutableArray, Representation, TableAdapter,
    VarTable,
};
use crate::strong_iter::{IterRegistry, StrongIter};
use crate::value::{Reference, Value};

static NEXT_ARRAY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one array instance.
///
/// Copies and escalations always produce a new id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayId(u64);

impl ArrayId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ARRAY_ID.fetch_add(1, atomic::Ordering::Relaxed))
    }

    /// The raw id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for ArrayId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// One array instance: its storage, internal position and live cursors.
///
/// The kind is fixed for the lifetime of the instance. Reads are available
/// through [`Array`] via `Deref`.
pub struct ArrayData {
    id: ArrayId,
    pub(crate) body: Body,
    pub(crate) pos: Option<usize>,
    is_static: bool,
    pub(crate) strong_iters: IterRegistry,
}

impl ArrayData {
    fn new(body: Body) -> Self {
        let pos = dispatch!(&body, r => r.iter_begin());
        Self {
            id: ArrayId::next(),
            body,
            pos,
            is_static: false,
            strong_iters: IterRegistry::default(),
        }
    }

    pub(crate) fn new_static(body: Body) -> Self {
        let mut data = Self::new(body);
        data.is_static = true;
        data
    }

    // A replacement for `src`: same position, fresh identity, no cursors yet.
    fn derived(src: &ArrayData, body: Body) -> Self {
        Self {
            id: ArrayId::next(),
            body,
            pos: src.pos,
            is_static: false,
            strong_iters: IterRegistry::default(),
        }
    }

    /// Identity of this instance.
    #[must_use]
    pub fn id(&self) -> ArrayId {
        self.id
    }

    /// Representation backing this instance.
    #[must_use]
    pub fn kind(&self) -> ArrayKind {
        self.body.kind()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        dispatch!(&self.body, r => r.size())
    }

    /// Returns `true` if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for instances owned by the scalar cache.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// The internal position used by `current`, `next` and friends.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.pos
    }

    /// Looks up a key, returning `None` if it is absent.
    #[must_use]
    pub fn try_get(&self, key: &Key) -> Option<Value> {
        match key {
            Key::Int(k) => dispatch!(&self.body, r => r.get_int(*k)),
            Key::Str(k) => dispatch!(&self.body, r => r.get_str(k)),
        }
    }

    /// Looks up a key. A missing key yields [`Value::Null`] and a notice.
    #[must_use]
    pub fn get(&self, key: &Key) -> Value {
        match self.try_get(key) {
            Some(v) => v,
            None => self.missing(key),
        }
    }

    /// Looks up an integer key. A missing key yields [`Value::Null`].
    #[must_use]
    pub fn get_int(&self, k: i64) -> Value {
        match dispatch!(&self.body, r => r.get_int(k)) {
            Some(v) => v,
            None => self.missing(&Key::Int(k)),
        }
    }

    /// Looks up a string key. A missing key yields [`Value::Null`].
    #[must_use]
    pub fn get_str(&self, k: &str) -> Value {
        match dispatch!(&self.body, r => r.get_str(k)) {
            Some(v) => v,
            None => self.missing(&Key::from(k)),
        }
    }

    /// Validates a dynamically typed key, then looks it up.
    pub fn get_dyn(&self, key: &Value) -> Result<Value> {
        Ok(self.get(&Key::validate(key)?))
    }

    fn missing(&self, key: &Key) -> Value {
        if config().missing_key_notices && dispatch!(&self.body, r => r.notices_missing()) {
            tracing::warn!(target: "polyarray::notice", key = %key, "undefined index");
        }
        Value::Null
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn exists(&self, key: &Key) -> bool {
        match key {
            Key::Int(k) => dispatch!(&self.body, r => r.exists_int(*k)),
            Key::Str(k) => dispatch!(&self.body, r => r.exists_str(k)),
        }
    }

    /// Key at a position in iteration order.
    #[must_use]
    pub fn key_at(&self, pos: usize) -> Option<Key> {
        dispatch!(&self.body, r => r.key_at(pos))
    }

    /// Value at a position in iteration order.
    #[must_use]
    pub fn value_at(&self, pos: usize) -> Option<Value> {
        dispatch!(&self.body, r => r.value_at(pos))
    }

    /// Returns `true` if the keys are exactly `0..len()` in order.
    #[must_use]
    pub fn is_vector_data(&self) -> bool {
        dispatch!(&self.body, r => r.is_vector_data())
    }

    pub(crate) fn iter_begin(&self) -> Option<usize> {
        dispatch!(&self.body, r => r.iter_begin())
    }

    pub(crate) fn iter_end(&self) -> Option<usize> {
        dispatch!(&self.body, r => r.iter_end())
    }

    pub(crate) fn iter_advance(&self, pos: usize) -> Option<usize> {
        dispatch!(&self.body, r => r.iter_advance(pos))
    }

    pub(crate) fn iter_rewind(&self, pos: usize) -> Option<usize> {
        dispatch!(&self.body, r => r.iter_rewind(pos))
    }

    pub(crate) fn valid_pos(&self, pos: usize) -> bool {
        dispatch!(&self.body, r => r.valid_full_pos(pos))
    }

    /// Iterates over `(key, value)` pairs in order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            data: self,
            pos: self.iter_begin(),
        }
    }

    /// Number of strong iterators attached to this instance.
    #[must_use]
    pub fn strong_iterator_count(&self) -> usize {
        self.strong_iters.len()
    }

    /// Releases a cursor created by [`Array::new_full_pos`].
    pub fn free_full_pos(&self, it: &StrongIter) -> Result<()> {
        if it.owner() != Some(self.id) {
            return Err(ArrayError::internal(format!(
                "freeing a strong iterator that array {} does not own",
                self.id
            )));
        }
        self.strong_iters.detach(it)
    }

    fn cursor_pos(&self, it: &StrongIter) -> Option<usize> {
        if it.owner() != Some(self.id) {
            return None;
        }
        it.pos().filter(|&pos| self.valid_pos(pos))
    }

    /// Returns `true` if the cursor belongs here and points at an element.
    #[must_use]
    pub fn full_pos_valid(&self, it: &StrongIter) -> bool {
        self.cursor_pos(it).is_some()
    }

    /// Key under the cursor.
    #[must_use]
    pub fn full_pos_key(&self, it: &StrongIter) -> Option<Key> {
        self.cursor_pos(it).and_then(|pos| self.key_at(pos))
    }

    /// Value under the cursor.
    #[must_use]
    pub fn full_pos_value(&self, it: &StrongIter) -> Option<Value> {
        self.cursor_pos(it).and_then(|pos| self.value_at(pos))
    }

    /// Moves the cursor forward, returning `true` if it still points at an
    /// element.
    pub fn advance_full_pos(&self, it: &StrongIter) -> bool {
        match self.cursor_pos(it) {
            Some(pos) => {
                let next = self.iter_advance(pos);
                it.set_pos(next);
                next.is_some()
            }
            None => false,
        }
    }

    fn after_insert(&mut self, before: usize) {
        if self.pos.is_none() && self.len() > before {
            self.pos = Some(before);
        }
    }

    fn after_remove(&mut self, removed: usize) {
        let len = self.len();
        self.pos = match self.pos {
            Some(p) if p > removed => Some(p - 1),
            Some(p) if p == removed => (p < len).then_some(p),
            other => other,
        };
        self.strong_iters.on_remove(removed);
    }

    pub(crate) fn reset_pos(&mut self) {
        self.pos = self.iter_begin();
    }
}

impl Drop for ArrayData {
    fn drop(&mut self) {
        self.strong_iters.detach_all();
        dispatch!(&mut self.body, r => r.release());
    }
}

impl Debug for ArrayData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayData")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("len", &self.len())
            .field("pos", &self.pos)
            .field("static", &self.is_static)
            .finish()
    }
}

/// Iterator over the entries of an array, in order.
#[derive(Debug)]
pub struct Iter<'a> {
    data: &'a ArrayData,
    pos: Option<usize>,
}

impl Iterator for Iter<'_> {
    type Item = (Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.pos?;
        let item = (self.data.key_at(pos)?, self.data.value_at(pos)?);
        self.pos = self.data.iter_advance(pos);
        Some(item)
    }
}

/// A reference-counted handle to an array with value semantics.
///
/// Cloning shares the instance. The first write through a handle whose
/// instance is shared copies it, so other handles never observe the change.
/// The exception is [`ArrayKind::TableAdapter`], whose copies alias the live
/// table.
#[derive(Clone)]
pub struct Array(Arc<ArrayData>);

impl Deref for Array {
    type Target = ArrayData;

    fn deref(&self) -> &ArrayData {
        &self.0
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

fn set_op(key: &Key) -> WriteOp<'_> {
    match key {
        Key::Int(k) => WriteOp::SetInt(*k),
        Key::Str(k) => WriteOp::SetStr(k),
    }
}

fn set_ref_op(key: &Key) -> WriteOp<'_> {
    match key {
        Key::Int(k) => WriteOp::SetRefInt(*k),
        Key::Str(k) => WriteOp::SetRefStr(k),
    }
}

impl Array {
    pub(crate) fn from_data(data: ArrayData) -> Self {
        Self(Arc::new(data))
    }

    fn from_body(body: Body) -> Self {
        Self::from_data(ArrayData::new(body))
    }

    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self::from_body(Body::Dense(DenseArray::default()))
    }

    /// Creates a vector-like array keyed `0..n`.
    pub fn from_values<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        let values: Vec<Value> = values.into_iter().map(|v| v.into().unref()).collect();
        Self::from_body(Body::Dense(DenseArray::from(values)))
    }

    /// Creates an array from key/value pairs. Later duplicates overwrite
    /// earlier ones in place.
    pub fn from_pairs<K: Into<Key>, V: Into<Value>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::from_body(Body::General(GeneralArray::from(collect_map(pairs))))
    }

    /// Creates a read-only array from key/value pairs.
    pub fn immutable_from_pairs<K: Into<Key>, V: Into<Value>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::from_body(Body::Immutable(ImmutableArray::from(collect_map(pairs))))
    }

    /// Creates `[value]`.
    pub fn single(value: impl Into<Value>) -> Self {
        Self::from_body(Body::Dense(DenseArray::from(vec![value.into().unref()])))
    }

    /// Creates `[key => value]`.
    pub fn single_pair(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::from_pairs([(key.into(), value.into())])
    }

    /// Creates `[0 => &reference]`.
    #[must_use]
    pub fn single_ref(r: Reference) -> Self {
        Self::from_pairs([(Key::Int(0), Value::Ref(r))])
    }

    /// Creates an array that views `table` in place.
    #[must_use]
    pub fn table(table: VarTable) -> Self {
        Self::from_body(Body::Table(TableAdapter::new(table)))
    }

    /// Number of handles sharing this instance.
    #[must_use]
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Returns `true` if both handles share one instance.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }

    /// Makes this handle the sole owner of an instance that can perform `op`.
    pub(crate) fn prepare(&mut self, op: &WriteOp<'_>) -> Result<&mut ArrayData> {
        if dispatch!(&self.0.body, r => r.escalation_needed(op)) {
            self.escalate()?;
        } else if self.0.is_static || Arc::strong_count(&self.0) > 1 {
            self.separate()?;
        }
        Arc::get_mut(&mut self.0)
            .ok_or_else(|| ArrayError::internal("array is still shared after copy-on-write"))
    }

    fn replace_body(&mut self, body: Body) {
        let fresh = ArrayData::derived(&self.0, body);
        fresh.strong_iters.transfer_all(fresh.id, &self.0.strong_iters);
        self.0 = Arc::new(fresh);
    }

    fn separate(&mut self) -> Result<()> {
        let kind = self.kind();
        let body = if kind.no_copy_on_write() {
            dispatch!(&self.0.body, r => r.copy())
        } else {
            dispatch!(&self.0.body, r => r.copy_with_strong_iterators())?
        };
        tracing::trace!(id = %self.0.id, kind = %kind, "copy on write");
        self.replace_body(body);
        Ok(())
    }

    /// Converts this handle's array to the next more general representation.
    pub fn escalate(&mut self) -> Result<()> {
        let from = self.kind();
        let body = dispatch!(&self.0.body, r => r.escalate())
            .ok_or_else(|| ArrayError::unimplemented(from, "escalate"))?;
        let old = self.0.id;
        self.replace_body(body);
        tracing::debug!(id = %old, new_id = %self.0.id, from = %from, to = %self.kind(), "escalated array");
        Ok(())
    }

    /// Shallow copy; strong iterators stay with the original.
    #[must_use]
    pub fn copy(&self) -> Array {
        let body = dispatch!(&self.0.body, r => r.copy());
        Self::from_data(ArrayData::derived(&self.0, body))
    }

    /// Shallow copy that takes over every strong iterator of the original.
    pub fn copy_with_strong_iterators(&self) -> Result<Array> {
        let body = dispatch!(&self.0.body, r => r.copy_with_strong_iterators())?;
        let fresh = ArrayData::derived(&self.0, body);
        fresh.strong_iters.transfer_all(fresh.id, &self.0.strong_iters);
        Ok(Self::from_data(fresh))
    }

    /// Creates a strong iterator at the current internal position.
    pub fn new_full_pos(&mut self) -> Result<StrongIter> {
        let data = self.prepare(&WriteOp::Position)?;
        let it = StrongIter::new(data.pos);
        data.strong_iters.attach(data.id, &it)?;
        Ok(it)
    }

    /// Assigns `value` to `key`, writing through a reference stored there.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        let value = value.into().unref();
        if let Some(Value::Ref(r)) = self.try_get(&key) {
            r.set(value);
            return Ok(());
        }
        let before = self.len();
        let data = self.prepare(&set_op(&key))?;
        match &key {
            Key::Int(k) => dispatch!(&mut data.body, r => r.set_int(*k, value))?,
            Key::Str(k) => dispatch!(&mut data.body, r => r.set_str(k.clone(), value))?,
        }
        data.after_insert(before);
        Ok(())
    }

    /// Assigns an integer key.
    pub fn set_int(&mut self, k: i64, value: impl Into<Value>) -> Result<()> {
        self.set(Key::Int(k), value)
    }

    /// Assigns a string key.
    pub fn set_str(&mut self, k: &str, value: impl Into<Value>) -> Result<()> {
        self.set(Key::from(k), value)
    }

    /// Validates a dynamically typed key, then assigns it.
    pub fn set_dyn(&mut self, key: &Value, value: impl Into<Value>) -> Result<()> {
        self.set(Key::validate(key)?, value)
    }

    /// Inserts a key the caller knows to be absent.
    pub fn add(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        let value = value.into().unref();
        let before = self.len();
        let data = self.prepare(&set_op(&key))?;
        match &key {
            Key::Int(k) => dispatch!(&mut data.body, r => r.add_int(*k, value))?,
            Key::Str(k) => dispatch!(&mut data.body, r => r.add_str(k.clone(), value))?,
        }
        data.after_insert(before);
        Ok(())
    }

    /// Binds `key` to the reference cell `r`.
    pub fn set_ref(&mut self, key: impl Into<Key>, r: Reference) -> Result<()> {
        let key = key.into();
        let before = self.len();
        let data = self.prepare(&set_ref_op(&key))?;
        match &key {
            Key::Int(k) => dispatch!(&mut data.body, a => a.set_ref_int(*k, r))?,
            Key::Str(k) => dispatch!(&mut data.body, a => a.set_ref_str(k.clone(), r))?,
        }
        data.after_insert(before);
        Ok(())
    }

    /// Binds `key` to a reference owned outside the array.
    pub fn bind(&mut self, key: impl Into<Key>, r: Reference) -> Result<()> {
        let key = key.into();
        let before = self.len();
        let data = self.prepare(&WriteOp::Bind)?;
        match &key {
            Key::Int(k) => dispatch!(&mut data.body, a => a.bind_int(*k, r))?,
            Key::Str(k) => dispatch!(&mut data.body, a => a.bind_str(k.clone(), r))?,
        }
        data.after_insert(before);
        Ok(())
    }

    /// Appends a reference owned outside the array.
    pub fn bind_append(&mut self, r: Reference) -> Result<()> {
        let before = self.len();
        let data = self.prepare(&WriteOp::Bind)?;
        dispatch!(&mut data.body, a => a.bind_append(r))?;
        data.after_insert(before);
        Ok(())
    }

    /// Appends under the next free integer key.
    pub fn append(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into().unref();
        let before = self.len();
        let data = self.prepare(&WriteOp::Append)?;
        dispatch!(&mut data.body, r => r.append(value))?;
        data.after_insert(before);
        Ok(())
    }

    /// Appends the reference cell itself.
    pub fn append_ref(&mut self, r: Reference) -> Result<()> {
        let before = self.len();
        let data = self.prepare(&WriteOp::AppendRef)?;
        dispatch!(&mut data.body, a => a.append_ref(r))?;
        data.after_insert(before);
        Ok(())
    }

    /// Appends, keeping a [`Value::Ref`] as a reference.
    pub fn append_with_ref(&mut self, value: impl Into<Value>) -> Result<()> {
        match value.into() {
            Value::Ref(r) => self.append_ref(r),
            v => self.append(v),
        }
    }

    /// Removes a key, returning `true` if it was present. Removing a missing
    /// key never copies.
    pub fn remove(&mut self, key: &Key) -> Result<bool> {
        if !self.exists(key) {
            return Ok(false);
        }
        let op = match key {
            Key::Int(k) => WriteOp::RemoveInt(*k),
            Key::Str(k) => WriteOp::RemoveStr(k),
        };
        let data = self.prepare(&op)?;
        let removed = match key {
            Key::Int(k) => dispatch!(&mut data.body, r => r.remove_int(*k)),
            Key::Str(k) => dispatch!(&mut data.body, r => r.remove_str(k)),
        }?;
        if let Some(pos) = removed {
            data.after_remove(pos);
        }
        Ok(removed.is_some())
    }

    /// Removes an integer key.
    pub fn remove_int(&mut self, k: i64) -> Result<bool> {
        self.remove(&Key::Int(k))
    }

    /// Removes a string key.
    pub fn remove_str(&mut self, k: &str) -> Result<bool> {
        self.remove(&Key::from(k))
    }

    /// Validates a dynamically typed key, then removes it.
    pub fn remove_dyn(&mut self, key: &Value) -> Result<bool> {
        self.remove(&Key::validate(key)?)
    }

    /// Inserts at the front and renumbers integer keys from zero.
    pub fn prepend(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into().unref();
        let data = self.prepare(&WriteOp::Prepend)?;
        dispatch!(&mut data.body, r => r.prepend(value))?;
        data.strong_iters.on_prepend();
        data.reset_pos();
        Ok(())
    }

    /// Adds the entries of `other` whose keys are not present yet.
    pub fn plus(&mut self, other: &Array) -> Result<()> {
        let before = self.len();
        let data = self.prepare(&WriteOp::Union(&other.0))?;
        dispatch!(&mut data.body, r => r.plus(&other.0))?;
        data.after_insert(before);
        Ok(())
    }

    /// Appends the integer-keyed entries of `other` and overwrites with its
    /// string-keyed ones.
    pub fn merge(&mut self, other: &Array) -> Result<()> {
        let before = self.len();
        let data = self.prepare(&WriteOp::Union(&other.0))?;
        dispatch!(&mut data.body, r => r.merge(&other.0))?;
        data.after_insert(before);
        Ok(())
    }

    /// Re-keys integer keys densely from zero, keeping string keys.
    pub fn renumber(&mut self) -> Result<()> {
        let data = self.prepare(&WriteOp::Renumber)?;
        dispatch!(&mut data.body, r => r.renumber())
    }

    fn sorted(&mut self, kind: SortKind) -> Result<&mut ArrayData> {
        self.prepare(&WriteOp::Sort(kind))
    }

    /// Sorts by key.
    pub fn ksort(&mut self, flags: SortFlags, ascending: bool) -> Result<()> {
        let data = self.sorted(SortKind::Ksort)?;
        dispatch!(&mut data.body, r => r.ksort(flags, ascending))?;
        data.reset_pos();
        Ok(())
    }

    /// Sorts by value and renumbers.
    pub fn sort(&mut self, flags: SortFlags, ascending: bool) -> Result<()> {
        let data = self.sorted(SortKind::Sort)?;
        dispatch!(&mut data.body, r => r.sort(flags, ascending))?;
        data.reset_pos();
        Ok(())
    }

    /// Sorts by value, keeping keys.
    pub fn asort(&mut self, flags: SortFlags, ascending: bool) -> Result<()> {
        let data = self.sorted(SortKind::Asort)?;
        dispatch!(&mut data.body, r => r.asort(flags, ascending))?;
        data.reset_pos();
        Ok(())
    }

    /// Sorts by key with a user comparator.
    pub fn uksort(&mut self, mut cmp: impl FnMut(&Key, &Key) -> Ordering) -> Result<()> {
        let data = self.sorted(SortKind::Uksort)?;
        dispatch!(&mut data.body, r => r.uksort(&mut cmp))?;
        data.reset_pos();
        Ok(())
    }

    /// Sorts by value with a user comparator and renumbers.
    pub fn usort(&mut self, mut cmp: impl FnMut(&Value, &Value) -> Ordering) -> Result<()> {
        let data = self.sorted(SortKind::Usort)?;
        dispatch!(&mut data.body, r => r.usort(&mut cmp))?;
        data.reset_pos();
        Ok(())
    }

    /// Sorts by value with a user comparator, keeping keys.
    pub fn uasort(&mut self, mut cmp: impl FnMut(&Value, &Value) -> Ordering) -> Result<()> {
        let data = self.sorted(SortKind::Uasort)?;
        dispatch!(&mut data.body, r => r.uasort(&mut cmp))?;
        data.reset_pos();
        Ok(())
    }
}

fn collect_map<K: Into<Key>, V: Into<Value>>(
    pairs: impl IntoIterator<Item = (K, V)>,
) -> IndexMap<Key, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl<T: Into<Value>> FromIterator<T> for Array {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Array {
    fn from(other: Vec<T>) -> Self {
        Self::from_values(other)
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = (Key, Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl Debug for Array {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Strict comparison via [`ArrayData::same`].
impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        Array::ptr_eq(self, other) || self.same(other).unwrap_or(false)
    }
}

impl serde::Serialize for Array {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let _guard = RecursionGuard::enter().map_err(S::Error::custom)?;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(&k, &v)?;
        }
        map.end()
    }
}
