//! Arrays that view a live variable table

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::{Body, Representation};
use crate::error::{ArrayError, Result};
use crate::key::Key;
use crate::kind::ArrayKind;
use crate::value::{Reference, Value};

/// A shared table of named variables, such as a global scope.
///
/// Cloning a `VarTable` aliases it. The table is owned by whoever created
/// it; arrays built over it with [`Array::table`](crate::Array::table) read
/// and write it in place.
#[derive(Clone, Default)]
pub struct VarTable(Arc<RwLock<IndexMap<Arc<str>, Value>>>);

impl VarTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the named variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.read().get(name).cloned()
    }

    /// Assigns the named variable, writing through a reference if it holds one.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        let value = value.into().unref();
        let mut table = self.0.write();
        if let Some(Value::Ref(r)) = table.get(name) {
            r.set(value);
            return;
        }
        table.insert(name.into(), value);
    }

    /// Number of variables in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Returns `true` if the table holds no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if both handles alias the same table.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for VarTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarTable")
            .field("len", &self.len())
            .finish()
    }
}

/// Presents a [`VarTable`] as an array with string keys.
///
/// Integer keys are converted to their decimal spelling. Copies alias the same
/// table, so the kind opts out of copy-on-write.
#[derive(Clone, Debug)]
pub struct TableAdapter {
    table: VarTable,
}

impl TableAdapter {
    /// Wraps a live table.
    #[must_use]
    pub fn new(table: VarTable) -> Self {
        Self { table }
    }

    /// The table this adapter views.
    #[must_use]
    pub fn table(&self) -> &VarTable {
        &self.table
    }
}

impl Representation for TableAdapter {
    const KIND: ArrayKind = ArrayKind::TableAdapter;

    fn size(&self) -> usize {
        self.table.len()
    }

    fn find_int(&self, k: i64) -> Option<usize> {
        self.find_str(&k.to_string())
    }

    fn find_str(&self, k: &str) -> Option<usize> {
        self.table.0.read().get_index_of(k)
    }

    fn key_at(&self, pos: usize) -> Option<Key> {
        self.table
            .0
            .read()
            .get_index(pos)
            .map(|(k, _)| Key::Str(k.clone()))
    }

    fn value_at(&self, pos: usize) -> Option<Value> {
        self.table.0.read().get_index(pos).map(|(_, v)| v.clone())
    }

    fn notices_missing(&self) -> bool {
        false
    }

    fn is_vector_data(&self) -> bool {
        false
    }

    fn set_int(&mut self, k: i64, v: Value) -> Result<()> {
        self.set_str(k.to_string().into(), v)
    }

    fn set_str(&mut self, k: Arc<str>, v: Value) -> Result<()> {
        self.table.0.write().insert(k, v);
        Ok(())
    }

    fn set_ref_int(&mut self, k: i64, r: Reference) -> Result<()> {
        self.set_int(k, Value::Ref(r))
    }

    fn set_ref_str(&mut self, k: Arc<str>, r: Reference) -> Result<()> {
        self.set_str(k, Value::Ref(r))
    }

    fn remove_int(&mut self, k: i64) -> Result<Option<usize>> {
        self.remove_str(&k.to_string())
    }

    fn remove_str(&mut self, k: &str) -> Result<Option<usize>> {
        Ok(self
            .table
            .0
            .write()
            .shift_remove_full(k)
            .map(|(pos, _, _)| pos))
    }

    fn append(&mut self, _v: Value) -> Result<()> {
        Err(ArrayError::unimplemented(Self::KIND, "append"))
    }

    fn copy(&self) -> Body {
        Body::Table(self.clone())
    }

    fn bind_int(&mut self, k: i64, r: Reference) -> Result<()> {
        self.set_ref_int(k, r)
    }

    fn bind_str(&mut self, k: Arc<str>, r: Reference) -> Result<()> {
        self.set_ref_str(k, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[mockalloc::test]
    fn int_keys_become_names() {
        let table = VarTable::new();
        let mut adapter = TableAdapter::new(table.clone());
        adapter.set_int(7, Value::from("seven")).unwrap();
        assert_eq!(table.get("7"), Some(Value::from("seven")));
        assert_eq!(adapter.key_at(0), Some(Key::from("7")));
        assert_eq!(adapter.remove_int(7).unwrap(), Some(0));
        assert!(table.is_empty());
    }

    #[mockalloc::test]
    fn copies_alias_the_table() {
        let table = VarTable::new();
        let adapter = TableAdapter::new(table.clone());
        let mut copy = match adapter.copy() {
            Body::Table(copy) => copy,
            other => panic!("unexpected copy {:?}", other),
        };
        copy.set_str("x".into(), Value::Int(1)).unwrap();
        assert_eq!(adapter.get_str("x"), Some(Value::Int(1)));
        assert!(copy.table().ptr_eq(&table));
    }

    #[mockalloc::test]
    fn structural_rows_are_unimplemented() {
        let mut adapter = TableAdapter::new(VarTable::new());
        assert_eq!(
            adapter.append(Value::Null),
            Err(ArrayError::unimplemented(ArrayKind::TableAdapter, "append"))
        );
        assert!(adapter.prepend(Value::Null).is_err());
        assert!(adapter.copy_with_strong_iterators().is_err());
        assert!(!adapter.notices_missing());
    }

    #[mockalloc::test]
    fn table_set_writes_through_references() {
        let table = VarTable::new();
        let r = Reference::new(1);
        let mut adapter = TableAdapter::new(table.clone());
        adapter.bind_str("g".into(), r.clone()).unwrap();
        table.set("g", 2);
        assert_eq!(r.get(), Value::Int(2));
    }
}
