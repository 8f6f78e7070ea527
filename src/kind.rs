//! Functionality relating to representation kinds and the operations routed
//! through them

use std::fmt::{self, Display, Formatter};

use crate::array::ArrayData;

/// Physical representation backing an [`Array`](crate::Array).
///
/// The set is closed. Every array operation is routed by this tag to the
/// matching [`Representation`](crate::repr::Representation) implementation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ArrayKind {
    /// Vector of values keyed `0..n`
    Dense = 0,
    /// Ordered map over arbitrary int and string keys
    General = 1,
    /// Shared read-only ordered map, produced by scalar interning
    Immutable = 2,
    /// View over a live external variable table
    TableAdapter = 3,
}

/// Static per-kind properties.
#[derive(Debug)]
pub struct KindInfo {
    /// Name used in diagnostics
    pub name: &'static str,
    /// `true` if copies alias the same storage instead of copying it
    pub no_copy_on_write: bool,
}

static KIND_INFO: [KindInfo; 4] = [
    KindInfo {
        name: "DenseKind",
        no_copy_on_write: false,
    },
    KindInfo {
        name: "GeneralKind",
        no_copy_on_write: false,
    },
    KindInfo {
        name: "ImmutableKind",
        no_copy_on_write: false,
    },
    KindInfo {
        name: "TableAdapterKind",
        no_copy_on_write: true,
    },
];

impl ArrayKind {
    /// Every kind, in tag order.
    pub const ALL: [ArrayKind; 4] = [
        ArrayKind::Dense,
        ArrayKind::General,
        ArrayKind::Immutable,
        ArrayKind::TableAdapter,
    ];

    /// Static properties of this kind.
    #[must_use]
    pub fn info(self) -> &'static KindInfo {
        &KIND_INFO[self as usize]
    }

    /// Diagnostic name of this kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Whether this kind opts out of copy-on-write.
    #[must_use]
    pub fn no_copy_on_write(self) -> bool {
        self.info().no_copy_on_write
    }
}

impl Display for ArrayKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How keys or values are compared by the built-in sorts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SortFlags {
    /// Loose comparison; numeric strings compare as numbers
    #[default]
    Regular,
    /// Compare everything as numbers
    Numeric,
    /// Compare everything as strings
    String,
}

/// The six sort rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortKind {
    /// Sort by key
    Ksort,
    /// Sort by value, renumbering keys
    Sort,
    /// Sort by value, preserving keys
    Asort,
    /// Sort by key with a user comparator
    Uksort,
    /// Sort by value with a user comparator, renumbering keys
    Usort,
    /// Sort by value with a user comparator, preserving keys
    Uasort,
}

impl SortKind {
    /// Whether the sort keeps each value attached to its key.
    #[must_use]
    pub fn preserves_keys(self) -> bool {
        !matches!(self, SortKind::Sort | SortKind::Usort)
    }
}

/// A pending write, described before it is performed.
///
/// The copy-on-write controller asks the current representation whether it
/// can service the write before touching anything, so that escalation never
/// needs to hand a half-applied operation back to the caller.
#[derive(Copy, Clone, Debug)]
pub enum WriteOp<'a> {
    SetInt(i64),
    SetStr(&'a str),
    SetRefInt(i64),
    SetRefStr(&'a str),
    Append,
    AppendRef,
    RemoveInt(i64),
    RemoveStr(&'a str),
    Prepend,
    Union(&'a ArrayData),
    Sort(SortKind),
    Renumber,
    Bind,
    /// Moves only the internal position; never escalates
    Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[mockalloc::test]
    fn table_is_indexed_by_tag() {
        for kind in ArrayKind::ALL {
            assert_eq!(ArrayKind::ALL[kind as usize], kind);
        }
        assert_eq!(ArrayKind::Dense.name(), "DenseKind");
        assert_eq!(ArrayKind::TableAdapter.to_string(), "TableAdapterKind");
    }

    #[mockalloc::test]
    fn only_table_adapter_skips_cow() {
        let skipping: Vec<_> = ArrayKind::ALL
            .into_iter()
            .filter(|k| k.no_copy_on_write())
            .collect();
        assert_eq!(skipping, [ArrayKind::TableAdapter]);
    }

    #[test]
    fn renumbering_sorts() {
        assert!(!SortKind::Sort.preserves_keys());
        assert!(!SortKind::Usort.preserves_keys());
        assert!(SortKind::Asort.preserves_keys());
        assert!(SortKind::Ksort.preserves_keys());
    }
}
