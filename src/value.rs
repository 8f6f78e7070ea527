//! Functionality relating to the dynamic value type stored in arrays

use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::array::Array;
use crate::error::Result;

/// A dynamically typed value, as stored in an [`Array`].
///
/// Cloning is cheap: strings and arrays are reference counted, and cloning a
/// [`Value::Ref`] aliases the same reference cell.
#[derive(Clone)]
pub enum Value {
    /// The null value, also returned for missing keys
    Null,
    /// A boolean
    Bool(bool),
    /// A 64-bit signed integer
    Int(i64),
    /// A double precision float
    Double(f64),
    /// An immutable string
    Str(Arc<str>),
    /// A nested array
    Array(Array),
    /// A reference cell shared with other slots or variables
    Ref(Reference),
}

/// A shared, mutable value cell.
///
/// Storing the same `Reference` in several slots makes them aliases of each
/// other, and storing an array that contains the reference *inside* it is the
/// only way to build a circular structure.
#[derive(Clone)]
pub struct Reference(Arc<RwLock<Value>>);

impl Reference {
    /// Creates a new reference cell. A reference passed in is unwrapped so that
    /// cells never point directly at other cells.
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Arc::new(RwLock::new(value.into().unref())))
    }

    /// Returns a copy of the referenced value.
    #[must_use]
    pub fn get(&self) -> Value {
        self.with(Value::clone)
    }

    /// Replaces the referenced value.
    pub fn set(&self, value: impl Into<Value>) {
        let value = value.into().unref();
        *self.0.write() = value;
    }

    /// Borrows the referenced value for the duration of `f`.
    ///
    /// Uses a recursive read lock so that walking a circular structure can
    /// re-enter the same cell.
    pub fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.0.read_recursive())
    }

    /// Returns `true` if both handles point at the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const u8 as usize
    }
}

impl Debug for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // The pointee may contain this very cell.
        write!(f, "Reference({:#x})", self.addr())
    }
}

/// Parses a numeric string the way loose comparisons see it.
pub(crate) fn parse_numeric(s: &str) -> Option<f64> {
    let t = s.trim_start();
    let looks_numeric = !t.is_empty()
        && t
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if looks_numeric {
        t.parse::<f64>().ok()
    } else {
        None
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortRank {
    Null,
    Bool,
    Number,
    Text,
    Array,
}

impl Value {
    /// Name of the value's type, as used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Ref(r) => r.with(Value::type_name),
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for [`Value::Ref`].
    #[must_use]
    pub fn is_ref(&self) -> bool {
        matches!(self, Value::Ref(_))
    }

    /// Returns the referenced value for [`Value::Ref`], or `self` otherwise.
    #[must_use]
    pub fn unref(self) -> Value {
        match self {
            Value::Ref(r) => r.get(),
            other => other,
        }
    }

    /// Borrows the nested array, if this is one.
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Borrows the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness of the value.
    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(d) => *d != 0.0,
            Value::Str(s) => !s.is_empty() && &**s != "0",
            Value::Array(a) => !a.is_empty(),
            Value::Ref(r) => r.with(Value::to_bool),
        }
    }

    /// Numeric value used by numeric sorts.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Int(i) => *i as f64,
            Value::Double(d) => *d,
            Value::Str(s) => parse_numeric(s).unwrap_or(0.0),
            Value::Array(a) => f64::from(u8::from(!a.is_empty())),
            Value::Ref(r) => r.with(Value::to_f64),
        }
    }

    /// String conversion used by string sorts and diagnostics.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Value::Null | Value::Bool(false) => String::new(),
            Value::Bool(true) => "1".to_owned(),
            Value::Int(i) => i.to_string(),
            Value::Double(d) => d.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Array(_) => "Array".to_owned(),
            Value::Ref(r) => r.with(Value::to_text),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Double(_) => 2,
            Value::Str(_) => 3,
            Value::Array(_) => 4,
            Value::Ref(r) => r.with(Value::type_rank),
        }
    }

    /// Loose equality: `loose_cmp` finds the values equal, except that NaN
    /// equals nothing. Arrays compare with [`Array::equal`].
    pub fn loose_eq(&self, other: &Value) -> Result<bool> {
        use Value::*;
        match (self, other) {
            (Ref(a), _) => a.with(|a| a.loose_eq(other)),
            (_, Ref(b)) => b.with(|b| self.loose_eq(b)),
            (Array(a), Array(b)) => a.equal(b),
            (Double(d), _) | (_, Double(d)) if d.is_nan() => Ok(false),
            _ => Ok(self.loose_cmp(other)? == Ordering::Equal),
        }
    }

    /// Strict identity: same type and same value. A reference is only the
    /// same as another reference, and two references are the same if they
    /// alias or their pointees are the same.
    pub fn same(&self, other: &Value) -> Result<bool> {
        use Value::*;
        Ok(match (self, other) {
            (Ref(a), Ref(b)) => {
                if a.ptr_eq(b) {
                    true
                } else {
                    return a.with(|a| b.with(|b| a.same(b)));
                }
            }
            (Ref(_), _) | (_, Ref(_)) => false,
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Array(a), Array(b)) => return a.same(b),
            _ => false,
        })
    }

    /// Loose ordering, used by [`Array::compare`]: numbers and numeric strings
    /// compare by value, `null` and booleans by truthiness.
    pub fn loose_cmp(&self, other: &Value) -> Result<Ordering> {
        use Value::*;
        Ok(match (self, other) {
            (Ref(a), _) => return a.with(|a| a.loose_cmp(other)),
            (_, Ref(b)) => return b.with(|b| self.loose_cmp(b)),
            (Array(a), Array(b)) => return a.compare(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Int(_), Double(_)) | (Double(_), Int(_)) | (Double(_), Double(_)) => self
                .to_f64()
                .partial_cmp(&other.to_f64())
                .unwrap_or(Ordering::Equal),
            (Str(a), Str(b)) => match (parse_numeric(a), parse_numeric(b)) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => a.as_bytes().cmp(b.as_bytes()),
            },
            (Null | Bool(_), _) | (_, Null | Bool(_)) => self.to_bool().cmp(&other.to_bool()),
            _ => self.type_rank().cmp(&other.type_rank()),
        })
    }

    /// Total order used by the regular value sorts: null, booleans, numbers
    /// and numeric strings by value, other strings by bytes, then arrays by
    /// size and entries. Ties between equal numbers of different types are
    /// broken by type.
    pub fn sort_cmp(&self, other: &Value) -> Result<Ordering> {
        use Value::*;
        if let Ref(a) = self {
            return a.with(|a| a.sort_cmp(other));
        }
        if let Ref(b) = other {
            return b.with(|b| self.sort_cmp(b));
        }
        let (ra, rb) = (self.sort_rank(), other.sort_rank());
        if ra != rb {
            return Ok(ra.cmp(&rb));
        }
        Ok(match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Array(a), Array(b)) => return a.sort_cmp_entries(b),
            (Str(a), Str(b)) if ra == SortRank::Text => a.as_bytes().cmp(b.as_bytes()),
            _ => self
                .sort_number()
                .total_cmp(&other.sort_number())
                .then_with(|| self.number_tag().cmp(&other.number_tag()))
                .then_with(|| match (self, other) {
                    (Int(a), Int(b)) => a.cmp(b),
                    (Str(a), Str(b)) => a.as_bytes().cmp(b.as_bytes()),
                    _ => Ordering::Equal,
                }),
        })
    }

    fn sort_rank(&self) -> SortRank {
        match self {
            Value::Null => SortRank::Null,
            Value::Bool(_) => SortRank::Bool,
            Value::Int(_) | Value::Double(_) => SortRank::Number,
            Value::Str(s) if parse_numeric(s).is_some() => SortRank::Number,
            Value::Str(_) => SortRank::Text,
            Value::Array(_) => SortRank::Array,
            Value::Ref(r) => r.with(Value::sort_rank),
        }
    }

    fn sort_number(&self) -> f64 {
        match self {
            Value::Int(i) => *i as f64,
            Value::Double(d) => *d,
            Value::Str(s) => parse_numeric(s).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    fn number_tag(&self) -> u8 {
        match self {
            Value::Int(_) => 0,
            Value::Double(_) => 1,
            _ => 2,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => Debug::fmt(b, f),
            Value::Int(i) => Debug::fmt(i, f),
            Value::Double(d) => Debug::fmt(d, f),
            Value::Str(s) => Debug::fmt(&**s, f),
            Value::Array(a) => Debug::fmt(a, f),
            Value::Ref(r) => Debug::fmt(r, f),
        }
    }
}

/// Strict comparison via [`Value::same`]; hitting the recursion limit
/// compares unequal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other).unwrap_or(false)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

macro_rules! from_int_impl {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(other: $ty) -> Self {
                Value::Int(other.into())
            }
        })*
    };
}

from_int_impl!(i8, u8, i16, u16, i32, u32, i64);

impl From<bool> for Value {
    fn from(other: bool) -> Self {
        Value::Bool(other)
    }
}

impl From<f64> for Value {
    fn from(other: f64) -> Self {
        Value::Double(other)
    }
}

impl From<&str> for Value {
    fn from(other: &str) -> Self {
        Value::Str(other.into())
    }
}

impl From<String> for Value {
    fn from(other: String) -> Self {
        Value::Str(other.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(other: Arc<str>) -> Self {
        Value::Str(other)
    }
}

impl From<Array> for Value {
    fn from(other: Array) -> Self {
        Value::Array(other)
    }
}

impl From<Reference> for Value {
    fn from(other: Reference) -> Self {
        Value::Ref(other)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(other: Option<T>) -> Self {
        other.map_or(Value::Null, Into::into)
    }
}

impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(a) => serde::Serialize::serialize(a, serializer),
            Value::Ref(r) => r.with(|v| serde::Serialize::serialize(v, serializer)),
        }
    }
}
