//! Functionality relating to array keys

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::Equivalent;

use crate::error::{ArrayError, Result};
use crate::kind::SortFlags;
use crate::value::{parse_numeric, Value};

/// A validated array key: either an integer or a string.
///
/// Strings that look like integers are *not* converted here; that coercion
/// belongs to the caller. Two keys are equal only if they have the same tag
/// and the same value, so `Key::Int(1)` and `Key::from("1")` are distinct.
#[derive(Clone, PartialEq, Eq)]
pub enum Key {
    /// Integer key
    Int(i64),
    /// String key
    Str(Arc<str>),
}

/// Borrowed form of [`Key`], used for map lookups without allocating.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum KeyRef<'a> {
    Int(i64),
    Str(&'a str),
}

impl Equivalent<Key> for KeyRef<'_> {
    fn equivalent(&self, key: &Key) -> bool {
        *self == key.as_key_ref()
    }
}

impl Key {
    /// Validates a dynamically typed key.
    ///
    /// Integers and strings (including the pointee of a reference) are
    /// accepted; anything else fails with [`ArrayError::InvalidKey`].
    pub fn validate(value: &Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(Key::Int(*i)),
            Value::Str(s) => Ok(Key::Str(s.clone())),
            Value::Ref(r) => r.with(Key::validate),
            other => Err(ArrayError::InvalidKey(other.type_name())),
        }
    }

    /// Returns `true` if [`Key::validate`] would accept this value.
    #[must_use]
    pub fn is_valid(value: &Value) -> bool {
        Self::validate(value).is_ok()
    }

    pub(crate) fn as_key_ref(&self) -> KeyRef<'_> {
        match self {
            Key::Int(i) => KeyRef::Int(*i),
            Key::Str(s) => KeyRef::Str(s),
        }
    }

    /// Returns the integer if this is an integer key.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            Key::Str(_) => None,
        }
    }

    /// Returns the string if this is a string key.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Int(_) => None,
            Key::Str(s) => Some(s),
        }
    }

    /// Returns `true` for integer keys.
    #[must_use]
    pub fn is_int(&self) -> bool {
        matches!(self, Key::Int(_))
    }

    fn to_text(&self) -> Cow<'_, str> {
        match self {
            Key::Int(i) => Cow::Owned(i.to_string()),
            Key::Str(s) => Cow::Borrowed(s),
        }
    }

    fn to_f64(&self) -> f64 {
        match self {
            Key::Int(i) => *i as f64,
            Key::Str(s) => parse_numeric(s).unwrap_or(0.0),
        }
    }

    fn sort_number(&self) -> Option<f64> {
        match self {
            Key::Int(i) => Some(*i as f64),
            Key::Str(s) => parse_numeric(s),
        }
    }

    /// Orders two keys the way the key sorts do.
    ///
    /// Every flag gives a total order. Under [`SortFlags::Regular`] integers
    /// and numeric strings come first, by value, and other strings follow by
    /// bytes; a number that is both an integer and a string sorts the
    /// integer first.
    #[must_use]
    pub fn sort_cmp(&self, other: &Key, flags: SortFlags) -> Ordering {
        match flags {
            SortFlags::Regular => match (self.sort_number(), other.sort_number()) {
                (Some(a), Some(b)) => a
                    .total_cmp(&b)
                    .then_with(|| other.is_int().cmp(&self.is_int()))
                    .then_with(|| self.cmp_same_tag(other)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => self.cmp_same_tag(other),
            },
            SortFlags::Numeric => self.to_f64().total_cmp(&other.to_f64()),
            SortFlags::String => self.to_text().cmp(&other.to_text()),
        }
    }

    fn cmp_same_tag(&self, other: &Key) -> Ordering {
        match (self, other) {
            (Key::Int(a), Key::Int(b)) => a.cmp(b),
            (Key::Str(a), Key::Str(b)) => a.as_bytes().cmp(b.as_bytes()),
            _ => Ordering::Equal,
        }
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `KeyRef` so borrowed lookups find owned keys.
        self.as_key_ref().hash(state);
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => Debug::fmt(i, f),
            Key::Str(s) => Debug::fmt(&**s, f),
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => Display::fmt(i, f),
            Key::Str(s) => f.write_str(s),
        }
    }
}

macro_rules! from_int_impl {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Key {
            fn from(other: $ty) -> Self {
                Key::Int(other.into())
            }
        })*
    };
}

from_int_impl!(i8, u8, i16, u16, i32, u32, i64);

impl From<&str> for Key {
    fn from(other: &str) -> Self {
        Key::Str(other.into())
    }
}

impl From<String> for Key {
    fn from(other: String) -> Self {
        Key::Str(other.into())
    }
}

impl From<Arc<str>> for Key {
    fn from(other: Arc<str>) -> Self {
        Key::Str(other)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(i) => Value::Int(i),
            Key::Str(s) => Value::Str(s),
        }
    }
}

impl serde::Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Key::Int(i) => serializer.serialize_i64(*i),
            Key::Str(s) => serializer.serialize_str(s),
        }
    }
}
