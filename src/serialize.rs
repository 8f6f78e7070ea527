//! Functionality relating to driving serializers over arrays
//!
//! The driver in [`ArrayData::serialize_into`] walks an array and calls the hooks
//! of an [`ArraySerializer`]. Two serializers ship with the crate: the PHP
//! `serialize()` format, which doubles as the canonical form used as the
//! scalar cache key, and a `var_dump` style pretty printer used by the debug
//! dumps.

use std::fmt::{self, Write as _};

use hashbrown::HashMap;

use crate::array::{Array, ArrayData, ArrayId};
use crate::config::config;
use crate::error::{ArrayError, Result};
use crate::key::Key;
use crate::recursion::RecursionGuard;
use crate::value::Value;

/// Hooks called by [`ArrayData::serialize_into`].
pub trait ArraySerializer {
    /// Starts an array of `size` elements. `is_vector` is a hint that the
    /// keys are exactly `0..size`.
    fn write_array_header(&mut self, size: usize, is_vector: bool) -> Result<()>;
    fn write_array_key(&mut self, key: &Key) -> Result<()>;
    fn write_array_value(&mut self, value: &Value) -> Result<()>;
    fn write_array_footer(&mut self) -> Result<()>;
    /// Called instead of writing an array that is already being written.
    fn write_overflow(&mut self, id: ArrayId) -> Result<()>;
    /// Marks `id` as in progress; returns `true` if it already was.
    fn inc_nested_level(&mut self, id: ArrayId) -> bool;
    fn dec_nested_level(&mut self, id: ArrayId);
}

/// Tracks which arrays a serializer is currently inside.
#[derive(Debug, Default)]
pub struct NestingGuard {
    levels: HashMap<ArrayId, usize>,
}

impl NestingGuard {
    /// Enters `id`, returning `true` if it was already entered.
    pub fn enter(&mut self, id: ArrayId) -> bool {
        let level = self.levels.entry(id).or_insert(0);
        *level += 1;
        *level > 1
    }

    /// Leaves `id`.
    pub fn leave(&mut self, id: ArrayId) {
        if let Some(level) = self.levels.get_mut(&id) {
            *level -= 1;
            if *level == 0 {
                self.levels.remove(&id);
            }
        }
    }

    /// Returns `true` while no array is entered.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.levels.is_empty()
    }
}

impl ArrayData {
    /// Writes this array through `s`.
    ///
    /// With `skip_nest_check` the caller guarantees the array cannot contain
    /// itself and cycle detection is skipped; the recursion limit still
    /// applies.
    pub fn serialize_into<S: ArraySerializer + ?Sized>(
        &self,
        s: &mut S,
        skip_nest_check: bool,
    ) -> Result<()> {
        if self.is_empty() {
            s.write_array_header(0, self.is_vector_data())?;
            return s.write_array_footer();
        }
        let _guard = RecursionGuard::enter()?;
        let check = !skip_nest_check;
        let overflow = check && s.inc_nested_level(self.id());
        let result = if overflow {
            s.write_overflow(self.id())
        } else {
            self.write_entries(s)
        };
        if check {
            s.dec_nested_level(self.id());
        }
        result
    }

    fn write_entries<S: ArraySerializer + ?Sized>(&self, s: &mut S) -> Result<()> {
        s.write_array_header(self.len(), self.is_vector_data())?;
        for (k, v) in self.iter() {
            s.write_array_key(&k)?;
            s.write_array_value(&v)?;
        }
        s.write_array_footer()
    }

    /// The canonical serialized form used as the scalar cache key.
    ///
    /// Fails with [`ArrayError::NotScalar`] if the array holds references.
    pub fn canonical_key(&self) -> Result<String> {
        let mut s = PhpSerializer::new(SerializeMode::Canonical);
        self.serialize_into(&mut s, false)?;
        Ok(s.into_string())
    }

    /// Renders the array the way `var_dump` does.
    pub fn var_dump(&self) -> Result<String> {
        let mut s = VarDumpSerializer::new();
        self.serialize_into(&mut s, false)?;
        Ok(s.into_string())
    }

    /// Writes one line per element: `index #### key #### value`, with values
    /// in `serialize()` form. An element that fails to render reports its
    /// error instead of aborting the dump.
    pub fn dump_elements(&self, out: &mut impl fmt::Write) -> fmt::Result {
        for (i, (k, v)) in self.iter().enumerate() {
            let mut s = PhpSerializer::new(SerializeMode::Serialize);
            match s.write_array_value(&v) {
                Ok(()) => writeln!(out, "{} #### {} #### {}", i, k, s.into_string())?,
                Err(e) => writeln!(out, "{} #### {} #### Exception: {}", i, k, e)?,
            }
        }
        Ok(())
    }
}

impl Array {
    /// Debug rendering: `ArrayData(<id>, <refcount>): <var_dump>`.
    #[must_use]
    pub fn dump(&self) -> String {
        let contents = match self.var_dump() {
            Ok(text) => text,
            Err(e) => format!("Exception: {}", e),
        };
        format!("ArrayData({}, {}): {}", self.id(), self.refcount(), contents)
    }
}

/// What [`PhpSerializer`] produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SerializeMode {
    /// Cache key form: references are rejected
    Canonical,
    /// `serialize()` output: references are followed
    Serialize,
}

/// Writes the PHP `serialize()` format.
#[derive(Debug)]
pub struct PhpSerializer {
    mode: SerializeMode,
    out: String,
    nesting: NestingGuard,
}

impl PhpSerializer {
    /// Creates a serializer writing to an empty buffer.
    #[must_use]
    pub fn new(mode: SerializeMode) -> Self {
        Self {
            mode,
            out: String::new(),
            nesting: NestingGuard::default(),
        }
    }

    /// The serialized text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        // Writing to a String cannot fail.
        let _ = self.out.write_fmt(args);
    }

    fn emit_str(&mut self, s: &str) {
        self.emit(format_args!("s:{}:\"{}\";", s.len(), s));
    }
}

fn double_text(d: f64) -> String {
    if d.is_nan() {
        "NAN".to_owned()
    } else if d.is_infinite() {
        if d > 0.0 { "INF" } else { "-INF" }.to_owned()
    } else {
        d.to_string()
    }
}

impl ArraySerializer for PhpSerializer {
    fn write_array_header(&mut self, size: usize, _is_vector: bool) -> Result<()> {
        self.emit(format_args!("a:{}:{{", size));
        Ok(())
    }

    fn write_array_key(&mut self, key: &Key) -> Result<()> {
        match key {
            Key::Int(i) => self.emit(format_args!("i:{};", i)),
            Key::Str(s) => self.emit_str(s),
        }
        Ok(())
    }

    fn write_array_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.out.push_str("N;"),
            Value::Bool(b) => self.emit(format_args!("b:{};", u8::from(*b))),
            Value::Int(i) => self.emit(format_args!("i:{};", i)),
            Value::Double(d) => self.emit(format_args!("d:{};", double_text(*d))),
            Value::Str(s) => self.emit_str(s),
            Value::Array(a) => a.serialize_into(self, false)?,
            Value::Ref(r) => match self.mode {
                SerializeMode::Canonical => return Err(ArrayError::NotScalar),
                SerializeMode::Serialize => r.with(|inner| self.write_array_value(inner))?,
            },
        }
        Ok(())
    }

    fn write_array_footer(&mut self) -> Result<()> {
        self.out.push('}');
        Ok(())
    }

    fn write_overflow(&mut self, _id: ArrayId) -> Result<()> {
        Err(ArrayError::RecursionLimit(config().recursion_limit))
    }

    fn inc_nested_level(&mut self, id: ArrayId) -> bool {
        self.nesting.enter(id)
    }

    fn dec_nested_level(&mut self, id: ArrayId) {
        self.nesting.leave(id);
    }
}

/// Writes `var_dump` style text.
#[derive(Debug, Default)]
pub struct VarDumpSerializer {
    out: String,
    indent: usize,
    nesting: NestingGuard,
}

impl VarDumpSerializer {
    /// Creates a printer writing to an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The rendered text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        // Writing to a String cannot fail.
        let _ = self.out.write_fmt(args);
        self.out.push('\n');
    }

    fn pad(&mut self) {
        self.out.extend(std::iter::repeat(' ').take(self.indent));
    }
}

impl ArraySerializer for VarDumpSerializer {
    fn write_array_header(&mut self, size: usize, _is_vector: bool) -> Result<()> {
        self.line(format_args!("array({}) {{", size));
        self.indent += 2;
        Ok(())
    }

    fn write_array_key(&mut self, key: &Key) -> Result<()> {
        self.pad();
        match key {
            Key::Int(i) => self.line(format_args!("[{}]=>", i)),
            Key::Str(s) => self.line(format_args!("[\"{}\"]=>", s)),
        }
        Ok(())
    }

    fn write_array_value(&mut self, value: &Value) -> Result<()> {
        self.pad();
        self.write_unpadded(value)
    }

    fn write_array_footer(&mut self) -> Result<()> {
        self.indent = self.indent.saturating_sub(2);
        self.pad();
        self.line(format_args!("}}"));
        Ok(())
    }

    fn write_overflow(&mut self, _id: ArrayId) -> Result<()> {
        self.line(format_args!("*RECURSION*"));
        Ok(())
    }

    fn inc_nested_level(&mut self, id: ArrayId) -> bool {
        self.nesting.enter(id)
    }

    fn dec_nested_level(&mut self, id: ArrayId) {
        self.nesting.leave(id);
    }
}

impl VarDumpSerializer {
    fn write_unpadded(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.line(format_args!("NULL")),
            Value::Bool(b) => self.line(format_args!("bool({})", b)),
            Value::Int(i) => self.line(format_args!("int({})", i)),
            Value::Double(d) => self.line(format_args!("float({})", double_text(*d))),
            Value::Str(s) => self.line(format_args!("string({}) \"{}\"", s.len(), s)),
            Value::Array(a) => a.serialize_into(self, false)?,
            Value::Ref(r) => r.with(|inner| self.write_unpadded(inner))?,
        }
        Ok(())
    }
}
