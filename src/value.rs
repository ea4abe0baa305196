//! Dynamic value model for the tagstream codec.

use std::fmt;

/// A value in the tagstream model.
///
/// Strings are byte strings and carry no UTF-8 requirement. Numbers are split
/// into `Int` and `Float`; a `Float` whose value fits a 32-bit integer exactly
/// is encoded as an integer and round-trips as `Int`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(Vec<u8>),
    /// Opaque host-pointer-sized handle. The wire carries the raw bits; their
    /// meaning outside the producing address space is up to the caller.
    Pointer(usize),
    Table(Table),
}

impl Value {
    /// Returns true if this is the `Nil` value.
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the value as a bool, if it is a `Bool` variant.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an i32, if it is an `Int` variant.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the raw bytes of a `Str` variant.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Str(b) => Some(b),
            _ => None,
        }
    }

    /// Returns a `Str` variant as `&str`, if it holds valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Returns a reference to the table, if it is a `Table` variant.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }
}

/// Converts a float to an i32 when the conversion is exact.
pub(crate) fn as_exact_i32(f: f64) -> Option<i32> {
    let i = f as i32;
    if i as f64 == f { Some(i) } else { None }
}

/// An aggregate with an ordered array part and a keyed map part.
///
/// The array part holds the values at contiguous 1-based integer keys; every
/// other key lives in the map part. Map pair order is unspecified and does not
/// affect equality.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub array: Vec<Value>,
    pub map: Vec<(Value, Value)>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table whose array part is `items` and whose map part is empty.
    pub fn from_array(items: Vec<Value>) -> Self {
        Self {
            array: items,
            map: Vec::new(),
        }
    }

    /// Inserts a key/value pair, keeping the array/map split consistent.
    ///
    /// An exactly-integral `Float` key is normalized to `Int` first. An `Int`
    /// key extending the array part by one is appended to it; one already
    /// covered by the array part overwrites in place. Any other key replaces
    /// an existing equal map key or appends a new pair.
    pub fn insert(&mut self, key: Value, value: Value) {
        let key = match key {
            Value::Float(f) => match as_exact_i32(f) {
                Some(i) => Value::Int(i),
                None => Value::Float(f),
            },
            k => k,
        };
        if let Value::Int(i) = key {
            if i >= 1 {
                let idx = i as usize;
                if idx <= self.array.len() {
                    self.array[idx - 1] = value;
                    return;
                }
                if idx == self.array.len() + 1 {
                    self.array.push(value);
                    self.absorb_contiguous();
                    return;
                }
            }
        }
        if let Some(entry) = self.map.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.map.push((key, value));
        }
    }

    /// Moves map entries into the array part while their `Int` keys continue
    /// the contiguous sequence. Filling a gap re-links the keys parked in the
    /// map by earlier out-of-order inserts.
    fn absorb_contiguous(&mut self) {
        loop {
            let next = self.array.len() + 1;
            let pos = self
                .map
                .iter()
                .position(|(k, _)| matches!(k, Value::Int(i) if *i >= 1 && *i as usize == next));
            match pos {
                Some(p) => {
                    let (_, v) = self.map.remove(p);
                    self.array.push(v);
                }
                None => break,
            }
        }
    }

    /// Looks up a key in the array part (positive in-range `Int`) or the map part.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        if let Value::Int(i) = key {
            if *i >= 1 && (*i as usize) <= self.array.len() {
                return Some(&self.array[*i as usize - 1]);
            }
        }
        self.map.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Total number of entries across both parts.
    pub fn len(&self) -> usize {
        self.array.len() + self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty() && self.map.is_empty()
    }
}

impl PartialEq for Table {
    /// Array parts compare in order; map parts compare as unordered pair sets.
    fn eq(&self, other: &Self) -> bool {
        self.array == other.array
            && self.map.len() == other.map.len()
            && self
                .map
                .iter()
                .all(|(k, v)| other.map.iter().any(|(ok, ov)| ok == k && ov == v))
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Str(b)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Self::Table(t)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "\"{s}\""),
                Err(_) => write!(f, "<{} bytes>", b.len()),
            },
            Self::Pointer(p) => write!(f, "ptr(0x{p:x})"),
            Self::Table(t) => {
                write!(f, "{{")?;
                let mut first = true;
                for item in &t.array {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{item}")?;
                }
                for (k, v) in &t.map {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
