//! Value model for resolved configuration entries.

use std::cmp::Ordering;
use std::fmt;

use rustc_hash::FxHashMap;

/// A resolved configuration value.
///
/// One variant per shape the registry knows how to extract. Slots in the
/// resolved-value snapshot always hold the variant matching their key's
/// declared type; that invariant is established at key construction and
/// never re-checked on read.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Boolean value.
	Bool(bool),
	/// Integer value.
	Int(i64),
	/// Floating-point value.
	Float(f64),
	/// String value.
	String(String),
	/// List of strings, in source order.
	StringList(Vec<String>),
	/// List of integers, in source order.
	IntList(Vec<i64>),
	/// List of floats, in source order.
	FloatList(Vec<f64>),
	/// String-to-string map. Keys are unique; iteration order is unspecified.
	StringMap(FxHashMap<String, String>),
}

/// The shape of a [`Value`], without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	/// Boolean.
	Bool,
	/// Integer.
	Int,
	/// Float.
	Float,
	/// String.
	String,
	/// List of strings.
	StringList,
	/// List of integers.
	IntList,
	/// List of floats.
	FloatList,
	/// String-to-string map.
	StringMap,
}

impl Value {
	/// Returns the kind of this value.
	pub fn kind(&self) -> ValueKind {
		match self {
			Value::Bool(_) => ValueKind::Bool,
			Value::Int(_) => ValueKind::Int,
			Value::Float(_) => ValueKind::Float,
			Value::String(_) => ValueKind::String,
			Value::StringList(_) => ValueKind::StringList,
			Value::IntList(_) => ValueKind::IntList,
			Value::FloatList(_) => ValueKind::FloatList,
			Value::StringMap(_) => ValueKind::StringMap,
		}
	}

	/// Returns true if this value matches the given kind.
	pub fn matches_kind(&self, kind: ValueKind) -> bool {
		self.kind() == kind
	}

	/// Returns the type name of this value, for diagnostics.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::String(_) => "string",
			Value::StringList(_) => "string list",
			Value::IntList(_) => "int list",
			Value::FloatList(_) => "float list",
			Value::StringMap(_) => "string map",
		}
	}

	/// Returns the boolean value if this is a `Bool` variant.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the integer value if this is an `Int` variant.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the float value if this is a `Float` variant.
	pub fn as_float(&self) -> Option<f64> {
		match self {
			Value::Float(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the string value if this is a `String` variant.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the string list if this is a `StringList` variant.
	pub fn as_string_list(&self) -> Option<&[String]> {
		match self {
			Value::StringList(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the int list if this is an `IntList` variant.
	pub fn as_int_list(&self) -> Option<&[i64]> {
		match self {
			Value::IntList(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the float list if this is a `FloatList` variant.
	pub fn as_float_list(&self) -> Option<&[f64]> {
		match self {
			Value::FloatList(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the string map if this is a `StringMap` variant.
	pub fn as_string_map(&self) -> Option<&FxHashMap<String, String>> {
		match self {
			Value::StringMap(v) => Some(v),
			_ => None,
		}
	}

	/// Compares two values of the same comparable kind.
	///
	/// Returns `None` when the kinds differ or the kind has no ordering
	/// (lists and maps). Float comparisons follow [`f64::partial_cmp`].
	pub fn partial_cmp_same_kind(&self, other: &Value) -> Option<Ordering> {
		match (self, other) {
			(Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
			(Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
			(Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
			(Value::String(a), Value::String(b)) => Some(a.cmp(b)),
			_ => None,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Bool(v) => write!(f, "{v}"),
			Value::Int(v) => write!(f, "{v}"),
			Value::Float(v) => write!(f, "{v}"),
			Value::String(v) => f.write_str(v),
			Value::StringList(v) => write_list(f, v.iter()),
			Value::IntList(v) => write_list(f, v.iter()),
			Value::FloatList(v) => write_list(f, v.iter()),
			Value::StringMap(v) => {
				f.write_str("{")?;
				for (i, (k, val)) in v.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{k}={val}")?;
				}
				f.write_str("}")
			}
		}
	}
}

fn write_list<T: fmt::Display>(
	f: &mut fmt::Formatter<'_>,
	items: impl Iterator<Item = T>,
) -> fmt::Result {
	f.write_str("[")?;
	for (i, item) in items.enumerate() {
		if i > 0 {
			f.write_str(", ")?;
		}
		write!(f, "{item}")?;
	}
	f.write_str("]")
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::String(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::String(v.to_string())
	}
}

impl From<Vec<String>> for Value {
	fn from(v: Vec<String>) -> Self {
		Value::StringList(v)
	}
}

impl From<Vec<i64>> for Value {
	fn from(v: Vec<i64>) -> Self {
		Value::IntList(v)
	}
}

impl From<Vec<f64>> for Value {
	fn from(v: Vec<f64>) -> Self {
		Value::FloatList(v)
	}
}

impl From<FxHashMap<String, String>> for Value {
	fn from(v: FxHashMap<String, String>) -> Self {
		Value::StringMap(v)
	}
}

// Seal the FromValue trait to the shapes the registry can store.
mod sealed {
	use rustc_hash::FxHashMap;

	pub trait Sealed {}
	impl Sealed for bool {}
	impl Sealed for i64 {}
	impl Sealed for f64 {}
	impl Sealed for String {}
	impl Sealed for Vec<String> {}
	impl Sealed for Vec<i64> {}
	impl Sealed for Vec<f64> {}
	impl Sealed for FxHashMap<String, String> {}
}

/// Trait for types that can be read out of a [`Value`].
///
/// Collection types are cloned out, so callers always receive their own
/// defensive copy and can never mutate the published snapshot.
pub trait FromValue: sealed::Sealed + Sized {
	/// Extracts the value, returning `None` if the variant does not match.
	fn from_value(value: &Value) -> Option<Self>;

	/// Returns the [`ValueKind`] corresponding to this Rust type.
	fn value_kind() -> ValueKind;
}

impl FromValue for bool {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_bool()
	}

	fn value_kind() -> ValueKind {
		ValueKind::Bool
	}
}

impl FromValue for i64 {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_int()
	}

	fn value_kind() -> ValueKind {
		ValueKind::Int
	}
}

impl FromValue for f64 {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_float()
	}

	fn value_kind() -> ValueKind {
		ValueKind::Float
	}
}

impl FromValue for String {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_str().map(|s| s.to_string())
	}

	fn value_kind() -> ValueKind {
		ValueKind::String
	}
}

impl FromValue for Vec<String> {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_string_list().map(|v| v.to_vec())
	}

	fn value_kind() -> ValueKind {
		ValueKind::StringList
	}
}

impl FromValue for Vec<i64> {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_int_list().map(|v| v.to_vec())
	}

	fn value_kind() -> ValueKind {
		ValueKind::IntList
	}
}

impl FromValue for Vec<f64> {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_float_list().map(|v| v.to_vec())
	}

	fn value_kind() -> ValueKind {
		ValueKind::FloatList
	}
}

impl FromValue for FxHashMap<String, String> {
	fn from_value(value: &Value) -> Option<Self> {
		value.as_string_map().cloned()
	}

	fn value_kind() -> ValueKind {
		ValueKind::StringMap
	}
}
