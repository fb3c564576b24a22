//! Config key declarations.
//!
//! A key describes one configuration slot: where it lives in the source
//! (dotted path), its typed default, how to extract it (an [`Extractor`]
//! strategy), whether it may be refreshed on reload, and optional validation
//! constraints. Keys are declared through the constructor functions in this
//! module and registered into a [`KeySet`], which assigns each one its
//! ordinal — the fixed array index into the resolved-value snapshot.
//!
//! ```ignore
//! let mut keys = KeySet::new();
//! let log_level = keys.register(
//!     key::lowercase_string("log.level", "info").allowed(["trace", "debug", "info", "warn"]),
//! );
//! let port = keys.register(key::int("server.port", 8080).range(0, 65536).not_reloadable());
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::SourceError;
use crate::source::ConfigSource;
use crate::value::{FromValue, Value};

/// Signature of a [`Extractor::Custom`] extraction function.
pub type ExtractFn = dyn Fn(&dyn ConfigSource) -> Result<Value, SourceError> + Send + Sync;

/// A reusable typed extraction strategy.
///
/// Each variant is a pure function of `(source, path, default)` for one
/// target shape. `LowercaseString` composes: it delegates to the string rule
/// and then normalizes case. `Custom` carries an arbitrary function of the
/// source, for keys derived from more than one node.
#[derive(Clone)]
pub enum Extractor {
	/// Extracts a boolean.
	Bool,
	/// Extracts a string.
	String,
	/// Extracts a string and lowercases it.
	LowercaseString,
	/// Extracts an integer.
	Int,
	/// Extracts a float.
	Float,
	/// Extracts a list of strings.
	StringList,
	/// Extracts a list of integers.
	IntList,
	/// Extracts a list of floats.
	FloatList,
	/// Extracts a string-to-string map.
	StringMap,
	/// Computes the value with an arbitrary function of the source.
	Custom(Arc<ExtractFn>),
}

impl fmt::Debug for Extractor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Extractor::Bool => "Bool",
			Extractor::String => "String",
			Extractor::LowercaseString => "LowercaseString",
			Extractor::Int => "Int",
			Extractor::Float => "Float",
			Extractor::StringList => "StringList",
			Extractor::IntList => "IntList",
			Extractor::FloatList => "FloatList",
			Extractor::StringMap => "StringMap",
			Extractor::Custom(_) => "Custom",
		};
		f.write_str(name)
	}
}

impl Extractor {
	/// Pulls the raw value for `path` out of the source.
	///
	/// `default` must hold the variant this extractor produces; key
	/// construction guarantees that pairing.
	pub fn extract(
		&self,
		source: &dyn ConfigSource,
		path: &str,
		default: &Value,
	) -> Result<Value, SourceError> {
		match self {
			Extractor::Bool => {
				let def = default.as_bool().unwrap_or_default();
				source.get_bool(path, def).map(Value::Bool)
			}
			Extractor::String => {
				let def = default.as_str().unwrap_or_default();
				source.get_string(path, def).map(Value::String)
			}
			Extractor::LowercaseString => {
				let value = Extractor::String.extract(source, path, default)?;
				match value {
					Value::String(s) => Ok(Value::String(s.to_lowercase())),
					other => Ok(other),
				}
			}
			Extractor::Int => {
				let def = default.as_int().unwrap_or_default();
				source.get_int(path, def).map(Value::Int)
			}
			Extractor::Float => {
				let def = default.as_float().unwrap_or_default();
				source.get_float(path, def).map(Value::Float)
			}
			Extractor::StringList => {
				let def = default.as_string_list().unwrap_or_default();
				source.get_string_list(path, def).map(Value::StringList)
			}
			Extractor::IntList => {
				let def = default.as_int_list().unwrap_or_default();
				source.get_int_list(path, def).map(Value::IntList)
			}
			Extractor::FloatList => {
				let def = default.as_float_list().unwrap_or_default();
				source.get_float_list(path, def).map(Value::FloatList)
			}
			Extractor::StringMap => {
				let empty = FxHashMap::default();
				let def = default.as_string_map().unwrap_or(&empty);
				source.get_string_map(path, def).map(Value::StringMap)
			}
			Extractor::Custom(extract) => extract(source),
		}
	}
}

/// Erased description of one configuration slot.
#[derive(Debug, Clone)]
pub struct KeyDef {
	pub(crate) path: String,
	pub(crate) default: Value,
	pub(crate) extractor: Extractor,
	pub(crate) reloadable: bool,
	pub(crate) range: Option<(Value, Value)>,
	pub(crate) allowed: Option<Vec<Value>>,
}

impl KeyDef {
	/// Dotted path identifying this key's location in the source.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// The value substituted on any per-key failure.
	pub fn default(&self) -> &Value {
		&self.default
	}

	/// Whether this key is refreshed on reload.
	pub fn reloadable(&self) -> bool {
		self.reloadable
	}
}

/// A key declaration before registration.
///
/// Built by the constructor functions in this module; the chained modifiers
/// attach the optional behaviors (validation constraints, reload policy).
pub struct KeySpec<T> {
	def: KeyDef,
	_marker: PhantomData<fn() -> T>,
}

impl<T: FromValue> KeySpec<T> {
	fn new(path: impl Into<String>, default: Value, extractor: Extractor) -> Self {
		Self {
			def: KeyDef {
				path: path.into(),
				default,
				extractor,
				reloadable: true,
				range: None,
				allowed: None,
			},
			_marker: PhantomData,
		}
	}

	/// Pins this key to its initially loaded value: `reload()` will not
	/// refresh it.
	pub fn not_reloadable(mut self) -> Self {
		self.def.reloadable = false;
		self
	}

	/// Restricts this key to a closed set of acceptable values.
	///
	/// A resolved value outside the set is rejected and replaced by the
	/// default. An absent set means unrestricted.
	pub fn allowed<I, V>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		self.def.allowed = Some(values.into_iter().map(Into::into).collect());
		self
	}

	pub(crate) fn into_def(self) -> KeyDef {
		self.def
	}
}

impl<T: FromValue + Comparable> KeySpec<T> {
	/// Requires the resolved value to lie strictly between `min` and `max`.
	///
	/// Both bounds are exclusive: a value equal to either bound is rejected
	/// and replaced by the default.
	pub fn range(mut self, min: T, max: T) -> Self
	where
		T: Into<Value>,
	{
		self.def.range = Some((min.into(), max.into()));
		self
	}
}

// Range checks only apply to shapes with a total order per kind.
mod sealed {
	pub trait Sealed {}
	impl Sealed for bool {}
	impl Sealed for i64 {}
	impl Sealed for f64 {}
	impl Sealed for String {}
}

/// Marker for value types that support range constraints.
pub trait Comparable: sealed::Sealed {}

impl Comparable for bool {}
impl Comparable for i64 {}
impl Comparable for f64 {}
impl Comparable for String {}

/// Declares a boolean key.
pub fn boolean(path: impl Into<String>, default: bool) -> KeySpec<bool> {
	KeySpec::new(path, Value::Bool(default), Extractor::Bool)
}

/// Declares a string key.
pub fn string(path: impl Into<String>, default: impl Into<String>) -> KeySpec<String> {
	KeySpec::new(path, Value::String(default.into()), Extractor::String)
}

/// Declares a string key whose resolved value is lowercased.
pub fn lowercase_string(path: impl Into<String>, default: impl Into<String>) -> KeySpec<String> {
	KeySpec::new(path, Value::String(default.into()), Extractor::LowercaseString)
}

/// Declares an integer key.
pub fn int(path: impl Into<String>, default: i64) -> KeySpec<i64> {
	KeySpec::new(path, Value::Int(default), Extractor::Int)
}

/// Declares a float key.
pub fn float(path: impl Into<String>, default: f64) -> KeySpec<f64> {
	KeySpec::new(path, Value::Float(default), Extractor::Float)
}

/// Declares a string-list key.
pub fn string_list<I, S>(path: impl Into<String>, default: I) -> KeySpec<Vec<String>>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let def = default.into_iter().map(Into::into).collect();
	KeySpec::new(path, Value::StringList(def), Extractor::StringList)
}

/// Declares an int-list key.
pub fn int_list(
	path: impl Into<String>,
	default: impl IntoIterator<Item = i64>,
) -> KeySpec<Vec<i64>> {
	let def = default.into_iter().collect();
	KeySpec::new(path, Value::IntList(def), Extractor::IntList)
}

/// Declares a float-list key.
pub fn float_list(
	path: impl Into<String>,
	default: impl IntoIterator<Item = f64>,
) -> KeySpec<Vec<f64>> {
	let def = default.into_iter().collect();
	KeySpec::new(path, Value::FloatList(def), Extractor::FloatList)
}

/// Declares a string-map key. The default is the empty map.
pub fn string_map(path: impl Into<String>) -> KeySpec<FxHashMap<String, String>> {
	KeySpec::new(
		path,
		Value::StringMap(FxHashMap::default()),
		Extractor::StringMap,
	)
}

/// Declares a key whose value is computed by `extract` from the whole source
/// rather than read at a single path.
///
/// `path` names the key in diagnostics only. The computed value flows through
/// the same validation as any other key and must hold the shape of `default`;
/// a mismatched shape surfaces as a fallback at read time.
pub fn computed<T, F>(path: impl Into<String>, default: T, extract: F) -> KeySpec<T>
where
	T: FromValue + Into<Value>,
	F: Fn(&dyn ConfigSource) -> Result<Value, SourceError> + Send + Sync + 'static,
{
	KeySpec::new(path, default.into(), Extractor::Custom(Arc::new(extract)))
}

/// Typed handle to a registered key.
///
/// Carries the ordinal assigned at registration and the value type at the
/// Rust level. Handles are `Copy` and are the only way to read from a
/// [`KeyedConfig`](crate::registry::KeyedConfig).
pub struct Key<T> {
	ordinal: u32,
	_marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Key<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Key<T> {}

impl<T> core::fmt::Debug for Key<T> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_tuple("Key").field(&self.ordinal).finish()
	}
}

impl<T> Key<T> {
	/// The position of this key within its registry.
	///
	/// Ordinals are contiguous from 0 in registration order and are internal
	/// bookkeeping — they never appear in configuration files.
	pub fn ordinal(&self) -> u32 {
		self.ordinal
	}
}

/// The explicit, ordered collection of key declarations.
///
/// Registration order determines ordinals, so it must be stable across a
/// process run. Re-registering keys in a different order would invalidate
/// every previously issued handle.
#[derive(Debug, Default)]
pub struct KeySet {
	defs: Vec<KeyDef>,
}

impl KeySet {
	/// Creates an empty key set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a key declaration, assigning it the next ordinal.
	pub fn register<T: FromValue>(&mut self, spec: KeySpec<T>) -> Key<T> {
		let ordinal = self.defs.len() as u32;
		self.defs.push(spec.into_def());
		Key {
			ordinal,
			_marker: PhantomData,
		}
	}

	/// Number of registered keys.
	pub fn len(&self) -> usize {
		self.defs.len()
	}

	/// Returns `true` if no keys have been registered.
	pub fn is_empty(&self) -> bool {
		self.defs.is_empty()
	}

	/// Iterates over the registered declarations in ordinal order.
	pub fn iter(&self) -> impl Iterator<Item = &KeyDef> {
		self.defs.iter()
	}

	pub(crate) fn into_defs(self) -> Vec<KeyDef> {
		self.defs
	}
}
