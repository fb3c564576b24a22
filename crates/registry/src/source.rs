//! The source adapter boundary.
//!
//! The registry never reads a document format directly. It resolves keys
//! against a [`ConfigSource`]: typed, dotted-path lookups with caller-supplied
//! defaults over whatever hierarchical document the adapter parses. How the
//! adapter gets its data (KDL file on disk, in-memory fixture, ...) is
//! irrelevant here.

use rustc_hash::FxHashMap;

use crate::error::SourceError;

/// Typed, path-addressed access to a hierarchical configuration document.
///
/// Each getter either returns the value found at `path` converted to the
/// requested shape, or returns the supplied default. A missing path or a
/// wrong-shaped node is an expected condition — configuration files routinely
/// lag behind code — so implementations emit a `tracing` warning and fall back
/// to the default rather than failing the caller. The `Result` exists only for
/// adapter-internal failures, which the registry treats as severe.
///
/// List getters preserve source order; map getters guarantee key uniqueness
/// but no ordering.
pub trait ConfigSource {
	/// Re-reads the backing store, replacing the adapter's root document
	/// wholesale.
	///
	/// An unreadable or unparseable backing store is fatal to the call:
	/// there is no partial or stale state to fall back to, so the error
	/// propagates and nothing is replaced.
	fn reload(&mut self) -> Result<(), SourceError>;

	/// Reads a boolean at `path`, or `default` if absent or wrong-shaped.
	fn get_bool(&self, path: &str, default: bool) -> Result<bool, SourceError>;

	/// Reads a string at `path`, or `default` if absent or wrong-shaped.
	fn get_string(&self, path: &str, default: &str) -> Result<String, SourceError>;

	/// Reads an integer at `path`, or `default` if absent or wrong-shaped.
	fn get_int(&self, path: &str, default: i64) -> Result<i64, SourceError>;

	/// Reads a float at `path`, or `default` if absent or wrong-shaped.
	/// Integer nodes satisfy a float read.
	fn get_float(&self, path: &str, default: f64) -> Result<f64, SourceError>;

	/// Reads a list of strings at `path`, or a copy of `default`.
	fn get_string_list(&self, path: &str, default: &[String]) -> Result<Vec<String>, SourceError>;

	/// Reads a list of integers at `path`, or a copy of `default`.
	fn get_int_list(&self, path: &str, default: &[i64]) -> Result<Vec<i64>, SourceError>;

	/// Reads a list of floats at `path`, or a copy of `default`.
	fn get_float_list(&self, path: &str, default: &[f64]) -> Result<Vec<f64>, SourceError>;

	/// Reads a string-to-string map at `path`, or a copy of `default`.
	fn get_string_map(
		&self,
		path: &str,
		default: &FxHashMap<String, String>,
	) -> Result<FxHashMap<String, String>, SourceError>;
}
