//! The keyed configuration registry.
//!
//! [`KeyedConfig`] owns the key list, the source adapter, and the
//! resolved-value snapshot: a fixed-size array with one slot per registered
//! key, indexed by ordinal. All correctness work happens at load time;
//! [`KeyedConfig::get`] is an O(1) snapshot read that never validates, never
//! blocks, and never touches I/O.
//!
//! # Load/reload state machine
//!
//! `Uninitialized -> init() -> Ready -> reload() -> Ready`. There is no path
//! back. Calling [`KeyedConfig::get`] before [`KeyedConfig::init`] is a
//! precondition violation; the slots hold declared defaults at that point, so
//! reads are total but reflect no loaded document.
//!
//! # Concurrency
//!
//! Each load pass builds the next snapshot privately and publishes it with a
//! single atomic swap, so concurrent readers never observe a partially
//! updated mix of old and new values. The adapter sits behind a mutex, which
//! serializes overlapping `reload()` calls against each other without
//! touching the read path.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::error::{ResolveError, SourceError};
use crate::key::{Key, KeyDef, KeySet};
use crate::source::ConfigSource;
use crate::validate;
use crate::value::{FromValue, Value};

#[cfg(test)]
mod tests;

/// A registry of typed configuration keys resolved against one source.
pub struct KeyedConfig<S: ConfigSource> {
	defs: Vec<KeyDef>,
	source: Mutex<S>,
	snapshot: ArcSwap<Vec<Value>>,
}

impl<S: ConfigSource> KeyedConfig<S> {
	/// Creates a registry over `source` for the given key set.
	///
	/// The snapshot starts out holding every key's declared default; no
	/// resolution happens until [`init`](Self::init).
	pub fn new(source: S, keys: KeySet) -> Self {
		let defs = keys.into_defs();
		let initial: Vec<Value> = defs.iter().map(|d| d.default.clone()).collect();
		Self {
			defs,
			source: Mutex::new(source),
			snapshot: ArcSwap::from_pointee(initial),
		}
	}

	/// Performs the first full load, resolving every key unconditionally.
	///
	/// Call once after construction. Per-key failures are handled internally
	/// (default substitution or a severe log line); they never abort the
	/// pass.
	pub fn init(&self) {
		let source = self.source.lock();
		self.load(&*source, true);
	}

	/// Re-reads the backing store and refreshes the reloadable keys.
	///
	/// The source reloads its document wholesale first; if that fails the
	/// error propagates and no slot changes. Keys declared
	/// `not_reloadable()` keep their previously loaded values.
	pub fn reload(&self) -> Result<(), SourceError> {
		let mut source = self.source.lock();
		source.reload()?;
		self.load(&*source, false);
		Ok(())
	}

	/// Reads the resolved value for `key`.
	///
	/// O(1) by ordinal, no validation, no I/O. Returns the value stored by
	/// the last load pass, or the key's declared default if the key has
	/// never been resolved.
	pub fn get<T: FromValue + Default>(&self, key: Key<T>) -> T {
		let snapshot = self.snapshot.load();
		let idx = key.ordinal() as usize;

		match snapshot.get(idx).and_then(T::from_value) {
			Some(value) => value,
			None => {
				// Only reachable with a handle issued by a different
				// registry's key set.
				tracing::warn!(
					ordinal = key.ordinal(),
					"config key does not belong to this registry"
				);
				self.defs
					.get(idx)
					.and_then(|d| T::from_value(&d.default))
					.unwrap_or_default()
			}
		}
	}

	/// Number of registered keys.
	pub fn len(&self) -> usize {
		self.defs.len()
	}

	/// Returns `true` if the registry holds no keys.
	pub fn is_empty(&self) -> bool {
		self.defs.is_empty()
	}

	/// Iterates over the registered key declarations in ordinal order.
	pub fn keys(&self) -> impl Iterator<Item = &KeyDef> {
		self.defs.iter()
	}

	/// Resolves keys into a fresh snapshot and publishes it atomically.
	///
	/// `initial` resolves every key; otherwise only reloadable ones. Slots
	/// for skipped keys carry over unchanged from the current snapshot.
	fn load(&self, source: &S, initial: bool) {
		let mut next: Vec<Value> = self.snapshot.load_full().as_ref().clone();

		for (def, slot) in self.defs.iter().zip(next.iter_mut()) {
			if !initial && !def.reloadable {
				continue;
			}

			match resolve(def, source) {
				Ok(value) => *slot = value,
				Err(ResolveError::Source(err)) => {
					// Unclassified failure: severe, slot keeps its prior state.
					tracing::error!(
						path = def.path(),
						error = %err,
						"failed to resolve config key"
					);
				}
				Err(err) => {
					tracing::warn!(
						path = def.path(),
						fallback = %def.default(),
						"{err}; using the default instead"
					);
					*slot = def.default().clone();
				}
			}
		}

		self.snapshot.store(Arc::new(next));
	}
}

/// Extracts and validates one key against the source.
fn resolve(def: &KeyDef, source: &dyn ConfigSource) -> Result<Value, ResolveError> {
	let raw = def.extractor.extract(source, def.path(), def.default())?;
	validate::check(def, raw)
}
