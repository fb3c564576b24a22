use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::*;
use crate::key;

/// In-memory source for exercising the registry without a parser.
///
/// Cloning shares the backing state, so tests can keep a handle and mutate
/// the "document" between `init()` and `reload()`.
#[derive(Clone, Default)]
struct MockSource {
	state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
	values: FxHashMap<String, Value>,
	/// Paths whose getters fail with an internal error.
	fail_paths: Vec<String>,
	/// Makes the next `reload()` fail like an unparseable document.
	fail_reload: bool,
	reloads: usize,
}

impl MockSource {
	fn set(&self, path: &str, value: Value) {
		self.state.lock().values.insert(path.to_string(), value);
	}

	fn remove(&self, path: &str) {
		self.state.lock().values.remove(path);
	}

	fn fail_path(&self, path: &str) {
		self.state.lock().fail_paths.push(path.to_string());
	}

	fn fail_next_reload(&self) {
		self.state.lock().fail_reload = true;
	}

	fn reloads(&self) -> usize {
		self.state.lock().reloads
	}

	fn lookup<T>(
		&self,
		path: &str,
		default: T,
		read: impl Fn(&Value) -> Option<T>,
	) -> Result<T, SourceError> {
		let state = self.state.lock();
		if state.fail_paths.iter().any(|p| p == path) {
			return Err(SourceError::Internal(format!("backing store error at '{path}'")));
		}
		Ok(state.values.get(path).and_then(|v| read(v)).unwrap_or(default))
	}
}

impl ConfigSource for MockSource {
	fn reload(&mut self) -> Result<(), SourceError> {
		let mut state = self.state.lock();
		if state.fail_reload {
			state.fail_reload = false;
			return Err(SourceError::Internal("document is unparseable".to_string()));
		}
		state.reloads += 1;
		Ok(())
	}

	fn get_bool(&self, path: &str, default: bool) -> Result<bool, SourceError> {
		self.lookup(path, default, Value::as_bool)
	}

	fn get_string(&self, path: &str, default: &str) -> Result<String, SourceError> {
		self.lookup(path, default.to_string(), |v| {
			v.as_str().map(|s| s.to_string())
		})
	}

	fn get_int(&self, path: &str, default: i64) -> Result<i64, SourceError> {
		self.lookup(path, default, Value::as_int)
	}

	fn get_float(&self, path: &str, default: f64) -> Result<f64, SourceError> {
		self.lookup(path, default, Value::as_float)
	}

	fn get_string_list(&self, path: &str, default: &[String]) -> Result<Vec<String>, SourceError> {
		self.lookup(path, default.to_vec(), |v| {
			v.as_string_list().map(|l| l.to_vec())
		})
	}

	fn get_int_list(&self, path: &str, default: &[i64]) -> Result<Vec<i64>, SourceError> {
		self.lookup(path, default.to_vec(), |v| v.as_int_list().map(|l| l.to_vec()))
	}

	fn get_float_list(&self, path: &str, default: &[f64]) -> Result<Vec<f64>, SourceError> {
		self.lookup(path, default.to_vec(), |v| {
			v.as_float_list().map(|l| l.to_vec())
		})
	}

	fn get_string_map(
		&self,
		path: &str,
		default: &FxHashMap<String, String>,
	) -> Result<FxHashMap<String, String>, SourceError> {
		self.lookup(path, default.clone(), |v| v.as_string_map().cloned())
	}
}

#[test]
fn test_init_resolves_present_values() {
	let source = MockSource::default();
	source.set("server.host", Value::String("example.org".into()));
	source.set("server.port", Value::Int(9090));
	source.set("server.tls", Value::Bool(true));

	let mut keys = KeySet::new();
	let host = keys.register(key::string("server.host", "localhost"));
	let port = keys.register(key::int("server.port", 8080));
	let tls = keys.register(key::boolean("server.tls", false));

	let config = KeyedConfig::new(source, keys);
	config.init();

	assert_eq!(config.get(host), "example.org");
	assert_eq!(config.get(port), 9090);
	assert!(config.get(tls));
}

#[test]
fn test_missing_keys_fall_back_to_defaults() {
	let mut keys = KeySet::new();
	let host = keys.register(key::string("server.host", "localhost"));
	let retries = keys.register(key::int_list("server.retries", [1, 2, 4]));
	let labels = keys.register(key::string_map("server.labels"));

	let config = KeyedConfig::new(MockSource::default(), keys);
	config.init();

	assert_eq!(config.get(host), "localhost");
	assert_eq!(config.get(retries), vec![1, 2, 4]);
	assert!(config.get(labels).is_empty());
}

#[test]
fn test_get_before_init_returns_declared_defaults() {
	let mut keys = KeySet::new();
	let port = keys.register(key::int("server.port", 8080));

	let source = MockSource::default();
	source.set("server.port", Value::Int(9090));

	let config = KeyedConfig::new(source, keys);
	// init() not called: the slot still holds the declared default.
	assert_eq!(config.get(port), 8080);
}

#[test]
fn test_lowercase_string_folds_case() {
	let source = MockSource::default();
	source.set("log.level", Value::String("INFO".into()));

	let mut keys = KeySet::new();
	let level = keys.register(key::lowercase_string("log.level", "warn"));
	let config = KeyedConfig::new(source, keys);
	config.init();

	assert_eq!(config.get(level), "info");
}

#[test]
fn test_plain_string_is_not_transformed() {
	let source = MockSource::default();
	source.set("name", Value::String("MiXeD".into()));

	let mut keys = KeySet::new();
	let name = keys.register(key::string("name", ""));
	let config = KeyedConfig::new(source, keys);
	config.init();

	assert_eq!(config.get(name), "MiXeD");
}

#[test]
fn test_range_is_strict_exclusive() {
	for (value, expected) in [(0, 5), (10, 5), (-1, 5), (11, 5), (5, 5), (9, 9), (1, 1)] {
		let source = MockSource::default();
		source.set("n", Value::Int(value));

		let mut keys = KeySet::new();
		let n = keys.register(key::int("n", 5).range(0, 10));
		let config = KeyedConfig::new(source, keys);
		config.init();

		assert_eq!(config.get(n), expected, "source value {value}");
	}
}

#[test]
fn test_allowed_set_rejection_substitutes_default() {
	let source = MockSource::default();
	source.set("mode", Value::String("c".into()));

	let mut keys = KeySet::new();
	let mode = keys.register(key::string("mode", "a").allowed(["a", "b"]));
	let config = KeyedConfig::new(source, keys);
	config.init();

	assert_eq!(config.get(mode), "a");
}

#[test]
fn test_allowed_member_passes_unchanged() {
	let source = MockSource::default();
	source.set("mode", Value::String("b".into()));

	let mut keys = KeySet::new();
	let mode = keys.register(key::string("mode", "a").allowed(["a", "b"]));
	let config = KeyedConfig::new(source, keys);
	config.init();

	assert_eq!(config.get(mode), "b");
}

#[test]
fn test_reload_skips_non_reloadable_keys() {
	let source = MockSource::default();
	source.set("pinned", Value::Int(1));
	source.set("live", Value::Int(1));

	let mut keys = KeySet::new();
	let pinned = keys.register(key::int("pinned", 0).not_reloadable());
	let live = keys.register(key::int("live", 0));

	let config = KeyedConfig::new(source.clone(), keys);
	config.init();
	assert_eq!(config.get(pinned), 1);
	assert_eq!(config.get(live), 1);

	source.set("pinned", Value::Int(2));
	source.set("live", Value::Int(2));
	config.reload().unwrap();

	assert_eq!(config.get(pinned), 1, "non-reloadable key must keep its value");
	assert_eq!(config.get(live), 2);
}

#[test]
fn test_init_resolves_non_reloadable_keys() {
	let source = MockSource::default();
	source.set("pinned", Value::Int(42));

	let mut keys = KeySet::new();
	let pinned = keys.register(key::int("pinned", 0).not_reloadable());
	let config = KeyedConfig::new(source, keys);
	config.init();

	assert_eq!(config.get(pinned), 42);
}

#[test]
fn test_failures_are_isolated_per_key() {
	let source = MockSource::default();
	source.set("a", Value::Int(1));
	source.set("b", Value::Int(99));
	source.set("c", Value::Int(3));

	let mut keys = KeySet::new();
	let a = keys.register(key::int("a", 0));
	let b = keys.register(key::int("b", 7).range(0, 10));
	let c = keys.register(key::int("c", 0));

	let config = KeyedConfig::new(source, keys);
	config.init();

	assert_eq!(config.get(a), 1);
	assert_eq!(config.get(b), 7, "out-of-range value falls back to default");
	assert_eq!(config.get(c), 3);
}

#[test]
fn test_source_error_leaves_slot_at_prior_state() {
	let source = MockSource::default();
	source.set("ok", Value::Int(1));
	source.set("broken", Value::Int(5));

	let mut keys = KeySet::new();
	let ok = keys.register(key::int("ok", 0));
	let broken = keys.register(key::int("broken", 0));

	let config = KeyedConfig::new(source.clone(), keys);
	config.init();
	assert_eq!(config.get(broken), 5);

	// The getter now fails internally; the previously loaded value survives.
	source.fail_path("broken");
	source.set("ok", Value::Int(2));
	config.reload().unwrap();

	assert_eq!(config.get(ok), 2);
	assert_eq!(config.get(broken), 5);
}

#[test]
fn test_source_error_during_init_keeps_default() {
	let source = MockSource::default();
	source.fail_path("broken");

	let mut keys = KeySet::new();
	let broken = keys.register(key::int("broken", 13));
	let config = KeyedConfig::new(source, keys);
	config.init();

	assert_eq!(config.get(broken), 13);
}

#[test]
fn test_failed_reload_propagates_and_publishes_nothing() {
	let source = MockSource::default();
	source.set("n", Value::Int(1));

	let mut keys = KeySet::new();
	let n = keys.register(key::int("n", 0));
	let config = KeyedConfig::new(source.clone(), keys);
	config.init();

	source.set("n", Value::Int(2));
	source.fail_next_reload();
	assert!(config.reload().is_err());
	assert_eq!(config.get(n), 1, "failed reload must not publish new values");

	// A later successful reload picks up the change.
	config.reload().unwrap();
	assert_eq!(config.get(n), 2);
}

#[test]
fn test_reload_is_idempotent() {
	let source = MockSource::default();
	source.set("a", Value::Int(3));
	source.set("b", Value::String("x".into()));

	let mut keys = KeySet::new();
	let a = keys.register(key::int("a", 0));
	let b = keys.register(key::string("b", ""));

	let config = KeyedConfig::new(source.clone(), keys);
	config.init();
	config.reload().unwrap();
	let first = (config.get(a), config.get(b));
	config.reload().unwrap();
	let second = (config.get(a), config.get(b));

	assert_eq!(first, second);
	assert_eq!(source.reloads(), 2);
}

#[test]
fn test_removed_key_falls_back_on_reload() {
	let source = MockSource::default();
	source.set("n", Value::Int(9));

	let mut keys = KeySet::new();
	let n = keys.register(key::int("n", 4));
	let config = KeyedConfig::new(source.clone(), keys);
	config.init();
	assert_eq!(config.get(n), 9);

	source.remove("n");
	config.reload().unwrap();
	assert_eq!(config.get(n), 4);
}

#[test]
fn test_list_and_map_round_trip() {
	let source = MockSource::default();
	source.set(
		"hosts",
		Value::StringList(vec!["a".into(), "b".into(), "c".into()]),
	);
	let mut map = FxHashMap::default();
	map.insert("env".to_string(), "prod".to_string());
	source.set("labels", Value::StringMap(map.clone()));

	let mut keys = KeySet::new();
	let hosts = keys.register(key::string_list("hosts", ["fallback"]));
	let labels = keys.register(key::string_map("labels"));

	let config = KeyedConfig::new(source, keys);
	config.init();

	assert_eq!(config.get(hosts), vec!["a", "b", "c"]);
	assert_eq!(config.get(labels), map);
}

#[test]
fn test_computed_key_reads_across_paths() {
	let source = MockSource::default();
	source.set("host", Value::String("example.org".into()));
	source.set("port", Value::Int(9090));

	let mut keys = KeySet::new();
	let addr = keys.register(key::computed(
		"addr",
		String::new(),
		|source: &dyn ConfigSource| {
			let host = source.get_string("host", "localhost")?;
			let port = source.get_int("port", 0)?;
			Ok(Value::String(format!("{host}:{port}")))
		},
	));

	let config = KeyedConfig::new(source, keys);
	config.init();

	assert_eq!(config.get(addr), "example.org:9090");
}

#[test]
fn test_computed_key_is_validated_like_any_other() {
	let source = MockSource::default();
	source.set("workers", Value::Int(64));

	let mut keys = KeySet::new();
	let doubled = keys.register(
		key::computed("workers", 4i64, |source: &dyn ConfigSource| {
			Ok(Value::Int(source.get_int("workers", 2)? * 2))
		})
		.range(0, 100),
	);

	let config = KeyedConfig::new(source, keys);
	config.init();

	// 128 is out of range, so the declared default wins.
	assert_eq!(config.get(doubled), 4);
}

#[test]
fn test_float_range_boundary() {
	let source = MockSource::default();
	source.set("ratio", Value::Float(1.0));

	let mut keys = KeySet::new();
	let ratio = keys.register(key::float("ratio", 0.5).range(0.0, 1.0));
	let config = KeyedConfig::new(source, keys);
	config.init();

	// Upper bound is exclusive.
	assert_eq!(config.get(ratio), 0.5);
}
