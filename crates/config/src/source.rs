//! The KDL source adapter.

use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlNode, KdlValue};
use rustc_hash::FxHashMap;

use cairn_registry::{ConfigSource, SourceError};

/// A [`ConfigSource`] over a parsed KDL document.
///
/// File-backed sources re-read and re-parse on `reload()`, replacing the root
/// document wholesale; in-memory sources (from [`KdlSource::parse`]) have no
/// backing store and reload as a no-op.
pub struct KdlSource {
	origin: Origin,
	doc: KdlDocument,
}

enum Origin {
	File(PathBuf),
	Memory,
}

impl KdlSource {
	/// Opens and parses a KDL file.
	///
	/// Parse and I/O failures are fatal here: a source that cannot produce a
	/// document must abort startup rather than pretend to hold one.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
		let path = path.into();
		let doc = read_document(&path)?;
		Ok(Self {
			origin: Origin::File(path),
			doc,
		})
	}

	/// Parses an in-memory KDL document, for tests and embedded defaults.
	pub fn parse(input: &str) -> Result<Self, SourceError> {
		let doc = parse_document(input, Path::new("<memory>"))?;
		Ok(Self {
			origin: Origin::Memory,
			doc,
		})
	}

	/// Walks the dotted `path` through nested nodes.
	fn node(&self, path: &str) -> Option<&KdlNode> {
		let mut segments = path.split('.');
		let mut node = self.doc.get(segments.next()?)?;
		for segment in segments {
			node = node.children()?.get(segment)?;
		}
		Some(node)
	}

	fn scalar<T>(
		&self,
		path: &str,
		default: T,
		expected: &'static str,
		read: impl Fn(&KdlValue) -> Option<T>,
	) -> T {
		let Some(node) = self.node(path) else {
			warn_missing(path);
			return default;
		};
		let Some(value) = first_arg(node) else {
			warn_shape(path, expected, "no value");
			return default;
		};
		match read(value) {
			Some(v) => v,
			None => {
				warn_shape(path, expected, kdl_type_name(value));
				default
			}
		}
	}

	fn list<T: Clone>(
		&self,
		path: &str,
		default: &[T],
		expected: &'static str,
		read: impl Fn(&KdlValue) -> Option<T>,
	) -> Vec<T> {
		let Some(node) = self.node(path) else {
			warn_missing(path);
			return default.to_vec();
		};
		// A section node is map-shaped, not an empty list.
		if node.children().is_some() {
			warn_shape(path, expected, "node with children");
			return default.to_vec();
		}
		let mut out = Vec::new();
		for value in args(node) {
			match read(value) {
				Some(v) => out.push(v),
				None => {
					warn_shape(path, expected, kdl_type_name(value));
					return default.to_vec();
				}
			}
		}
		out
	}
}

impl ConfigSource for KdlSource {
	fn reload(&mut self) -> Result<(), SourceError> {
		match &self.origin {
			Origin::File(path) => {
				self.doc = read_document(path)?;
				Ok(())
			}
			// Nothing to re-read.
			Origin::Memory => Ok(()),
		}
	}

	fn get_bool(&self, path: &str, default: bool) -> Result<bool, SourceError> {
		Ok(self.scalar(path, default, "bool", KdlValue::as_bool))
	}

	fn get_string(&self, path: &str, default: &str) -> Result<String, SourceError> {
		Ok(self.scalar(path, default.to_string(), "string", |v| {
			v.as_string().map(|s| s.to_string())
		}))
	}

	fn get_int(&self, path: &str, default: i64) -> Result<i64, SourceError> {
		Ok(self.scalar(path, default, "int", read_int))
	}

	fn get_float(&self, path: &str, default: f64) -> Result<f64, SourceError> {
		Ok(self.scalar(path, default, "float", read_float))
	}

	fn get_string_list(&self, path: &str, default: &[String]) -> Result<Vec<String>, SourceError> {
		Ok(self.list(path, default, "string list", |v| {
			v.as_string().map(|s| s.to_string())
		}))
	}

	fn get_int_list(&self, path: &str, default: &[i64]) -> Result<Vec<i64>, SourceError> {
		Ok(self.list(path, default, "int list", read_int))
	}

	fn get_float_list(&self, path: &str, default: &[f64]) -> Result<Vec<f64>, SourceError> {
		Ok(self.list(path, default, "float list", read_float))
	}

	fn get_string_map(
		&self,
		path: &str,
		default: &FxHashMap<String, String>,
	) -> Result<FxHashMap<String, String>, SourceError> {
		let Some(node) = self.node(path) else {
			warn_missing(path);
			return Ok(default.clone());
		};
		let Some(children) = node.children() else {
			warn_shape(path, "map of children", "no children");
			return Ok(default.clone());
		};

		let mut out = FxHashMap::default();
		for child in children.nodes() {
			match first_arg(child).and_then(stringify) {
				// Duplicate child names: last one wins.
				Some(value) => {
					out.insert(child.name().value().to_string(), value);
				}
				None => {
					warn_shape(path, "map of children", "non-scalar entry");
					return Ok(default.clone());
				}
			}
		}
		Ok(out)
	}
}

fn read_document(path: &Path) -> Result<KdlDocument, SourceError> {
	let input = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
		path: path.to_path_buf(),
		source,
	})?;
	parse_document(&input, path)
}

fn parse_document(input: &str, path: &Path) -> Result<KdlDocument, SourceError> {
	input.parse().map_err(|e: kdl::KdlError| SourceError::Parse {
		path: path.to_path_buf(),
		message: e.to_string(),
	})
}

/// First positional argument of a node (named entries are properties).
fn first_arg(node: &KdlNode) -> Option<&KdlValue> {
	node.entries()
		.iter()
		.find(|e| e.name().is_none())
		.map(|e| e.value())
}

/// All positional arguments of a node, in source order.
fn args(node: &KdlNode) -> impl Iterator<Item = &KdlValue> {
	node.entries()
		.iter()
		.filter(|e| e.name().is_none())
		.map(|e| e.value())
}

fn read_int(value: &KdlValue) -> Option<i64> {
	value.as_integer().and_then(|i| i64::try_from(i).ok())
}

/// Integer nodes satisfy a float read.
fn read_float(value: &KdlValue) -> Option<f64> {
	value
		.as_float()
		.or_else(|| value.as_integer().map(|i| i as f64))
}

fn stringify(value: &KdlValue) -> Option<String> {
	match value {
		KdlValue::String(s) => Some(s.clone()),
		KdlValue::Integer(i) => Some(i.to_string()),
		KdlValue::Float(f) => Some(f.to_string()),
		KdlValue::Bool(b) => Some(b.to_string()),
		KdlValue::Null => None,
	}
}

fn kdl_type_name(value: &KdlValue) -> &'static str {
	match value {
		KdlValue::String(_) => "string",
		KdlValue::Integer(_) => "integer",
		KdlValue::Float(_) => "float",
		KdlValue::Bool(_) => "bool",
		KdlValue::Null => "null",
	}
}

fn warn_missing(path: &str) {
	tracing::warn!(path, "key not found in config; using default");
}

fn warn_shape(path: &str, expected: &'static str, found: &'static str) {
	tracing::warn!(path, expected, found, "config value has the wrong shape; using default");
}
