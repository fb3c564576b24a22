//! Typed, keyed configuration registry.
//!
//! This crate maps a fixed, statically-declared set of configuration keys to
//! values pulled from a hierarchical configuration source, with per-key
//! defaulting, validation, and selective reload. Application code reads
//! configuration through strongly typed handles instead of parsing raw nodes
//! ad hoc, and malformed or missing values degrade to safe defaults with a
//! diagnostic rather than failing the process.
//!
//! # Overview
//!
//! Keys are declared once at startup and registered into a [`KeySet`], which
//! assigns each one a stable ordinal in registration order. The ordinal is the
//! sole index into the resolved-value snapshot, so reads are O(1) and never
//! touch the underlying document.
//!
//! ```ignore
//! use cairn_registry::{key, KeySet, KeyedConfig};
//!
//! let mut keys = KeySet::new();
//! let port = keys.register(key::int("server.port", 8080).range(0, 65536));
//! let theme = keys.register(key::lowercase_string("ui.theme", "default").not_reloadable());
//!
//! let config = KeyedConfig::new(source, keys);
//! config.init();
//!
//! let p: i64 = config.get(port);
//! let t: String = config.get(theme);
//! ```
//!
//! The backing document is read through the [`ConfigSource`] trait; see the
//! `cairn-config` crate for the KDL-backed implementation. Resolution happens
//! only during [`KeyedConfig::init`] and [`KeyedConfig::reload`] — a value
//! that fails its range or allowed-set check is replaced by the key's declared
//! default and logged, and a source-wide parse failure aborts the reload
//! without publishing partial state.

pub mod error;
pub mod key;
pub mod registry;
pub mod source;
mod validate;
pub mod value;

pub use error::{ResolveError, SourceError};
pub use key::{Key, KeyDef, KeySet, KeySpec};
pub use registry::KeyedConfig;
pub use source::ConfigSource;
pub use value::{FromValue, Value, ValueKind};
