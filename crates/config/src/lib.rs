//! KDL-backed configuration source.
//!
//! This crate is the persistence boundary of the configuration system: a
//! passthrough adapter that parses a KDL (v2) document and exposes it to the
//! `cairn-registry` core through the
//! [`ConfigSource`](cairn_registry::ConfigSource) trait — typed, dotted-path
//! lookups with caller-supplied defaults. The core never sees KDL; this crate
//! never validates values.
//!
//! # Document shape
//!
//! Dotted paths walk nested nodes. Scalars are a node's first argument, lists
//! are all of a node's arguments in source order, and maps are a node's
//! children read as `name -> first argument`:
//!
//! ```kdl
//! server {
//!     host "example.org"
//!     port 9090
//!     tls #true
//! }
//! limits {
//!     retry-backoff-ms 100 200 400
//! }
//! labels {
//!     env "prod"
//!     region "eu-1"
//! }
//! ```
//!
//! `"server.port"` resolves to `9090`; `"limits.retry-backoff-ms"` to
//! `[100, 200, 400]`.
//!
//! A missing path or a wrong-shaped node returns the supplied default with a
//! warning — configuration files routinely lag behind code, so that is an
//! expected condition, not an error. An unparseable document, by contrast, is
//! fatal to [`KdlSource::open`] and [`reload`](cairn_registry::ConfigSource::reload):
//! there is no stale state worth keeping.

mod source;

pub use cairn_registry::SourceError;
pub use source::KdlSource;

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
