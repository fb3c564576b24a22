//! Error types for source access and key resolution.

use std::path::PathBuf;

use thiserror::Error;

use crate::value::Value;

/// A failure at the configuration source itself.
///
/// These are the unrecoverable conditions of the pipeline: an unreadable or
/// unparseable backing document aborts the whole `init`/`reload` call, and an
/// adapter-internal failure on a single getter is logged as severe while the
/// affected slot keeps its prior value. A merely *missing* key is never an
/// error — adapters handle that by returning the caller-supplied default.
#[derive(Debug, Error)]
pub enum SourceError {
	/// The backing document could not be read.
	#[error("failed to read {path}: {source}")]
	Io {
		/// Path to the document that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The backing document could not be parsed.
	#[error("failed to parse {path}: {message}")]
	Parse {
		/// Path to the document that failed to parse.
		path: PathBuf,
		/// Parser diagnostic.
		message: String,
	},

	/// Any other adapter-internal failure.
	#[error("{0}")]
	Internal(String),
}

/// The outcome of resolving a single key, when it is not a value.
///
/// Range and allowed-set rejections are recoverable: the registry substitutes
/// the key's declared default and logs a warning. A [`SourceError`] is not
/// recoverable per key and leaves the slot at its prior state.
#[derive(Debug, Error)]
pub enum ResolveError {
	/// The extracted value fell outside the key's exclusive `(min, max)` range.
	#[error("value '{value}' for key '{path}' is not in range ({min}, {max})")]
	OutOfRange {
		/// Dotted path of the offending key.
		path: String,
		/// Exclusive lower bound.
		min: Value,
		/// Exclusive upper bound.
		max: Value,
		/// The rejected value.
		value: Value,
	},

	/// The extracted value is not a member of the key's allowed set.
	#[error("value '{value}' for key '{path}' is not one of {allowed:?}")]
	NotAllowed {
		/// Dotted path of the offending key.
		path: String,
		/// The rejected value.
		value: Value,
		/// The closed set of acceptable values.
		allowed: Vec<Value>,
	},

	/// The source failed while extracting the raw value.
	#[error(transparent)]
	Source(#[from] SourceError),
}
