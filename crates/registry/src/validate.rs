//! Constraint checks applied after raw extraction.
//!
//! Validation is composition, not hierarchy: a key is a plain description
//! plus optional attached constraints, and this module applies whichever are
//! present. Checks run only on a successfully extracted raw value — a default
//! substituted for a missing key is trusted implicitly and never revalidated.

use std::cmp::Ordering;

use crate::error::ResolveError;
use crate::key::KeyDef;
use crate::value::Value;

/// Applies the key's optional constraints to an extracted value.
///
/// The allowed-set check runs first, then the range check. Range bounds are
/// strict exclusive: the value must satisfy `min < value < max`, so a value
/// equal to either bound is rejected. A value that compares with neither
/// bound (NaN) cannot satisfy the constraint and is rejected too.
pub(crate) fn check(def: &KeyDef, value: Value) -> Result<Value, ResolveError> {
	if let Some(allowed) = &def.allowed
		&& !allowed.contains(&value)
	{
		return Err(ResolveError::NotAllowed {
			path: def.path.clone(),
			value,
			allowed: allowed.clone(),
		});
	}

	if let Some((min, max)) = &def.range {
		let within = min
			.partial_cmp_same_kind(&value)
			.is_some_and(|o| o == Ordering::Less)
			&& max
				.partial_cmp_same_kind(&value)
				.is_some_and(|o| o == Ordering::Greater);

		if !within {
			return Err(ResolveError::OutOfRange {
				path: def.path.clone(),
				min: min.clone(),
				max: max.clone(),
				value,
			});
		}
	}

	Ok(value)
}
