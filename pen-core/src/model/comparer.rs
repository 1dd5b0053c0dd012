use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::Arc;

/// A total order (and equality) over token values.
///
/// The comparer is supplied once at `Pen` construction and is the only way
/// tokens are ever compared: index construction, pattern search and sentinel
/// detection all go through it. Tokens are never compared by identity.
///
/// # Invariants
/// - `compare` is a total order: antisymmetric, transitive, and total.
/// - An absent token (`None`) must have a consistent place in the order.
///
/// # Persistence
/// `descriptor` names the comparer in snapshots. Deserialization only
/// accepts descriptors of the comparers provided by this crate; a custom
/// comparer can be used at runtime but its snapshots will not decode
/// elsewhere unless the same descriptor is registered.
pub trait Comparer: Debug + Send + Sync {
	/// Stable identifier stored in snapshots.
	fn descriptor(&self) -> &'static str;

	/// Three-way comparison of two (possibly absent) token values.
	fn compare(&self, a: Option<&str>, b: Option<&str>) -> Ordering;

	/// Equality under this order.
	fn equal(&self, a: Option<&str>, b: Option<&str>) -> bool {
		self.compare(a, b) == Ordering::Equal
	}
}

/// Byte-ordinal token order, the default.
///
/// An absent token sorts before any present token; present tokens are
/// compared bytewise.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ordinal;

impl Comparer for Ordinal {
	fn descriptor(&self) -> &'static str {
		"ordinal"
	}

	fn compare(&self, a: Option<&str>, b: Option<&str>) -> Ordering {
		a.cmp(&b)
	}
}

/// Case-insensitive ordinal order.
///
/// Present tokens are compared after Unicode lowercasing, character by
/// character. An absent token still sorts before any present token.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinalIgnoreCase;

impl Comparer for OrdinalIgnoreCase {
	fn descriptor(&self) -> &'static str {
		"ordinal-ignore-case"
	}

	fn compare(&self, a: Option<&str>, b: Option<&str>) -> Ordering {
		match (a, b) {
			(None, None) => Ordering::Equal,
			(None, Some(_)) => Ordering::Less,
			(Some(_), None) => Ordering::Greater,
			(Some(x), Some(y)) => x
				.chars()
				.flat_map(char::to_lowercase)
				.cmp(y.chars().flat_map(char::to_lowercase)),
		}
	}
}

/// Reconstructs a provided comparer from its snapshot descriptor.
///
/// Returns `None` for unknown descriptors; the caller decides how to fail.
pub(crate) fn from_descriptor(descriptor: &str) -> Option<Arc<dyn Comparer>> {
	match descriptor {
		"ordinal" => Some(Arc::new(Ordinal)),
		"ordinal-ignore-case" => Some(Arc::new(OrdinalIgnoreCase)),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ordinal_absent_sorts_first() {
		let c = Ordinal;
		assert_eq!(c.compare(None, Some("a")), Ordering::Less);
		assert_eq!(c.compare(Some("a"), None), Ordering::Greater);
		assert_eq!(c.compare(None, None), Ordering::Equal);
	}

	#[test]
	fn ordinal_is_bytewise() {
		let c = Ordinal;
		assert_eq!(c.compare(Some("ran"), Some("sat")), Ordering::Less);
		assert_eq!(c.compare(Some("the"), Some("the")), Ordering::Equal);
		// Uppercase letters sort before lowercase in byte order
		assert_eq!(c.compare(Some("The"), Some("the")), Ordering::Less);
	}

	#[test]
	fn ignore_case_folds() {
		let c = OrdinalIgnoreCase;
		assert!(c.equal(Some("The"), Some("the")));
		assert_eq!(c.compare(Some("CAT"), Some("dog")), Ordering::Less);
		assert!(!c.equal(None, Some("")));
	}

	#[test]
	fn descriptor_round_trip() {
		for comparer in [Ordinal.descriptor(), OrdinalIgnoreCase.descriptor()] {
			let rebuilt = from_descriptor(comparer).unwrap();
			assert_eq!(rebuilt.descriptor(), comparer);
		}
		assert!(from_descriptor("no-such-order").is_none());
	}
}
