use serde::{Deserialize, Serialize};

/// Whether a function may be invoked from outside its defining module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
	/// Declared `pub` with no restriction.
	#[default]
	Public,
	/// Private, `pub(crate)`, `pub(super)` or `pub(in ..)`.
	Restricted,
}

impl Visibility {
	/// Classifies a stringified visibility qualifier, as produced by
	/// `stringify!($vis)` inside a macro.
	///
	/// Only a bare `pub` is public; the empty string and every `pub(..)` form
	/// are restricted.
	pub const fn from_qualifier(qualifier: &str) -> Self {
		let bytes = qualifier.as_bytes();
		let mut start = 0;
		let mut end = bytes.len();
		while start < end && bytes[start].is_ascii_whitespace() {
			start += 1;
		}
		while end > start && bytes[end - 1].is_ascii_whitespace() {
			end -= 1;
		}
		if end - start == 3 && bytes[start] == b'p' && bytes[start + 1] == b'u' && bytes[start + 2] == b'b' {
			Self::Public
		} else {
			Self::Restricted
		}
	}

	/// Returns true for [`Visibility::Public`].
	#[inline]
	pub const fn is_public(self) -> bool {
		matches!(self, Self::Public)
	}
}

/// Whether a function needs an owning instance to be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Binding {
	/// Free-standing: callable given only its module and name.
	#[default]
	Free,
	/// Method taking a receiver as its first parameter.
	Instance,
}

impl Binding {
	/// Returns true for [`Binding::Free`].
	#[inline]
	pub const fn is_free(self) -> bool {
		matches!(self, Self::Free)
	}
}
