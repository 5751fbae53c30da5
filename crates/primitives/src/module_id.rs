//! Module identifiers.
//!
//! A module identifier names the compilation unit a function lives in:
//! a `::`-separated path, optionally followed by `@` and a version tag.
//!
//! ```text
//! MathUtils
//! app::callbacks
//! app::callbacks@1.4.0
//! ```
//!
//! # Invariants
//!
//! - A valid identifier never contains a lone `:`. Colons only appear as
//!   `::` path separators, so a token's single lone colon is unambiguous.
//! - The version tag, when present, is non-empty and holds no `:` or `@`.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Separator between module path segments.
pub const PATH_SEPARATOR: &str = "::";

/// Separator between the module path and its version tag.
pub const VERSION_SEPARATOR: char = '@';

/// Grammar violations in a module identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleIdError {
	#[error("module identifier is empty")]
	Empty,
	#[error("empty path segment at byte {at}")]
	EmptySegment { at: usize },
	#[error("invalid character {ch:?} in module path at byte {at}")]
	InvalidPathChar { ch: char, at: usize },
	#[error("version tag is empty")]
	EmptyVersion,
	#[error("invalid character {ch:?} in version tag")]
	InvalidVersionChar { ch: char },
}

/// Identifier of the module that defines a function.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ModuleId {
	path: Cow<'static, str>,
	version: Option<Cow<'static, str>>,
}

impl ModuleId {
	/// Parses `path` or `path@version`.
	pub fn parse(s: &str) -> Result<Self, ModuleIdError> {
		let (path, version) = match s.split_once(VERSION_SEPARATOR) {
			Some((path, version)) => (path, Some(version)),
			None => (s, None),
		};
		validate_path(path)?;
		if let Some(version) = version {
			validate_version(version)?;
		}
		Ok(Self {
			path: Cow::Owned(path.to_owned()),
			version: version.map(|v| Cow::Owned(v.to_owned())),
		})
	}

	/// Creates an unversioned identifier from a path.
	pub fn new(path: impl Into<Cow<'static, str>>) -> Result<Self, ModuleIdError> {
		let path = path.into();
		validate_path(&path)?;
		Ok(Self { path, version: None })
	}

	/// Attaches (or replaces) the version tag.
	pub fn with_version(mut self, version: impl Into<Cow<'static, str>>) -> Result<Self, ModuleIdError> {
		let version = version.into();
		validate_version(&version)?;
		self.version = Some(version);
		Ok(self)
	}

	/// Builds an identifier from static parts without validation.
	///
	/// Intended for `module_path!()` and `env!("CARGO_PKG_VERSION")`, which
	/// always satisfy the grammar. Other callers should run
	/// [`validate`](Self::validate) before relying on the result.
	pub const fn from_static(path: &'static str, version: Option<&'static str>) -> Self {
		let version = match version {
			Some(v) => Some(Cow::Borrowed(v)),
			None => None,
		};
		Self {
			path: Cow::Borrowed(path),
			version,
		}
	}

	/// Returns the `::`-separated module path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns the version tag, if any.
	pub fn version(&self) -> Option<&str> {
		self.version.as_deref()
	}

	/// Checks the identifier against the grammar.
	///
	/// Always succeeds for identifiers built by [`parse`](Self::parse),
	/// [`new`](Self::new) or [`with_version`](Self::with_version).
	pub fn validate(&self) -> Result<(), ModuleIdError> {
		validate_path(&self.path)?;
		match &self.version {
			Some(version) => validate_version(version),
			None => Ok(()),
		}
	}

	/// Orders two identifiers of the same path by version.
	///
	/// Dot-separated numeric components compare numerically, other
	/// components lexically. An unversioned identifier sorts first.
	pub fn cmp_version(&self, other: &ModuleId) -> Ordering {
		match (self.version(), other.version()) {
			(None, None) => Ordering::Equal,
			(None, Some(_)) => Ordering::Less,
			(Some(_), None) => Ordering::Greater,
			(Some(a), Some(b)) => cmp_version_tags(a, b),
		}
	}
}

fn cmp_version_tags(a: &str, b: &str) -> Ordering {
	let mut lhs = a.split('.');
	let mut rhs = b.split('.');
	loop {
		match (lhs.next(), rhs.next()) {
			(None, None) => return Ordering::Equal,
			(None, Some(_)) => return Ordering::Less,
			(Some(_), None) => return Ordering::Greater,
			(Some(x), Some(y)) => {
				let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
					(Ok(x), Ok(y)) => x.cmp(&y),
					_ => x.cmp(y),
				};
				if ord != Ordering::Equal {
					return ord;
				}
			}
		}
	}
}

fn is_path_char(c: char) -> bool {
	c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn is_version_char(c: char) -> bool {
	c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_')
}

fn validate_path(path: &str) -> Result<(), ModuleIdError> {
	if path.is_empty() {
		return Err(ModuleIdError::Empty);
	}
	let mut offset = 0;
	for segment in path.split(PATH_SEPARATOR) {
		if segment.is_empty() {
			return Err(ModuleIdError::EmptySegment { at: offset });
		}
		if let Some((idx, ch)) = segment.char_indices().find(|&(_, c)| !is_path_char(c)) {
			return Err(ModuleIdError::InvalidPathChar { ch, at: offset + idx });
		}
		offset += segment.len() + PATH_SEPARATOR.len();
	}
	Ok(())
}

fn validate_version(version: &str) -> Result<(), ModuleIdError> {
	if version.is_empty() {
		return Err(ModuleIdError::EmptyVersion);
	}
	match version.chars().find(|&c| !is_version_char(c)) {
		Some(ch) => Err(ModuleIdError::InvalidVersionChar { ch }),
		None => Ok(()),
	}
}

impl fmt::Display for ModuleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.path)?;
		if let Some(version) = &self.version {
			write!(f, "{VERSION_SEPARATOR}{version}")?;
		}
		Ok(())
	}
}

impl fmt::Debug for ModuleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ModuleId({self})")
	}
}

impl FromStr for ModuleId {
	type Err = ModuleIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl Serialize for ModuleId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for ModuleId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = Cow::<'de, str>::deserialize(deserializer)?;
		Self::parse(&raw).map_err(serde::de::Error::custom)
	}
}
