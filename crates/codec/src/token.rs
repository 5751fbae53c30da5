//! Token wire format.
//!
//! A token is `<module-identifier>:<function-name>`, split on the single
//! *lone* colon:
//!
//! - `::` is a module path separator and never the boundary.
//! - A run of three or more colons is ambiguous and rejected.
//! - Zero lone colons, or more than one, is malformed.
//!
//! So `app::math@1.0.0:square` splits into `app::math@1.0.0` and `square`
//! without any escaping.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use fnref_primitives::{ModuleId, ModuleIdError, is_simple_ident};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::options::DEFAULT_MAX_TOKEN_LEN;

/// Boundary between module identifier and function name.
pub const DELIMITER: char = ':';

/// Token grammar violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
	#[error("token is empty")]
	Empty,
	#[error("token is {len} bytes, limit is {max}")]
	TooLong { len: usize, max: usize },
	#[error("no `:` between module and function name")]
	MissingDelimiter,
	#[error("more than one `:` delimiter (second at byte {at})")]
	ExtraDelimiter { at: usize },
	#[error("ambiguous run of {len} colons at byte {at}")]
	AmbiguousColons { at: usize, len: usize },
	#[error("module identifier is empty")]
	EmptyModule,
	#[error("function name is empty")]
	EmptyFunction,
	#[error("invalid module identifier: {0}")]
	Module(#[from] ModuleIdError),
	#[error("function name {0:?} is not a simple identifier")]
	InvalidFunction(String),
}

/// A parsed `module:name` token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
	module: ModuleId,
	function: String,
}

impl Token {
	/// Builds a token from parts, validating both against the grammar.
	pub fn new(module: ModuleId, function: impl Into<String>) -> Result<Self, TokenError> {
		module.validate()?;
		let function = function.into();
		check_function(&function)?;
		Ok(Self { module, function })
	}

	/// Parses a token using the default length limit.
	pub fn parse(raw: &str) -> Result<Self, TokenError> {
		Self::parse_with_limit(raw, DEFAULT_MAX_TOKEN_LEN)
	}

	/// Parses a token no longer than `max_len` bytes.
	pub fn parse_with_limit(raw: &str, max_len: usize) -> Result<Self, TokenError> {
		if raw.is_empty() {
			return Err(TokenError::Empty);
		}
		if raw.len() > max_len {
			return Err(TokenError::TooLong {
				len: raw.len(),
				max: max_len,
			});
		}

		let at = find_boundary(raw)?;
		let (module, function) = (&raw[..at], &raw[at + DELIMITER.len_utf8()..]);
		if module.is_empty() {
			return Err(TokenError::EmptyModule);
		}
		if function.is_empty() {
			return Err(TokenError::EmptyFunction);
		}

		let module = ModuleId::parse(module)?;
		check_function(function)?;
		Ok(Self {
			module,
			function: function.to_owned(),
		})
	}

	/// Returns the module identifier.
	pub fn module(&self) -> &ModuleId {
		&self.module
	}

	/// Returns the simple function name.
	pub fn function(&self) -> &str {
		&self.function
	}

	/// Returns the length of the encoded form in bytes.
	pub fn encoded_len(&self) -> usize {
		// Display of the module is path [+ '@' + version].
		let module = self.module.path().len() + self.module.version().map_or(0, |v| v.len() + 1);
		module + DELIMITER.len_utf8() + self.function.len()
	}
}

pub(crate) fn check_function(function: &str) -> Result<(), TokenError> {
	if function.is_empty() {
		return Err(TokenError::EmptyFunction);
	}
	if !is_simple_ident(function) {
		return Err(TokenError::InvalidFunction(function.to_owned()));
	}
	Ok(())
}

/// Finds the byte offset of the single lone colon.
fn find_boundary(raw: &str) -> Result<usize, TokenError> {
	let bytes = raw.as_bytes();
	let mut boundary = None;
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] != b':' {
			i += 1;
			continue;
		}
		let start = i;
		while i < bytes.len() && bytes[i] == b':' {
			i += 1;
		}
		match i - start {
			1 if boundary.is_some() => return Err(TokenError::ExtraDelimiter { at: start }),
			1 => boundary = Some(start),
			2 => {}
			len => return Err(TokenError::AmbiguousColons { at: start, len }),
		}
	}
	boundary.ok_or(TokenError::MissingDelimiter)
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{DELIMITER}{}", self.module, self.function)
	}
}

impl fmt::Debug for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Token({self})")
	}
}

impl FromStr for Token {
	type Err = TokenError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl Serialize for Token {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Token {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = Cow::<'de, str>::deserialize(deserializer)?;
		Self::parse(&raw).map_err(serde::de::Error::custom)
	}
}
