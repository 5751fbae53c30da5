//! Codec configuration.
//!
//! Options deserialize from TOML with kebab-case keys:
//!
//! ```toml
//! max-token-len = 512
//! version-match = "latest"
//! ```

use serde::{Deserialize, Serialize};

/// Default upper bound on token length in bytes.
pub const DEFAULT_MAX_TOKEN_LEN: usize = 4096;

/// How a token's module version tag is matched against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionMatch {
	/// The module identifier must match exactly, version tag included.
	#[default]
	Exact,
	/// Fall back to the highest registered version of the same module path
	/// when the exact identifier is unknown.
	Latest,
}

/// Tunables for [`Codec`](crate::Codec).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CodecOptions {
	/// Tokens longer than this are malformed; encode refuses to produce them.
	pub max_token_len: usize,
	pub version_match: VersionMatch,
}

impl Default for CodecOptions {
	fn default() -> Self {
		Self {
			max_token_len: DEFAULT_MAX_TOKEN_LEN,
			version_match: VersionMatch::default(),
		}
	}
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),
	#[error("max-token-len must be greater than zero")]
	ZeroTokenLen,
}

impl CodecOptions {
	/// Parses options from a TOML document. Missing keys keep their defaults.
	pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
		let options: Self = toml::from_str(source)?;
		options.validate()?;
		Ok(options)
	}

	/// Checks invariants that the type system does not.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_token_len == 0 {
			return Err(ConfigError::ZeroTokenLen);
		}
		Ok(())
	}
}
