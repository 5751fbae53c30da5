//! Encode and decode.
//!
//! # Invariants
//!
//! - Encode reads only the reference's identity metadata.
//! - Decode reads the registry and nothing else; for a fixed registry
//!   snapshot the same token always yields the same function or the same
//!   [`ErrorKind`](crate::ErrorKind).
//! - Every token encode returns parses back under the same options.

use fnref_primitives::{FnSignature, Signature};
use fnref_registry::{FunctionRef, FunctionRegistry, ModuleHandle};

use crate::options::DEFAULT_MAX_TOKEN_LEN;
use crate::{CodecError, CodecOptions, Token, TokenError, VersionMatch};

/// Longest token prefix kept in a [`CodecError::MalformedToken`].
const TOKEN_EXCERPT_LEN: usize = 256;

/// Encodes `reference` with the default options.
///
/// See [`Codec::encode`].
pub fn encode(reference: Option<&FunctionRef>) -> Result<Token, CodecError> {
	encode_with_limit(reference, DEFAULT_MAX_TOKEN_LEN)
}

fn encode_with_limit(reference: Option<&FunctionRef>, max_len: usize) -> Result<Token, CodecError> {
	let reference = reference.ok_or(CodecError::NullReference)?;
	let module = reference.module();
	let name = reference.name();
	if name.is_empty() || module.path().is_empty() {
		return Err(CodecError::NullReference);
	}
	if !reference.is_public() {
		return Err(CodecError::NotExternallyVisible {
			module: module.clone(),
			name: name.to_owned(),
		});
	}
	if !reference.is_free_standing() {
		return Err(CodecError::NotFreeStanding {
			module: module.clone(),
			name: name.to_owned(),
		});
	}

	let invalid = |reason| CodecError::InvalidIdentity {
		module: module.clone(),
		name: name.to_owned(),
		reason,
	};
	let token = Token::new(module.clone(), name).map_err(invalid)?;
	let len = token.encoded_len();
	if len > max_len {
		return Err(invalid(TokenError::TooLong { len, max: max_len }));
	}
	Ok(token)
}

/// Function reference codec over a caller-supplied registry.
///
/// `R` is usually `&'static TableRegistry` from
/// [`fnref_registry::linked`], an `Arc<TableRegistry>`, or a test double.
#[derive(Debug, Clone)]
pub struct Codec<R> {
	registry: R,
	options: CodecOptions,
}

impl<R: FunctionRegistry> Codec<R> {
	/// Creates a codec with default options.
	pub fn new(registry: R) -> Self {
		Self::with_options(registry, CodecOptions::default())
	}

	pub fn with_options(registry: R, options: CodecOptions) -> Self {
		Self { registry, options }
	}

	pub fn registry(&self) -> &R {
		&self.registry
	}

	pub fn options(&self) -> &CodecOptions {
		&self.options
	}

	/// Encodes a reference as a `module:name` token.
	///
	/// Fails with:
	/// * `NullReference` if `reference` is `None` or has an empty name.
	/// * `NotExternallyVisible` if it is not `pub`.
	/// * `NotFreeStanding` if it is bound to an instance.
	/// * `InvalidIdentity` if its name or length would not decode.
	pub fn encode(&self, reference: Option<&FunctionRef>) -> Result<Token, CodecError> {
		encode_with_limit(reference, self.options.max_token_len)
	}

	/// Resolves `token` to a public, free-standing function whose signature
	/// equals `expected`.
	pub fn decode(&self, token: &str, expected: &Signature) -> Result<FunctionRef, CodecError> {
		let parsed = Token::parse_with_limit(token, self.options.max_token_len).map_err(|reason| {
			CodecError::MalformedToken {
				token: excerpt(token),
				reason,
			}
		})?;
		self.resolve(token, &parsed, expected)
	}

	/// Like [`decode`](Self::decode) for an already parsed token.
	pub fn decode_token(&self, token: &Token, expected: &Signature) -> Result<FunctionRef, CodecError> {
		let raw = token.to_string();
		if raw.len() > self.options.max_token_len {
			return Err(CodecError::MalformedToken {
				token: excerpt(&raw),
				reason: TokenError::TooLong {
					len: raw.len(),
					max: self.options.max_token_len,
				},
			});
		}
		self.resolve(&raw, token, expected)
	}

	/// Decodes and binds in one step, deriving the expected signature from
	/// the `fn` pointer type `F`.
	pub fn decode_as<F: FnSignature>(&self, token: &str) -> Result<F, CodecError> {
		let expected = F::signature();
		let function = self.decode(token, &expected)?;
		function.bind::<F>().ok_or_else(|| CodecError::SignatureMismatch {
			token: token.to_owned(),
			actual: function.signature().clone(),
			expected,
		})
	}

	fn resolve(&self, raw: &str, token: &Token, expected: &Signature) -> Result<FunctionRef, CodecError> {
		let module = self.resolve_module(token).ok_or_else(|| CodecError::ModuleNotFound {
			token: raw.to_owned(),
			module: token.module().clone(),
		})?;

		let function = self
			.registry
			.resolve_function(&module, token.function())
			.filter(|f| f.is_public() && f.is_free_standing())
			.ok_or_else(|| CodecError::FunctionNotFound {
				token: raw.to_owned(),
				module: module.id().clone(),
				function: token.function().to_owned(),
			})?;

		if function.signature() != expected {
			return Err(CodecError::SignatureMismatch {
				token: raw.to_owned(),
				expected: expected.clone(),
				actual: function.signature().clone(),
			});
		}
		Ok(function)
	}

	fn resolve_module(&self, token: &Token) -> Option<ModuleHandle> {
		if let Some(handle) = self.registry.resolve_module(token.module()) {
			return Some(handle);
		}
		match self.options.version_match {
			VersionMatch::Exact => None,
			VersionMatch::Latest => self.registry.resolve_module_latest(token.module().path()),
		}
	}
}

fn excerpt(token: &str) -> String {
	if token.len() <= TOKEN_EXCERPT_LEN {
		return token.to_owned();
	}
	let mut end = TOKEN_EXCERPT_LEN;
	while !token.is_char_boundary(end) {
		end -= 1;
	}
	format!("{}...", &token[..end])
}

#[cfg(test)]
mod tests;
