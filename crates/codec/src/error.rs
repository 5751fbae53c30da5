use fnref_primitives::{ModuleId, Signature};

use crate::TokenError;

/// Failure category of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	NullReference,
	NotExternallyVisible,
	NotFreeStanding,
	InvalidIdentity,
	MalformedToken,
	ModuleNotFound,
	FunctionNotFound,
	SignatureMismatch,
}

/// Encode and decode failures.
///
/// The first four variants come from [`Codec::encode`](crate::Codec::encode),
/// the rest from decode.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
	#[error("function reference is absent or empty")]
	NullReference,

	#[error("{module}:{name} is not publicly invokable")]
	NotExternallyVisible { module: ModuleId, name: String },

	#[error("{module}:{name} requires an instance to invoke")]
	NotFreeStanding { module: ModuleId, name: String },

	/// The reference's identity would not survive a round trip.
	#[error("cannot encode {module}:{name}: {reason}")]
	InvalidIdentity {
		module: ModuleId,
		name: String,
		#[source]
		reason: TokenError,
	},

	#[error("malformed token {token:?}: {reason}")]
	MalformedToken {
		token: String,
		#[source]
		reason: TokenError,
	},

	#[error("module {module} of token {token:?} is not registered")]
	ModuleNotFound { token: String, module: ModuleId },

	#[error("no public free-standing function {function:?} in module {module} (token {token:?})")]
	FunctionNotFound {
		token: String,
		module: ModuleId,
		function: String,
	},

	#[error("signature mismatch for token {token:?}: expected {expected}, found {actual}")]
	SignatureMismatch {
		token: String,
		expected: Signature,
		actual: Signature,
	},
}

impl CodecError {
	/// Returns the failure category.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::NullReference => ErrorKind::NullReference,
			Self::NotExternallyVisible { .. } => ErrorKind::NotExternallyVisible,
			Self::NotFreeStanding { .. } => ErrorKind::NotFreeStanding,
			Self::InvalidIdentity { .. } => ErrorKind::InvalidIdentity,
			Self::MalformedToken { .. } => ErrorKind::MalformedToken,
			Self::ModuleNotFound { .. } => ErrorKind::ModuleNotFound,
			Self::FunctionNotFound { .. } => ErrorKind::FunctionNotFound,
			Self::SignatureMismatch { .. } => ErrorKind::SignatureMismatch,
		}
	}

	/// Returns the offending token for decode failures.
	pub fn token(&self) -> Option<&str> {
		match self {
			Self::MalformedToken { token, .. }
			| Self::ModuleNotFound { token, .. }
			| Self::FunctionNotFound { token, .. }
			| Self::SignatureMismatch { token, .. } => Some(token),
			_ => None,
		}
	}
}
