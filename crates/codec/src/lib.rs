//! Function reference codec.
//!
//! Turns a public, free-standing [`FunctionRef`] into a `module:name`
//! [`Token`] and resolves tokens back into invokable references through a
//! caller-supplied [`FunctionRegistry`].
//!
//! ```ignore
//! let codec = Codec::new(fnref_registry::linked());
//! let token = codec.encode(Some(&square_ref))?;          // "app::math@1.0.0:square"
//! let square = codec.decode_as::<fn(i64) -> i64>(&token.to_string())?;
//! assert_eq!(square(5), 25);
//! ```
//!
//! The codec holds no state beyond its registry and options and never logs;
//! every failure is returned as a [`CodecError`].

mod codec;
mod error;
pub mod options;
pub mod token;

pub use codec::{Codec, encode};
pub use error::{CodecError, ErrorKind};
pub use fnref_registry::{FunctionRef, FunctionRegistry, ModuleId, Signature};
pub use options::{CodecOptions, ConfigError, VersionMatch};
pub use token::{DELIMITER, Token, TokenError};
