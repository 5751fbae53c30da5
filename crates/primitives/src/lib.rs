//! Identity vocabulary shared by the function reference registry and codec.
//!
//! Nothing here knows how functions are stored or looked up. These types only
//! describe *which* function is meant: the module it lives in, its simple
//! name, its call signature, and whether it may be invoked from outside.

/// Visibility and binding flags.
pub mod access;
/// Simple identifier grammar.
pub mod ident;
/// Module identifiers (`path::to::module@version`).
pub mod module_id;
/// Type-level call signatures.
pub mod signature;

pub use access::{Binding, Visibility};
pub use ident::is_simple_ident;
pub use module_id::{ModuleId, ModuleIdError};
pub use signature::{FnSignature, Signature, TypeDesc};
