//! Function registries.
//!
//! A registry maps `(module, name)` to a [`FunctionRef`]. Two population
//! strategies are provided:
//!
//! * [`TableRegistry::register`] for explicit registration at runtime.
//! * [`export_fn!`] for link-time collection via `inventory`, gathered by
//!   [`TableRegistry::from_exports`] and the process-wide [`linked`] table.
//!
//! Consumers only see the [`FunctionRegistry`] trait.

pub mod export;
pub mod function;
pub mod registry;
pub mod table;

pub use export::{ExportedFn, ExportedFnReg, linked};
pub use fnref_primitives::{Binding, FnSignature, ModuleId, Signature, TypeDesc, Visibility};
pub use function::FunctionRef;
pub use registry::{FunctionRegistry, ModuleHandle};
pub use table::{DuplicatePolicy, RegisterError, RegistrationOutcome, TableRegistry};

#[doc(hidden)]
pub mod __private {
	pub use inventory;
	pub use paste;
}
