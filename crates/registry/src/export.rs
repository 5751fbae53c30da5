//! Link-time function exports via `inventory`.
//!
//! Each [`export_fn!`](crate::export_fn) invocation defines the function,
//! creates an [`ExportedFn`] record next to it, and submits it via
//! `inventory::submit!`. [`TableRegistry::from_exports`] collects every record
//! linked into the binary; [`linked`] caches that table for the process.

use std::any::Any;
use std::sync::LazyLock;

use fnref_primitives::{ModuleId, Signature, Visibility};
use tracing::{debug, warn};

use crate::{FunctionRef, TableRegistry};

/// Static export record collected via `inventory`.
pub struct ExportedFn {
	/// `module_path!()` at the definition site.
	pub module_path: &'static str,
	/// Crate that defined the function.
	pub crate_name: &'static str,
	/// Version tag of the defining crate.
	pub crate_version: &'static str,
	/// Simple function name.
	pub name: &'static str,
	/// Visibility as declared.
	pub visibility: Visibility,
	/// Signature constructor; `TypeId` is not available in const context.
	pub signature: fn() -> Signature,
	/// The `fn` pointer, type-erased.
	pub target: &'static (dyn Any + Send + Sync),
}

impl ExportedFn {
	/// Returns `module_path@crate_version`.
	pub fn module_id(&self) -> ModuleId {
		ModuleId::from_static(self.module_path, Some(self.crate_version))
	}

	/// Builds the reference the registry stores for this export.
	pub fn to_function_ref(&self) -> FunctionRef {
		FunctionRef::from_static(self.module_id(), self.name, (self.signature)(), self.visibility, self.target)
	}
}

/// Wrapper for `inventory::collect!`.
pub struct ExportedFnReg(pub &'static ExportedFn);

inventory::collect!(ExportedFnReg);

impl TableRegistry {
	/// Builds a registry from every export linked into the binary.
	///
	/// Exports that fail registration are dropped with a warning.
	pub fn from_exports() -> Self {
		let registry = Self::new("linked");
		let mut dropped = 0usize;
		for reg in inventory::iter::<ExportedFnReg> {
			let export = reg.0;
			if let Err(err) = registry.register(export.to_function_ref()) {
				dropped += 1;
				warn!(crate_name = export.crate_name, %err, "dropping linked function export");
			}
		}
		debug!(
			registry = registry.label(),
			modules = registry.modules().len(),
			functions = registry.len(),
			dropped,
			"built linked function registry"
		);
		registry
	}
}

static LINKED: LazyLock<TableRegistry> = LazyLock::new(TableRegistry::from_exports);

/// Returns the process-wide registry of linked exports.
///
/// Built on first access. Pass it to the codec explicitly; tests that need
/// isolation build their own [`TableRegistry`].
pub fn linked() -> &'static TableRegistry {
	&LINKED
}

/// Defines a function and exports it for lookup by module and name.
///
/// The module identifier is `module_path!()` tagged with the defining crate's
/// version. Visibility is taken from the declaration: only a bare `pub`
/// export can be decoded. Parameter and return types must be `'static`.
///
/// ```ignore
/// fnref_registry::export_fn! {
///     /// Squares its input.
///     pub fn square(x: i64) -> i64 {
///         x * x
///     }
/// }
/// ```
#[macro_export]
macro_rules! export_fn {
	(
		$(#[$attr:meta])*
		$vis:vis fn $name:ident ( $($arg:ident : $ty:ty),* $(,)? ) -> $ret:ty $body:block
	) => {
		$(#[$attr])*
		$vis fn $name($($arg: $ty),*) -> $ret $body

		$crate::__private::paste::paste! {
			#[allow(non_upper_case_globals)]
			static [<__FNREF_PTR_ $name>]: fn($($ty),*) -> $ret = $name;

			#[allow(non_upper_case_globals)]
			static [<__FNREF_EXPORT_ $name>]: $crate::ExportedFn = $crate::ExportedFn {
				module_path: module_path!(),
				crate_name: env!("CARGO_PKG_NAME"),
				crate_version: env!("CARGO_PKG_VERSION"),
				name: stringify!($name),
				visibility: $crate::Visibility::from_qualifier(stringify!($vis)),
				signature: <fn($($ty),*) -> $ret as $crate::FnSignature>::signature,
				target: &[<__FNREF_PTR_ $name>],
			};

			$crate::__private::inventory::submit!($crate::ExportedFnReg(&[<__FNREF_EXPORT_ $name>]));
		}
	};
	(
		$(#[$attr:meta])*
		$vis:vis fn $name:ident ( $($arg:ident : $ty:ty),* $(,)? ) $body:block
	) => {
		$crate::export_fn! {
			$(#[$attr])*
			$vis fn $name($($arg : $ty),*) -> () $body
		}
	};
}
