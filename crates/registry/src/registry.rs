//! The lookup contract consumed by the codec.

use std::sync::Arc;

use fnref_primitives::ModuleId;

use crate::FunctionRef;

/// A module resolved by a [`FunctionRegistry`].
///
/// `slot` is registry-private; implementations must still honor a handle
/// whose slot went stale after the registry changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleHandle {
	id: ModuleId,
	slot: usize,
}

impl ModuleHandle {
	pub fn new(id: ModuleId, slot: usize) -> Self {
		Self { id, slot }
	}

	/// Returns the identifier the module was registered under.
	pub fn id(&self) -> &ModuleId {
		&self.id
	}

	pub fn slot(&self) -> usize {
		self.slot
	}
}

/// Queryable mapping from `(module, name)` to a [`FunctionRef`].
///
/// Lookups are read-only and must be safe to call concurrently.
/// Visibility and binding are *not* filtered here: a registry returns
/// whatever it holds and the caller applies [`FunctionRef::is_public`] and
/// [`FunctionRef::is_free_standing`].
pub trait FunctionRegistry {
	/// Resolves an exact module identifier, version tag included.
	fn resolve_module(&self, id: &ModuleId) -> Option<ModuleHandle>;

	/// Finds a function by simple name within a resolved module.
	fn resolve_function(&self, module: &ModuleHandle, name: &str) -> Option<FunctionRef>;

	/// Resolves the highest registered version of a module path.
	///
	/// Registries that do not track versions keep the default.
	fn resolve_module_latest(&self, path: &str) -> Option<ModuleHandle> {
		let _ = path;
		None
	}
}

impl<R: FunctionRegistry + ?Sized> FunctionRegistry for &R {
	fn resolve_module(&self, id: &ModuleId) -> Option<ModuleHandle> {
		(**self).resolve_module(id)
	}

	fn resolve_function(&self, module: &ModuleHandle, name: &str) -> Option<FunctionRef> {
		(**self).resolve_function(module, name)
	}

	fn resolve_module_latest(&self, path: &str) -> Option<ModuleHandle> {
		(**self).resolve_module_latest(path)
	}
}

impl<R: FunctionRegistry + ?Sized> FunctionRegistry for Arc<R> {
	fn resolve_module(&self, id: &ModuleId) -> Option<ModuleHandle> {
		(**self).resolve_module(id)
	}

	fn resolve_function(&self, module: &ModuleHandle, name: &str) -> Option<FunctionRef> {
		(**self).resolve_function(module, name)
	}

	fn resolve_module_latest(&self, path: &str) -> Option<ModuleHandle> {
		(**self).resolve_module_latest(path)
	}
}
