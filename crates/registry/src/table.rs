//! Runtime function table with atomic publication.
//!
//! # Role
//!
//! [`TableRegistry`] is the explicit-registration [`FunctionRegistry`]. Reads
//! load an immutable snapshot without locking; writers build a new snapshot
//! and publish it with a compare-and-swap loop.
//!
//! # Invariants
//!
//! - Readers always observe a complete snapshot, never a half-applied write.
//! - Module slots are append-only. A module stays resolvable after its last
//!   function is unregistered, so handles never point at another module.
//! - Function names are simple identifiers.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use fnref_primitives::{ModuleId, is_simple_ident};
use rustc_hash::FxHashMap as HashMap;
use tracing::trace;

use crate::{FunctionRef, FunctionRegistry, ModuleHandle};

/// What to do when a `(module, name)` pair is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
	/// Keep the existing entry and return [`RegisterError::Duplicate`].
	#[default]
	Reject,
	/// Replace the existing entry.
	Replace,
}

/// Result of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
	/// The pair was new.
	InsertedNew,
	/// The pair existed and was replaced under [`DuplicatePolicy::Replace`].
	ReplacedExisting,
}

/// Registration failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegisterError {
	#[error("empty function name in module {module}")]
	EmptyName { module: ModuleId },
	#[error("function name {name:?} in module {module} is not a simple identifier")]
	InvalidName { module: ModuleId, name: String },
	#[error("duplicate function {module}:{name} rejected by {label} registry")]
	Duplicate {
		label: &'static str,
		module: ModuleId,
		name: String,
	},
}

#[derive(Clone)]
struct ModuleTable {
	id: ModuleId,
	functions: HashMap<Box<str>, FunctionRef>,
}

#[derive(Clone, Default)]
struct Snapshot {
	modules: Vec<Arc<ModuleTable>>,
	by_id: HashMap<ModuleId, usize>,
	len: usize,
}

impl Snapshot {
	fn module(&self, handle: &ModuleHandle) -> Option<&ModuleTable> {
		let table: &ModuleTable = match self.modules.get(handle.slot()) {
			Some(table) if table.id == *handle.id() => table,
			_ => &self.modules[*self.by_id.get(handle.id())?],
		};
		Some(table)
	}
}

/// Explicit-registration function registry.
pub struct TableRegistry {
	label: &'static str,
	snap: ArcSwap<Snapshot>,
	policy: DuplicatePolicy,
}

impl TableRegistry {
	/// Creates an empty registry that rejects duplicates.
	pub fn new(label: &'static str) -> Self {
		Self::with_policy(label, DuplicatePolicy::default())
	}

	/// Creates an empty registry with the given duplicate policy.
	pub fn with_policy(label: &'static str, policy: DuplicatePolicy) -> Self {
		Self {
			label,
			snap: ArcSwap::from_pointee(Snapshot::default()),
			policy,
		}
	}

	pub fn label(&self) -> &'static str {
		self.label
	}

	/// Registers a function with linearizable semantics.
	///
	/// Restricted and instance-bound references are accepted; lookups return
	/// them and decode filters them out.
	pub fn register(&self, function: FunctionRef) -> Result<RegistrationOutcome, RegisterError> {
		let name = function.name();
		if name.is_empty() {
			return Err(RegisterError::EmptyName {
				module: function.module().clone(),
			});
		}
		if !is_simple_ident(name) {
			return Err(RegisterError::InvalidName {
				module: function.module().clone(),
				name: name.to_owned(),
			});
		}

		loop {
			let old = self.snap.load_full();
			let mut next = Snapshot::clone(&old);

			let slot = match next.by_id.get(function.module()) {
				Some(&slot) => slot,
				None => {
					let slot = next.modules.len();
					next.modules.push(Arc::new(ModuleTable {
						id: function.module().clone(),
						functions: HashMap::default(),
					}));
					next.by_id.insert(function.module().clone(), slot);
					slot
				}
			};

			let table = Arc::make_mut(&mut next.modules[slot]);
			let outcome = if table.functions.contains_key(name) {
				match self.policy {
					DuplicatePolicy::Reject => {
						return Err(RegisterError::Duplicate {
							label: self.label,
							module: function.module().clone(),
							name: name.to_owned(),
						});
					}
					DuplicatePolicy::Replace => RegistrationOutcome::ReplacedExisting,
				}
			} else {
				next.len += 1;
				RegistrationOutcome::InsertedNew
			};
			table.functions.insert(Box::from(name), function.clone());

			let prev = self.snap.compare_and_swap(&old, Arc::new(next));
			if Arc::ptr_eq(&prev, &old) {
				trace!(
					registry = self.label,
					module = %function.module(),
					name,
					?outcome,
					"registered function"
				);
				return Ok(outcome);
			}
			// CAS failed, retry against the newer snapshot
		}
	}

	/// Registers every function, stopping at the first failure.
	pub fn register_all(&self, functions: impl IntoIterator<Item = FunctionRef>) -> Result<(), RegisterError> {
		for function in functions {
			self.register(function)?;
		}
		Ok(())
	}

	/// Removes a function, returning it if it was present.
	pub fn unregister(&self, module: &ModuleId, name: &str) -> Option<FunctionRef> {
		loop {
			let old = self.snap.load_full();
			let slot = *old.by_id.get(module)?;
			if !old.modules[slot].functions.contains_key(name) {
				return None;
			}

			let mut next = Snapshot::clone(&old);
			let removed = Arc::make_mut(&mut next.modules[slot]).functions.remove(name)?;
			next.len -= 1;

			let prev = self.snap.compare_and_swap(&old, Arc::new(next));
			if Arc::ptr_eq(&prev, &old) {
				trace!(registry = self.label, %module, name, "unregistered function");
				return Some(removed);
			}
		}
	}

	/// Returns the number of registered functions.
	pub fn len(&self) -> usize {
		self.snap.load().len
	}

	/// Returns true if no functions are registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns every known module identifier in registration order.
	pub fn modules(&self) -> Vec<ModuleId> {
		self.snap.load().modules.iter().map(|m| m.id.clone()).collect()
	}

	/// Returns the functions of a module sorted by name.
	pub fn functions(&self, module: &ModuleId) -> Vec<FunctionRef> {
		let snap = self.snap.load();
		let Some(&slot) = snap.by_id.get(module) else {
			return Vec::new();
		};
		let mut functions: Vec<_> = snap.modules[slot].functions.values().cloned().collect();
		functions.sort_by(|a, b| a.name().cmp(b.name()));
		functions
	}
}

impl FunctionRegistry for TableRegistry {
	fn resolve_module(&self, id: &ModuleId) -> Option<ModuleHandle> {
		let snap = self.snap.load();
		let slot = *snap.by_id.get(id)?;
		Some(ModuleHandle::new(id.clone(), slot))
	}

	fn resolve_function(&self, module: &ModuleHandle, name: &str) -> Option<FunctionRef> {
		let snap = self.snap.load();
		snap.module(module)?.functions.get(name).cloned()
	}

	fn resolve_module_latest(&self, path: &str) -> Option<ModuleHandle> {
		let snap = self.snap.load();
		snap.modules
			.iter()
			.enumerate()
			.filter(|(_, m)| m.id.path() == path)
			.max_by(|(_, a), (_, b)| a.id.cmp_version(&b.id))
			.map(|(slot, m)| ModuleHandle::new(m.id.clone(), slot))
	}
}

impl fmt::Debug for TableRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let snap = self.snap.load();
		f.debug_struct("TableRegistry")
			.field("label", &self.label)
			.field("policy", &self.policy)
			.field("modules", &snap.modules.len())
			.field("functions", &snap.len)
			.finish()
	}
}
