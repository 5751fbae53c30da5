//! Invokable function references.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use fnref_primitives::{Binding, FnSignature, ModuleId, Signature, Visibility};

type ErasedFn = dyn Any + Send + Sync;

#[derive(Clone)]
enum Target {
	/// Pointer stored in a link-time export.
	Static(&'static ErasedFn),
	/// Pointer boxed at runtime registration.
	Shared(Arc<ErasedFn>),
}

impl Target {
	fn as_any(&self) -> &ErasedFn {
		match self {
			Target::Static(f) => *f,
			Target::Shared(f) => f.as_ref(),
		}
	}
}

/// Handle to a named function together with its identity metadata.
///
/// The callable is a plain `fn` pointer stored type-erased; [`bind`] recovers
/// it when the requested pointer type matches the recorded [`Signature`].
/// Cloning is cheap.
///
/// [`bind`]: FunctionRef::bind
#[derive(Clone)]
pub struct FunctionRef {
	module: ModuleId,
	name: Cow<'static, str>,
	signature: Signature,
	visibility: Visibility,
	binding: Binding,
	target: Target,
}

impl FunctionRef {
	/// Creates a reference to a public, free-standing function.
	pub fn new<F: FnSignature>(module: ModuleId, name: impl Into<Cow<'static, str>>, f: F) -> Self {
		Self {
			module,
			name: name.into(),
			signature: F::signature(),
			visibility: Visibility::Public,
			binding: Binding::Free,
			target: Target::Shared(Arc::new(f)),
		}
	}

	/// Creates a reference to a method whose first parameter is its receiver.
	///
	/// Such references can be registered and inspected but are never encoded
	/// or returned by decode.
	pub fn method<F: FnSignature>(module: ModuleId, name: impl Into<Cow<'static, str>>, f: F) -> Self {
		Self {
			binding: Binding::Instance,
			..Self::new(module, name, f)
		}
	}

	pub(crate) fn from_static(
		module: ModuleId,
		name: &'static str,
		signature: Signature,
		visibility: Visibility,
		target: &'static ErasedFn,
	) -> Self {
		Self {
			module,
			name: Cow::Borrowed(name),
			signature,
			visibility,
			binding: Binding::Free,
			target: Target::Static(target),
		}
	}

	/// Overrides the visibility flag.
	pub fn with_visibility(mut self, visibility: Visibility) -> Self {
		self.visibility = visibility;
		self
	}

	/// Returns the defining module.
	pub fn module(&self) -> &ModuleId {
		&self.module
	}

	/// Returns the simple function name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the recorded call signature.
	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	pub fn visibility(&self) -> Visibility {
		self.visibility
	}

	pub fn binding(&self) -> Binding {
		self.binding
	}

	/// Returns true if the function may be called from outside its module.
	#[inline]
	pub fn is_public(&self) -> bool {
		self.visibility.is_public()
	}

	/// Returns true if the function needs no owning instance.
	#[inline]
	pub fn is_free_standing(&self) -> bool {
		self.binding.is_free()
	}

	/// Recovers the callable as the `fn` pointer type `F`.
	///
	/// Returns `None` if `F` does not match the recorded signature.
	pub fn bind<F: FnSignature>(&self) -> Option<F> {
		if F::signature() != self.signature {
			return None;
		}
		self.target.as_any().downcast_ref::<F>().copied()
	}
}

impl fmt::Debug for FunctionRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FunctionRef")
			.field("module", &self.module)
			.field("name", &self.name)
			.field("signature", &self.signature)
			.field("visibility", &self.visibility)
			.field("binding", &self.binding)
			.finish_non_exhaustive()
	}
}
