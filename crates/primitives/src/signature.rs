//! Call signatures described at the type level.
//!
//! A [`Signature`] lists parameter types in order plus the return type. Two
//! signatures are compatible exactly when every component has the same
//! [`TypeId`]; names are carried only for diagnostics.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

/// A single type in a signature.
#[derive(Clone, Copy)]
pub struct TypeDesc {
	id: TypeId,
	name: &'static str,
}

impl TypeDesc {
	/// Describes `T`.
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
		}
	}

	/// Returns the runtime type identity.
	#[inline]
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Returns the compiler-provided type name.
	#[inline]
	pub fn name(&self) -> &'static str {
		self.name
	}

	fn is_unit(&self) -> bool {
		self.id == TypeId::of::<()>()
	}
}

impl PartialEq for TypeDesc {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeDesc {}

impl Hash for TypeDesc {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeDesc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl fmt::Display for TypeDesc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Ordered parameter types plus a return type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
	params: SmallVec<[TypeDesc; 4]>,
	ret: TypeDesc,
}

impl Signature {
	/// Creates a signature from its parts.
	pub fn new(params: &[TypeDesc], ret: TypeDesc) -> Self {
		Self {
			params: SmallVec::from_slice(params),
			ret,
		}
	}

	/// Returns the signature of the `fn` pointer type `F`.
	pub fn of<F: FnSignature>() -> Self {
		F::signature()
	}

	/// Returns the parameter types in order.
	pub fn params(&self) -> &[TypeDesc] {
		&self.params
	}

	/// Returns the return type.
	pub fn ret(&self) -> TypeDesc {
		self.ret
	}

	/// Returns the number of parameters.
	pub fn arity(&self) -> usize {
		self.params.len()
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("fn(")?;
		for (idx, param) in self.params.iter().enumerate() {
			if idx > 0 {
				f.write_str(", ")?;
			}
			f.write_str(param.name())?;
		}
		f.write_str(")")?;
		if !self.ret.is_unit() {
			write!(f, " -> {}", self.ret)?;
		}
		Ok(())
	}
}

impl fmt::Debug for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Signature({self})")
	}
}

/// Implemented for plain `fn` pointer types whose parameter and return types
/// are `'static`.
///
/// Higher-ranked pointers such as `fn(&str) -> usize` are not covered; use
/// owned parameter types for registered functions.
pub trait FnSignature: Copy + Send + Sync + 'static {
	/// Describes this pointer type.
	fn signature() -> Signature;
}

macro_rules! impl_fn_signature {
	($($param:ident),*) => {
		impl<Ret: 'static, $($param: 'static),*> FnSignature for fn($($param),*) -> Ret {
			fn signature() -> Signature {
				Signature::new(&[$(TypeDesc::of::<$param>()),*], TypeDesc::of::<Ret>())
			}
		}
	};
}

impl_fn_signature!();
impl_fn_signature!(A);
impl_fn_signature!(A, B);
impl_fn_signature!(A, B, C);
impl_fn_signature!(A, B, C, D);
impl_fn_signature!(A, B, C, D, E);
impl_fn_signature!(A, B, C, D, E, F);
impl_fn_signature!(A, B, C, D, E, F, G);
impl_fn_signature!(A, B, C, D, E, F, G, H);
