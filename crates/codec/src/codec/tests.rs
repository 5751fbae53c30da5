use std::sync::atomic::{AtomicUsize, Ordering};

use fnref_primitives::{ModuleId, Signature, Visibility};
use fnref_registry::{FunctionRef, FunctionRegistry, ModuleHandle, TableRegistry};
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::{Codec, encode};
use crate::{CodecError, CodecOptions, ErrorKind, Token, TokenError, VersionMatch};

fn square(x: i64) -> i64 {
	x * x
}

fn negate(x: i64) -> i64 {
	-x
}

fn module(raw: &str) -> ModuleId {
	ModuleId::parse(raw).expect("valid module id")
}

fn square_ref() -> FunctionRef {
	FunctionRef::new(module("MathUtils"), "Square", square as fn(i64) -> i64)
}

fn math_registry() -> TableRegistry {
	let registry = TableRegistry::new("math");
	registry.register(square_ref()).expect("register Square");
	registry
		.register(FunctionRef::new(module("MathUtils"), "Hidden", negate as fn(i64) -> i64).with_visibility(Visibility::Restricted))
		.expect("register Hidden");
	registry
		.register(FunctionRef::method(module("MathUtils"), "Method", negate as fn(i64) -> i64))
		.expect("register Method");
	registry
}

fn int_to_int() -> Signature {
	Signature::of::<fn(i64) -> i64>()
}

#[test]
fn square_scenario() {
	let codec = Codec::new(math_registry());

	let token = codec.encode(Some(&square_ref())).expect("encode");
	assert_eq!(token.to_string(), "MathUtils:Square");

	let decoded = codec.decode("MathUtils:Square", &int_to_int()).expect("decode");
	let f = decoded.bind::<fn(i64) -> i64>().expect("bind");
	assert_eq!(f(5), 25);
}

#[test]
fn encode_absent_reference() {
	let err = encode(None).expect_err("absent reference");
	assert_eq!(err.kind(), ErrorKind::NullReference);
}

#[test]
fn encode_empty_name_is_null() {
	let empty = FunctionRef::new(module("MathUtils"), "", square as fn(i64) -> i64);
	assert_eq!(encode(Some(&empty)).expect_err("empty name").kind(), ErrorKind::NullReference);
}

#[test]
fn encode_rejects_restricted() {
	let hidden = square_ref().with_visibility(Visibility::Restricted);
	match encode(Some(&hidden)) {
		Err(CodecError::NotExternallyVisible { module: m, name }) => {
			assert_eq!(m, module("MathUtils"));
			assert_eq!(name, "Square");
		}
		other => panic!("expected NotExternallyVisible, got {other:?}"),
	}
}

#[test]
fn encode_rejects_instance_bound() {
	let method = FunctionRef::method(module("MathUtils"), "Square", square as fn(i64) -> i64);
	assert_eq!(encode(Some(&method)).expect_err("method").kind(), ErrorKind::NotFreeStanding);
}

#[test]
fn visibility_is_checked_before_binding() {
	let both = FunctionRef::method(module("MathUtils"), "Square", square as fn(i64) -> i64).with_visibility(Visibility::Restricted);
	assert_eq!(encode(Some(&both)).expect_err("both").kind(), ErrorKind::NotExternallyVisible);
}

#[test]
fn encode_rejects_names_that_would_not_decode() {
	let dashed = FunctionRef::new(module("MathUtils"), "on-save", square as fn(i64) -> i64);
	match encode(Some(&dashed)) {
		Err(CodecError::InvalidIdentity { reason, .. }) => {
			assert_eq!(reason, TokenError::InvalidFunction("on-save".to_owned()));
		}
		other => panic!("expected InvalidIdentity, got {other:?}"),
	}
}

#[rstest]
#[case::lone_colon("a:b", None)]
#[case::empty_version("MathUtils", Some(""))]
#[case::space("my mod", None)]
fn encode_rejects_modules_that_would_not_decode(#[case] path: &'static str, #[case] version: Option<&'static str>) {
	let reference = FunctionRef::new(ModuleId::from_static(path, version), "Square", square as fn(i64) -> i64);
	match encode(Some(&reference)) {
		Err(CodecError::InvalidIdentity {
			reason: TokenError::Module(_),
			..
		}) => {}
		other => panic!("expected InvalidIdentity, got {other:?}"),
	}

	let raw = format!("{}:Square", ModuleId::from_static(path, version));
	let err = Codec::new(math_registry()).decode(&raw, &Signature::of::<fn(i64) -> i64>()).expect_err("malformed");
	assert_eq!(err.kind(), ErrorKind::MalformedToken);
}

#[test]
fn encode_respects_length_limit() {
	let options = CodecOptions {
		max_token_len: 8,
		..CodecOptions::default()
	};
	let codec = Codec::with_options(TableRegistry::new("empty"), options);
	match codec.encode(Some(&square_ref())) {
		Err(CodecError::InvalidIdentity {
			reason: TokenError::TooLong { len, max },
			..
		}) => {
			assert_eq!(len, "MathUtils:Square".len());
			assert_eq!(max, 8);
		}
		other => panic!("expected TooLong, got {other:?}"),
	}
}

#[test]
fn decode_malformed_tokens() {
	let codec = Codec::new(math_registry());
	for raw in ["", "noColonHere", "MathUtils:Square:extra", ":Square", "MathUtils:"] {
		let err = codec.decode(raw, &int_to_int()).expect_err("malformed");
		assert_eq!(err.kind(), ErrorKind::MalformedToken, "token {raw:?}");
		assert_eq!(err.token(), Some(raw));
	}
}

#[test]
fn decode_truncates_oversized_tokens_in_errors() {
	let codec = Codec::new(math_registry());
	let raw = format!("{}:f", "m".repeat(10_000));
	match codec.decode(&raw, &int_to_int()) {
		Err(CodecError::MalformedToken { token, reason }) => {
			assert!(matches!(reason, TokenError::TooLong { .. }));
			assert!(token.len() < 300, "excerpt is {} bytes", token.len());
			assert!(token.ends_with("..."));
		}
		other => panic!("expected MalformedToken, got {other:?}"),
	}
}

#[test]
fn decode_unknown_module() {
	let codec = Codec::new(math_registry());
	match codec.decode("NoSuchModule:someFn", &int_to_int()) {
		Err(CodecError::ModuleNotFound { token, module: m }) => {
			assert_eq!(token, "NoSuchModule:someFn");
			assert_eq!(m, module("NoSuchModule"));
		}
		other => panic!("expected ModuleNotFound, got {other:?}"),
	}
}

#[test]
fn decode_unknown_function() {
	let codec = Codec::new(math_registry());
	let err = codec.decode("MathUtils:noSuchFunction", &int_to_int()).expect_err("unknown function");
	assert_eq!(err.kind(), ErrorKind::FunctionNotFound);
	assert_eq!(err.token(), Some("MathUtils:noSuchFunction"));
}

#[test]
fn decode_hides_restricted_and_instance_functions() {
	let codec = Codec::new(math_registry());
	for raw in ["MathUtils:Hidden", "MathUtils:Method"] {
		let err = codec.decode(raw, &int_to_int()).expect_err("not decodable");
		assert_eq!(err.kind(), ErrorKind::FunctionNotFound, "token {raw:?}");
	}
}

#[test]
fn decode_signature_mismatch_reports_both_sides() {
	let codec = Codec::new(math_registry());
	let expected = Signature::of::<fn(String) -> bool>();
	match codec.decode("MathUtils:Square", &expected) {
		Err(CodecError::SignatureMismatch {
			token,
			expected: e,
			actual,
		}) => {
			assert_eq!(token, "MathUtils:Square");
			assert_eq!(e, expected);
			assert_eq!(actual, int_to_int());
		}
		other => panic!("expected SignatureMismatch, got {other:?}"),
	}
}

#[test]
fn decode_as_binds_typed_pointer() {
	let codec = Codec::new(math_registry());
	let f = codec.decode_as::<fn(i64) -> i64>("MathUtils:Square").expect("decode_as");
	assert_eq!(f(-4), 16);

	let err = codec.decode_as::<fn(i32) -> i32>("MathUtils:Square").expect_err("wrong type");
	assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
}

#[test]
fn decode_token_skips_parsing() {
	let codec = Codec::new(math_registry());
	let token = Token::parse("MathUtils:Square").expect("token");
	let f = codec.decode_token(&token, &int_to_int()).expect("decode_token");
	assert_eq!(f.name(), "Square");

	let tight = Codec::with_options(
		math_registry(),
		CodecOptions {
			max_token_len: 4,
			..CodecOptions::default()
		},
	);
	assert_eq!(tight.decode_token(&token, &int_to_int()).expect_err("too long").kind(), ErrorKind::MalformedToken);
}

#[test]
fn decode_is_deterministic() {
	let codec = Codec::new(math_registry());
	for raw in ["MathUtils:Square", "MathUtils:nope", "Nope:f", "bad"] {
		let first = codec.decode(raw, &int_to_int()).map(|f| f.name().to_owned()).map_err(|e| e.kind());
		let second = codec.decode(raw, &int_to_int()).map(|f| f.name().to_owned()).map_err(|e| e.kind());
		assert_eq!(first, second, "token {raw:?}");
	}
}

fn versioned_registry() -> TableRegistry {
	let registry = TableRegistry::new("versions");
	registry
		.register(FunctionRef::new(module("app::cb@1.0.0"), "run", negate as fn(i64) -> i64))
		.expect("v1");
	registry
		.register(FunctionRef::new(module("app::cb@1.2.0"), "run", square as fn(i64) -> i64))
		.expect("v1.2");
	registry
}

#[test]
fn exact_version_match_is_default() {
	let codec = Codec::new(versioned_registry());
	let err = codec.decode("app::cb@0.9.0:run", &int_to_int()).expect_err("old version");
	assert_eq!(err.kind(), ErrorKind::ModuleNotFound);

	let v1 = codec.decode_as::<fn(i64) -> i64>("app::cb@1.0.0:run").expect("exact v1");
	assert_eq!(v1(3), -3);
}

#[test]
fn latest_version_match_falls_back() {
	let options = CodecOptions {
		version_match: VersionMatch::Latest,
		..CodecOptions::default()
	};
	let codec = Codec::with_options(versioned_registry(), options);

	let fallback = codec.decode_as::<fn(i64) -> i64>("app::cb@0.9.0:run").expect("fallback");
	assert_eq!(fallback(3), 9);
	let unversioned = codec.decode_as::<fn(i64) -> i64>("app::cb:run").expect("unversioned");
	assert_eq!(unversioned(3), 9);

	// An exact hit still wins over the newest version.
	let exact = codec.decode_as::<fn(i64) -> i64>("app::cb@1.0.0:run").expect("exact");
	assert_eq!(exact(3), -3);

	assert_eq!(codec.decode("other::cb:run", &int_to_int()).expect_err("missing").kind(), ErrorKind::ModuleNotFound);
}

/// Registry double with a single function that counts lookups.
struct SingleFunction {
	function: FunctionRef,
	lookups: AtomicUsize,
}

impl FunctionRegistry for SingleFunction {
	fn resolve_module(&self, id: &ModuleId) -> Option<ModuleHandle> {
		self.lookups.fetch_add(1, Ordering::Relaxed);
		(id == self.function.module()).then(|| ModuleHandle::new(id.clone(), 0))
	}

	fn resolve_function(&self, module: &ModuleHandle, name: &str) -> Option<FunctionRef> {
		self.lookups.fetch_add(1, Ordering::Relaxed);
		(module.id() == self.function.module() && name == self.function.name()).then(|| self.function.clone())
	}
}

#[test]
fn codec_accepts_any_registry() {
	let registry = SingleFunction {
		function: square_ref(),
		lookups: AtomicUsize::new(0),
	};
	let options = CodecOptions {
		version_match: VersionMatch::Latest,
		..CodecOptions::default()
	};
	let codec = Codec::with_options(&registry, options);

	assert_eq!(codec.decode_as::<fn(i64) -> i64>("MathUtils:Square").expect("decode")(6), 36);
	assert_eq!(registry.lookups.load(Ordering::Relaxed), 2);

	// Default `resolve_module_latest` finds nothing.
	let err = codec.decode("MathUtils@2.0.0:Square", &int_to_int()).expect_err("no version tracking");
	assert_eq!(err.kind(), ErrorKind::ModuleNotFound);
}

#[test]
fn encode_does_not_touch_registry() {
	let registry = SingleFunction {
		function: square_ref(),
		lookups: AtomicUsize::new(0),
	};
	let codec = Codec::new(&registry);
	codec.encode(Some(&square_ref())).expect("encode");
	assert_eq!(registry.lookups.load(Ordering::Relaxed), 0);
}

#[test]
fn error_messages_name_the_problem() {
	let codec = Codec::new(math_registry());
	let err = codec.decode("MathUtils:Square", &Signature::of::<fn() -> bool>()).expect_err("mismatch");
	let msg = err.to_string();
	assert!(msg.contains("fn() -> bool"), "{msg}");
	assert!(msg.contains("fn(i64) -> i64"), "{msg}");

	let err = codec.decode("noColonHere", &int_to_int()).expect_err("malformed");
	assert!(err.to_string().contains("noColonHere"), "{err}");
}
