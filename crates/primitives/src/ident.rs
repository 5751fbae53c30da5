/// Returns true if `name` is a simple identifier: a letter or `_` followed by
/// letters, digits or `_`.
///
/// A lone `_` is rejected since it can never name a function.
pub fn is_simple_ident(name: &str) -> bool {
	let mut chars = name.chars();
	let Some(first) = chars.next() else {
		return false;
	};
	if !(first.is_alphabetic() || first == '_') {
		return false;
	}
	if name == "_" {
		return false;
	}
	chars.all(|c| c.is_alphanumeric() || c == '_')
}
