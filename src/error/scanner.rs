/// A lexical error with the line it occurred on.
///
/// Rendered in the same `[line N] Error: ...` form the compiler uses, minus a
/// lexeme: a malformed lexeme has no printable spelling.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("[line {line}] Error: {type}")]
pub struct ScanError {
	line:   usize,
	r#type: ScanErrorType,
}

impl ScanError {
	pub fn new(line: usize, r#type: ScanErrorType) -> Self { Self { line, r#type } }

	pub fn line(&self) -> usize { self.line }

	pub fn r#type(&self) -> ScanErrorType { self.r#type }
}

/// Types of lexical errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorType {
	/// A byte no Lox lexeme starts with.
	UnexpectedCharacter,
	/// A string literal still open at the end of the source.
	UnterminatedString,
	/// A digit sequence the float parser rejected.
	InvalidNumber,
}

impl std::fmt::Display for ScanErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ScanErrorType::*;
		match self {
			UnexpectedCharacter => write!(f, "Unexpected character."),
			UnterminatedString => write!(f, "Unterminated string."),
			InvalidNumber => write!(f, "Invalid number literal."),
		}
	}
}
