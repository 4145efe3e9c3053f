pub mod compiler;
pub mod scanner;
pub mod vm;

/// LoxError is the top-level error type for the bloxer compiler and virtual machine.
///
/// Compile-time diagnostics are streamed to stderr as they are discovered so
/// that one bad statement does not hide the next; the `CompileErrors` variant
/// only carries how many were reported.
#[derive(thiserror::Error, Debug)]
pub enum LoxError {
	/// Internal fault outside the language semantics, should never happen
	#[error("InternalError: {0}")]
	InternalError(#[from] anyhow::Error),
	/// The source failed to compile; individual diagnostics are already on stderr
	#[error("Generated {0} compile errors")]
	CompileErrors(usize),
	/// The program aborted; the payload renders the message and stack trace
	#[error(transparent)]
	RuntimeError(#[from] vm::RuntimeError),
	/// The source file could not be opened or read
	#[error("Could not open file \"{0}\".")]
	FileRead(String),
}

pub type Result<T> = std::result::Result<T, LoxError>;
