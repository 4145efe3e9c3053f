/// Types of runtime errors. Each renders the exact message the VM reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeErrorType {
	/// Unary `-` applied to something that is not a number.
	OperandMustBeNumber,
	/// Arithmetic or comparison on non-number operands.
	OperandsMustBeNumbers,
	/// `+` on operands that are neither two numbers nor two strings.
	OperandsMustBeNumbersOrStrings,
	/// Read of, or assignment to, a global that was never defined.
	UndefinedVariable(String),
	/// Call of a value that is not a closure or native function.
	NotCallable,
	/// Call with the wrong number of arguments.
	ArityMismatch { expected: usize, got: usize },
	/// The call-frame stack is full.
	StackOverflow,
}

impl std::fmt::Display for RuntimeErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use RuntimeErrorType::*;
		match self {
			OperandMustBeNumber => write!(f, "Operand must be a number."),
			OperandsMustBeNumbers => write!(f, "Operands must be numbers."),
			OperandsMustBeNumbersOrStrings => {
				write!(f, "Operands must be two numbers or two strings.")
			}
			UndefinedVariable(name) => write!(f, "Undefined variable '{name}'."),
			NotCallable => write!(f, "Can only call functions and classes."),
			ArityMismatch { expected, got } => {
				write!(f, "Expected {expected} arguments, but got {got}.")
			}
			StackOverflow => write!(f, "Stack overflow."),
		}
	}
}

/// A runtime error plus the call-stack trace captured when it was raised.
///
/// Displays as the message followed by one `[line N] in <name>()` line per
/// frame, innermost first, with the outermost frame rendered as `in script`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
	r#type: RuntimeErrorType,
	trace:  Vec<String>,
}

impl RuntimeError {
	pub(crate) fn new(r#type: RuntimeErrorType, trace: Vec<String>) -> Self { Self { r#type, trace } }

	pub fn r#type(&self) -> &RuntimeErrorType { &self.r#type }
}

impl std::fmt::Display for RuntimeError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.r#type)?;
		for line in &self.trace {
			write!(f, "\n{line}")?;
		}
		Ok(())
	}
}

impl std::error::Error for RuntimeError {}
