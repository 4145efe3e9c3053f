//! # bloxer: Lox as bytecode
//!
//! User's source code: `var average = (min + max) / 2;`
//!
//! ## Scanning
//!
//! The scanner turns raw characters into tokens on demand: punctuation `(`,
//! numbers `123`, string literals `"hi!"`, identifiers `min`. Whitespace and
//! comments vanish here. The compiler only ever needs the current and the
//! previous token, so nothing is buffered.
//!
//! ## Single-pass compiling
//!
//! There is no syntax tree. A Pratt parser interleaves parsing, analysis and
//! code generation: the moment a construct is recognized its bytecode is
//! appended to the current chunk, the unit of code that also owns a constant
//! pool and a line table. Precedence lives in a rule table mapping each token
//! to a prefix handler, an infix handler and a binding strength. Local
//! variables resolve to stack slots at compile time; a scope stack inside the
//! compiler mirrors what the VM's value stack will look like at runtime.
//! Variables captured by nested functions are routed through upvalues
//! instead.
//!
//! ## Running
//!
//! The virtual machine executes chunks on a value stack with one call frame
//! per live function call. Strings are interned in a heap owned by the VM, so
//! equal content means equal handle. Closures pair a compiled function with
//! the upvalue cells it captured; a cell aliases its stack slot while the
//! local is live and owns the value after the slot is closed.
//!
//! There is no garbage collector: objects live in arenas torn down with the
//! VM, so a long-running program that keeps creating strings keeps them until
//! shutdown.

pub mod cli;

mod chunk;
mod compiler;
mod error;
mod heap;
mod loxer;
mod scanner;
mod value;
mod vm;

pub use error::{
	LoxError, Result,
	compiler::CompileError,
	scanner::{ScanError, ScanErrorType},
	vm::{RuntimeError, RuntimeErrorType},
};
pub use heap::{ClosureId, FnId, NativeId, StrId};
pub use loxer::Loxer;
pub use value::{Obj, Value};
pub use vm::{FRAMES_MAX, STACK_MAX, Vm};
