//! The object kinds living in the [`Heap`](super::Heap).

use crate::{
	chunk::Chunk,
	heap::{FnId, StrId, UpvalueId},
	value::Value,
	vm::Vm,
};

/// A compiled function: the compile-time artifact an `OP_CLOSURE` instruction
/// wraps at runtime. The top-level script is a nameless function of arity 0.
#[derive(Debug)]
pub(crate) struct Function {
	pub name:          Option<StrId>,
	pub arity:         usize,
	pub upvalue_count: usize,
	pub chunk:         Chunk,
}

impl Function {
	/// The nameless top-level function.
	pub fn script() -> Self { Self { name: None, arity: 0, upvalue_count: 0, chunk: Chunk::new() } }

	pub fn named(name: StrId) -> Self {
		Self { name: Some(name), arity: 0, upvalue_count: 0, chunk: Chunk::new() }
	}
}

/// Runtime pairing of a function with the upvalues it captured, sized by the
/// function's `upvalue_count`.
#[derive(Debug)]
pub(crate) struct Closure {
	pub function: FnId,
	pub upvalues: Vec<UpvalueId>,
}

/// A captured variable cell.
///
/// While the captured local is still on the stack the cell is `Open` and
/// aliases its slot; closing moves the value into the cell, after which reads
/// and writes through the upvalue keep hitting that same storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Upvalue {
	Open(usize),
	Closed(Value),
}

/// Signature of a host function callable from Lox. Natives receive the popped
/// arguments and run without a call frame of their own.
pub type NativeFn = fn(&mut Vm, &[Value]) -> Value;

/// A host-provided function. Its name lives in the globals table entry that
/// points at it.
#[derive(Debug)]
pub(crate) struct Native {
	pub function: NativeFn,
}
