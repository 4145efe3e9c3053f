//! The bytecode virtual machine.
//!
//! A strictly single-threaded stack machine. Every expression evaluates by
//! pushing and popping a shared value stack; function calls push a
//! [`CallFrame`] whose `base` marks the window of stack slots holding the
//! callee (slot zero) and its parameters, so arguments become locals for
//! free. Dispatch is one tight loop over the current frame's bytecode.
//!
//! The VM owns the [`Heap`] behind all object handles, the globals table and
//! the string intern table inside the heap, so `==` on two string values is
//! an id comparison and `+` on strings re-interns the concatenation.
//!
//! Closures capture variables through upvalue cells. While a captured local
//! is still on the stack its cell is open and aliases the slot; the open
//! cells form a queue ordered by slot so that leaving a scope, or returning
//! from a function, closes exactly the cells above the boundary by moving
//! the slot's value into the cell.
//!
//! A runtime error carries the message and a stack trace, resets the VM, and
//! leaves it ready for the next `interpret`: the REPL keeps its globals.

pub(crate) mod natives;

use std::{
	collections::HashMap,
	io::{self, Write},
	time::Instant,
};

use anyhow::Context;

use crate::{
	chunk::{Chunk, OpCode},
	compiler,
	error::{
		vm::{RuntimeError, RuntimeErrorType},
		LoxError,
	},
	heap::{
		object::{Closure, Upvalue},
		ClosureId, Heap, StrId, UpvalueId,
	},
	value::{Obj, Value},
};

/// Maximum depth of the call-frame stack.
pub const FRAMES_MAX: usize = 64;
/// Capacity of the value stack: one full window of 256 slots per frame.
pub const STACK_MAX: usize = FRAMES_MAX * (u8::MAX as usize + 1);

/// One function activation: the closure being run, its instruction pointer,
/// and the stack slot its window starts at. Slot zero holds the callee, the
/// arguments sit in slots `1..=arity`.
struct CallFrame {
	closure: ClosureId,
	ip:      usize,
	base:    usize,
}

macro_rules! binary_op {
	($self:expr, $wrap:expr, $op:tt) => {{
		let (Value::Number(b), Value::Number(a)) = ($self.peek(0), $self.peek(1)) else {
			return Err($self.fail(RuntimeErrorType::OperandsMustBeNumbers));
		};
		$self.pop();
		$self.pop();
		$self.push($wrap(a $op b));
	}};
}

/// The virtual machine. One `Vm` is one independent interpreter; globals and
/// interned strings persist across `interpret` calls.
pub struct Vm {
	frames:        Vec<CallFrame>,
	stack:         Vec<Value>,
	globals:       HashMap<StrId, Value>,
	/// Upvalues still aliasing stack slots, ordered by slot, deepest last.
	open_upvalues: Vec<(usize, UpvalueId)>,
	heap:          Heap,
	started:       Instant,
	output:        Box<dyn Write>,
}

impl Vm {
	pub fn new() -> Self { Self::with_output(Box::new(io::stdout())) }

	/// A VM writing program output to `output` instead of stdout.
	pub fn with_output(output: Box<dyn Write>) -> Self {
		let mut vm = Self {
			frames: Vec::with_capacity(FRAMES_MAX),
			stack: Vec::with_capacity(STACK_MAX),
			globals: HashMap::new(),
			open_upvalues: Vec::new(),
			heap: Heap::new(),
			started: Instant::now(),
			output,
		};
		natives::register(&mut vm);
		vm
	}

	/// Compile and run `source`.
	pub fn interpret(&mut self, source: &str) -> Result<(), LoxError> {
		let function = compiler::compile(source, &mut self.heap)?;
		let closure = self.heap.alloc_closure(Closure { function, upvalues: Vec::new() });
		self.push(Value::Obj(Obj::Closure(closure)));
		self.call(closure, 0)?;
		self.run()?;
		debug_assert!(self.stack.is_empty(), "a clean top-level run must balance the stack");
		Ok(())
	}

	// ------------------------------------------------------------------
	// Dispatch
	// ------------------------------------------------------------------

	fn run(&mut self) -> Result<(), LoxError> {
		loop {
			#[cfg(feature = "trace")]
			self.trace_instruction();

			match OpCode::from(self.read_byte()) {
				OpCode::Constant => {
					let value = self.read_constant();
					self.push(value);
				}
				OpCode::ConstantLong => {
					let index = self.read_u24();
					let value = self.current_chunk().constants[index];
					self.push(value);
				}
				OpCode::Nil => self.push(Value::Nil),
				OpCode::True => self.push(Value::Bool(true)),
				OpCode::False => self.push(Value::Bool(false)),
				OpCode::Pop => {
					self.pop();
				}
				OpCode::GetLocal => {
					let slot = self.read_byte() as usize;
					let base = self.frame().base;
					let value = self.stack[base + slot];
					self.push(value);
				}
				OpCode::SetLocal => {
					let slot = self.read_byte() as usize;
					let value = self.peek(0);
					let base = self.frame().base;
					self.stack[base + slot] = value;
				}
				OpCode::GetGlobal => {
					let name = self.read_string();
					match self.globals.get(&name) {
						Some(&value) => self.push(value),
						None => {
							let name = self.heap.string(name).to_string();
							return Err(self.fail(RuntimeErrorType::UndefinedVariable(name)));
						}
					}
				}
				OpCode::DefineGlobal => {
					let name = self.read_string();
					let value = self.peek(0);
					self.globals.insert(name, value);
					self.pop();
				}
				OpCode::SetGlobal => {
					let name = self.read_string();
					if !self.globals.contains_key(&name) {
						let name = self.heap.string(name).to_string();
						return Err(self.fail(RuntimeErrorType::UndefinedVariable(name)));
					}
					let value = self.peek(0);
					self.globals.insert(name, value);
				}
				OpCode::GetUpvalue => {
					let slot = self.read_byte() as usize;
					let id = self.heap.closure(self.frame().closure).upvalues[slot];
					let value = match *self.heap.upvalue(id) {
						Upvalue::Open(stack_slot) => self.stack[stack_slot],
						Upvalue::Closed(value) => value,
					};
					self.push(value);
				}
				OpCode::SetUpvalue => {
					let slot = self.read_byte() as usize;
					let id = self.heap.closure(self.frame().closure).upvalues[slot];
					let value = self.peek(0);
					match *self.heap.upvalue(id) {
						Upvalue::Open(stack_slot) => self.stack[stack_slot] = value,
						Upvalue::Closed(_) => *self.heap.upvalue_mut(id) = Upvalue::Closed(value),
					}
				}
				OpCode::CloseUpvalue => {
					self.close_upvalues(self.stack.len() - 1);
					self.pop();
				}
				OpCode::Equal => {
					let b = self.pop();
					let a = self.pop();
					self.push(Value::Bool(a == b));
				}
				OpCode::Greater => binary_op!(self, Value::Bool, >),
				OpCode::Less => binary_op!(self, Value::Bool, <),
				OpCode::Add => match (self.peek(1), self.peek(0)) {
					(Value::Number(a), Value::Number(b)) => {
						self.pop();
						self.pop();
						self.push(Value::Number(a + b));
					}
					(Value::Obj(Obj::Str(a)), Value::Obj(Obj::Str(b))) => {
						self.pop();
						self.pop();
						// Interning makes a duplicate concatenation free: the
						// id of an existing string comes back instead.
						let text = format!("{}{}", self.heap.string(a), self.heap.string(b));
						let id = self.heap.intern(&text);
						self.push(Value::Obj(Obj::Str(id)));
					}
					_ => return Err(self.fail(RuntimeErrorType::OperandsMustBeNumbersOrStrings)),
				},
				OpCode::Subtract => binary_op!(self, Value::Number, -),
				OpCode::Multiply => binary_op!(self, Value::Number, *),
				OpCode::Divide => binary_op!(self, Value::Number, /),
				OpCode::Not => {
					let value = self.pop();
					self.push(Value::Bool(value.is_falsey()));
				}
				OpCode::Negate => {
					let Value::Number(n) = self.peek(0) else {
						return Err(self.fail(RuntimeErrorType::OperandMustBeNumber));
					};
					self.pop();
					self.push(Value::Number(-n));
				}
				OpCode::Print => {
					let value = self.pop();
					let text = self.heap.display(value).to_string();
					writeln!(self.output, "{text}").context("Failed write program output")?;
				}
				OpCode::Jump => {
					let offset = self.read_u16();
					self.frame_mut().ip += offset;
				}
				OpCode::JumpIfFalse => {
					let offset = self.read_u16();
					if self.peek(0).is_falsey() {
						self.frame_mut().ip += offset;
					}
				}
				OpCode::Loop => {
					let offset = self.read_u16();
					self.frame_mut().ip -= offset;
				}
				OpCode::Call => {
					let arg_count = self.read_byte() as usize;
					let callee = self.peek(arg_count);
					self.call_value(callee, arg_count)?;
				}
				OpCode::Closure => {
					let function = match self.read_constant() {
						Value::Obj(Obj::Function(id)) => id,
						other => unreachable!("CLOSURE wraps a function constant, found {other:?}"),
					};
					let count = self.heap.function(function).upvalue_count;
					let mut upvalues = Vec::with_capacity(count);
					for _ in 0..count {
						let is_local = self.read_byte() != 0;
						let index = self.read_byte() as usize;
						if is_local {
							let slot = self.frame().base + index;
							upvalues.push(self.capture_upvalue(slot));
						} else {
							upvalues.push(self.heap.closure(self.frame().closure).upvalues[index]);
						}
					}
					let closure = self.heap.alloc_closure(Closure { function, upvalues });
					self.push(Value::Obj(Obj::Closure(closure)));
				}
				OpCode::Return => {
					let result = self.pop();
					let base = self.frame().base;
					// Any local of this frame still captured gets hoisted
					// into its cell before the slots disappear.
					self.close_upvalues(base);
					self.frames.pop();
					if self.frames.is_empty() {
						// Pop the top-level script closure itself.
						self.pop();
						return Ok(());
					}
					self.stack.truncate(base);
					self.push(result);
				}
			}
		}
	}

	// ------------------------------------------------------------------
	// Decoding
	// ------------------------------------------------------------------

	fn frame(&self) -> &CallFrame {
		self.frames.last().expect("the VM only dispatches inside a call frame")
	}

	fn frame_mut(&mut self) -> &mut CallFrame {
		self.frames.last_mut().expect("the VM only dispatches inside a call frame")
	}

	fn current_chunk(&self) -> &Chunk {
		let frame = self.frame();
		&self.heap.function(self.heap.closure(frame.closure).function).chunk
	}

	fn read_byte(&mut self) -> u8 {
		let frame = self.frames.last_mut().expect("the VM only dispatches inside a call frame");
		let function = self.heap.closure(frame.closure).function;
		let byte = self.heap.function(function).chunk.code[frame.ip];
		frame.ip += 1;
		byte
	}

	fn read_u16(&mut self) -> usize {
		let hi = self.read_byte() as usize;
		let lo = self.read_byte() as usize;
		(hi << 8) | lo
	}

	fn read_u24(&mut self) -> usize {
		let hi = self.read_byte() as usize;
		let mid = self.read_byte() as usize;
		let lo = self.read_byte() as usize;
		(hi << 16) | (mid << 8) | lo
	}

	fn read_constant(&mut self) -> Value {
		let index = self.read_byte() as usize;
		self.current_chunk().constants[index]
	}

	fn read_string(&mut self) -> StrId {
		match self.read_constant() {
			Value::Obj(Obj::Str(id)) => id,
			other => unreachable!("name operands are always string constants, found {other:?}"),
		}
	}

	// ------------------------------------------------------------------
	// Stack
	// ------------------------------------------------------------------

	fn push(&mut self, value: Value) { self.stack.push(value); }

	fn pop(&mut self) -> Value {
		self.stack.pop().expect("compiled code never pops below the frame base")
	}

	fn peek(&self, distance: usize) -> Value { self.stack[self.stack.len() - 1 - distance] }

	// ------------------------------------------------------------------
	// Calls
	// ------------------------------------------------------------------

	fn call_value(&mut self, callee: Value, arg_count: usize) -> Result<(), LoxError> {
		match callee {
			Value::Obj(Obj::Closure(closure)) => self.call(closure, arg_count),
			Value::Obj(Obj::Native(native)) => {
				let function = self.heap.native(native).function;
				let first_arg = self.stack.len() - arg_count;
				let args: Vec<Value> = self.stack[first_arg..].to_vec();
				let result = function(self, &args);
				// Drop the arguments and the native itself.
				self.stack.truncate(first_arg - 1);
				self.push(result);
				Ok(())
			}
			_ => Err(self.fail(RuntimeErrorType::NotCallable)),
		}
	}

	fn call(&mut self, closure: ClosureId, arg_count: usize) -> Result<(), LoxError> {
		let arity = self.heap.function(self.heap.closure(closure).function).arity;
		if arg_count != arity {
			return Err(self.fail(RuntimeErrorType::ArityMismatch { expected: arity, got: arg_count }));
		}
		if self.frames.len() == FRAMES_MAX {
			return Err(self.fail(RuntimeErrorType::StackOverflow));
		}
		self.frames.push(CallFrame { closure, ip: 0, base: self.stack.len() - arg_count - 1 });
		Ok(())
	}

	// ------------------------------------------------------------------
	// Upvalues
	// ------------------------------------------------------------------

	/// Find or create the upvalue aliasing `slot`; one cell per slot, ever.
	fn capture_upvalue(&mut self, slot: usize) -> UpvalueId {
		for &(open_slot, id) in self.open_upvalues.iter().rev() {
			if open_slot == slot {
				return id;
			}
			if open_slot < slot {
				break;
			}
		}
		let id = self.heap.alloc_upvalue(Upvalue::Open(slot));
		let position = self.open_upvalues.partition_point(|&(open_slot, _)| open_slot < slot);
		self.open_upvalues.insert(position, (slot, id));
		id
	}

	/// Close every open upvalue at or above `boundary`: move the stack value
	/// into the cell and drop the cell from the open queue.
	fn close_upvalues(&mut self, boundary: usize) {
		while let Some(&(slot, id)) = self.open_upvalues.last() {
			if slot < boundary {
				break;
			}
			*self.heap.upvalue_mut(id) = Upvalue::Closed(self.stack[slot]);
			self.open_upvalues.pop();
		}
	}

	// ------------------------------------------------------------------
	// Errors
	// ------------------------------------------------------------------

	/// Build a runtime error carrying the stack trace, then reset the VM so
	/// the next `interpret` starts clean.
	fn fail(&mut self, r#type: RuntimeErrorType) -> LoxError {
		let mut trace = Vec::with_capacity(self.frames.len());
		for frame in self.frames.iter().rev() {
			let function = self.heap.function(self.heap.closure(frame.closure).function);
			// ip already advanced past the operands; every byte of an
			// instruction carries the same line.
			let line = function.chunk.lines[frame.ip - 1];
			let entry = match function.name {
				Some(name) => format!("[line {line}] in {}()", self.heap.string(name)),
				None => format!("[line {line}] in script"),
			};
			trace.push(entry);
		}
		self.stack.clear();
		self.frames.clear();
		self.open_upvalues.clear();
		RuntimeError::new(r#type, trace).into()
	}

	#[cfg(feature = "trace")]
	fn trace_instruction(&mut self) {
		use std::fmt::Write as _;
		let mut slots = String::new();
		for value in &self.stack {
			let _ = write!(slots, "[ {} ]", self.heap.display(*value));
		}
		eprintln!("          {slots}");
		let mut text = String::new();
		crate::chunk::debug::disassemble_instruction(self.current_chunk(), self.frame().ip, &self.heap, &mut text);
		eprint!("{text}");
	}
}

impl Default for Vm {
	fn default() -> Self { Self::new() }
}
