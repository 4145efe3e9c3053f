//! The object heap: one arena per object kind, addressed by typed ids.
//!
//! Ids are plain indices, so handles stay `Copy` and comparing two handles is
//! comparing two integers. Nothing is ever freed individually; the whole heap
//! is torn down when the VM that owns it is dropped.
//!
//! Strings are interned through [`Heap::intern`]: the table maps content to
//! id, so two equal-content strings always share one entry and string
//! identity doubles as content equality.
pub(crate) mod object;

use std::{collections::HashMap, fmt, rc::Rc};

use object::{Closure, Function, Native, Upvalue};

use crate::value::{Obj, Value};

/// Identifies an interned string. Equal ids mean equal content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrId(u32);

/// Identifies a compiled function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FnId(u32);

/// Identifies a runtime closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureId(u32);

/// Identifies an upvalue cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpvalueId(u32);

/// Identifies a registered native function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeId(u32);

/// The arenas behind every [`Obj`] handle.
#[derive(Default)]
pub(crate) struct Heap {
	strings:   Vec<Rc<str>>,
	intern:    HashMap<Rc<str>, StrId>,
	functions: Vec<Function>,
	closures:  Vec<Closure>,
	upvalues:  Vec<Upvalue>,
	natives:   Vec<Native>,
}

impl Heap {
	pub fn new() -> Self { Self::default() }

	/// Intern `text`, returning the id shared by every string with this
	/// content. Allocates only on first sight.
	pub fn intern(&mut self, text: &str) -> StrId {
		if let Some(&id) = self.intern.get(text) {
			return id;
		}
		let content: Rc<str> = Rc::from(text);
		let id = StrId(self.strings.len() as u32);
		self.strings.push(Rc::clone(&content));
		self.intern.insert(content, id);
		id
	}

	pub fn string(&self, id: StrId) -> &str { &self.strings[id.0 as usize] }

	pub fn alloc_function(&mut self, function: Function) -> FnId {
		self.functions.push(function);
		FnId(self.functions.len() as u32 - 1)
	}

	pub fn function(&self, id: FnId) -> &Function { &self.functions[id.0 as usize] }

	pub fn alloc_closure(&mut self, closure: Closure) -> ClosureId {
		self.closures.push(closure);
		ClosureId(self.closures.len() as u32 - 1)
	}

	pub fn closure(&self, id: ClosureId) -> &Closure { &self.closures[id.0 as usize] }

	pub fn alloc_upvalue(&mut self, upvalue: Upvalue) -> UpvalueId {
		self.upvalues.push(upvalue);
		UpvalueId(self.upvalues.len() as u32 - 1)
	}

	pub fn upvalue(&self, id: UpvalueId) -> &Upvalue { &self.upvalues[id.0 as usize] }

	pub fn upvalue_mut(&mut self, id: UpvalueId) -> &mut Upvalue { &mut self.upvalues[id.0 as usize] }

	pub fn alloc_native(&mut self, native: Native) -> NativeId {
		self.natives.push(native);
		NativeId(self.natives.len() as u32 - 1)
	}

	pub fn native(&self, id: NativeId) -> &Native { &self.natives[id.0 as usize] }

	/// Adapter that resolves object handles while printing a value.
	pub fn display(&self, value: Value) -> ValueDisplay<'_> { ValueDisplay { heap: self, value } }
}

/// Prints a value in its user-facing form; needs the heap to follow handles.
pub(crate) struct ValueDisplay<'h> {
	heap:  &'h Heap,
	value: Value,
}

impl fmt::Display for ValueDisplay<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.value {
			Value::Nil => write!(f, "nil"),
			Value::Bool(b) => write!(f, "{b}"),
			Value::Number(n) => write!(f, "{n}"),
			Value::Obj(Obj::Str(id)) => write!(f, "{}", self.heap.string(id)),
			Value::Obj(Obj::Function(id)) => self.heap.write_function_name(f, id),
			Value::Obj(Obj::Closure(id)) => {
				let function = self.heap.closure(id).function;
				self.heap.write_function_name(f, function)
			}
			Value::Obj(Obj::Native(_)) => write!(f, "<native fn>"),
		}
	}
}

impl Heap {
	fn write_function_name(&self, f: &mut fmt::Formatter<'_>, id: FnId) -> fmt::Result {
		match self.function(id).name {
			Some(name) => write!(f, "<fn {}>", self.string(name)),
			None => write!(f, "<script>"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interning_shares_one_entry_per_content() {
		let mut heap = Heap::new();
		let a = heap.intern("foo");
		let b = heap.intern("foo");
		let c = heap.intern("bar");
		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_eq!(heap.string(a), "foo");
	}

	#[test]
	fn interning_reuses_concatenation_results() {
		let mut heap = Heap::new();
		let whole = heap.intern("foobar");
		let glued = {
			let text = format!("{}{}", "foo", "bar");
			heap.intern(&text)
		};
		assert_eq!(whole, glued);
	}

	#[test]
	fn printed_forms() {
		let mut heap = Heap::new();
		let id = heap.intern("hi");
		assert_eq!(heap.display(Value::Nil).to_string(), "nil");
		assert_eq!(heap.display(Value::Bool(true)).to_string(), "true");
		assert_eq!(heap.display(Value::Number(7.0)).to_string(), "7");
		assert_eq!(heap.display(Value::Number(2.5)).to_string(), "2.5");
		assert_eq!(heap.display(Value::Obj(Obj::Str(id))).to_string(), "hi");

		let script = heap.alloc_function(object::Function::script());
		assert_eq!(heap.display(Value::Obj(Obj::Function(script))).to_string(), "<script>");

		let name = heap.intern("make");
		let named = heap.alloc_function(object::Function::named(name));
		let closure = heap.alloc_closure(Closure { function: named, upvalues: Vec::new() });
		assert_eq!(heap.display(Value::Obj(Obj::Closure(closure))).to_string(), "<fn make>");
	}
}
