//! Host functions exposed to Lox programs.
//!
//! Natives are registered straight into the globals table when the VM is
//! built. They receive their already-popped arguments and run without a call
//! frame, so they never appear in stack traces.

use std::io::{self, BufRead, Write};

use super::Vm;
use crate::{
	heap::object::{Native, NativeFn},
	value::{Obj, Value},
};

/// Register every native function.
pub(super) fn register(vm: &mut Vm) {
	define(vm, "clock", clock);
	define(vm, "read_number", read_number);
}

fn define(vm: &mut Vm, name: &str, function: NativeFn) {
	let name = vm.heap.intern(name);
	let native = vm.heap.alloc_native(Native { function });
	vm.globals.insert(name, Value::Obj(Obj::Native(native)));
}

/// `clock() -> number`: seconds elapsed since the interpreter started.
fn clock(vm: &mut Vm, _args: &[Value]) -> Value {
	Value::Number(vm.started.elapsed().as_secs_f64())
}

/// `read_number(prompt?) -> number`: write the optional string prompt, then
/// parse one line of stdin as a number. Misuse and unparseable input both
/// yield `0` rather than an error.
fn read_number(vm: &mut Vm, args: &[Value]) -> Value {
	match args {
		[] => {}
		[Value::Obj(Obj::Str(prompt))] => {
			let prompt = vm.heap.string(*prompt).to_string();
			let _ = write!(vm.output, "{prompt}");
			let _ = vm.output.flush();
		}
		_ => return Value::Number(0.0),
	}

	let mut line = String::new();
	if io::stdin().lock().read_line(&mut line).is_err() {
		return Value::Number(0.0);
	}
	Value::Number(line.trim().parse().unwrap_or(0.0))
}
