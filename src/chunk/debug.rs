//! Chunk disassembler.
//!
//! Walks instruction boundaries using each opcode's operand arity, which only
//! works while `Chunk::code` holds whole instructions back to back. Debugging
//! aid and the reference for how the VM decodes operands.

use std::fmt::Write;

use super::{Chunk, OpCode};
use crate::{
	heap::Heap,
	value::{Obj, Value},
};

/// Render every instruction in `chunk` under a header line.
pub fn disassemble_chunk(chunk: &Chunk, name: &str, heap: &Heap) -> String {
	let mut output = format!("== {name} ==\n");
	let mut offset = 0;
	while offset < chunk.code.len() {
		offset = disassemble_instruction(chunk, offset, heap, &mut output);
	}
	output
}

/// Render the instruction at `offset` and return the offset of the next one.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize, heap: &Heap, output: &mut String) -> usize {
	let _ = write!(output, "{offset:04} ");
	if offset > 0 && chunk.lines[offset] == chunk.lines[offset - 1] {
		let _ = write!(output, "   | ");
	} else {
		let _ = write!(output, "{:4} ", chunk.lines[offset]);
	}

	let op = OpCode::from(chunk.code[offset]);
	match op {
		OpCode::Constant | OpCode::GetGlobal | OpCode::DefineGlobal | OpCode::SetGlobal => {
			let index = chunk.code[offset + 1] as usize;
			let value = chunk.constants[index];
			let _ = writeln!(output, "{op:?} {index} '{}'", heap.display(value));
		}
		OpCode::ConstantLong => {
			let index = ((chunk.code[offset + 1] as usize) << 16)
				| ((chunk.code[offset + 2] as usize) << 8)
				| chunk.code[offset + 3] as usize;
			let value = chunk.constants[index];
			let _ = writeln!(output, "{op:?} {index} '{}'", heap.display(value));
		}
		OpCode::GetLocal | OpCode::SetLocal | OpCode::GetUpvalue | OpCode::SetUpvalue | OpCode::Call => {
			let operand = chunk.code[offset + 1];
			let _ = writeln!(output, "{op:?} {operand}");
		}
		OpCode::Jump | OpCode::JumpIfFalse | OpCode::Loop => {
			let jump = ((chunk.code[offset + 1] as usize) << 8) | chunk.code[offset + 2] as usize;
			let past_operand = offset + 3;
			let target =
				if op == OpCode::Loop { past_operand - jump } else { past_operand + jump };
			let _ = writeln!(output, "{op:?} {offset} -> {target}");
		}
		OpCode::Closure => {
			let index = chunk.code[offset + 1] as usize;
			let value = chunk.constants[index];
			let _ = writeln!(output, "{op:?} {index} {}", heap.display(value));

			let upvalue_count = match value {
				Value::Obj(Obj::Function(id)) => heap.function(id).upvalue_count,
				_ => 0,
			};
			let mut pair = offset + 2;
			for _ in 0..upvalue_count {
				let kind = if chunk.code[pair] != 0 { "local" } else { "upvalue" };
				let _ = writeln!(output, "{:04}    |   {kind} {}", pair, chunk.code[pair + 1]);
				pair += 2;
			}
			return pair;
		}
		_ => {
			let _ = writeln!(output, "{op:?}");
		}
	}

	offset + 1 + op.operand_len()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::heap::object::Function;

	#[test]
	fn chunk_listing_carries_the_header() {
		let heap = Heap::new();
		let mut chunk = Chunk::new();
		chunk.write(OpCode::Nil as u8, 1);
		chunk.write(OpCode::Return as u8, 1);
		let listing = disassemble_chunk(&chunk, "main", &heap);
		assert!(listing.starts_with("== main ==\n"));
		assert!(listing.contains("Nil"));
		assert!(listing.contains("Return"));
	}

	/// Emitting then disassembling any opcode advances the cursor by exactly
	/// one plus its operand bytes (plus the capture pairs for `Closure`).
	#[test]
	fn disassembly_walks_instruction_boundaries() {
		let mut heap = Heap::new();
		let name = heap.intern("f");
		let mut inner = Function::named(name);
		inner.upvalue_count = 1;
		let function = heap.alloc_function(inner);

		let mut chunk = Chunk::new();
		let number = chunk.add_constant(Value::Number(1.0)) as u8;
		let fn_const = chunk.add_constant(Value::Obj(Obj::Function(function))) as u8;

		use OpCode::*;
		let instructions: &[(OpCode, &[u8])] = &[
			(Constant, &[number]),
			(ConstantLong, &[0, 0, number]),
			(Nil, &[]),
			(True, &[]),
			(False, &[]),
			(Pop, &[]),
			(GetLocal, &[0]),
			(SetLocal, &[0]),
			(GetGlobal, &[number]),
			(DefineGlobal, &[number]),
			(SetGlobal, &[number]),
			(GetUpvalue, &[0]),
			(SetUpvalue, &[0]),
			(CloseUpvalue, &[]),
			(Equal, &[]),
			(Greater, &[]),
			(Less, &[]),
			(Add, &[]),
			(Subtract, &[]),
			(Multiply, &[]),
			(Divide, &[]),
			(Not, &[]),
			(Negate, &[]),
			(Print, &[]),
			(Jump, &[0, 1]),
			(JumpIfFalse, &[0, 1]),
			(Loop, &[0, 1]),
			(Call, &[0]),
			(Closure, &[fn_const, 1, 0]),
			(Return, &[]),
		];

		let mut expected = Vec::new();
		for &(op, operands) in instructions {
			expected.push((chunk.code.len(), 1 + operands.len()));
			chunk.write(op as u8, 1);
			for &operand in operands {
				chunk.write(operand, 1);
			}
		}

		let mut output = String::new();
		for (offset, size) in expected {
			let next = disassemble_instruction(&chunk, offset, &heap, &mut output);
			assert_eq!(next - offset, size, "at offset {offset}:\n{output}");
		}
	}
}
