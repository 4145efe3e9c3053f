//! Property-based tests for equality and comparison laws.
//!
//! Runs generated programs through the VM and checks the laws the operators
//! promise: `a == b` agrees with `!(a != b)`, every comparison agrees with
//! its negated complement, and concatenation lands on the interned string.

use std::{
	cell::RefCell,
	io::{self, Write},
	rc::Rc,
};

use bloxer::Vm;
use proptest::prelude::*;

#[derive(Clone, Default)]
struct Sink(Rc<RefCell<Vec<u8>>>);

impl Write for Sink {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.borrow_mut().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

/// Run `source` and collect one printed line per `print` statement.
fn eval_lines(source: &str) -> Vec<String> {
	let sink = Sink::default();
	let mut vm = Vm::with_output(Box::new(sink.clone()));
	vm.interpret(source).expect("generated program should run cleanly");
	let output = String::from_utf8(sink.0.borrow().clone()).expect("program output is UTF-8");
	output.lines().map(str::to_string).collect()
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(200))]

	/// `a == b` holds exactly when `!(a != b)` does, and both match host
	/// float equality. Number literals round-trip through shortest-form
	/// printing, so formatting them into source is lossless.
	#[test]
	fn equality_agrees_with_negated_inequality(a in -1000.0f64..1000.0, b in -1000.0f64..1000.0) {
		let lines = eval_lines(&format!("print {a} == {b}; print !({a} != {b});"));
		prop_assert_eq!(&lines[0], &lines[1]);
		prop_assert_eq!(lines[0] == "true", a == b);
	}

	/// A value always equals itself (no NaN can be written as a literal).
	#[test]
	fn literals_are_reflexive(a in -1000.0f64..1000.0) {
		let lines = eval_lines(&format!("print {a} == {a};"));
		prop_assert_eq!(&lines[0], "true");
	}

	/// `<` is the complement of `>=`, `>` the complement of `<=`.
	#[test]
	fn comparisons_agree_with_their_complements(a in -1000.0f64..1000.0, b in -1000.0f64..1000.0) {
		let source = format!(
			"print {a} < {b}; print !({a} >= {b}); print {a} > {b}; print !({a} <= {b});"
		);
		let lines = eval_lines(&source);
		prop_assert_eq!(&lines[0], &lines[1]);
		prop_assert_eq!(&lines[2], &lines[3]);
		prop_assert_eq!(lines[0] == "true", a < b);
		prop_assert_eq!(lines[2] == "true", a > b);
	}

	/// Concatenating two literals produces the same interned string as
	/// writing the joined literal directly.
	#[test]
	fn concatenation_lands_on_the_interned_string(s in "[a-z]{0,8}", t in "[a-z]{0,8}") {
		let lines = eval_lines(&format!(r#"print "{s}" + "{t}" == "{s}{t}";"#));
		prop_assert_eq!(&lines[0], "true");
	}
}
