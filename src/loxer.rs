use std::{fs::read_to_string, io::Write, path::Path};

use crate::{LoxError, vm::Vm};

/// The interpreter driver. Owns one [`Vm`], so consecutive REPL lines share
/// globals and interned strings.
pub struct Loxer {
	vm: Vm,
}

impl Loxer {
	pub fn new() -> Self { Self { vm: Vm::new() } }

	pub fn run_file(&mut self, path: &Path) -> crate::Result<()> {
		let source =
			read_to_string(path).map_err(|_| LoxError::FileRead(path.display().to_string()))?;
		self.run(&source)
	}

	/// Read-eval-print loop: one line per prompt, EOF exits.
	pub fn run_prompt(&mut self) {
		let mut input = String::new();
		let stdin = std::io::stdin();
		loop {
			input.clear();
			print!("> ");
			if let Err(e) = std::io::stdout().flush() {
				eprintln!("Failed flush: {e}");
			}
			match stdin.read_line(&mut input) {
				Ok(0) => {
					println!();
					break;
				}
				Ok(_) => {}
				Err(e) => {
					eprintln!("Failed read line: {e}");
					continue;
				}
			}
			match self.run(&input) {
				Ok(()) => {}
				// Compile diagnostics already went to stderr one by one.
				Err(LoxError::CompileErrors(_)) => {}
				Err(e) => eprintln!("{e}"),
			}
		}
	}

	pub fn run(&mut self, source: &str) -> crate::Result<()> { self.vm.interpret(source) }
}

impl Default for Loxer {
	fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use super::*;

	#[test]
	fn run_source_strings() {
		let mut loxer = Loxer::new();
		assert!(loxer.run("").is_ok());
		assert!(loxer.run("1 + 2;").is_ok());
		assert!(loxer.run("var answer = 6 * 7;").is_ok());
		assert!(matches!(loxer.run("@"), Err(LoxError::CompileErrors(_))));
		assert!(matches!(loxer.run("print missing;"), Err(LoxError::RuntimeError(_))));
	}

	#[test]
	fn globals_survive_between_runs() {
		let mut loxer = Loxer::new();
		loxer.run("var a = 1;").expect("define should run");
		loxer.run("a = a + 1;").expect("update should run");
	}

	#[test]
	fn missing_files_map_to_the_file_error() {
		let mut loxer = Loxer::new();
		let path = PathBuf::from("definitely/not/a/real/file.lox");
		assert!(matches!(loxer.run_file(&path), Err(LoxError::FileRead(_))));
	}
}
