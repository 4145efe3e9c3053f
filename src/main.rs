use bloxer::{LoxError, Loxer, cli::Cli};
use palc::Parser;

fn main() {
	let cli = Cli::parse();
	let mut loxer = Loxer::new();

	match cli.paths.as_slice() {
		[] => loxer.run_prompt(),
		[path] => {
			if let Err(e) = loxer.run_file(path) {
				report(&e);
				std::process::exit(exit_code(&e));
			}
		}
		_ => {
			eprintln!("Usage: bloxer [path]");
			std::process::exit(64);
		}
	}
}

fn report(error: &LoxError) {
	match error {
		// Compile diagnostics were streamed to stderr as they were found.
		LoxError::CompileErrors(_) => {}
		e => eprintln!("{e}"),
	}
}

/// sysexits-style codes: 65 for bad source, 70 for a runtime abort, 74 for
/// anything the host itself failed to do.
fn exit_code(error: &LoxError) -> i32 {
	match error {
		LoxError::CompileErrors(_) => 65,
		LoxError::RuntimeError(_) => 70,
		_ => 74,
	}
}
