use std::path::PathBuf;

use palc::Parser;

/// CLI arguments
#[derive(Parser)]
#[command(name = "bloxer", after_long_help = "A bytecode compiler and VM for the Lox language.")]
pub struct Cli {
	/// Script to run; without one the interpreter starts a REPL
	pub paths: Vec<PathBuf>,
}
