#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "clonedoc", about = "Structured-clone and framed Snappy inspection tools")]
struct Cli {
	/// Increase log verbosity (-v info, -vv debug, -vvv trace).
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Decode a structured-clone value, unframing it first when needed.
	Decode(cmd::decode::Args),
	/// Decompress a framed Snappy stream.
	Unframe(cmd::unframe::Args),
	/// Summarize framing and structured-clone header facts.
	Info(cmd::info::Args),
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(command: Commands) -> cmd::Result<()> {
	match command {
		Commands::Decode(args) => cmd::decode::run(args),
		Commands::Unframe(args) => cmd::unframe::run(args),
		Commands::Info(args) => cmd::info::run(args),
	}
}

fn init_tracing(verbose: u8) {
	let filter = match verbose {
		0 => EnvFilter::new("warn"),
		1 => EnvFilter::new("info"),
		2 => EnvFilter::new("debug"),
		_ => EnvFilter::new("trace"),
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.init();
}
