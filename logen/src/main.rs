use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use varlog::{
	GenerateReport, Generator, GeneratorConfig, DEFAULT_OUTPUT_PATH, DEFAULT_TARGET_SIZE_BYTES,
};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about = "Fill a file with synthetic syslog lines until it reaches a target size",
	long_about = None
)]
struct Args {
	/// File to write. Existing contents are overwritten.
	#[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
	output_path: PathBuf,
	/// Stop once at least this many bytes have been written. The last line
	/// is never cut, so the file may end up slightly larger.
	#[arg(long, default_value_t = DEFAULT_TARGET_SIZE_BYTES)]
	target_size_bytes: u64,
	/// Print debug diagnostics, including progress.
	#[arg(short, long)]
	verbose: bool,
}

impl Args {
	fn config(&self) -> GeneratorConfig {
		GeneratorConfig {
			output_path: self.output_path.clone(),
			target_size_bytes: self.target_size_bytes,
		}
	}
}

fn completion_message(report: &GenerateReport) -> String {
	format!(
		"Log generation complete. Total size: {} bytes. Total entries: {}",
		report.bytes_written, report.entries_written
	)
}

fn run(args: &Args) -> Result<GenerateReport> {
	Generator::new(args.config())
		.run()
		.with_context(|| format!("log generation into {} failed", args.output_path.display()))
}

fn main() -> Result<()> {
	let args = Args::parse();
	simple_logger::SimpleLogger::new()
		.with_level(if args.verbose {
			log::LevelFilter::Debug
		} else {
			log::LevelFilter::Warn
		})
		.env()
		.init()
		.ok();

	println!("Log generation started.");
	let report = run(&args)?;
	println!("{}", completion_message(&report));
	Ok(())
}
