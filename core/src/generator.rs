use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::clock::{Clock, SystemClock};
use crate::logline::LogLine;

pub const DEFAULT_OUTPUT_PATH: &str = "syslog_test";
pub const DEFAULT_TARGET_SIZE_BYTES: u64 = 1024 * 1024 * 1024;

const PROGRESS_INTERVAL: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
	pub output_path: PathBuf,
	pub target_size_bytes: u64,
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self {
			output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
			target_size_bytes: DEFAULT_TARGET_SIZE_BYTES,
		}
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateReport {
	pub bytes_written: u64,
	pub entries_written: u64,
}

#[derive(Debug)]
pub enum GenerateError {
	Open {
		path: PathBuf,
		source: io::Error,
	},
	Write {
		path: PathBuf,
		entries_written: u64,
		source: io::Error,
	},
}

impl fmt::Display for GenerateError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GenerateError::Open { path, source } => {
				write!(f, "failed to open {} for writing: {}", path.display(), source)
			}
			GenerateError::Write {
				path,
				entries_written,
				source,
			} => write!(
				f,
				"failed to write {} after {} entries: {}",
				path.display(),
				entries_written,
				source
			),
		}
	}
}

impl std::error::Error for GenerateError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			GenerateError::Open { source, .. } | GenerateError::Write { source, .. } => Some(source),
		}
	}
}

/// A write that failed part way through. `written` counts what made it out
/// before the failure.
#[derive(Debug)]
pub struct WriteError {
	pub written: GenerateReport,
	pub source: io::Error,
}

impl fmt::Display for WriteError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"write failed after {} entries ({} bytes): {}",
			self.written.entries_written, self.written.bytes_written, self.source
		)
	}
}

impl std::error::Error for WriteError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		Some(&self.source)
	}
}

/// Writes synthetic syslog lines until the target size is reached.
///
/// The bound is checked before every line, so the output ends up at least
/// `target_size_bytes` long and overshoots by less than one line. A target
/// of zero produces an empty file.
#[derive(Debug)]
pub struct Generator<C = SystemClock> {
	config: GeneratorConfig,
	clock: C,
}

impl Generator<SystemClock> {
	pub fn new(config: GeneratorConfig) -> Self {
		Self::with_clock(config, SystemClock)
	}
}

impl<C: Clock> Generator<C> {
	pub fn with_clock(config: GeneratorConfig, clock: C) -> Self {
		Self { config, clock }
	}

	/// Truncates the output path and fills it. On error the partial file is
	/// left on disk.
	pub fn run(&self) -> Result<GenerateReport, GenerateError> {
		let path = &self.config.output_path;
		log::info!(
			"generating {} bytes of logs into {}",
			self.config.target_size_bytes,
			path.display()
		);
		let file = OpenOptions::new()
			.write(true)
			.create(true)
			.truncate(true)
			.open(path)
			.map_err(|source| GenerateError::Open {
				path: path.clone(),
				source,
			})?;
		let mut writer = BufWriter::new(file);

		let report = self
			.write_to(&mut writer)
			.map_err(|err| GenerateError::Write {
				path: path.clone(),
				entries_written: err.written.entries_written,
				source: err.source,
			})?;

		let write_err = |source: io::Error| GenerateError::Write {
			path: path.clone(),
			entries_written: report.entries_written,
			source,
		};
		let file = writer
			.into_inner()
			.map_err(|err| write_err(err.into_error()))?;
		// devices and pipes reject fsync
		if file.metadata().map_err(write_err)?.is_file() {
			file.sync_all().map_err(write_err)?;
		}

		log::info!(
			"wrote {} entries ({} bytes) to {}",
			report.entries_written,
			report.bytes_written,
			path.display()
		);
		Ok(report)
	}

	/// The generation loop over any writer. Does not flush.
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<GenerateReport, WriteError> {
		let target = self.config.target_size_bytes;
		let mut report = GenerateReport::default();
		while report.bytes_written < target {
			let line = LogLine::new(self.clock.now(), report.entries_written).to_string();
			if let Err(source) = writer.write_all(line.as_bytes()) {
				return Err(WriteError {
					written: report,
					source,
				});
			}
			report.bytes_written += line.len() as u64;
			report.entries_written += 1;

			if report.entries_written % PROGRESS_INTERVAL == 0 {
				log::debug!(
					"progress: {} entries, {}/{} bytes",
					report.entries_written,
					report.bytes_written,
					target
				);
			}
		}

		Ok(report)
	}
}
