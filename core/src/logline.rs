use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;

/// `Mon DD HH:MM:SS`, the classic syslog prefix.
pub const TIMESTAMP_FORMAT: &str = "%b %d %H:%M:%S";

pub const MESSAGE: &str = "This is a log message.";

/// One synthetic syslog entry. Rendering includes the trailing newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine {
	pub timestamp: NaiveDateTime,
	pub index: u64,
}

impl LogLine {
	pub fn new(timestamp: NaiveDateTime, index: u64) -> Self {
		Self { timestamp, index }
	}
}

impl fmt::Display for LogLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(
			f,
			"{} Entry {}: {}",
			self.timestamp.format(TIMESTAMP_FORMAT),
			self.index,
			MESSAGE
		)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLogLine {
	pub timestamp: String,
	pub index: u64,
}

fn line_regex() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| {
		Regex::new(
			r"^([A-Z][a-z]{2} \d{2} \d{2}:\d{2}:\d{2}) Entry (0|[1-9]\d*): This is a log message\.$",
		)
		.unwrap()
	})
}

/// Parses a single line without its newline. Returns `None` for anything
/// that deviates from the generated format.
pub fn parse_log_line(line: &str) -> Option<ParsedLogLine> {
	let caps = line_regex().captures(line)?;
	let index = caps[2].parse().ok()?;
	Some(ParsedLogLine {
		timestamp: caps[1].to_string(),
		index,
	})
}
