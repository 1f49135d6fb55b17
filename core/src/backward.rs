use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
pub const DEFAULT_MAX_LINE_LEN: usize = 1024 * 1024;

/// Reads the lines of a file from last to first without loading the whole
/// file. The file is read backwards in chunks of `chunk_size` bytes.
///
/// Every yielded line ends with `\n`, including a first line that had none.
/// Empty lines are not yielded but still count towards [`lines_seen`], and
/// a trailing newline at the end of the file does not start an extra line.
/// A line longer than `max_line_len` bytes is an `InvalidData` error.
///
/// [`lines_seen`]: BackwardLineReader::lines_seen
#[derive(Debug)]
pub struct BackwardLineReader<R> {
	reader: R,
	chunk_size: usize,
	max_line_len: usize,
	// bytes before this offset have not been read yet
	offset: u64,
	started: bool,
	// unscanned part of the most recent chunk
	buf: Vec<u8>,
	// pieces of the line being assembled, latest file position first
	partial: Vec<Vec<u8>>,
	partial_len: usize,
	skip: u64,
	lines_seen: u64,
	done: bool,
}

impl BackwardLineReader<File> {
	pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
		Self::new(File::open(path)?)
	}
}

impl<R: Read + Seek> BackwardLineReader<R> {
	pub fn new(mut reader: R) -> io::Result<Self> {
		let offset = reader.seek(SeekFrom::End(0))?;
		Ok(Self {
			reader,
			chunk_size: DEFAULT_CHUNK_SIZE,
			max_line_len: DEFAULT_MAX_LINE_LEN,
			offset,
			started: false,
			buf: Vec::new(),
			partial: Vec::new(),
			partial_len: 0,
			skip: 0,
			lines_seen: 0,
			done: false,
		})
	}

	pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
		self.chunk_size = chunk_size.max(1);
		self
	}

	pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
		self.max_line_len = max_line_len;
		self
	}

	/// Skips the last `lines` lines of the file.
	pub fn skip_lines(mut self, lines: u64) -> Self {
		self.skip = lines;
		self
	}

	/// Lines consumed from the end so far, skipped and empty ones included.
	/// Passing this to [`skip_lines`](Self::skip_lines) on a fresh reader
	/// resumes where this one stopped.
	pub fn lines_seen(&self) -> u64 {
		self.lines_seen
	}

	fn read_chunk(&mut self) -> io::Result<()> {
		let len = (self.chunk_size as u64).min(self.offset);
		self.offset -= len;
		self.reader.seek(SeekFrom::Start(self.offset))?;
		let mut chunk = vec![0u8; len as usize];
		self.reader.read_exact(&mut chunk)?;
		if !self.started {
			self.started = true;
			if chunk.last() == Some(&b'\n') {
				chunk.pop();
			}
		}
		self.buf = chunk;
		Ok(())
	}

	fn line_too_long(&self) -> io::Error {
		io::Error::new(
			io::ErrorKind::InvalidData,
			format!("line longer than {} bytes", self.max_line_len),
		)
	}

	fn push_partial(&mut self, piece: Vec<u8>) -> io::Result<()> {
		self.partial_len += piece.len();
		if self.partial_len > self.max_line_len {
			return Err(self.line_too_long());
		}
		if !piece.is_empty() {
			self.partial.push(piece);
		}
		Ok(())
	}

	fn take_line(&mut self, head: Vec<u8>) -> Vec<u8> {
		let mut line = head;
		line.reserve(self.partial_len);
		for piece in self.partial.drain(..).rev() {
			line.extend_from_slice(&piece);
		}
		self.partial_len = 0;
		line
	}

	fn next_raw_line(&mut self) -> io::Result<Option<Vec<u8>>> {
		loop {
			if let Some(pos) = self.buf.iter().rposition(|b| *b == b'\n') {
				let head = self.buf.split_off(pos + 1);
				self.buf.pop();
				if head.len() + self.partial_len > self.max_line_len {
					return Err(self.line_too_long());
				}
				return Ok(Some(self.take_line(head)));
			}
			// no newline left in buf, all of it belongs to the current line
			let rest = std::mem::take(&mut self.buf);
			self.push_partial(rest)?;
			if self.offset > 0 {
				self.read_chunk()?;
				continue;
			}
			if self.started && self.partial_len > 0 {
				return Ok(Some(self.take_line(Vec::new())));
			}
			return Ok(None);
		}
	}
}

impl<R: Read + Seek> Iterator for BackwardLineReader<R> {
	type Item = io::Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		while !self.done {
			let line = match self.next_raw_line() {
				Ok(Some(line)) => line,
				Ok(None) => {
					self.done = true;
					return None;
				}
				Err(err) => {
					self.done = true;
					return Some(Err(err));
				}
			};
			self.lines_seen += 1;
			if self.lines_seen <= self.skip || line.is_empty() {
				continue;
			}
			let mut text = String::from_utf8_lossy(&line).into_owned();
			text.push('\n');
			return Some(Ok(text));
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;
	use tempfile::NamedTempFile;

	fn collect(data: &str, chunk_size: usize) -> Vec<String> {
		BackwardLineReader::new(Cursor::new(data.as_bytes().to_vec()))
			.unwrap()
			.with_chunk_size(chunk_size)
			.map(|l| l.unwrap())
			.collect()
	}

	#[test]
	fn reverses_lines_with_small_and_large_chunks() {
		let data = "Line 1\nLine 2\nLine 3\n";
		for chunk_size in [2, 1024] {
			let lines = collect(data, chunk_size);
			assert_eq!(lines.concat(), "Line 3\nLine 2\nLine 1\n", "chunk size {}", chunk_size);
		}
	}

	#[test]
	fn reads_from_file() {
		let mut file = NamedTempFile::new().unwrap();
		std::io::Write::write_all(&mut file, b"a\nb\nc\n").unwrap();
		let lines: Vec<String> = BackwardLineReader::open(file.path())
			.unwrap()
			.map(|l| l.unwrap())
			.collect();
		assert_eq!(lines, vec!["c\n", "b\n", "a\n"]);
	}

	#[test]
	fn first_line_without_newline_is_terminated() {
		assert_eq!(collect("one\ntwo", 3), vec!["two\n", "one\n"]);
		assert_eq!(collect("single", 4), vec!["single\n"]);
	}

	#[test]
	fn empty_input_yields_nothing() {
		assert!(collect("", 8).is_empty());
		assert!(collect("\n", 8).is_empty());
	}

	#[test]
	fn blank_lines_are_counted_but_not_yielded() {
		let mut reader = BackwardLineReader::new(Cursor::new(b"a\n\n\nb\n".to_vec()))
			.unwrap()
			.with_chunk_size(1);
		assert_eq!(reader.next().unwrap().unwrap(), "b\n");
		assert_eq!(reader.next().unwrap().unwrap(), "a\n");
		assert!(reader.next().is_none());
		assert_eq!(reader.lines_seen(), 4);
	}

	#[test]
	fn multibyte_characters_survive_chunk_boundaries() {
		let data = "zürich\nłódź\n日本語\n";
		assert_eq!(collect(data, 1), vec!["日本語\n", "łódź\n", "zürich\n"]);
	}

	#[test]
	fn skip_and_resume() {
		let data: String = (0..10).map(|i| format!("line {}\n", i)).collect();
		let mut reader = BackwardLineReader::new(Cursor::new(data.clone().into_bytes()))
			.unwrap()
			.with_chunk_size(5);
		let first: Vec<String> = reader.by_ref().take(3).map(|l| l.unwrap()).collect();
		assert_eq!(first, vec!["line 9\n", "line 8\n", "line 7\n"]);

		let rest: Vec<String> = BackwardLineReader::new(Cursor::new(data.into_bytes()))
			.unwrap()
			.skip_lines(reader.lines_seen())
			.map(|l| l.unwrap())
			.collect();
		assert_eq!(rest.len(), 7);
		assert_eq!(rest[0], "line 6\n");
		assert_eq!(rest[6], "line 0\n");
	}

	#[test]
	fn missing_file_fails_to_open() {
		let dir = tempfile::tempdir().unwrap();
		let err = BackwardLineReader::open(dir.path().join("nope")).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::NotFound);
	}

	#[test]
	fn long_line_is_assembled_in_linear_time() {
		// 4 MiB in 64 byte chunks: 65536 reads, each must only touch its own chunk
		let len = 4 * 1024 * 1024;
		let mut data = vec![b'x'; len];
		data.push(b'\n');
		data.extend_from_slice(b"tail\n");
		let started = std::time::Instant::now();
		let lines: Vec<String> = BackwardLineReader::new(Cursor::new(data))
			.unwrap()
			.with_chunk_size(64)
			.with_max_line_len(len)
			.map(|l| l.unwrap())
			.collect();
		assert_eq!(lines.len(), 2);
		assert_eq!(lines[0], "tail\n");
		assert_eq!(lines[1].len(), len + 1);
		assert!(lines[1].bytes().take(len).all(|b| b == b'x'));
		assert!(started.elapsed() < std::time::Duration::from_secs(30));
	}

	#[test]
	fn overlong_line_is_an_error() {
		let mut data = b"short\n".to_vec();
		data.extend(std::iter::repeat(b'z').take(1000));
		let mut reader = BackwardLineReader::new(Cursor::new(data))
			.unwrap()
			.with_chunk_size(16)
			.with_max_line_len(100);
		let err = reader.next().unwrap().unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::InvalidData);
		assert!(reader.next().is_none());
	}

	#[test]
	fn overlong_line_with_newline_in_same_chunk_is_an_error() {
		let mut data = b"ok\n".to_vec();
		data.extend(std::iter::repeat(b'z').take(20));
		data.push(b'\n');
		let mut reader = BackwardLineReader::new(Cursor::new(data))
			.unwrap()
			.with_max_line_len(10);
		let err = reader.next().unwrap().unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::InvalidData);
	}

	#[test]
	fn line_at_the_limit_is_accepted() {
		let lines: Vec<String> = BackwardLineReader::new(Cursor::new(b"0123456789\nabc\n".to_vec()))
			.unwrap()
			.with_chunk_size(3)
			.with_max_line_len(10)
			.map(|l| l.unwrap())
			.collect();
		assert_eq!(lines, vec!["abc\n", "0123456789\n"]);
	}

	struct BrokenDisk;

	impl Read for BrokenDisk {
		fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
			Err(io::Error::new(io::ErrorKind::Other, "read failed"))
		}
	}

	impl Seek for BrokenDisk {
		fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
			Ok(100)
		}
	}

	#[test]
	fn read_error_is_yielded_once() {
		let mut reader = BackwardLineReader::new(BrokenDisk).unwrap();
		let err = reader.next().unwrap().unwrap_err();
		assert_eq!(err.to_string(), "read failed");
		assert!(reader.next().is_none());
	}
}
