use std::path::{Path, PathBuf};

/// Shared, read-only state of the log API.
#[derive(Debug)]
pub struct Context {
	log_dir: PathBuf,
}

impl Context {
	pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
		Context {
			log_dir: log_dir.as_ref().to_owned(),
		}
	}

	pub fn log_dir(&self) -> &Path {
		&self.log_dir
	}

	pub fn log_path(&self, file: &str) -> PathBuf {
		self.log_dir.join(file)
	}
}
