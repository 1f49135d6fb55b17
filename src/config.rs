use std::path::PathBuf;

pub const DEFAULT_LOG_DIR_PATH: &str = "/var/log/";
pub const DEFAULT_PORT: u16 = 3001;

pub fn log_dir_path() -> PathBuf {
	match std::env::var("LOG_DIR_PATH") {
		Ok(val) => PathBuf::from(val),
		Err(_) => PathBuf::from(DEFAULT_LOG_DIR_PATH),
	}
}

pub fn port() -> u16 {
	match std::env::var("PORT") {
		Ok(val) => match val.trim().parse() {
			Ok(port) => port,
			Err(err) => {
				log::warn!("invalid PORT {:?} ({}), using {}", val, err, DEFAULT_PORT);
				DEFAULT_PORT
			}
		},
		Err(_) => DEFAULT_PORT,
	}
}
