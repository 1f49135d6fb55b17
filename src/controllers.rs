use std::convert::Infallible;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs::read_dir;
use tokio::sync::mpsc;
use tokio::task::spawn_blocking;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use varlog::BackwardLineReader;

use crate::context::Context;

#[derive(Deserialize, Debug)]
pub struct GetLogsQuery {
	pub file: Option<String>,
	pub n: Option<String>,
	pub keyword: Option<String>,
	/// Lines to skip from the end before matching.
	pub offset: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
	BadRequest(String),
	Forbidden(String),
	NotFound(String),
	Internal(String),
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (status, msg) = match self {
			ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
			ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
			ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
			ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
		};
		(status, Json(json!({ "error": msg }))).into_response()
	}
}

impl From<io::Error> for ApiError {
	fn from(err: io::Error) -> Self {
		match err.kind() {
			io::ErrorKind::PermissionDenied => ApiError::Forbidden("Access to file is denied".into()),
			io::ErrorKind::NotFound => ApiError::NotFound("file not found".into()),
			_ => ApiError::BadRequest(err.to_string()),
		}
	}
}

pub async fn list_log_files(State(ctx): State<Arc<Context>>) -> Result<Json<Value>, ApiError> {
	let dir = ctx.log_dir();
	let failed = |err: io::Error| {
		log::error!("failed to list {}: {}", dir.display(), err);
		ApiError::Internal(format!("Failed to list files in {}", dir.display()))
	};
	let mut entries = read_dir(dir).await.map_err(failed)?;
	let mut files = Vec::new();
	while let Some(entry) = entries.next_entry().await.map_err(failed)? {
		files.push(entry.file_name().to_string_lossy().into_owned());
	}
	files.sort();
	Ok(Json(json!({ "files": files })))
}

fn is_bare_file_name(file: &str) -> bool {
	Path::new(file).file_name().and_then(|name| name.to_str()) == Some(file)
}

fn open_log_file(path: &Path) -> io::Result<BackwardLineReader<File>> {
	let file = File::open(path)?;
	if !file.metadata()?.is_file() {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("{} is not a regular file", path.display()),
		));
	}
	BackwardLineReader::new(file)
}

#[derive(Debug, PartialEq, Eq)]
struct Streamed {
	sent: usize,
	lines_seen: u64,
}

/// Feeds matching lines, newest first, into `tx` until `limit` lines were
/// sent, the file is exhausted or the receiver is gone.
fn send_matching_lines<R: Read + Seek>(
	mut lines: BackwardLineReader<R>,
	keyword: &str,
	limit: Option<usize>,
	tx: mpsc::Sender<String>,
) -> Streamed {
	let mut sent = 0;
	while limit.map_or(true, |limit| sent < limit) {
		if tx.is_closed() {
			log::debug!("client disconnected after {} lines", sent);
			break;
		}
		let line = match lines.next() {
			Some(Ok(line)) => line,
			Some(Err(err)) => {
				log::error!("failed to read log file: {}", err);
				break;
			}
			None => break,
		};
		if !line.contains(keyword) {
			continue;
		}
		if tx.blocking_send(line).is_err() {
			log::debug!("client disconnected after {} lines", sent);
			break;
		}
		sent += 1;
	}
	Streamed {
		sent,
		lines_seen: lines.lines_seen(),
	}
}

pub async fn get_logs(
	State(ctx): State<Arc<Context>>,
	Query(params): Query<GetLogsQuery>,
) -> Result<Response, ApiError> {
	log::debug!("get logs {:?}", params);
	let file = match params.file.as_deref() {
		Some(file) if !file.is_empty() => file,
		_ => {
			return Err(ApiError::BadRequest(
				"Bad Request - Missing required data: file".into(),
			))
		}
	};
	if !is_bare_file_name(file) {
		return Err(ApiError::BadRequest(
			"Bad Request - file can not be a path".into(),
		));
	}
	let limit = match params.n.as_deref() {
		Some(n) => match n.trim().parse::<usize>() {
			Ok(n) => Some(n),
			Err(_) => return Err(ApiError::BadRequest("Bad Request - n is not a number".into())),
		},
		None => None,
	};
	let offset = match params.offset.as_deref() {
		Some(offset) => match offset.trim().parse::<u64>() {
			Ok(offset) => offset,
			Err(_) => {
				return Err(ApiError::BadRequest(
					"Bad Request - offset is not a number".into(),
				))
			}
		},
		None => 0,
	};
	let keyword = params.keyword.unwrap_or_default();

	let path = ctx.log_path(file);
	let lines = spawn_blocking(move || open_log_file(&path))
		.await
		.map_err(|err| ApiError::Internal(err.to_string()))??
		.skip_lines(offset);

	let (tx, rx) = mpsc::channel(100);
	spawn_blocking(move || {
		let streamed = send_matching_lines(lines, &keyword, limit, tx);
		log::debug!(
			"streamed {} lines, resume at offset {}",
			streamed.sent,
			streamed.lines_seen
		);
	});

	let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));
	Ok(([(header::CONTENT_TYPE, "text/plain")], body).into_response())
}
