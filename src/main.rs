use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use varlog_server::config::{log_dir_path, port};
use varlog_server::context::Context;
use varlog_server::router;

#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
	use tokio::signal::unix::{signal, SignalKind};

	let mut interrupt = signal(SignalKind::interrupt())?;
	let mut terminate = signal(SignalKind::terminate())?;
	let mut quit = signal(SignalKind::quit())?;
	Ok(async move {
		let name = tokio::select! {
			_ = interrupt.recv() => "SIGINT",
			_ = terminate.recv() => "SIGTERM",
			_ = quit.recv() => "SIGQUIT",
		};
		log::info!("received {}, shutting down", name);
	})
}

#[cfg(not(unix))]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
	Ok(async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			log::error!("failed to listen for ctrl-c: {}", err);
			std::future::pending::<()>().await;
		}
		log::info!("received ctrl-c, shutting down");
	})
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	simple_logger::SimpleLogger::new()
		.with_level(log::LevelFilter::Info)
		.env()
		.init()
		.ok();

	let log_dir = log_dir_path();
	let port = port();
	let app = router(Arc::new(Context::new(&log_dir)));

	let addr = SocketAddr::from(([0, 0, 0, 0], port));
	let listener = tokio::net::TcpListener::bind(addr)
		.await
		.with_context(|| format!("failed to bind {}", addr))?;
	let shutdown = shutdown_signal().context("failed to install signal handlers")?;
	log::info!(
		"serving {} at http://localhost:{}",
		log_dir.display(),
		port
	);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown)
		.await
		.context("server failed")?;
	log::info!("server is gracefully shut down");
	Ok(())
}
