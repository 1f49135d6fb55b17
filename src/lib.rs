use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;

pub mod config;
pub mod context;
pub mod controllers;
pub mod request_log;

use context::Context;

pub fn router(ctx: Arc<Context>) -> Router {
	Router::new()
		.route("/list", get(controllers::list_log_files))
		.route("/logs", get(controllers::get_logs))
		.layer(middleware::from_fn(request_log::log_request))
		.with_state(ctx)
}
