use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

pub async fn log_request(req: Request, next: Next) -> Response {
	log::info!("{} {}", req.method(), req.uri());
	next.run(req).await
}
