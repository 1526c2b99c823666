use std::time::Instant;

use axum::{middleware::Next, response::Response};
use hyper::Request;
use tracing::{info, warn};

/// Logs every request with its status and latency. Client and server errors
/// are logged at `warn`.
pub(crate) async fn logging_middleware(
  req: Request<axum::body::Body>,
  next: Next
) -> Response {
  let path = req.uri().path().to_owned();
  let method = req.method().clone();

  info!("Request received: {} {}", method, path);

  let start = Instant::now();
  let response = next.run(req).await;
  let duration = start.elapsed();
  let status = response.status();

  if status.is_client_error() || status.is_server_error() {
    warn!("Request failed: {} {} -> {} in {:?}", method, path, status, duration);
  } else {
    info!("Request completed: {} {} -> {} in {:?}", method, path, status, duration);
  }
  response
}
