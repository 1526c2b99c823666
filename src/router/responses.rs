use serde::Serialize;

#[derive(Serialize)]
pub struct MessageResponse {
  pub message: String
}

#[derive(Serialize)]
pub struct ErrorResponse {
  pub detail: String
}
