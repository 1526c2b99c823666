use serde::Deserialize;

#[derive(Deserialize)]
pub struct ParticipantQuery {
  pub email: String
}
