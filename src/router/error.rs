use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use super::responses::ErrorResponse;
use crate::store::{
    activity::ActivityError,
    store::{StoreError, UpdateError},
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Activity(#[from] ActivityError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{}", .0.body_text())]
    InvalidQuery(#[from] QueryRejection),
}

impl From<UpdateError<ActivityError>> for ApiError {
    fn from(err: UpdateError<ActivityError>) -> Self {
        match err {
            UpdateError::Rejected(e) => ApiError::Activity(e),
            UpdateError::Store(e) => ApiError::Store(e),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Activity(ActivityError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Activity(ActivityError::AlreadySignedUp | ActivityError::NotSignedUp) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match &self {
            ApiError::Activity(e) => e.to_string(),
            ApiError::InvalidQuery(e) => e.body_text(),
            ApiError::Store(e) => {
                error!("Storage failure: {}", e);
                "Could not save activities".to_string()
            }
        };

        (self.status(), Json(ErrorResponse { detail })).into_response()
    }
}
