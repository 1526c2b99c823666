use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    middleware,
    response::Redirect,
    routing::{delete, get, post},
    Json, Router,
};
use std::{path::Path as FsPath, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use super::{error::ApiError, requests::ParticipantQuery, responses::MessageResponse};
use crate::logging::middleware::logging_middleware;
use crate::mcp::mcp::handle_mcp;
use crate::store::{
    activity::{self, Activities},
    store::ActivityStore,
};

pub fn create_router<S>(store: Arc<S>, static_dir: &FsPath) -> Router
where
    S: ActivityStore + 'static,
{
    Router::new()
        .route("/", get(|| async { Redirect::temporary("/static/index.html") }))
        .route("/activities", get(list_activities::<S>))
        .route("/activities/:activity_name/signup", post(signup::<S>))
        .route("/activities/:activity_name/unregister", delete(unregister::<S>))
        .route("/mcp", post(handle_mcp::<S>))
        .with_state(store)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn list_activities<S: ActivityStore>(State(store): State<Arc<S>>) -> Json<Activities> {
    Json(store.load())
}

async fn signup<S: ActivityStore>(
    State(store): State<Arc<S>>,
    Path(activity_name): Path<String>,
    query: Result<Query<ParticipantQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Query(query) = query?;
    let message =
        store.update(|activities| activity::signup(activities, &activity_name, &query.email))?;

    info!("{}", message);
    Ok(Json(MessageResponse { message }))
}

async fn unregister<S: ActivityStore>(
    State(store): State<Arc<S>>,
    Path(activity_name): Path<String>,
    query: Result<Query<ParticipantQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Query(query) = query?;
    let message =
        store.update(|activities| activity::unregister(activities, &activity_name, &query.email))?;

    info!("{}", message);
    Ok(Json(MessageResponse { message }))
}
