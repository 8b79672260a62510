use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::error::ServiceError;
use crate::state::AppState;

use super::dto::{UserCreatedResponse, UserFilter, UserListQuery, UserRead, UserWrite};

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users", put(update_user))
        .route("/users/:id", delete(delete_user))
}

#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserRead>>, ServiceError> {
    let users = match query.filter {
        Some(UserFilter::Active) => state.users.filter_by_active(true).await?,
        Some(UserFilter::Inactive) => state.users.filter_by_active(false).await?,
        _ => state.users.get_all().await?,
    };
    Ok(Json(users))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserRead>, ServiceError> {
    let user = state.users.get_user(id).await?;
    Ok(Json(user))
}

#[instrument(skip(state, body))]
async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<UserWrite>,
) -> Result<(StatusCode, HeaderMap, Json<UserCreatedResponse>), ServiceError> {
    let id = state.users.create_user(body).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/v1/users/{id}").parse().unwrap(),
    );

    Ok((StatusCode::CREATED, headers, Json(UserCreatedResponse { id })))
}

#[instrument(skip(state, body))]
async fn update_user(
    State(state): State<AppState>,
    Json(body): Json<UserWrite>,
) -> Result<Json<UserRead>, ServiceError> {
    let user = state.users.update_user(body).await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    // TODO: thread the authenticated actor through once auth lands
    state.users.delete_user(id, "System").await?;
    Ok(StatusCode::NO_CONTENT)
}
