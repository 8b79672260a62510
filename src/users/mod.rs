pub mod dto;
pub mod handlers;
pub mod services;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_router())
        .merge(handlers::write_router())
}
