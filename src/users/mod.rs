use crate::state::AppState;
use axum::{routing::get, Router};

pub mod avatar;
pub mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/users/me",
        get(handlers::get_me).put(handlers::update_profile),
    )
}
