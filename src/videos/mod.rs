use crate::state::AppState;
use axum::{routing::get, Router};

pub mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/videos",
            get(handlers::list_videos).post(handlers::create_video),
        )
        .route(
            "/videos/:id",
            get(handlers::get_video).delete(handlers::delete_video),
        )
}
