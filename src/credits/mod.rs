use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/credits", get(handlers::get_balance))
        .route("/credits/purchase", post(handlers::purchase))
}
