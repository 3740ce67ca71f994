pub mod extract;
pub mod health;
pub mod items;

use crate::config::Config;
use crate::db::Repository;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self { repo, config }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/", get(items::list_items).post(items::create_item))
        .route(
            "/items/:item_id",
            get(items::get_item)
                .put(items::update_item)
                .patch(items::update_item)
                .delete(items::delete_item),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
