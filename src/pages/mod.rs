use axum::Router;

use crate::state::AppState;

pub mod handlers;
pub mod render;

pub use handlers::is_ajax;

pub fn router() -> Router<AppState> {
    handlers::page_routes()
}
