use axum::routing::get;
use axum::Router;

use crate::handlers::ui;
use crate::state::AppState;

/// ```text
/// GET    /                 -> index
/// GET    /static/app.js    -> app_js
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(ui::index))
        .route("/static/app.js", get(ui::app_js))
}
