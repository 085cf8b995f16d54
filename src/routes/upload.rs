use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::handlers::upload::{upload_media, MAX_VIDEO_SIZE};
use crate::state::AppState;

// Multipart framing on top of the largest accepted video.
const UPLOAD_BODY_LIMIT: usize = MAX_VIDEO_SIZE + 1024 * 1024;

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_media))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}
