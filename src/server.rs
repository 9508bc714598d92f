// PromptReel Web Server
// Copyright (c) 2026 Xing_The_Creator | PromptReel

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower::ServiceExt; // For oneshot
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::{ApiError, GenError};
use crate::health::{self, HealthReport};
use crate::media::{validate_media_name, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::service;
use crate::state::AppState;
use crate::storage::{GeneratedImage, GeneratedVideo};
use crate::views::{self, Notice, PageQuery, GALLERY_PER_PAGE, RECENT_VIDEOS};

const VIDEO_FAILED: &str = "An error occurred while generating the video.";
const IMAGE_FAILED: &str = "An error occurred while generating the image.";

#[derive(Deserialize)]
pub struct PromptForm {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteResponse {
    pub id: i64,
    pub is_favorite: bool,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate_video))
        .route("/images/generate", post(generate_image))
        .route("/gallery/videos", get(videos_gallery))
        .route("/gallery/images", get(images_gallery))
        .route("/api/health", get(health_check))
        .route("/api/videos/:id", get(get_video))
        .route("/api/videos/:id/favorite", post(toggle_video_favorite))
        .route("/api/images/:id", get(get_image))
        .route("/api/images/:id/favorite", post(toggle_image_favorite))
        .route("/media/videos/:filename", get(serve_video))
        .route("/media/images/:filename", get(serve_image))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn start_server(addr: &str, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = addr.parse()?;
    let app = create_router(state);

    let display_addr = if addr.ip().is_unspecified() {
        format!("127.0.0.1:{}", addr.port())
    } else {
        addr.to_string()
    };
    info!("[SERVER] PromptReel running on http://{}", display_addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(State(state): State<AppState>, Query(q): Query<PageQuery>) -> Result<Html<String>, ApiError> {
    let recent = state.db.recent_videos(RECENT_VIDEOS).await?;
    Ok(Html(views::index_page(&recent, q.notice().as_ref())))
}

/// Message shown to the user for a failed request.
fn failure_notice(err: &GenError, generic: &str) -> Notice {
    match err {
        GenError::Validation(msg) => Notice::error(msg.clone()),
        other => {
            error!("[SERVER] Generation failed: {}", other);
            Notice::error(generic)
        }
    }
}

async fn generate_video(State(state): State<AppState>, Form(form): Form<PromptForm>) -> Redirect {
    let notice = match service::generate_video(&state, &form.prompt).await {
        Ok(_) => Notice::success("Video generated successfully!"),
        Err(e) => failure_notice(&e, VIDEO_FAILED),
    };
    Redirect::to(&notice.redirect_target("/"))
}

async fn generate_image(State(state): State<AppState>, Form(form): Form<PromptForm>) -> Redirect {
    let notice = match service::generate_image(&state, &form.prompt).await {
        Ok(_) => Notice::success("Image generated successfully!"),
        Err(e) => failure_notice(&e, IMAGE_FAILED),
    };
    Redirect::to(&notice.redirect_target("/gallery/images"))
}

async fn videos_gallery(State(state): State<AppState>, Query(q): Query<PageQuery>) -> Result<Html<String>, ApiError> {
    let page = state
        .db
        .list_videos(q.page.unwrap_or(1), GALLERY_PER_PAGE)
        .await?;
    Ok(Html(views::videos_gallery(&page, q.notice().as_ref())))
}

async fn images_gallery(State(state): State<AppState>, Query(q): Query<PageQuery>) -> Result<Html<String>, ApiError> {
    let page = state
        .db
        .list_images(q.page.unwrap_or(1), GALLERY_PER_PAGE)
        .await?;
    Ok(Html(views::images_gallery(&page, q.notice().as_ref())))
}

async fn get_video(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<GeneratedVideo>, ApiError> {
    state
        .db
        .get_video(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("video {}", id)))
}

async fn get_image(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<GeneratedImage>, ApiError> {
    state
        .db
        .get_image(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("image {}", id)))
}

async fn toggle_video_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    match state.db.toggle_video_favorite(id).await? {
        Some(is_favorite) => Ok(Json(FavoriteResponse { id, is_favorite })),
        None => Err(ApiError::NotFound(format!("video {}", id))),
    }
}

async fn toggle_image_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    match state.db.toggle_image_favorite(id).await? {
        Some(is_favorite) => Ok(Json(FavoriteResponse { id, is_favorite })),
        None => Err(ApiError::NotFound(format!("image {}", id))),
    }
}

async fn serve_video(State(state): State<AppState>, Path(filename): Path<String>, req: Request) -> Response {
    let dir = state.config.media.videos.clone();
    serve_media(&dir, &filename, VIDEO_EXTENSIONS, req).await
}

async fn serve_image(State(state): State<AppState>, Path(filename): Path<String>, req: Request) -> Response {
    let dir = state.config.media.images.clone();
    serve_media(&dir, &filename, IMAGE_EXTENSIONS, req).await
}

async fn serve_media(dir: &std::path::Path, filename: &str, allowed: &[&str], req: Request) -> Response {
    // Security check: validate the name before touching the filesystem
    if let Err(e) = validate_media_name(filename, allowed) {
        warn!("[MEDIA] Rejected {:?}: {}", filename, e);
        return ApiError::Forbidden(e).into_response();
    }

    let path = dir.join(filename);
    if !path.is_file() {
        return ApiError::NotFound(filename.to_string()).into_response();
    }

    let service = ServeFile::new(path);
    match service.oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(err) => {
            error!("[MEDIA] ServeFile error: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = health::check(&state).await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_shown_verbatim() {
        let n = failure_notice(&GenError::validation("Prompt must be at least 3 characters long."), VIDEO_FAILED);
        assert_eq!(n, Notice::error("Prompt must be at least 3 characters long."));
    }

    #[test]
    fn other_errors_are_generic() {
        let n = failure_notice(&GenError::encode("ffmpeg exited 1"), VIDEO_FAILED);
        assert_eq!(n.message, VIDEO_FAILED);
    }
}
