use crate::corpus::{Book, CorpusStats, Surah};
use crate::engine::{SearchEngine, SearchResults};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub end: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    #[serde(flatten)]
    pub results: SearchResults,
}

/// Surah listing without its verses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahSummary {
    pub id: u32,
    pub number: u32,
    pub name_arabic: String,
    pub name_kurdish: String,
    pub meaning_kurdish: String,
    pub name_translit: String,
    pub revelation_type: String,
    pub verse_count: usize,
    pub has_lessons: bool,
}

impl From<&Surah> for SurahSummary {
    fn from(surah: &Surah) -> Self {
        Self {
            id: surah.id,
            number: surah.number,
            name_arabic: surah.name_arabic.clone(),
            name_kurdish: surah.name_kurdish.clone(),
            meaning_kurdish: surah.meaning_kurdish.clone(),
            name_translit: surah.name_translit.clone(),
            revelation_type: surah.revelation_type.clone(),
            verse_count: surah
                .verse_count
                .map_or(surah.verses.len(), |count| count as usize),
            has_lessons: surah.has_lessons,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

// ========== Error Handling ==========

pub enum AppError {
    NotFound(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Internal(err) => {
                let message = format!("{:#}", err);
                tracing::error!("API error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

// ========== Handlers ==========

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK"))
}

async fn search(
    State(engine): State<Arc<SearchEngine>>,
    Query(req): Query<SearchRequest>,
) -> Json<ApiResponse<SearchResponse>> {
    let results = engine.search(&req.q);

    Json(ApiResponse::success(SearchResponse {
        query: req.q,
        results,
    }))
}

async fn list_surahs(
    State(engine): State<Arc<SearchEngine>>,
    Query(req): Query<RangeRequest>,
) -> Json<ApiResponse<Vec<SurahSummary>>> {
    let surahs = engine
        .corpus()
        .surahs_range(req.start.unwrap_or(1), req.end.unwrap_or(u32::MAX))
        .into_iter()
        .map(SurahSummary::from)
        .collect();

    Json(ApiResponse::success(surahs))
}

async fn list_surahs_with_lessons(
    State(engine): State<Arc<SearchEngine>>,
) -> Json<ApiResponse<Vec<SurahSummary>>> {
    let surahs = engine
        .corpus()
        .surahs_with_lessons()
        .into_iter()
        .map(SurahSummary::from)
        .collect();

    Json(ApiResponse::success(surahs))
}

async fn get_surah(
    State(engine): State<Arc<SearchEngine>>,
    Path(id): Path<u32>,
) -> Result<Json<ApiResponse<Surah>>, AppError> {
    let surah = engine
        .corpus()
        .get_surah(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Surah with id '{}' not found", id)))?;

    Ok(Json(ApiResponse::success(surah)))
}

async fn get_book(
    State(engine): State<Arc<SearchEngine>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Book>>, AppError> {
    let book = engine
        .corpus()
        .get_book(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Book with id '{}' not found", id)))?;

    Ok(Json(ApiResponse::success(book)))
}

async fn get_stats(State(engine): State<Arc<SearchEngine>>) -> Json<ApiResponse<CorpusStats>> {
    Json(ApiResponse::success(engine.corpus().stats()))
}

// ========== Router ==========

pub fn create_router(engine: Arc<SearchEngine>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/search", get(search))
        .route("/surahs", get(list_surahs))
        .route("/surahs/lessons", get(list_surahs_with_lessons))
        .route("/surahs/:id", get(get_surah))
        .route("/books/:id", get(get_book))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(engine)
}
