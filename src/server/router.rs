use super::serializers::AppState;
use crate::db;
use crate::server::routes::extraction_router::{
    extract_document, get_extraction, list_extractions,
};
use crate::service::llm::OpenAiExtractor;

use axum::{
    Router,
    routing::{get, post},
    serve,
};

use std::{net::SocketAddr, sync::Arc};

use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub async fn run() {
    let pool = db::create_connection_pool().expect("Failed to create database pool");

    {
        let mut conn =
            db::get_connection_from_pool(&pool).expect("Failed to get database connection");
        db::run_migrations(&mut conn).expect("Failed to run migrations");
    }

    let extractor = OpenAiExtractor::from_env().expect("Failed to build LLM client");

    let state = Arc::new(AppState {
        pool,
        extractor: Arc::new(extractor),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(|| async { "LLM Extraction API" }))
        .route("/api/extract", post(extract_document))
        .route("/api/extractions", get(list_extractions))
        .route("/api/extractions/{document_id}", get(get_extraction))
        .with_state(state)
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(
            25 * 1024 * 1024, // 25mb cap
        ))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    serve(listener, app).await.unwrap();
}
