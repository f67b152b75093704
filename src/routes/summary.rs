use axum::{
    extract::{Multipart, Query, State},
    http::{header, Method},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    config::BatchParams,
    error::AppError,
    models::{ExportRequest, UrlBatchRequest},
    services::{
        file_loader::{collect_uploads, fetch_signed_files},
        pci::{
            export::{serialize, XLSX_MIME},
            processor::NO_VALID_DATA,
            types::{BatchReport, SheetLayout, SummaryRow, UploadedFile},
            utils::{content_disposition, export_file_name},
            BatchProcessor,
        },
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/pci/summary", post(summarize_uploads))
        .route("/pci/summary/xlsx", post(download_summary))
        .route("/pci/summary/urls", post(summarize_urls))
        .route("/pci/export", post(export_table))
        .layer(cors)
}

fn processor(state: &AppState, layout: SheetLayout) -> BatchProcessor {
    BatchProcessor::new(layout).with_max_file_size(state.config.max_file_size)
}

async fn run_batch(processor: BatchProcessor, files: Vec<UploadedFile>) -> Result<BatchReport, AppError> {
    let report = tokio::task::spawn_blocking(move || processor.process(&files)).await?;
    Ok(report)
}

fn xlsx_response(rows: &[SummaryRow], requested: Option<&str>, default_name: &str) -> Result<Response, AppError> {
    if rows.is_empty() {
        return Err(AppError::NoValidData(NO_VALID_DATA.to_string()));
    }

    let bytes = serialize(rows)?;
    let file_name = export_file_name(requested, default_name);
    tracing::info!("Exporting {} rows as {} ({}KB)", rows.len(), file_name, bytes.len() / 1024);

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&file_name)),
        ],
        bytes,
    )
        .into_response())
}

async fn summarize_uploads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BatchParams>,
    multipart: Multipart,
) -> Result<Json<BatchReport>, AppError> {
    let start = std::time::Instant::now();
    let files = collect_uploads(multipart).await?;
    let layout = params.layout(&state.config.layout);
    tracing::info!("Summarizing {} uploaded files with layout {:?}", files.len(), layout);

    let report = run_batch(processor(&state, layout), files).await?;
    tracing::info!("Batch completed in {:?}", start.elapsed());
    Ok(Json(report))
}

async fn download_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BatchParams>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let files = collect_uploads(multipart).await?;
    let layout = params.layout(&state.config.layout);
    tracing::info!("Building summary download for {} files", files.len());

    let report = run_batch(processor(&state, layout), files).await?;
    for issue in report.warnings.iter().chain(&report.errors) {
        tracing::warn!("Left out of export: {}", issue.message);
    }
    xlsx_response(&report.rows, params.filename.as_deref(), &state.config.export_name)
}

async fn summarize_urls(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BatchParams>,
    Json(request): Json<UrlBatchRequest>,
) -> Result<Json<BatchReport>, AppError> {
    let start = std::time::Instant::now();
    tracing::info!("Fetching {} signed files", request.files.len());
    let inputs = fetch_signed_files(&request.files).await?;
    tracing::info!("Downloads finished in {:?}", start.elapsed());

    let processor = processor(&state, params.layout(&state.config.layout));
    let report = tokio::task::spawn_blocking(move || processor.process_inputs(inputs)).await?;
    Ok(Json(report))
}

async fn export_table(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    xlsx_response(&request.rows, request.filename.as_deref(), &state.config.export_name)
}
