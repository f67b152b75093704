use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde_json::json;
use axum::Json;
use thiserror::Error;

/// Failures scoped to a single file of a batch. They are recorded in the
/// batch report and never abort the remaining files.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to open {file_name} as an Excel workbook: {reason}")]
    FileParse { file_name: String, reason: String },
    #[error("sheet '{sheet_name}' not found in {file_name}")]
    SheetNotFound { file_name: String, sheet_name: String },
    #[error("column {column} not found in sheet '{sheet_name}' of {file_name}")]
    ColumnNotFound {
        file_name: String,
        sheet_name: String,
        column: String,
    },
    #[error("{file_name} is not an .xlsx file")]
    UnsupportedFileType { file_name: String },
    #[error("{file_name} is {size} bytes, above the {limit} byte limit")]
    FileTooLarge {
        file_name: String,
        size: usize,
        limit: usize,
    },
    #[error("failed to download {file_name}: {reason}")]
    Download { file_name: String, reason: String },
}

impl SheetError {
    pub fn file_name(&self) -> &str {
        match self {
            SheetError::FileParse { file_name, .. }
            | SheetError::SheetNotFound { file_name, .. }
            | SheetError::ColumnNotFound { file_name, .. }
            | SheetError::UnsupportedFileType { file_name }
            | SheetError::FileTooLarge { file_name, .. }
            | SheetError::Download { file_name, .. } => file_name,
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    InvalidInput(String),
    NoValidData(String),
    ExportError(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::NoValidData(msg) => write!(f, "No valid data: {}", msg),
            AppError::ExportError(msg) => write!(f, "Export error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::ExportError(err.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::InvalidInput(format!("Malformed upload: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NoValidData(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::ExportError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_error_messages_name_the_file() {
        let err = SheetError::SheetNotFound {
            file_name: "route_12.xlsx".to_string(),
            sheet_name: "PCI".to_string(),
        };
        assert_eq!(err.file_name(), "route_12.xlsx");
        assert_eq!(err.to_string(), "sheet 'PCI' not found in route_12.xlsx");
    }

    #[test]
    fn test_no_valid_data_maps_to_unprocessable_entity() {
        let response = AppError::NoValidData("nothing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = AppError::InvalidInput("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_export_and_join_failures_are_server_errors() {
        let err = AppError::from(rust_xlsxwriter::XlsxError::RowColumnLimitError);
        assert!(matches!(err, AppError::ExportError(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::Internal("worker panicked".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
