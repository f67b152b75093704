use axum::extract::Multipart;
use reqwest::Client;

use crate::error::{AppError, SheetError};
use crate::models::SignedFile;
use crate::services::pci::types::UploadedFile;
use crate::services::pci::utils::{file_name_from_url, load_file_from_url};

pub const NO_FILES_PROMPT: &str = "Upload PCI Excel files and process them to begin";

/// Collects every file part of a multipart upload, in the order sent.
///
/// Parts without a file name, or with no content (an empty file picker),
/// are ignored. A request without any file is rejected.
pub async fn collect_uploads(mut multipart: Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                tracing::debug!("Ignoring non-file form field {:?}", field.name());
                continue;
            }
        };

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            tracing::warn!("Ignoring empty upload {}", name);
            continue;
        }

        tracing::info!("Received {} ({}KB)", name, bytes.len() / 1024);
        files.push(UploadedFile::new(name, bytes));
    }

    if files.is_empty() {
        return Err(AppError::InvalidInput(NO_FILES_PROMPT.to_string()));
    }
    Ok(files)
}

/// Downloads every signed URL in order. A failed download stays in the list
/// as a per-file error so the batch can report it in place.
pub async fn fetch_signed_files(files: &[SignedFile]) -> Result<Vec<Result<UploadedFile, SheetError>>, AppError> {
    if files.is_empty() {
        return Err(AppError::InvalidInput(NO_FILES_PROMPT.to_string()));
    }

    let client = Client::new();
    let mut fetched = Vec::with_capacity(files.len());
    for file in files {
        let name = file
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| file_name_from_url(&file.signed_url));

        let result = load_file_from_url(&client, name, &file.signed_url).await;
        if let Err(e) = &result {
            tracing::error!("{}", e);
        }
        fetched.push(result);
    }
    Ok(fetched)
}
