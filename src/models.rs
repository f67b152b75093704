use serde::Deserialize;

use crate::services::pci::types::SummaryRow;

#[derive(Debug, Deserialize)]
pub struct SignedFile {
    pub name: Option<String>,
    pub signed_url: String,
}

/// Batch of workbooks to fetch from pre-signed URLs.
#[derive(Debug, Deserialize)]
pub struct UrlBatchRequest {
    pub files: Vec<SignedFile>,
}

/// A summary table previously returned to the client, sent back for download.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub rows: Vec<SummaryRow>,
    pub filename: Option<String>,
}
