use bytes::Bytes;
use calamine::Data;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHEET_NAME: &str = "PCI";
pub const DEFAULT_SKIP_ROWS: usize = 5;
pub const DEFAULT_COLUMN_INDEX: usize = 3;

/// Cell values of one column, in sheet row order.
pub type RawColumn = Vec<Data>;

/// One spreadsheet submitted as part of a batch.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// How the PCI column is located once the leading rows are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    /// Zero-based positional column.
    Index(usize),
    /// Label of a header cell on the first row after the skipped block.
    Header(String),
}

impl std::fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnSelector::Index(idx) => write!(f, "index {}", idx),
            ColumnSelector::Header(label) => write!(f, "header '{}'", label),
        }
    }
}

/// Where the PCI values live inside each workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub skip_rows: usize,
    pub column: ColumnSelector,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            skip_rows: DEFAULT_SKIP_ROWS,
            column: ColumnSelector::Index(DEFAULT_COLUMN_INDEX),
        }
    }
}

/// Values of a raw column that coerced to finite numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericSample {
    pub values: Vec<f64>,
    pub dropped: usize,
}

impl NumericSample {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Unrounded statistics of a non-empty sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub file_name: String,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub median: f64,
}

pub type SummaryTable = Vec<SummaryRow>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiagnostics {
    pub file_name: String,
    pub rows_read: usize,
    pub numeric_values: usize,
    pub dropped_values: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIssue {
    pub file_name: String,
    pub message: String,
}

/// Outcome of one batch: the summary table plus every per-file message.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub processed_at: DateTime<Utc>,
    pub rows: SummaryTable,
    pub warnings: Vec<FileIssue>,
    pub errors: Vec<FileIssue>,
    pub diagnostics: Vec<FileDiagnostics>,
    pub batch_warning: Option<String>,
}
