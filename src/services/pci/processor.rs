use super::reader::read_column;
use super::stats::{coerce, summarize_sample};
use super::types::*;
use crate::error::SheetError;
use chrono::Utc;

pub const NO_VALID_DATA: &str = "No valid PCI data found in any uploaded files.";

enum FileOutcome {
    Summarized(SummaryRow, FileDiagnostics),
    NoData(FileDiagnostics),
    Failed(SheetError),
}

/// Runs every file of a batch through the reader and the statistics step.
///
/// Files are handled one at a time in input order and never affect each
/// other: a failing file is recorded and the batch moves on.
pub struct BatchProcessor {
    layout: SheetLayout,
    max_file_size: Option<usize>,
}

impl BatchProcessor {
    pub fn new(layout: SheetLayout) -> Self {
        Self { layout, max_file_size: None }
    }

    pub fn with_max_file_size(mut self, limit: usize) -> Self {
        self.max_file_size = Some(limit);
        self
    }

    pub fn process(&self, files: &[UploadedFile]) -> BatchReport {
        self.process_inputs(files.iter().cloned().map(Ok))
    }

    /// Like [`process`](Self::process), for batches where some inputs
    /// already failed upstream (a download, for instance). Those failures
    /// keep their position among the per-file errors.
    pub fn process_inputs<I>(&self, inputs: I) -> BatchReport
    where
        I: IntoIterator<Item = Result<UploadedFile, SheetError>>,
    {
        let start = std::time::Instant::now();
        let mut report = BatchReport {
            processed_at: Utc::now(),
            rows: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            diagnostics: Vec::new(),
            batch_warning: None,
        };

        let mut file_count = 0;
        for input in inputs {
            file_count += 1;
            let outcome = match input {
                Ok(file) => self.process_file(&file),
                Err(e) => FileOutcome::Failed(e),
            };

            match outcome {
                FileOutcome::Summarized(row, diagnostics) => {
                    report.rows.push(row);
                    report.diagnostics.push(diagnostics);
                }
                FileOutcome::NoData(diagnostics) => {
                    report.warnings.push(FileIssue {
                        message: format!("No PCI values found in {}", diagnostics.file_name),
                        file_name: diagnostics.file_name.clone(),
                    });
                    report.diagnostics.push(diagnostics);
                }
                FileOutcome::Failed(e) => {
                    report.errors.push(FileIssue {
                        file_name: e.file_name().to_string(),
                        message: format!("Error processing {}: {}", e.file_name(), e),
                    });
                }
            }
        }

        if report.rows.is_empty() {
            tracing::warn!("No valid PCI data in a batch of {} files", file_count);
            report.batch_warning = Some(NO_VALID_DATA.to_string());
        }

        tracing::info!(
            "Processed {} files in {:?}: {} rows, {} warnings, {} errors",
            file_count,
            start.elapsed(),
            report.rows.len(),
            report.warnings.len(),
            report.errors.len()
        );
        report
    }

    fn process_file(&self, file: &UploadedFile) -> FileOutcome {
        if let Err(e) = self.validate(file) {
            tracing::error!("Rejected {}: {}", file.name, e);
            return FileOutcome::Failed(e);
        }

        let raw = match read_column(file, &self.layout) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", file.name, e);
                return FileOutcome::Failed(e);
            }
        };

        let sample = coerce(&raw);
        let diagnostics = FileDiagnostics {
            file_name: file.name.clone(),
            rows_read: raw.len(),
            numeric_values: sample.values.len(),
            dropped_values: sample.dropped,
        };

        match summarize_sample(&sample) {
            Some(stats) => {
                tracing::info!(
                    "Summarized {}: {} values, {} dropped",
                    file.name,
                    diagnostics.numeric_values,
                    diagnostics.dropped_values
                );
                FileOutcome::Summarized(SummaryRow::from_stats(file.name.clone(), &stats), diagnostics)
            }
            None => {
                tracing::warn!("No PCI values found in {} ({} rows read)", file.name, raw.len());
                FileOutcome::NoData(diagnostics)
            }
        }
    }

    fn validate(&self, file: &UploadedFile) -> Result<(), SheetError> {
        if !file.name.to_ascii_lowercase().ends_with(".xlsx") {
            return Err(SheetError::UnsupportedFileType { file_name: file.name.clone() });
        }
        match self.max_file_size {
            Some(limit) if file.bytes.len() > limit => Err(SheetError::FileTooLarge {
                file_name: file.name.clone(),
                size: file.bytes.len(),
                limit,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pci::fixtures::{numbers, survey_workbook, PciCell};

    fn processor() -> BatchProcessor {
        BatchProcessor::new(SheetLayout::default())
    }

    fn valid(name: &str, values: &[f64]) -> UploadedFile {
        UploadedFile::new(name, survey_workbook(&numbers(values)))
    }

    fn corrupt(name: &str) -> UploadedFile {
        UploadedFile::new(name, b"PK\x03\x04 truncated".to_vec())
    }

    #[test]
    fn test_survey_scenario_produces_expected_row() {
        let cells = [
            PciCell::Number(70.0),
            PciCell::Number(85.0),
            PciCell::Blank,
            PciCell::Text("N/A"),
            PciCell::Number(90.0),
            PciCell::Number(60.0),
        ];
        let file = UploadedFile::new("route_7.xlsx", survey_workbook(&cells));
        let report = processor().process(&[file]);

        assert_eq!(
            report.rows,
            vec![SummaryRow {
                file_name: "route_7.xlsx".to_string(),
                average: 76.25,
                max: 90.0,
                min: 60.0,
                median: 77.5,
            }]
        );
        assert_eq!(
            report.diagnostics,
            vec![FileDiagnostics {
                file_name: "route_7.xlsx".to_string(),
                rows_read: 6,
                numeric_values: 4,
                dropped_values: 2,
            }]
        );
        assert!(report.warnings.is_empty());
        assert!(report.errors.is_empty());
        assert!(report.batch_warning.is_none());
    }

    #[test]
    fn test_all_blank_column_is_warning_not_row() {
        let file = UploadedFile::new(
            "blank.xlsx",
            survey_workbook(&[PciCell::Text(" "), PciCell::Blank, PciCell::Text("  ")]),
        );
        let report = processor().process(&[file]);

        assert!(report.rows.is_empty());
        assert!(report.errors.is_empty());
        assert_eq!(
            report.warnings,
            vec![FileIssue {
                file_name: "blank.xlsx".to_string(),
                message: "No PCI values found in blank.xlsx".to_string(),
            }]
        );
        assert_eq!(report.diagnostics[0].dropped_values, 3);
        assert_eq!(report.batch_warning.as_deref(), Some(NO_VALID_DATA));
    }

    #[test]
    fn test_column_missing_from_data_rows_is_error() {
        let file = UploadedFile::new("unfilled.xlsx", survey_workbook(&[PciCell::Blank, PciCell::Blank]));
        let report = processor().process(&[file]);

        assert!(report.rows.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("column index 3 not found"));
    }

    #[test]
    fn test_corrupt_file_does_not_stop_batch() {
        let files = vec![
            valid("a.xlsx", &[80.0, 90.0]),
            corrupt("b.xlsx"),
            valid("c.xlsx", &[50.0]),
        ];
        let report = processor().process(&files);

        let names: Vec<&str> = report.rows.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.xlsx", "c.xlsx"]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].file_name, "b.xlsx");
        assert!(report.errors[0].message.starts_with("Error processing b.xlsx"));
    }

    #[test]
    fn test_rows_are_independent_of_other_files() {
        let a = valid("a.xlsx", &[72.0, 64.5, 91.0]);
        let alone = processor().process(&[a.clone()]);
        let together = processor().process(&[a, corrupt("b.xlsx")]);

        assert_eq!(alone.rows, together.rows);
        assert!(alone.errors.is_empty());
        assert_eq!(together.errors.len(), 1);
        assert_eq!(together.errors[0].file_name, "b.xlsx");
    }

    #[test]
    fn test_processing_is_idempotent() {
        let files = vec![
            valid("a.xlsx", &[10.0, 20.0, 30.0]),
            corrupt("b.xlsx"),
            UploadedFile::new("c.xlsx", survey_workbook(&[PciCell::Text("--")])),
        ];
        let first = processor().process(&files);
        let second = processor().process(&files);

        assert_eq!(first.rows, second.rows);
        assert_eq!(first.warnings, second.warnings);
        assert_eq!(first.errors, second.errors);
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[test]
    fn test_rejects_non_xlsx_and_oversized_files() {
        let files = vec![
            UploadedFile::new("notes.csv", b"70,80".to_vec()),
            valid("big.XLSX", &[70.0]),
        ];
        let report = processor().with_max_file_size(16).process(&files);

        assert!(report.rows.is_empty());
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].message.contains("not an .xlsx file"));
        assert!(report.errors[1].message.contains("byte limit"));
    }

    #[test]
    fn test_upstream_failures_keep_their_position() {
        let inputs = vec![
            Err(SheetError::Download {
                file_name: "first.xlsx".to_string(),
                reason: "status 404".to_string(),
            }),
            Ok(corrupt("second.xlsx")),
        ];
        let report = processor().process_inputs(inputs);

        let failed: Vec<&str> = report.errors.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(failed, vec!["first.xlsx", "second.xlsx"]);
    }

    #[test]
    fn test_empty_batch_sets_batch_warning() {
        let report = processor().process(&[]);
        assert!(report.rows.is_empty());
        assert_eq!(report.batch_warning.as_deref(), Some(NO_VALID_DATA));
    }
}
