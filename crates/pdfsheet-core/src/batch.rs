//! Converting many PDFs in one run.
//!
//! Files are processed one at a time. A file that fails is recorded and
//! skipped; it never stops the rest of the batch.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver};
use serde::{Deserialize, Serialize};

use crate::error::PdfsheetError;
use crate::extraction::PdfExtractor;
use crate::layout::WorkbookPlan;
use crate::workbook::write_plan;

/// Options shared by every file of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Put every table of a document into a single sheet.
    pub merge: bool,
    /// Directory for workbooks; next to each PDF when unset.
    pub output_dir: Option<PathBuf>,
}

impl ConvertOptions {
    /// Build a job for `input` with its default output path.
    pub fn job_for(&self, input: impl Into<PathBuf>) -> ConversionJob {
        let input = input.into();
        let output = default_output_path(&input, self.output_dir.as_deref());
        ConversionJob { input, output }
    }
}

/// One PDF to convert and where its workbook goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// `report.pdf` becomes `report.xlsx`, in `output_dir` when given.
pub fn default_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let with_ext = input.with_extension("xlsx");
    match (output_dir, with_ext.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => with_ext,
    }
}

/// What was written for one successfully converted file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sheets: Vec<String>,
    pub tables: usize,
    pub rows: usize,
    /// True when the document had no tables and its page text was written.
    pub text_fallback: bool,
}

/// A file that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file_name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted(FileReport),
    Failed(FileFailure),
}

/// Progress notification emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    /// File `index` (0-based) of `total` is done.
    FileFinished {
        index: usize,
        total: usize,
        outcome: FileOutcome,
    },
    /// Every file has been attempted.
    Finished { converted: usize, failed: usize },
}

/// Summary of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub converted: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Convert one PDF file and write its workbook.
pub fn convert_file(
    job: &ConversionJob,
    extractor: &dyn PdfExtractor,
    options: &ConvertOptions,
) -> Result<FileReport, PdfsheetError> {
    let bytes = std::fs::read(&job.input)?;
    let plan = crate::convert_pdf(&bytes, extractor, options.merge)?;
    write_plan(&plan, &job.output)?;

    let report = FileReport {
        input: job.input.clone(),
        output: job.output.clone(),
        sheets: plan.sheet_names().into_iter().map(String::from).collect(),
        tables: plan.table_count(),
        rows: plan.data_row_count(),
        text_fallback: matches!(plan, WorkbookPlan::TextContent { .. }),
    };
    tracing::info!(
        input = %job.input.display(),
        output = %job.output.display(),
        tables = report.tables,
        rows = report.rows,
        "converted"
    );
    Ok(report)
}

/// Convert every job in order, reporting progress after each file.
pub fn run_batch(
    jobs: &[ConversionJob],
    extractor: &dyn PdfExtractor,
    options: &ConvertOptions,
    mut on_progress: impl FnMut(&BatchEvent),
) -> BatchReport {
    let total = jobs.len();
    let mut report = BatchReport::default();

    for (index, job) in jobs.iter().enumerate() {
        let outcome = match convert_file(job, extractor, options) {
            Ok(file) => FileOutcome::Converted(file),
            Err(e) => {
                let failure = FileFailure {
                    file_name: display_name(&job.input),
                    message: e.to_string(),
                };
                tracing::warn!(file = %failure.file_name, error = %e, "conversion failed");
                FileOutcome::Failed(failure)
            }
        };

        match &outcome {
            FileOutcome::Converted(file) => report.converted.push(file.clone()),
            FileOutcome::Failed(failure) => report.failures.push(failure.clone()),
        }
        on_progress(&BatchEvent::FileFinished {
            index,
            total,
            outcome,
        });
    }

    on_progress(&BatchEvent::Finished {
        converted: report.converted.len(),
        failed: report.failures.len(),
    });
    report
}

/// A batch running on its worker thread.
pub struct BatchHandle {
    events: Receiver<BatchEvent>,
    worker: JoinHandle<BatchReport>,
}

impl BatchHandle {
    /// Progress events. The channel closes once the batch is done.
    pub fn events(&self) -> &Receiver<BatchEvent> {
        &self.events
    }

    /// Wait for the worker and return its report.
    pub fn join(self) -> Result<BatchReport, PdfsheetError> {
        self.worker.join().map_err(|_| PdfsheetError::WorkerPanicked)
    }
}

/// Run a batch on a background thread, streaming progress over a channel.
pub fn spawn_batch(
    jobs: Vec<ConversionJob>,
    extractor: Box<dyn PdfExtractor>,
    options: ConvertOptions,
) -> Result<BatchHandle, PdfsheetError> {
    let (tx, rx) = unbounded();
    let worker = thread::Builder::new()
        .name("pdfsheet-batch".into())
        .spawn(move || {
            run_batch(&jobs, extractor.as_ref(), &options, |event| {
                // The receiver may be gone if the caller stopped listening.
                let _ = tx.send(event.clone());
            })
        })?;
    Ok(BatchHandle { events: rx, worker })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
