use crate::core::summary::SummaryLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::xlsx::export_xlsx;
use crate::export::{ExportFormat, SummaryExport};
use crate::models::filter::SummaryFilter;
use std::path::Path;

pub struct ExportLogic;

impl ExportLogic {
    /// Export the attendance summary for `filter` to `file`.
    pub fn export(
        pool: &mut DbPool,
        format: &ExportFormat,
        file: &str,
        filter: &SummaryFilter,
        force: bool,
    ) -> AppResult<()> {
        let path = Path::new(file);

        ensure_writable(path, force)?;

        let summaries = SummaryLogic::summarize(pool, filter)?;

        if summaries.is_empty() {
            println!("⚠️  No attendance data for the selected filter. Nothing to export.");
            return Ok(());
        }

        let rows: Vec<SummaryExport> = summaries.iter().map(SummaryExport::from).collect();

        match format {
            ExportFormat::Csv => export_csv(&rows, path),
            ExportFormat::Json => export_json(&rows, path),
            ExportFormat::Xlsx => export_xlsx(&rows, path),
        }
    }
}
