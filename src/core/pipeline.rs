use crate::adapters::CsvReader;
use crate::core::reconcile;
use crate::domain::model::{ExtractedInputs, ReconciliationOutcome, ReconciliationReport};
use crate::domain::ports::{ConfigProvider, OutputFormat, Pipeline, Storage, TabularReader};
use crate::domain::sheet::Sheet;
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_FILE: &str = "reconciliation.json";
pub const DISCREPANCY_CSV_FILE: &str = "discrepancies.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// Reads the three exports from storage, reconciles them and writes the
/// report files back.
pub struct ReconciliationPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ReconciliationPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_sheet(&self, path: &str) -> Result<Sheet> {
        let bytes = self.storage.read_file(path).await?;
        let sheet = CsvReader::for_path(path).open(&bytes).inspect_err(|e| {
            tracing::error!("❌ Could not parse {}: {}", path, e);
        })?;
        tracing::debug!("📄 {}: {} data rows", path, sheet.data_row_count());
        Ok(sheet)
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), name)
    }
}

/// Flat CSV rendering of the discrepancy list; unmapped rows leave
/// `masterCardId` empty.
pub fn discrepancies_to_csv(report: &ReconciliationReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["fulcrumId", "masterCardId", "error"])?;
    for discrepancy in &report.discrepancies {
        writer.write_record([
            discrepancy.fulcrum_id(),
            discrepancy.mastercard_id().unwrap_or(""),
            discrepancy.reason(),
        ])?;
    }
    let data = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(data)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReconciliationPipeline<S, C> {
    async fn extract(&self) -> Result<ExtractedInputs> {
        tracing::info!(
            "📥 Reading mapping={}, prism={}, beeline={}",
            self.config.mapping_file(),
            self.config.prism_file(),
            self.config.beeline_file()
        );

        let mapping = self.read_sheet(self.config.mapping_file()).await?;
        let prism = self.read_sheet(self.config.prism_file()).await?;
        let beeline = self.read_sheet(self.config.beeline_file()).await?;

        let options = self.config.reconcile_options();
        reconcile::extract_inputs(&mapping, &prism, &beeline, &options)
    }

    async fn transform(&self, inputs: ExtractedInputs) -> Result<ReconciliationOutcome> {
        Ok(reconcile::compare(&inputs))
    }

    async fn load(&self, outcome: &ReconciliationOutcome) -> Result<String> {
        let mut files: Vec<(&str, Vec<u8>)> = Vec::new();

        for format in self.config.output_formats() {
            match format {
                OutputFormat::Json => {
                    files.push((REPORT_FILE, serde_json::to_vec_pretty(&outcome.report)?))
                }
                OutputFormat::Csv => {
                    files.push((DISCREPANCY_CSV_FILE, discrepancies_to_csv(&outcome.report)?))
                }
            }
        }
        files.push((SUMMARY_FILE, serde_json::to_vec_pretty(&outcome.summary)?));

        for (name, data) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(&self.output_file(name), data).await?;
        }

        if self.config.bundle_output() {
            let bundle_name = self.config.bundle_filename();
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &files {
                    zip.start_file::<_, ()>(*name, FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing ZIP bundle ({} bytes)", zip_data.len());
            self.storage
                .write_file(&self.output_file(bundle_name), &zip_data)
                .await?;
        }

        Ok(self.config.output_path().to_string())
    }
}
