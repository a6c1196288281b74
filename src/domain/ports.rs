use crate::core::options::ReconcileOptions;
use crate::domain::model::{ExtractedInputs, ReconciliationOutcome};
use crate::domain::sheet::Sheet;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Turns raw file bytes into rows of cells. The binary format is the
/// reader's business; callers only see indexed cell access.
pub trait TabularReader: Send + Sync {
    fn open(&self, bytes: &[u8]) -> Result<Sheet>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub const ALL: [&'static str; 2] = ["json", "csv"];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn prism_file(&self) -> &str;
    fn beeline_file(&self) -> &str;
    fn mapping_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> Vec<OutputFormat>;
    fn bundle_output(&self) -> bool;
    fn bundle_filename(&self) -> &str {
        "reconciliation.zip"
    }
    fn reconcile_options(&self) -> ReconcileOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractedInputs>;
    async fn transform(&self, inputs: ExtractedInputs) -> Result<ReconciliationOutcome>;
    async fn load(&self, outcome: &ReconciliationOutcome) -> Result<String>;
}
