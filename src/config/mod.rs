pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::options::{DuplicatePolicy, ReconcileOptions};
#[cfg(feature = "cli")]
use crate::domain::ports::{ConfigProvider, OutputFormat};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "timesheet-recon")]
#[command(about = "Reconcile Prism and Beeline timesheet hours")]
pub struct CliConfig {
    /// Prism export (source A, Fulcrum IDs)
    #[arg(long)]
    pub prism_file: String,

    /// Beeline export (source B, MasterCard IDs)
    #[arg(long)]
    pub beeline_file: String,

    /// Fulcrum ID -> MasterCard ID mapping table
    #[arg(long)]
    pub mapping_file: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "json")]
    pub output_formats: Vec<String>,

    #[arg(long, help = "Also write every output into reconciliation.zip")]
    pub bundle: bool,

    #[arg(long, help = "Fail when a Fulcrum ID appears twice in the mapping")]
    pub reject_duplicate_mappings: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn prism_file(&self) -> &str {
        &self.prism_file
    }

    fn beeline_file(&self) -> &str {
        &self.beeline_file
    }

    fn mapping_file(&self) -> &str {
        &self.mapping_file
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.output_formats
            .iter()
            .filter_map(|f| OutputFormat::parse(f))
            .collect()
    }

    fn bundle_output(&self) -> bool {
        self.bundle
    }

    fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            duplicate_policy: if self.reject_duplicate_mappings {
                DuplicatePolicy::Reject
            } else {
                DuplicatePolicy::Overwrite
            },
            ..ReconcileOptions::default()
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_input_file("prism_file", &self.prism_file)?;
        validation::validate_input_file("beeline_file", &self.beeline_file)?;
        validation::validate_input_file("mapping_file", &self.mapping_file)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;

        tracing::debug!("✅ CLI configuration validation passed");
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["timesheet-recon"];
        argv.extend_from_slice(args);
        CliConfig::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[
            "--prism-file",
            "prism.csv",
            "--beeline-file",
            "beeline.tsv",
            "--mapping-file",
            "mapping.csv",
        ]);

        assert_eq!(config.output_path, "./output");
        assert_eq!(config.output_formats(), vec![OutputFormat::Json]);
        assert!(!config.bundle_output());
        assert_eq!(
            config.reconcile_options().duplicate_policy,
            DuplicatePolicy::Overwrite
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "--prism-file",
            "p.csv",
            "--beeline-file",
            "b.csv",
            "--mapping-file",
            "m.csv",
            "--output-formats",
            "json,csv",
            "--bundle",
            "--reject-duplicate-mappings",
        ]);

        assert_eq!(
            config.output_formats(),
            vec![OutputFormat::Json, OutputFormat::Csv]
        );
        assert!(config.bundle_output());
        assert_eq!(
            config.reconcile_options().duplicate_policy,
            DuplicatePolicy::Reject
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = parse(&[
            "--prism-file",
            "p.xlsx",
            "--beeline-file",
            "b.csv",
            "--mapping-file",
            "m.csv",
        ]);
        assert!(config.validate().is_err());

        config.prism_file = "p.csv".to_string();
        config.output_formats = vec!["parquet".to_string()];
        assert!(config.validate().is_err());
    }
}
