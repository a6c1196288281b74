use crate::core::extract::ProjectedRecord;
use crate::core::identity::MAPPING_FIELDS;
use crate::core::options::{DuplicatePolicy, ReconcileOptions, SheetLayout};
use crate::domain::model::{BeelineRecord, PrismRecord};
use crate::domain::ports::{ConfigProvider, OutputFormat};
use crate::utils::error::{ReconError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub inputs: InputsConfig,
    pub mapping: Option<MappingConfig>,
    pub prism: Option<SourceConfig>,
    pub beeline: Option<SourceConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    pub prism_file: Option<String>,
    pub beeline_file: Option<String>,
    pub mapping_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    pub duplicate_policy: Option<DuplicatePolicy>,
    pub columns: Option<SheetLayout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub columns: Option<SheetLayout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub bundle: Option<BundleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReconError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReconError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written and caught by validation.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReconError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.mapping
            .as_ref()
            .and_then(|m| m.duplicate_policy)
            .unwrap_or_default()
    }

    pub fn mapping_layout(&self) -> SheetLayout {
        self.mapping
            .as_ref()
            .and_then(|m| m.columns.clone())
            .unwrap_or_else(SheetLayout::mapping_default)
    }

    pub fn prism_layout(&self) -> SheetLayout {
        self.prism
            .as_ref()
            .and_then(|s| s.columns.clone())
            .unwrap_or_else(SheetLayout::prism_default)
    }

    pub fn beeline_layout(&self) -> SheetLayout {
        self.beeline
            .as_ref()
            .and_then(|s| s.columns.clone())
            .unwrap_or_else(SheetLayout::beeline_default)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn validate_config(&self) -> Result<()> {
        for (field, value) in [
            ("inputs.prism_file", &self.inputs.prism_file),
            ("inputs.beeline_file", &self.inputs.beeline_file),
            ("inputs.mapping_file", &self.inputs.mapping_file),
        ] {
            let path = validation::validate_required_field(field, value)?;
            if path.contains("${") {
                return Err(ReconError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: path.clone(),
                    reason: "unresolved environment variable".to_string(),
                });
            }
            validation::validate_input_file(field, path)?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        validation::validate_layout("mapping.columns", &self.mapping_layout(), &MAPPING_FIELDS)?;
        validation::validate_layout("prism.columns", &self.prism_layout(), PrismRecord::FIELDS)?;
        validation::validate_layout("beeline.columns", &self.beeline_layout(), BeelineRecord::FIELDS)?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn prism_file(&self) -> &str {
        self.inputs.prism_file.as_deref().unwrap_or_default()
    }

    fn beeline_file(&self) -> &str {
        self.inputs.beeline_file.as_deref().unwrap_or_default()
    }

    fn mapping_file(&self) -> &str {
        self.inputs.mapping_file.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.load
            .output_formats
            .iter()
            .filter_map(|f| OutputFormat::parse(f))
            .collect()
    }

    fn bundle_output(&self) -> bool {
        self.load.bundle.as_ref().map(|b| b.enabled).unwrap_or(false)
    }

    fn bundle_filename(&self) -> &str {
        self.load
            .bundle
            .as_ref()
            .and_then(|b| b.filename.as_deref())
            .unwrap_or("reconciliation.zip")
    }

    fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            duplicate_policy: self.duplicate_policy(),
            mapping_layout: self.mapping_layout(),
            prism_layout: self.prism_layout(),
            beeline_layout: self.beeline_layout(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[job]
name = "weekly-hours"

[inputs]
prism_file = "exports/prism.csv"
beeline_file = "exports/beeline.tsv"
mapping_file = "exports/mapping.csv"

[load]
output_path = "./recon-output"
output_formats = ["json", "csv"]
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.job.name, "weekly-hours");
        assert_eq!(config.prism_file(), "exports/prism.csv");
        assert_eq!(
            config.output_formats(),
            vec![OutputFormat::Json, OutputFormat::Csv]
        );
        assert!(!config.bundle_output());
        assert_eq!(config.bundle_filename(), "reconciliation.zip");
        assert!(!config.monitoring_enabled());
        assert_eq!(config.reconcile_options(), ReconcileOptions::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_columns_and_policy() {
        let toml_content = format!(
            r#"{}
[mapping]
duplicate_policy = "reject"

[beeline.columns]
mastercard_id = {{ index = 0, header = "MasterCard ID" }}
units = {{ index = 3 }}

[load.bundle]
enabled = true
filename = "week-42.zip"
"#,
            BASIC
        );

        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        let options = config.reconcile_options();

        assert_eq!(options.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(options.beeline_layout.get("units").unwrap().index, 3);
        assert_eq!(
            options.beeline_layout.get("mastercard_id").unwrap().header.as_deref(),
            Some("MasterCard ID")
        );
        assert_eq!(options.prism_layout, SheetLayout::prism_default());
        assert!(config.bundle_output());
        assert_eq!(config.bundle_filename(), "week-42.zip");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RECON_TEST_PRISM", "/data/prism-week42.csv");

        let toml_content = BASIC.replace("exports/prism.csv", "${RECON_TEST_PRISM}");
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.prism_file(), "/data/prism-week42.csv");

        std::env::remove_var("RECON_TEST_PRISM");
    }

    #[test]
    fn test_unresolved_env_var_fails_validation() {
        let toml_content = BASIC.replace("exports/beeline.tsv", "${RECON_TEST_NOT_SET_ANYWHERE}");
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ReconError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_missing_input_fails_validation() {
        let toml_content = BASIC.replace("mapping_file = \"exports/mapping.csv\"\n", "");
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ReconError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_incomplete_layout_fails_validation() {
        let toml_content = format!("{}\n[prism.columns]\nfulcrum_id = {{ index = 2 }}\n", BASIC);
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ReconError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.job.name, "weekly-hours");
    }
}
