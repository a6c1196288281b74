pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::adapters::CsvReader;
pub use crate::core::{
    discrepancy::find_discrepancies,
    job::{JobOutcome, ReconcileJob},
    options::{ColumnBinding, DuplicatePolicy, ReconcileOptions, SheetLayout},
    pipeline::ReconciliationPipeline,
    reconcile::reconcile,
};
pub use domain::model::{
    BeelineRecord, Discrepancy, IdentityMap, PrismRecord, ReconciliationReport,
    ReconciliationSummary, TimesheetSource,
};
pub use domain::sheet::{Cell, Row, Sheet};
pub use utils::error::{ReconError, Result};
