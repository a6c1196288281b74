pub mod discrepancy;
pub mod extract;
pub mod identity;
pub mod job;
pub mod options;
pub mod pipeline;
pub mod projection;
pub mod reconcile;

pub use crate::domain::model::{ExtractedInputs, ReconciliationOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TabularReader};
pub use crate::utils::error::Result;
