use crate::domain::model::ReconciliationOutcome;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub output_path: String,
    pub outcome: ReconciliationOutcome,
}

/// Drives a pipeline through extract, transform and load.
pub struct ReconcileJob<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ReconcileJob<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<JobOutcome> {
        tracing::info!("🚀 Starting timesheet reconciliation");
        self.monitor.log_stats("Start");

        let inputs = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Extracted {} mapping entries, {} Prism rows, {} Beeline rows",
            inputs.identity_map.len(),
            inputs.prism.len(),
            inputs.beeline.len()
        );
        self.monitor.log_stats("Extract");

        let outcome = self.pipeline.transform(inputs).await?;
        tracing::info!(
            "🔍 Found {} discrepancies ({} unmapped, {} hours mismatches)",
            outcome.summary.total_discrepancies(),
            outcome.summary.unmapped,
            outcome.summary.hours_mismatches
        );
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(&outcome).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(JobOutcome {
            output_path,
            outcome,
        })
    }
}
