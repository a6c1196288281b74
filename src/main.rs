use clap::Parser;
use timesheet_recon::utils::error::ErrorSeverity;
use timesheet_recon::utils::{logger, validation::Validate};
use timesheet_recon::{CliConfig, LocalStorage, ReconcileJob, ReconciliationPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting timesheet-recon CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::default();
    let pipeline = ReconciliationPipeline::new(storage, config);
    let job = ReconcileJob::new_with_monitoring(pipeline, monitor_enabled);

    match job.run().await {
        Ok(result) => {
            let report = &result.outcome.report;
            println!("{}", serde_json::to_string_pretty(report)?);
            println!(
                "✅ Reconciliation finished: {} discrepancies",
                report.discrepancies.len()
            );
            println!("📁 Output saved to: {}", result.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Reconciliation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
