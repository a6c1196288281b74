use anyhow::Context;
use clap::Parser;
use timesheet_recon::core::ConfigProvider;
use timesheet_recon::utils::error::ErrorSeverity;
use timesheet_recon::utils::{logger, validation::Validate};
use timesheet_recon::{LocalStorage, ReconcileJob, ReconciliationPipeline, SheetLayout, TomlConfig};

#[derive(Parser)]
#[command(name = "toml_recon")]
#[command(about = "Timesheet reconciliation driven by a TOML job file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "recon-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Validate the config and show the column layouts without reading any input
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = TomlConfig::from_file(&args.config).with_context(|| {
        format!(
            "Failed to load config file '{}'; make sure it exists and is valid TOML",
            args.config
        )
    })?;

    logger::init_logger(args.verbose, config.json_logs());
    tracing::info!("🚀 Starting TOML-based reconciliation");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No input will be read");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = ReconciliationPipeline::new(LocalStorage::default(), config);
    let job = ReconcileJob::new_with_monitoring(pipeline, monitor_enabled);

    match job.run().await {
        Ok(result) => {
            let summary = &result.outcome.summary;
            println!("✅ Reconciliation finished");
            println!(
                "  Discrepancies: {} ({} unmapped, {} hours mismatches)",
                summary.total_discrepancies(),
                summary.unmapped,
                summary.hours_mismatches
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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Job: {}", config.job.name);
    if let Some(description) = &config.job.description {
        println!("  Description: {}", description);
    }
    println!("  Mapping: {}", config.mapping_file());
    println!("  Prism: {}", config.prism_file());
    println!("  Beeline: {}", config.beeline_file());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    println!("  Duplicate mappings: {:?}", config.duplicate_policy());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn print_layout(title: &str, layout: &SheetLayout) {
    println!("{}:", title);
    for (field, binding) in layout.fields() {
        match &binding.header {
            Some(header) => println!("  {} <- column {} ('{}')", field, binding.index, header),
            None => println!("  {} <- column {}", field, binding.index),
        }
    }
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    let options = config.reconcile_options();
    print_layout("🗂️ Mapping columns", &options.mapping_layout);
    print_layout("🟦 Prism columns", &options.prism_layout);
    print_layout("🟩 Beeline columns", &options.beeline_layout);

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    if config.bundle_output() {
        println!("  Bundle: {} (ZIP)", config.bundle_filename());
    }

    println!();
    println!("✅ Dry run analysis complete.");
}
