use clap::Parser;
use invoice_merge::adapters::{
    GoogleDocsClient, GoogleDriveClient, GoogleSheetsClient, ServiceAccountAuth,
    ServiceAccountKey,
};
use invoice_merge::core::Pipeline;
use invoice_merge::utils::{error::ErrorSeverity, logger, validation::Validate};
use invoice_merge::{CliArgs, InvoiceEngine, InvoicePipeline, JobConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting invoice-merge");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match JobConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(monitor) = args.monitor {
        config.monitoring.enabled = monitor;
        tracing::info!("🔧 Monitoring overridden to: {}", monitor);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated");

    // Credential problems abort before any remote call.
    let key = match ServiceAccountKey::from_file(&config.auth.credentials_path) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(3);
        }
    };

    let auth = Arc::new(match &config.endpoints.token_url {
        Some(url) => ServiceAccountAuth::with_token_url(key, url.clone()),
        None => ServiceAccountAuth::new(key),
    });

    let fetcher = match &config.endpoints.sheets_url {
        Some(url) => GoogleSheetsClient::with_base_url(auth.clone(), url),
        None => GoogleSheetsClient::new(auth.clone()),
    };
    let copier = match &config.endpoints.drive_url {
        Some(url) => GoogleDriveClient::with_base_url(auth.clone(), url),
        None => GoogleDriveClient::new(auth.clone()),
    };
    let replacer = match &config.endpoints.docs_url {
        Some(url) => GoogleDocsClient::with_base_url(auth.clone(), url),
        None => GoogleDocsClient::new(auth.clone()),
    };

    let monitor_enabled = config.monitoring.enabled;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = InvoicePipeline::new(fetcher, copier, replacer, config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no documents will be produced");
        return dry_run(&pipeline).await;
    }

    let engine = InvoiceEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            println!(
                "✅ Run finished: {}/{} invoices produced",
                report.succeeded.len(),
                report.total()
            );
            if !report.is_clean() {
                for failure in &report.failed {
                    eprintln!(
                        "❌ Package {}: {}",
                        failure.package_number, failure.reason
                    );
                }
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
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

/// Fetch, merge and group the data, then show what a real run would produce.
async fn dry_run<P: Pipeline>(pipeline: &P) -> anyhow::Result<()> {
    let rows = pipeline.extract().await?;
    println!("Merged table: {} rows", rows.len());

    let outcome = pipeline.transform(rows).await?;
    println!("Would produce {} documents:", outcome.plans.len());
    for plan in &outcome.plans {
        println!(
            "  package {} -> '{}' (total {})",
            plan.package_number,
            plan.document_name,
            plan.replacements
                .get("Total_Amount")
                .map(String::as_str)
                .unwrap_or("?")
        );
    }
    for rejected in &outcome.rejected {
        println!(
            "  package {} would be rejected: {}",
            rejected.package_number, rejected.reason
        );
    }

    Ok(())
}
