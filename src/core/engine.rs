use crate::domain::model::RunReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives the three pipeline stages and reports progress.
pub struct InvoiceEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> InvoiceEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Fetching and merging spreadsheet data...");
        let rows = self.pipeline.extract().await?;
        tracing::info!("Merged table has {} rows", rows.len());
        self.monitor.log_stats("extract");

        tracing::info!("Grouping packages and computing totals...");
        let outcome = self.pipeline.transform(rows).await?;
        tracing::info!(
            "{} invoices planned, {} packages rejected",
            outcome.plans.len(),
            outcome.rejected.len()
        );
        self.monitor.log_stats("transform");

        tracing::info!("Producing invoice documents...");
        let report = self.pipeline.load(outcome).await?;
        tracing::info!(
            "Produced {} documents, {} failures",
            report.succeeded.len(),
            report.failed.len()
        );
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(report)
    }
}
