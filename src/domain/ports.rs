use crate::domain::model::{InvoicePlan, MergedRow, RunReport, SheetTable};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read one named range from a spreadsheet as header + rows.
#[async_trait]
pub trait TableFetcher: Send + Sync {
    async fn fetch_table(&self, spreadsheet_id: &str, range: &str) -> Result<SheetTable>;
}

/// Duplicate a template document into a destination folder, returning the
/// id of the copy.
#[async_trait]
pub trait DocumentCopier: Send + Sync {
    async fn copy_document(
        &self,
        template_id: &str,
        name: &str,
        folder_id: &str,
    ) -> Result<String>;
}

/// Replace literal search strings inside a document. Keys arrive already
/// delimited (`{{Name}}`) and must be matched as opaque literal text,
/// case-sensitively, never as patterns.
#[async_trait]
pub trait TextReplacer: Send + Sync {
    async fn replace_text(
        &self,
        document_id: &str,
        substitutions: &[(String, String)],
    ) -> Result<()>;
}

/// The three-stage invoice pipeline.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<MergedRow>>;
    async fn transform(&self, rows: Vec<MergedRow>) -> Result<TransformOutcome>;
    async fn load(&self, outcome: TransformOutcome) -> Result<RunReport>;
}

/// Result of the transform stage: plans ready for document production plus
/// packages already rejected by data policy. `first_rejection` is the number
/// of plans that precede the earliest rejection in group order, so the load
/// stage can stop exactly there when failures must abort the run.
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    pub plans: Vec<InvoicePlan>,
    pub rejected: Vec<crate::domain::model::FailedInvoice>,
    pub first_rejection: Option<usize>,
}

impl TransformOutcome {
    pub fn reject(&mut self, package_number: String, reason: String) {
        self.first_rejection.get_or_insert(self.plans.len());
        self.rejected.push(crate::domain::model::FailedInvoice {
            package_number,
            reason,
        });
    }
}
