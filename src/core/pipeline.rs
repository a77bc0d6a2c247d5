use crate::config::{JobConfig, UnmatchedContentPolicy};
use crate::core::invoice;
use crate::core::merge;
use crate::domain::model::{FailedInvoice, InvoicePlan, MergedRow, RunReport};
use crate::domain::ports::{
    DocumentCopier, Pipeline, TableFetcher, TextReplacer, TransformOutcome,
};
use crate::utils::error::Result;

/// The invoice pipeline wired to its three capability ports. All remote
/// protocol knowledge lives behind the ports, so the stages here are fully
/// testable against fakes.
pub struct InvoicePipeline<F, C, R>
where
    F: TableFetcher,
    C: DocumentCopier,
    R: TextReplacer,
{
    fetcher: F,
    copier: C,
    replacer: R,
    config: JobConfig,
}

impl<F, C, R> InvoicePipeline<F, C, R>
where
    F: TableFetcher,
    C: DocumentCopier,
    R: TextReplacer,
{
    pub fn new(fetcher: F, copier: C, replacer: R, config: JobConfig) -> Self {
        Self {
            fetcher,
            copier,
            replacer,
            config,
        }
    }

    async fn produce_one(&self, plan: &InvoicePlan) -> Result<String> {
        let document_id = self
            .copier
            .copy_document(
                &self.config.template.document_id,
                &plan.document_name,
                &self.config.template.folder_id,
            )
            .await?;

        let substitutions = invoice::to_literal_substitutions(&plan.replacements);
        self.replacer
            .replace_text(&document_id, &substitutions)
            .await?;

        Ok(document_id)
    }
}

#[async_trait::async_trait]
impl<F, C, R> Pipeline for InvoicePipeline<F, C, R>
where
    F: TableFetcher,
    C: DocumentCopier,
    R: TextReplacer,
{
    async fn extract(&self) -> Result<Vec<MergedRow>> {
        let source = &self.config.source;

        tracing::debug!(
            spreadsheet = %source.spreadsheet_id,
            range = %source.meta_range,
            "fetching package metadata"
        );
        let meta = self
            .fetcher
            .fetch_table(&source.spreadsheet_id, &source.meta_range)
            .await?;

        tracing::debug!(
            spreadsheet = %source.spreadsheet_id,
            range = %source.contents_range,
            "fetching package contents"
        );
        let contents = self
            .fetcher
            .fetch_table(&source.spreadsheet_id, &source.contents_range)
            .await?;

        tracing::debug!(
            meta_rows = meta.row_count(),
            content_rows = contents.row_count(),
            "merging tables on package number"
        );

        Ok(merge::merge_tables(&meta, &contents))
    }

    async fn transform(&self, rows: Vec<MergedRow>) -> Result<TransformOutcome> {
        let groups = merge::group_rows(rows);
        let mut outcome = TransformOutcome::default();

        for group in groups {
            if self.config.policy.unmatched_content == UnmatchedContentPolicy::Reject
                && group.first_meta().is_none()
            {
                tracing::warn!(
                    package = %group.package_number,
                    "rejecting content rows with no metadata row"
                );
                outcome.reject(
                    group.package_number.clone(),
                    "no metadata row for package".to_string(),
                );
                continue;
            }

            match invoice::build_replacements(&group) {
                Ok(replacements) => outcome.plans.push(InvoicePlan {
                    package_number: group.package_number.clone(),
                    document_name: invoice::document_name(
                        &self.config.template.name_prefix,
                        &group.package_number,
                    ),
                    replacements,
                }),
                Err(e) => {
                    tracing::warn!(package = %group.package_number, error = %e, "skipping package");
                    outcome.reject(group.package_number.clone(), e.to_string());
                }
            }
        }

        Ok(outcome)
    }

    async fn load(&self, outcome: TransformOutcome) -> Result<RunReport> {
        let mut report = RunReport {
            succeeded: Vec::new(),
            failed: outcome.rejected,
        };

        // Under abort-on-first, packages that precede the earliest rejection
        // in the source order are still produced; everything after it is not.
        let stop_before = if self.config.policy.continue_on_error {
            None
        } else {
            outcome.first_rejection
        };

        for (index, plan) in outcome.plans.iter().enumerate() {
            if stop_before == Some(index) {
                tracing::error!(
                    package = %plan.package_number,
                    "aborting document production: data error in an earlier package"
                );
                break;
            }
            match self.produce_one(plan).await {
                Ok(document_id) => {
                    tracing::info!(
                        package = %plan.package_number,
                        document_id = %document_id,
                        "invoice document produced"
                    );
                    println!("Invoice generated for package {}.", plan.package_number);
                    report.succeeded.push(plan.package_number.clone());
                }
                Err(e) => {
                    tracing::error!(
                        package = %plan.package_number,
                        error = %e,
                        "failed to produce invoice"
                    );
                    report.failed.push(FailedInvoice {
                        package_number: plan.package_number.clone(),
                        reason: e.to_string(),
                    });
                    if !self.config.policy.continue_on_error {
                        // Remaining groups are left unattempted; a partial
                        // copy may exist for this package (the operation is
                        // not transactional).
                        break;
                    }
                }
            }
        }

        Ok(report)
    }
}
