use crate::domain::model::{InvoiceGroup, MergedRow, Record, SheetTable};
use indexmap::IndexMap;

/// Join the contents table onto the metadata table on the package number.
///
/// Every metadata row survives: with one merged row per matching content row,
/// or a single content-less row when nothing matches. Content rows whose
/// package number is unknown to the metadata tab are kept as well, with no
/// metadata attached, so they still produce a (degraded) invoice instead of
/// being silently dropped. Row order follows the source tabs: metadata rows
/// first, then orphaned content rows in their input order.
pub fn merge_tables(meta: &SheetTable, contents: &SheetTable) -> Vec<MergedRow> {
    let meta_records = meta.records();
    let content_records = contents.records();

    // Content rows bucketed by package number, preserving input order.
    let mut by_package: IndexMap<String, Vec<Record>> = IndexMap::new();
    for record in &content_records {
        by_package
            .entry(record.package_number().to_string())
            .or_default()
            .push(record.clone());
    }

    let mut merged = Vec::new();
    for meta_record in &meta_records {
        let key = meta_record.package_number().to_string();
        match by_package.shift_remove(&key) {
            Some(matches) => {
                for content in matches {
                    merged.push(MergedRow {
                        package_number: key.clone(),
                        meta: Some(meta_record.clone()),
                        content: Some(content),
                    });
                }
            }
            None => merged.push(MergedRow {
                package_number: key,
                meta: Some(meta_record.clone()),
                content: None,
            }),
        }
    }

    // Whatever is left never matched a metadata row.
    for (key, orphans) in by_package {
        for content in orphans {
            merged.push(MergedRow {
                package_number: key.clone(),
                meta: None,
                content: Some(content),
            });
        }
    }

    merged
}

/// Partition merged rows into groups keyed by package number, in the order
/// each package number first appears (stable grouping).
pub fn group_rows(rows: Vec<MergedRow>) -> Vec<InvoiceGroup> {
    let mut groups: IndexMap<String, Vec<MergedRow>> = IndexMap::new();
    for row in rows {
        groups
            .entry(row.package_number.clone())
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|(package_number, rows)| InvoiceGroup {
            package_number,
            rows,
        })
        .collect()
}
