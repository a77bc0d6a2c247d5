use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Column holding the package identifier in both source tabs.
pub const PACKAGE_NUMBER: &str = "Package_Number";

/// A tabular range fetched from the spreadsheet: the first row of the raw
/// range is the header, everything after it becomes records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Build a table from raw range values. An empty fetch result degrades to
    /// an empty table with no columns rather than an error.
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let header = values.remove(0);
        Self {
            header,
            rows: values,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Materialize rows as named records. Rows shorter than the header are
    /// padded with empty strings; cells beyond the header are dropped.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                let fields = self
                    .header
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let value = row.get(i).cloned().unwrap_or_default();
                        (name.clone(), value)
                    })
                    .collect();
                Record { fields }
            })
            .collect()
    }
}

/// One named row of a sheet table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub fields: IndexMap<String, String>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    /// Field value with the null-to-empty-string policy applied.
    pub fn get_or_blank(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn package_number(&self) -> &str {
        self.get_or_blank(PACKAGE_NUMBER)
    }
}

/// One row of the merged table. Either side may be absent: a metadata row
/// with no content rows keeps `content: None`, and a content row whose
/// package number is unknown to the metadata tab keeps `meta: None`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub package_number: String,
    pub meta: Option<Record>,
    pub content: Option<Record>,
}

impl MergedRow {
    pub fn meta_field(&self, name: &str) -> &str {
        self.meta
            .as_ref()
            .map(|r| r.get_or_blank(name))
            .unwrap_or("")
    }

    pub fn content_field(&self, name: &str) -> &str {
        self.content
            .as_ref()
            .map(|r| r.get_or_blank(name))
            .unwrap_or("")
    }
}

/// All merged rows sharing one package number, in input order.
#[derive(Debug, Clone)]
pub struct InvoiceGroup {
    pub package_number: String,
    pub rows: Vec<MergedRow>,
}

impl InvoiceGroup {
    /// Customer/shipping fields come from the first row carrying metadata.
    /// If metadata were to differ across rows of one package only the first
    /// would win.
    pub fn first_meta(&self) -> Option<&Record> {
        self.rows.iter().find_map(|r| r.meta.as_ref())
    }

    pub fn content_rows(&self) -> impl Iterator<Item = &Record> {
        self.rows.iter().filter_map(|r| r.content.as_ref())
    }
}

/// Placeholder-name -> computed value, in a fixed order.
pub type Replacements = IndexMap<String, String>;

/// Everything needed to produce one invoice document.
#[derive(Debug, Clone)]
pub struct InvoicePlan {
    pub package_number: String,
    pub document_name: String,
    pub replacements: Replacements,
}

/// A package that could not be turned into a document, with the reason.
#[derive(Debug, Clone)]
pub struct FailedInvoice {
    pub package_number: String,
    pub reason: String,
}

/// Aggregate outcome of one run: which packages produced a document and
/// which did not.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedInvoice>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_from_values_splits_header() {
        let table = SheetTable::from_values(vec![
            vec!["Package_Number".into(), "Customer_Name".into()],
            vec!["1".into(), "Alice".into()],
            vec!["2".into(), "Bob".into()],
        ]);

        assert_eq!(table.header, vec!["Package_Number", "Customer_Name"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_table_from_empty_values() {
        let table = SheetTable::from_values(vec![]);
        assert!(table.header.is_empty());
        assert!(table.is_empty());
        assert!(table.records().is_empty());
    }

    #[test]
    fn test_header_only_range_yields_empty_table() {
        let table = SheetTable::from_values(vec![vec!["Package_Number".into()]]);
        assert_eq!(table.header.len(), 1);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_records_pad_short_rows() {
        let table = SheetTable::from_values(vec![
            vec![
                "Package_Number".into(),
                "Customer_Name".into(),
                "Customer_Email".into(),
            ],
            vec!["1".into(), "Alice".into()],
        ]);

        let records = table.records();
        assert_eq!(records[0].get("Customer_Name"), Some("Alice"));
        assert_eq!(records[0].get("Customer_Email"), Some(""));
    }

    #[test]
    fn test_merged_row_blank_fields_when_side_missing() {
        let row = MergedRow {
            package_number: "99".into(),
            meta: None,
            content: None,
        };
        assert_eq!(row.meta_field("Customer_Name"), "");
        assert_eq!(row.content_field("Card"), "");
    }
}
