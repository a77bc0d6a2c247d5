use crate::domain::model::{InvoiceGroup, Record, Replacements};
use crate::utils::error::{InvoiceError, Result};
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// The fixed placeholder set known to the invoice template.
pub const PLACEHOLDERS: [&str; 7] = [
    "Customer_Name",
    "Customer_Email",
    "Package_Number",
    "Order_Date",
    "Shipping_Address",
    "Items",
    "Total_Amount",
];

const AMOUNT_COLUMN: &str = "Amount";

/// Wrap a placeholder name in its template delimiters.
pub fn placeholder(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

/// Deterministic name for the produced document.
pub fn document_name(prefix: &str, package_number: &str) -> String {
    format!("{}{}", prefix, package_number)
}

/// Render one content row as a single human-readable item line, fields in
/// fixed order.
fn render_item_line(record: &Record) -> String {
    format!(
        "Card: {}, Set: {}, Cond.: {}, Finish: {}, Lang.: {}, Amount: {}, Status: {}, Date: {}",
        record.get_or_blank("Card"),
        record.get_or_blank("Set"),
        record.get_or_blank("Cond."),
        record.get_or_blank("Finish"),
        record.get_or_blank("Lang."),
        record.get_or_blank(AMOUNT_COLUMN),
        record.get_or_blank("Status"),
        record.get_or_blank("Date"),
    )
}

/// One line per content row, newline-joined, in original row order. A group
/// with no content rows renders an empty string.
pub fn render_items(group: &InvoiceGroup) -> String {
    group
        .content_rows()
        .map(render_item_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Exact decimal sum of a group's amount column. The string form is the
/// plain decimal rendering, so "10.5" + "2.25" totals "12.75" and integral
/// inputs stay integral ("2" + "3" totals "5"); float artifacts never appear.
pub fn group_total(group: &InvoiceGroup) -> Result<BigDecimal> {
    let mut total = BigDecimal::from(0);
    for record in group.content_rows() {
        let raw = record.get_or_blank(AMOUNT_COLUMN);
        let amount = BigDecimal::from_str(raw.trim()).map_err(|_| {
            InvoiceError::ProcessingError {
                message: format!(
                    "package {}: amount '{}' is not a number",
                    group.package_number, raw
                ),
            }
        })?;
        total += amount;
    }
    Ok(total)
}

/// Compute the full replacement map for one group. Metadata fields come from
/// the group's first metadata-bearing row; a group with no metadata at all
/// (orphaned content) gets empty strings.
pub fn build_replacements(group: &InvoiceGroup) -> Result<Replacements> {
    let meta = group.first_meta();
    let meta_field = |name: &str| -> String {
        meta.map(|r| r.get_or_blank(name).to_string())
            .unwrap_or_default()
    };

    let total = group_total(group)?;

    let mut replacements = Replacements::new();
    replacements.insert("Customer_Name".to_string(), meta_field("Customer_Name"));
    replacements.insert("Customer_Email".to_string(), meta_field("Customer_Email"));
    replacements.insert(
        "Package_Number".to_string(),
        group.package_number.clone(),
    );
    replacements.insert("Order_Date".to_string(), meta_field("Order_Date"));
    replacements.insert(
        "Shipping_Address".to_string(),
        meta_field("Shipping_Address"),
    );
    replacements.insert("Items".to_string(), render_items(group));
    replacements.insert("Total_Amount".to_string(), total.to_string());

    Ok(replacements)
}

/// Turn a replacement map into the literal search/replace pairs handed to a
/// `TextReplacer`: keys get their delimiters, values stay opaque literal
/// text (no escaping, no pattern interpretation).
pub fn to_literal_substitutions(replacements: &Replacements) -> Vec<(String, String)> {
    replacements
        .iter()
        .map(|(name, value)| (placeholder(name), value.clone()))
        .collect()
}
