//! The extracted invoice record.

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured data extracted from a single billing document.
///
/// A record is always fully constructed: unresolved fields carry an explicit
/// empty-string or zero sentinel rather than being absent. Field-level misses
/// never raise; whether the record is usable is decided solely by
/// [`crate::validate::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    /// Invoice number (发票号码); empty if unresolved.
    pub invoice_number: String,

    /// Issue date in `YYYY-MM-DD` form; empty if unresolved.
    pub invoice_date: String,

    /// Line-item description. May carry the `*category*name` delimiter
    /// convention verbatim; empty if unresolved.
    pub item_name: String,

    /// Tax-inclusive total. Zero is the sentinel for "no amount resolved";
    /// the validator treats `amount <= 0` as missing either way.
    pub amount: Decimal,

    /// Free-text remark, internal whitespace collapsed; may be empty.
    pub remark: String,

    /// Opaque reference to the originating document (path, or a synthetic
    /// handle for byte input). Carried for traceability only.
    pub source: String,

    /// When this record was produced.
    pub extracted_at: DateTime<Local>,
}

impl ExtractedInvoice {
    /// True if every field still holds its unresolved sentinel.
    pub fn is_blank(&self) -> bool {
        self.invoice_number.is_empty()
            && self.invoice_date.is_empty()
            && self.item_name.is_empty()
            && self.amount.is_zero()
            && self.remark.is_empty()
    }
}
