//! Required-field completeness gate.
//!
//! This is the single authoritative decision on whether an extracted record
//! counts as a real invoice; no other component may make that call. The gate
//! runs once, immediately after extraction, and its outcome is consumed by
//! the caller to decide persistence.

use rust_decimal::Decimal;

use crate::invoice::ExtractedInvoice;

/// Human label for the invoice-number field.
pub const LABEL_INVOICE_NUMBER: &str = "发票号码";
/// Human label for the issue-date field.
pub const LABEL_INVOICE_DATE: &str = "开票日期";
/// Human label for the amount field.
pub const LABEL_AMOUNT: &str = "金额";

/// Outcome of the completeness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// All required fields are present.
    Valid,
    /// One or more required fields are missing, in fixed label order:
    /// number, date, amount.
    Invalid {
        /// Human labels of the missing fields.
        missing: Vec<&'static str>,
    },
}

impl ValidationOutcome {
    /// True for [`ValidationOutcome::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Missing-field labels; empty when valid.
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            ValidationOutcome::Valid => &[],
            ValidationOutcome::Invalid { missing } => missing,
        }
    }

    /// Joined rejection message for the presentation layer, `None` when
    /// valid.
    pub fn rejection_message(&self) -> Option<String> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid { missing } => Some(format!(
                "无法识别为有效发票，缺少: {}",
                missing.join(", ")
            )),
        }
    }
}

/// Check the three required conditions: trimmed invoice number non-empty,
/// trimmed issue date non-empty, amount strictly greater than zero.
///
/// `amount <= 0` covers both "no amount resolved" (the zero sentinel) and a
/// genuinely non-positive amount; the two are deliberately not distinguished
/// here.
pub fn validate(invoice: &ExtractedInvoice) -> ValidationOutcome {
    let mut missing = Vec::new();

    if invoice.invoice_number.trim().is_empty() {
        missing.push(LABEL_INVOICE_NUMBER);
    }
    if invoice.invoice_date.trim().is_empty() {
        missing.push(LABEL_INVOICE_DATE);
    }
    if invoice.amount <= Decimal::ZERO {
        missing.push(LABEL_AMOUNT);
    }

    if missing.is_empty() {
        ValidationOutcome::Valid
    } else {
        ValidationOutcome::Invalid { missing }
    }
}
