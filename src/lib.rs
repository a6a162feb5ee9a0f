//! # fapiao_extract
//!
//! Structured field extraction and validation for single-page Chinese
//! electronic-invoice (fapiao) PDFs.
//!
//! ## What it does
//!
//! - **Text acquisition**: reads the embedded text layer of page one; falls
//!   back to OCR (`pdftoppm` + `tesseract`, probed once at construction)
//!   when the page is a scanned image.
//! - **Field extraction**: resolves invoice number, issue date, line item,
//!   amount, and remark via ordered per-field strategy lists,
//!   first-match-wins.
//! - **Normalization**: zero-padded ISO dates, exact fixed-point decimal
//!   amounts, whitespace-collapsed text.
//! - **Validation**: a single completeness gate (number, date, amount > 0)
//!   deciding whether the record may be persisted.
//!
//! Field-level misses never fail a parse: unresolved fields carry explicit
//! empty/zero sentinels and are judged by the validator. Errors are reserved
//! for document-level failures: file not found, unopenable container, or no
//! recoverable page-one text.
//!
//! ## Quick start
//!
//! ```no_run
//! use fapiao_extract::{validate, InvoiceParser};
//!
//! # fn main() -> fapiao_extract::Result<()> {
//! let parser = InvoiceParser::new();
//! let invoice = parser.parse("invoice.pdf")?;
//!
//! if validate(&invoice).is_valid() {
//!     println!("{} {} {}", invoice.invoice_number, invoice.invoice_date, invoice.amount);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Field resolution and validation
pub mod fields;
pub mod invoice;
pub mod validate;

// Text acquisition
pub mod ocr;
pub mod parser;

// Re-exports
pub use error::{Error, Result};
pub use invoice::ExtractedInvoice;
pub use ocr::{MockRecognizer, PageRecognizer, TesseractRecognizer};
pub use parser::{InvoiceParser, ParserConfig};
pub use validate::{validate, ValidationOutcome};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
