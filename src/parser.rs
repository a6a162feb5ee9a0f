//! Invoice parsing: text acquisition and field assembly.
//!
//! Acquisition is two-tier: the embedded text layer of page one is tried
//! first; if it is empty or whitespace-only and the recognizer capability is
//! available, page one is rasterized and recognized. Only page one is ever
//! inspected. The engine is synchronous and stateless per call: each
//! invocation owns its own document handle and produces its own record, so
//! concurrent parses over distinct documents need no coordination. There are
//! no internal retries and no internal timeout; a stalled recognition call
//! blocks its thread until the caller imposes an external deadline.

use std::io::Write;
use std::path::Path;

use chrono::Local;
use lopdf::Document;

use crate::error::{Error, Result};
use crate::fields;
use crate::invoice::ExtractedInvoice;
use crate::ocr::{PageRecognizer, TesseractRecognizer, DEFAULT_OCR_DPI, DEFAULT_OCR_LANG};

/// Engine configuration.
///
/// # Example
///
/// ```
/// use fapiao_extract::parser::ParserConfig;
///
/// let config = ParserConfig {
///     ocr_dpi: 200,
///     ocr_lang: "chi_sim".to_string(),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Rasterization resolution for the OCR fallback.
    pub ocr_dpi: u32,
    /// Tesseract language model for the OCR fallback.
    pub ocr_lang: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            ocr_dpi: DEFAULT_OCR_DPI,
            ocr_lang: DEFAULT_OCR_LANG.to_string(),
        }
    }
}

/// The document resource handed to the acquisition tier.
enum DocumentSource<'a> {
    OnDisk(&'a Path),
    InMemory(&'a [u8]),
}

/// Parser for single-page electronic-invoice PDFs.
///
/// Construction probes the OCR capability once; the result is cached on the
/// recognizer and read-only afterwards.
pub struct InvoiceParser {
    recognizer: Box<dyn PageRecognizer>,
}

impl InvoiceParser {
    /// Build a parser with the default configuration and the system
    /// Tesseract recognizer (capability probed now).
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Build a parser with explicit OCR options.
    pub fn with_config(config: ParserConfig) -> Self {
        InvoiceParser {
            recognizer: Box::new(TesseractRecognizer::with_options(
                config.ocr_dpi,
                &config.ocr_lang,
            )),
        }
    }

    /// Build a parser around an injected recognizer.
    pub fn with_recognizer(recognizer: Box<dyn PageRecognizer>) -> Self {
        InvoiceParser { recognizer }
    }

    /// Whether the image-recognition fallback can run.
    pub fn ocr_available(&self) -> bool {
        self.recognizer.is_available()
    }

    /// Parse the invoice PDF at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] if `path` does not resolve to a file.
    /// - [`Error::DocumentOpenFailure`] if the PDF container cannot be
    ///   opened or has no pages.
    /// - [`Error::TextUnavailable`] if page one yields no usable text, with
    ///   `ocr_attempted` telling whether recognition was run.
    ///
    /// Field-level misses are not errors; they surface as sentinels on the
    /// returned record.
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<ExtractedInvoice> {
        let path = path.as_ref();
        let doc = Document::load(path).map_err(|e| Error::classify_open(path, e))?;
        let text = self.first_page_text(&doc, DocumentSource::OnDisk(path))?;
        Ok(self.assemble(&text, path.to_string_lossy().into_owned()))
    }

    /// Parse an in-memory invoice PDF, e.g. an uploaded buffer.
    ///
    /// `source_name` is carried on the record for traceability only. For the
    /// OCR fallback the bytes are spooled to a temporary file, since the
    /// rasterizer works on paths.
    pub fn parse_bytes(&self, bytes: &[u8], source_name: &str) -> Result<ExtractedInvoice> {
        let doc =
            Document::load_mem(bytes).map_err(|e| Error::classify_open_mem(source_name, e))?;
        let text = self.first_page_text(&doc, DocumentSource::InMemory(bytes))?;
        Ok(self.assemble(&text, source_name.to_string()))
    }

    /// Acquire page-one text: text layer first, then the recognizer.
    fn first_page_text(&self, doc: &Document, source: DocumentSource) -> Result<String> {
        let pages = doc.get_pages();
        let first_page = match pages.keys().next() {
            Some(&number) => number,
            None => {
                return Err(Error::DocumentOpenFailure {
                    reason: "document has no pages".to_string(),
                })
            },
        };

        let text = match doc.extract_text(&[first_page]) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("text-layer extraction failed: {}", e);
                String::new()
            },
        };

        if !text.trim().is_empty() {
            return Ok(text);
        }

        if !self.recognizer.is_available() {
            log::debug!("page one has no text layer and OCR tools are unavailable");
            return Err(Error::TextUnavailable {
                ocr_attempted: false,
            });
        }

        log::info!("page one has no text layer, falling back to OCR");
        match source {
            DocumentSource::OnDisk(path) => self.ocr_text(path),
            DocumentSource::InMemory(bytes) => self.ocr_bytes(bytes),
        }
    }

    /// Run recognition on page one and enforce the non-empty rule.
    fn ocr_text(&self, path: &Path) -> Result<String> {
        let recognized = match self.recognizer.recognize_first_page(path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("OCR recognition failed: {}", e);
                String::new()
            },
        };

        if recognized.trim().is_empty() {
            return Err(Error::TextUnavailable { ocr_attempted: true });
        }
        Ok(recognized)
    }

    /// Spool in-memory bytes to a scratch file and run recognition on it.
    fn ocr_bytes(&self, bytes: &[u8]) -> Result<String> {
        let spooled = tempfile::NamedTempFile::new()
            .and_then(|mut spool| spool.write_all(bytes).map(|_| spool));
        match spooled {
            Ok(spool) => self.ocr_text(spool.path()),
            Err(e) => {
                log::warn!("failed to spool PDF bytes for OCR: {}", e);
                Err(Error::TextUnavailable { ocr_attempted: true })
            },
        }
    }

    /// Resolve all five fields independently and stamp the record.
    fn assemble(&self, text: &str, source: String) -> ExtractedInvoice {
        let invoice = ExtractedInvoice {
            invoice_number: fields::extract_invoice_number(text),
            invoice_date: fields::extract_date(text),
            item_name: fields::extract_item_name(text),
            amount: fields::extract_amount(text),
            remark: fields::extract_remark(text),
            source,
            extracted_at: Local::now(),
        };
        log::debug!(
            "extracted invoice number={:?} date={:?} amount={} from {}",
            invoice.invoice_number,
            invoice.invoice_date,
            invoice.amount,
            invoice.source
        );
        invoice
    }
}

impl Default for InvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}
