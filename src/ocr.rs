//! Image-recognition fallback for scanned documents.
//!
//! Recognition is delegated to external tools: `pdftoppm` (poppler-utils)
//! rasterizes page one, `tesseract` recognizes it. Tool availability is an
//! expensive environment probe, so it is checked once when the recognizer is
//! constructed and cached. The flag is read-only afterwards and safe for
//! concurrent readers.
//!
//! The engine takes the recognizer through the [`PageRecognizer`] trait, so
//! tests (and callers with their own OCR service) can substitute an
//! implementation without Tesseract installed.

use std::io;
use std::path::Path;
use std::process::Command;

/// Rasterization resolution for page one.
pub const DEFAULT_OCR_DPI: u32 = 300;

/// Combined recognition model: source script plus Latin, for mixed-language
/// billing documents.
pub const DEFAULT_OCR_LANG: &str = "chi_sim+eng";

/// Abstraction over the page-one recognition capability.
///
/// Recognition failures are infrastructure-level (`io::Error`); the engine
/// logs them and treats the page as having produced no text.
pub trait PageRecognizer: Send + Sync {
    /// Whether recognition can be attempted at all. Checked before any
    /// rasterization work; a `false` here means the engine fails fast with
    /// `TextUnavailable { ocr_attempted: false }`.
    fn is_available(&self) -> bool;

    /// Rasterize and recognize page one of the PDF at `pdf_path`.
    fn recognize_first_page(&self, pdf_path: &Path) -> io::Result<String>;
}

/// Recognizer backed by the `pdftoppm` and `tesseract` command-line tools.
pub struct TesseractRecognizer {
    available: bool,
    dpi: u32,
    lang: String,
}

impl TesseractRecognizer {
    /// Probe tool availability and build a recognizer with the default
    /// resolution and language model.
    pub fn probe() -> Self {
        Self::with_options(DEFAULT_OCR_DPI, DEFAULT_OCR_LANG)
    }

    /// Probe tool availability and build a recognizer with explicit options.
    pub fn with_options(dpi: u32, lang: &str) -> Self {
        TesseractRecognizer {
            available: probe_tools(),
            dpi,
            lang: lang.to_string(),
        }
    }
}

impl PageRecognizer for TesseractRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn recognize_first_page(&self, pdf_path: &Path) -> io::Result<String> {
        let scratch = tempfile::tempdir()?;
        let output_prefix = scratch.path().join("page");

        log::info!(
            "starting OCR for {:?} (dpi={}, lang={})",
            pdf_path.file_name().unwrap_or_default(),
            self.dpi,
            self.lang
        );

        // Rasterize page one only.
        let pdftoppm = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg("1")
            .arg("-l")
            .arg("1")
            .arg(pdf_path)
            .arg(&output_prefix)
            .output()?;

        if !pdftoppm.status.success() {
            let stderr = String::from_utf8_lossy(&pdftoppm.stderr);
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("pdftoppm failed: {}", stderr),
            ));
        }

        let image_path = std::fs::read_dir(scratch.path())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .find(|path| path.extension().map(|ext| ext == "png").unwrap_or(false))
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "pdftoppm produced no image"))?;

        let tesseract = Command::new("tesseract")
            .arg(&image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .arg("--psm")
            .arg("1") // automatic page segmentation with OSD
            .output()?;

        if !tesseract.status.success() {
            let stderr = String::from_utf8_lossy(&tesseract.stderr);
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("tesseract failed: {}", stderr),
            ));
        }

        Ok(String::from_utf8_lossy(&tesseract.stdout).into_owned())
    }
}

/// Check for `pdftoppm` and `tesseract` on the current system.
fn probe_tools() -> bool {
    let pdftoppm = Command::new("pdftoppm").arg("-v").output().is_ok();
    let tesseract = Command::new("tesseract").arg("--version").output().is_ok();

    if !pdftoppm {
        log::debug!("pdftoppm not found - install poppler-utils for OCR support");
    }
    if !tesseract {
        log::debug!("tesseract not found - install tesseract-ocr for OCR support");
    }

    pdftoppm && tesseract
}

/// Recognizer returning a preset string, so the extraction pipeline can be
/// exercised without Tesseract installed.
pub struct MockRecognizer {
    text: String,
    available: bool,
}

impl MockRecognizer {
    /// An available recognizer that yields `text` for every page.
    pub fn new(text: impl Into<String>) -> Self {
        MockRecognizer {
            text: text.into(),
            available: true,
        }
    }

    /// A recognizer whose capability probe failed.
    pub fn unavailable() -> Self {
        MockRecognizer {
            text: String::new(),
            available: false,
        }
    }
}

impl PageRecognizer for MockRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn recognize_first_page(&self, _pdf_path: &Path) -> io::Result<String> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_returns_preset_text() {
        let recognizer = MockRecognizer::new("发票号码：12345678");
        assert!(recognizer.is_available());
        let text = recognizer
            .recognize_first_page(Path::new("/ignored.pdf"))
            .unwrap();
        assert_eq!(text, "发票号码：12345678");
    }

    #[test]
    fn test_unavailable_mock() {
        let recognizer = MockRecognizer::unavailable();
        assert!(!recognizer.is_available());
    }

    #[test]
    fn test_recognizer_is_object_safe() {
        let boxed: Box<dyn PageRecognizer> = Box::new(MockRecognizer::new("x"));
        assert!(boxed.is_available());
    }

    #[test]
    fn test_tesseract_probe_does_not_panic() {
        // Result depends on the host; only the probe mechanics are under test.
        let recognizer = TesseractRecognizer::probe();
        let _ = recognizer.is_available();
    }
}
