use std::path::Path;
use thiserror::Error;

use crate::extract::Extractor;
use crate::recognizer::{OcrError, TextRecognizer};
use crate::types::{ExtractionResult, LocatedFragment};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Text recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// The result of processing a single frame.
#[derive(Debug)]
pub struct FrameResult {
    /// Full recognized text.
    pub text: String,
    /// Fragments fed to the extractor, in traversal order.
    pub fragments: Vec<LocatedFragment>,
    pub extracted: ExtractionResult,
}

impl FrameResult {
    /// Fragments chosen as the total or date source.
    pub fn targets(&self) -> impl Iterator<Item = (usize, &LocatedFragment)> + '_ {
        self.extracted
            .targets()
            .into_iter()
            .filter_map(move |idx| self.fragments.get(idx).map(|f| (idx, f)))
    }
}

/// Orchestrates: recognize → flatten → extract → log.
pub struct FrameProcessor<R: TextRecognizer> {
    recognizer: R,
    extractor: Extractor,
}

impl<R: TextRecognizer> FrameProcessor<R> {
    pub fn new(recognizer: R, extractor: Extractor) -> Self {
        Self { recognizer, extractor }
    }

    /// Process a file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<FrameResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes)
    }

    /// Process raw frame bytes.
    pub fn process_bytes(&self, data: &[u8]) -> Result<FrameResult, PipelineError> {
        // 1. Run text recognition.
        let recognized = self.recognizer.recognize(data)?;
        tracing::debug!("detected text is: {}", recognized.text);

        // 2. Flatten to fragments.
        let fragments = recognized.located_fragments(self.extractor.config().granularity);
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();

        // 3. Extract fields.
        let extracted = self.extractor.extract(&texts);
        tracing::info!(
            fragments = fragments.len(),
            total = %extracted.total_or_default(),
            date = %extracted.date_or_default(),
            "frame processed"
        );

        Ok(FrameResult { text: recognized.text, fragments, extracted })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
