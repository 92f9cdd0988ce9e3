use thiserror::Error;

use crate::types::{RecognizedText, TextBlock, TextElement, TextLine};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Input decode error: {0}")]
    Decode(String),
}

/// Abstraction over a text-recognition engine.
/// Implementations accept raw frame bytes and return the recognized text tree.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, frame: &[u8]) -> Result<RecognizedText, OcrError>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, frame: &[u8]) -> Result<RecognizedText, OcrError> {
        (**self).recognize(frame)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set result regardless of input.
pub struct MockRecognizer {
    pub result: RecognizedText,
}

impl MockRecognizer {
    pub fn new(result: RecognizedText) -> Self {
        Self { result }
    }

    /// Build the preset result from a plain-text dump.
    pub fn from_text(text: &str) -> Self {
        Self::new(parse_text_dump(text))
    }
}

impl TextRecognizer for MockRecognizer {
    fn recognize(&self, _frame: &[u8]) -> Result<RecognizedText, OcrError> {
        Ok(self.result.clone())
    }
}

// ── Plain-text dump ───────────────────────────────────────────────────────────

/// Reads text already produced by an OCR engine.
///
/// Blank lines separate blocks, each remaining line is a line, and
/// whitespace-separated tokens are elements.
#[derive(Debug, Default)]
pub struct PlainTextRecognizer;

impl TextRecognizer for PlainTextRecognizer {
    fn recognize(&self, frame: &[u8]) -> Result<RecognizedText, OcrError> {
        let text = std::str::from_utf8(frame).map_err(|e| OcrError::Decode(e.to_string()))?;
        Ok(parse_text_dump(text))
    }
}

fn parse_text_dump(text: &str) -> RecognizedText {
    let mut blocks = Vec::new();
    let mut lines = Vec::new();

    for raw in text.lines() {
        let raw = raw.trim();
        if raw.is_empty() {
            if !lines.is_empty() {
                blocks.push(TextBlock::from_lines(std::mem::take(&mut lines)));
            }
            continue;
        }
        lines.push(TextLine::from_elements(
            raw.split_whitespace().map(TextElement::new).collect(),
        ));
    }
    if !lines.is_empty() {
        blocks.push(TextBlock::from_lines(lines));
    }

    RecognizedText::from_blocks(blocks)
}

// ── JSON dump ─────────────────────────────────────────────────────────────────

/// Reads a serialized [`RecognizedText`], bounding boxes included.
#[derive(Debug, Default)]
pub struct JsonRecognizer;

impl TextRecognizer for JsonRecognizer {
    fn recognize(&self, frame: &[u8]) -> Result<RecognizedText, OcrError> {
        let mut result: RecognizedText =
            serde_json::from_slice(frame).map_err(|e| OcrError::Decode(e.to_string()))?;
        if result.text.is_empty() {
            result.text = result.blocks.iter().map(|b| b.text.as_str()).collect::<Vec<_>>().join("\n");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::Granularity;

    #[test]
    fn mock_returns_preset_result() {
        let r = MockRecognizer::from_text("STARBUCKS\n$5.50");
        let out = r.recognize(b"fake image data").unwrap();
        assert_eq!(out.fragments(Granularity::Element), vec!["STARBUCKS", "$5.50"]);
        assert_eq!(r.recognize(b"").unwrap(), out);
    }

    #[test]
    fn plain_text_splits_blocks_on_blank_lines() {
        let out = PlainTextRecognizer
            .recognize(b"CORNER SHOP\n01/15/24\n\n\nTotal  $5.50\n")
            .unwrap();
        assert_eq!(out.blocks.len(), 2);
        assert_eq!(out.blocks[0].lines.len(), 2);
        assert_eq!(out.fragments(Granularity::Line), vec!["CORNER SHOP", "01/15/24", "Total $5.50"]);
        assert_eq!(
            out.fragments(Granularity::Element),
            vec!["CORNER", "SHOP", "01/15/24", "Total", "$5.50"]
        );
    }

    #[test]
    fn plain_text_empty_input() {
        let out = PlainTextRecognizer.recognize(b"\n  \n").unwrap();
        assert!(out.blocks.is_empty());
        assert_eq!(out.text, "");
    }

    #[test]
    fn plain_text_rejects_invalid_utf8() {
        assert!(matches!(
            PlainTextRecognizer.recognize(&[0xff, 0xfe, 0x00]),
            Err(OcrError::Decode(_))
        ));
    }

    #[test]
    fn json_fills_missing_full_text() {
        let json = br#"{"blocks":[
            {"text":"Total $9.00","lines":[{"text":"Total $9.00","elements":[
                {"text":"Total","bounding_box":{"left":0,"top":0,"right":40,"bottom":10}},
                {"text":"$9.00"}]}]}]}"#;
        let out = JsonRecognizer.recognize(json).unwrap();
        assert_eq!(out.text, "Total $9.00");
        assert_eq!(out.fragments(Granularity::Element), vec!["Total", "$9.00"]);
        assert!(out.blocks[0].lines[0].elements[0].bounding_box.is_some());
    }

    #[test]
    fn boxed_recognizer_delegates() {
        let r: Box<dyn TextRecognizer> = Box::new(PlainTextRecognizer);
        let out = r.recognize(b"$1.00").unwrap();
        assert_eq!(out.fragments(Granularity::Element), vec!["$1.00"]);
    }

    #[test]
    fn json_rejects_malformed_input() {
        assert!(matches!(JsonRecognizer.recognize(b"{not json"), Err(OcrError::Decode(_))));
    }
}
