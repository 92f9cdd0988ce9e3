use serde::Serialize;
use std::fmt::Write;
use tally_ocr::{BoundingBox, ExtractionResult, FrameResult};

/// A fragment picked as the source of an extracted field.
#[derive(Debug, Serialize)]
pub struct Target {
    pub index: usize,
    pub text: String,
    pub bounding_box: Option<BoundingBox>,
}

/// What gets printed for one input.
#[derive(Debug, Serialize)]
pub struct Report {
    pub input: String,
    /// Display value: zero when no total qualified.
    pub total: String,
    /// Display value: empty when no date matched.
    pub date: String,
    pub fragment_count: usize,
    pub targets: Vec<Target>,
    pub extraction: ExtractionResult,
}

impl Report {
    pub fn new(input: impl Into<String>, result: &FrameResult) -> Self {
        let targets = result
            .targets()
            .map(|(index, f)| Target { index, text: f.text.clone(), bounding_box: f.bounding_box })
            .collect();
        Self {
            input: input.into(),
            total: result.extracted.total_or_default(),
            date: result.extracted.date_or_default(),
            fragment_count: result.fragments.len(),
            targets,
            extraction: result.extracted.clone(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.input);
        let total_note = if self.extraction.total.is_none() { " (not found)" } else { "" };
        let _ = writeln!(out, "  total: {}{total_note}", self.total);
        let date = if self.date.is_empty() { "(not found)" } else { self.date.as_str() };
        let _ = writeln!(out, "  date:  {date}");
        for t in &self.targets {
            match t.bounding_box {
                Some(b) => {
                    let _ = writeln!(
                        out,
                        "  target #{} {:?} at ({}, {}, {}, {})",
                        t.index, t.text, b.left, b.top, b.right, b.bottom
                    );
                }
                None => {
                    let _ = writeln!(out, "  target #{} {:?}", t.index, t.text);
                }
            }
        }
        out
    }
}
