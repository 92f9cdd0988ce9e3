use serde::{Deserialize, Serialize};
use tally_core::{Granularity, Money};

/// One OCR-recognized token or line, in traversal order.
pub type TextFragment = String;

/// Pixel rectangle in the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub elements: Vec<TextElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub lines: Vec<TextLine>,
}

/// The output of one text-recognition pass over a frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

/// A fragment together with where it sits in the image, if known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedFragment {
    pub text: TextFragment,
    pub bounding_box: Option<BoundingBox>,
}

impl TextElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), bounding_box: None }
    }
}

impl TextLine {
    /// Build a line whose text is its elements joined by single spaces.
    pub fn from_elements(elements: Vec<TextElement>) -> Self {
        let text = elements.iter().map(|e| e.text.as_str()).collect::<Vec<_>>().join(" ");
        Self { text, bounding_box: None, elements }
    }
}

impl TextBlock {
    pub fn from_lines(lines: Vec<TextLine>) -> Self {
        let text = lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n");
        Self { text, bounding_box: None, lines }
    }
}

impl RecognizedText {
    pub fn from_blocks(blocks: Vec<TextBlock>) -> Self {
        let text = blocks.iter().map(|b| b.text.as_str()).collect::<Vec<_>>().join("\n");
        Self { text, blocks }
    }

    /// Flatten to fragments in block → line → element order.
    pub fn located_fragments(&self, granularity: Granularity) -> Vec<LocatedFragment> {
        match granularity {
            Granularity::Block => self
                .blocks
                .iter()
                .map(|b| LocatedFragment { text: b.text.clone(), bounding_box: b.bounding_box })
                .collect(),
            Granularity::Line => self
                .blocks
                .iter()
                .flat_map(|b| &b.lines)
                .map(|l| LocatedFragment { text: l.text.clone(), bounding_box: l.bounding_box })
                .collect(),
            Granularity::Element => self
                .blocks
                .iter()
                .flat_map(|b| &b.lines)
                .flat_map(|l| &l.elements)
                .map(|e| LocatedFragment { text: e.text.clone(), bounding_box: e.bounding_box })
                .collect(),
        }
    }

    pub fn fragments(&self, granularity: Granularity) -> Vec<TextFragment> {
        self.located_fragments(granularity).into_iter().map(|f| f.text).collect()
    }
}

/// The largest plausible total found in a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTotal {
    pub amount: Money,
    /// First currency marker seen anywhere in the frame.
    pub marker: Option<char>,
    /// Index of the fragment the amount came from.
    pub source: usize,
}

impl std::fmt::Display for ExtractedTotal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.amount.format_with(self.marker))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDate {
    /// Fragment text exactly as recognized.
    pub raw: String,
    pub source: usize,
}

/// Fields pulled out of one frame. `None` means nothing qualified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub total: Option<ExtractedTotal>,
    pub date: Option<ExtractedDate>,
    /// Marker seen in the frame even when no total qualified.
    pub marker: Option<char>,
}

impl ExtractionResult {
    /// Total as displayed on the overlay: zero when nothing qualified.
    pub fn total_or_default(&self) -> String {
        match &self.total {
            Some(t) => t.to_string(),
            None => Money::zero().format_with(self.marker),
        }
    }

    pub fn date_or_default(&self) -> String {
        self.date.as_ref().map(|d| d.raw.clone()).unwrap_or_default()
    }

    /// Fragment indices picked as field sources, for highlighting.
    pub fn targets(&self) -> Vec<usize> {
        let mut targets: Vec<usize> = self
            .total
            .iter()
            .map(|t| t.source)
            .chain(self.date.iter().map(|d| d.source))
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample() -> RecognizedText {
        RecognizedText::from_blocks(vec![
            TextBlock::from_lines(vec![
                TextLine::from_elements(vec![TextElement::new("CORNER"), TextElement::new("SHOP")]),
                TextLine::from_elements(vec![TextElement::new("01/15/24")]),
            ]),
            TextBlock::from_lines(vec![TextLine::from_elements(vec![
                TextElement::new("Total"),
                TextElement::new("$5.50"),
            ])]),
        ])
    }

    #[test]
    fn element_fragments_in_traversal_order() {
        assert_eq!(
            sample().fragments(Granularity::Element),
            vec!["CORNER", "SHOP", "01/15/24", "Total", "$5.50"]
        );
    }

    #[test]
    fn line_and_block_fragments() {
        let t = sample();
        assert_eq!(t.fragments(Granularity::Line), vec!["CORNER SHOP", "01/15/24", "Total $5.50"]);
        assert_eq!(t.fragments(Granularity::Block), vec!["CORNER SHOP\n01/15/24", "Total $5.50"]);
    }

    #[test]
    fn full_text_joins_blocks() {
        assert_eq!(sample().text, "CORNER SHOP\n01/15/24\nTotal $5.50");
    }

    #[test]
    fn located_fragments_keep_boxes() {
        let bbox = BoundingBox { left: 1, top: 2, right: 30, bottom: 12 };
        let t = RecognizedText::from_blocks(vec![TextBlock::from_lines(vec![
            TextLine::from_elements(vec![TextElement { text: "$1.00".into(), bounding_box: Some(bbox) }]),
        ])]);
        let located = t.located_fragments(Granularity::Element);
        assert_eq!(located[0].bounding_box, Some(bbox));
        assert_eq!(t.located_fragments(Granularity::Line)[0].bounding_box, None);
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let json = r#"{"blocks":[{"text":"a","lines":[{"text":"a","elements":[{"text":"a"}]}]}]}"#;
        let t: RecognizedText = serde_json::from_str(json).unwrap();
        assert_eq!(t.text, "");
        assert_eq!(t.fragments(Granularity::Element), vec!["a"]);
    }

    #[test]
    fn defaults_when_nothing_found() {
        let r = ExtractionResult::default();
        assert_eq!(r.total_or_default(), "0.00");
        assert_eq!(r.date_or_default(), "");
        assert!(r.targets().is_empty());

        let r = ExtractionResult { marker: Some('$'), ..Default::default() };
        assert_eq!(r.total_or_default(), "$0.00");
    }

    #[test]
    fn targets_are_sorted_and_unique() {
        let r = ExtractionResult {
            total: Some(ExtractedTotal {
                amount: Money::from_decimal(Decimal::from(5)),
                marker: None,
                source: 4,
            }),
            date: Some(ExtractedDate { raw: "01/15/24".into(), source: 2 }),
            marker: None,
        };
        assert_eq!(r.targets(), vec![2, 4]);
        assert_eq!(r.total_or_default(), "5.00");
    }
}
