pub mod extract;
pub mod pipeline;
pub mod recognizer;
pub mod types;

pub use extract::{extract_date, extract_total, find_date, find_total, Extractor};
pub use pipeline::{FrameProcessor, FrameResult, PipelineError};
pub use recognizer::{JsonRecognizer, MockRecognizer, OcrError, PlainTextRecognizer, TextRecognizer};
pub use types::{
    BoundingBox, ExtractedDate, ExtractedTotal, ExtractionResult, LocatedFragment, RecognizedText,
    TextBlock, TextElement, TextFragment, TextLine,
};
