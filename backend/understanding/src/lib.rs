//! Image and document understanding for Greenlens.
//!
//! The annotation pipeline turns a vision model's free-text reply into
//! labelled boxes drawn onto the source image:
//! [`parse_boxes`] → [`CoordinateMapper`] → [`BoxRenderer`].

pub mod annotate;
pub mod boxes;
pub mod mapper;
pub mod palette;
pub mod render;
pub mod verify;

pub use annotate::{Annotation, AnnotationPipeline, Annotator, DETECTION_PROMPT, decode_image};
pub use boxes::{BoundingBox, NORMALIZED_MAX, parse_boxes};
pub use mapper::{CoordinateMapper, DEFAULT_PADDING, PixelRect};
pub use palette::{ColorSource, LabelColorMap, RandomColors};
pub use render::{
    BoxRenderer, DEFAULT_FONT_SIZE, DEFAULT_THICKNESS, MAX_FONT_SIZE, MAX_THICKNESS, TEXT_COLOR,
};
pub use verify::{DocumentVerifier, Verdict, comparison_prompt};
