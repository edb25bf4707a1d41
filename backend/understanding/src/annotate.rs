//! Object annotation: ask a vision model for boxes and paint them.

use std::sync::Arc;

use greenlens_core::{Collaborator, LensError, LensResult, VisionModel};
use image::{DynamicImage, RgbImage};
use tracing::info;

use crate::boxes::{BoundingBox, parse_boxes};
use crate::mapper::{CoordinateMapper, PixelRect};
use crate::palette::LabelColorMap;
use crate::render::BoxRenderer;

/// Instruction sent with every image.
pub const DETECTION_PROMPT: &str = "Return bounding boxes for all objects (no living beings) \
in the image as a list. Format: [ymin, xmin, ymax, xmax, object_name].";

/// Output of one annotation request.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub boxes: Vec<BoundingBox>,
    pub rects: Vec<PixelRect>,
    pub image: RgbImage,
}

impl Annotation {
    /// Distinct labels in first-seen order.
    pub fn labels(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for bbox in &self.boxes {
            if !seen.contains(&bbox.label.as_str()) {
                seen.push(&bbox.label);
            }
        }
        seen
    }

    /// Distinct labels joined with commas, e.g. `"solar panel,battery"`.
    pub fn objects(&self) -> String {
        self.labels().join(",")
    }
}

/// The model-independent half: parse → map → render.
#[derive(Clone, Default)]
pub struct AnnotationPipeline {
    mapper: CoordinateMapper,
    renderer: BoxRenderer,
}

impl AnnotationPipeline {
    pub fn new(mapper: CoordinateMapper, renderer: BoxRenderer) -> Self {
        Self { mapper, renderer }
    }

    /// Annotate `image` with every detection found in `response`.
    pub fn run(
        &self,
        image: &DynamicImage,
        response: &str,
        colors: &mut LabelColorMap,
    ) -> Annotation {
        let boxes = parse_boxes(response);
        let rects = self.mapper.map_all(&boxes, image.width(), image.height());
        let rendered = self.renderer.render(image, &rects, colors);
        info!(
            detections = boxes.len(),
            width = image.width(),
            height = image.height(),
            "Annotated image"
        );
        Annotation { boxes, rects, image: rendered }
    }
}

/// Full detect flow backed by a [`VisionModel`].
pub struct Annotator {
    vision: Arc<dyn VisionModel>,
    pipeline: AnnotationPipeline,
    prompt: String,
}

impl Annotator {
    pub fn new(vision: Arc<dyn VisionModel>) -> Self {
        Self {
            vision,
            pipeline: AnnotationPipeline::default(),
            prompt: DETECTION_PROMPT.to_string(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: AnnotationPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Decode `image_bytes`, ask the model for detections, and render them.
    pub async fn annotate(
        &self,
        image_bytes: &[u8],
        colors: &mut LabelColorMap,
    ) -> LensResult<Annotation> {
        let image = decode_image(image_bytes)?;
        info!(model = self.vision.name(), bytes = image_bytes.len(), "Requesting detections");
        let reply = self
            .vision
            .detect(image_bytes, &self.prompt)
            .await
            .map_err(|e| LensError::collaborator(Collaborator::Vision, e))?;
        Ok(self.pipeline.run(&image, &reply, colors))
    }

    /// Render a reply that was obtained elsewhere, skipping the model call.
    pub fn annotate_response(
        &self,
        image: &DynamicImage,
        response: &str,
        colors: &mut LabelColorMap,
    ) -> Annotation {
        self.pipeline.run(image, response, colors)
    }
}

/// Decode an uploaded image, rejecting missing or unreadable bytes.
pub fn decode_image(bytes: &[u8]) -> LensResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(LensError::invalid("No image file uploaded"));
    }
    image::load_from_memory(bytes).map_err(|e| LensError::invalid(format!("Unreadable image: {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Mutex;

    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use image::ImageFormat;

    use super::*;

    struct ScriptedVision {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedVision {
        fn replying(reply: &str) -> Self {
            Self { reply: Ok(reply.to_string()), prompts: Mutex::new(Vec::new()) }
        }

        fn failing(message: &str) -> Self {
            Self { reply: Err(message.to_string()), prompts: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl VisionModel for ScriptedVision {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn detect(&self, _image: &[u8], prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => bail!("{message}"),
            }
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn annotates_valid_detections_and_skips_garbage() {
        let vision = Arc::new(ScriptedVision::replying(
            "Here: [100,200,300,400, solar panel] and garbage [abc,1,2,3,x]",
        ));
        let annotator = Annotator::new(vision.clone());
        let mut colors = LabelColorMap::seeded(3);

        let annotation = annotator.annotate(&png(1000, 500), &mut colors).await.unwrap();

        assert_eq!(annotation.boxes.len(), 1);
        assert_eq!(annotation.boxes[0].label, "solar panel");
        let rect = &annotation.rects[0];
        assert!(rect.x1 <= rect.x2 && rect.x2 <= 1000);
        assert!(rect.y1 <= rect.y2 && rect.y2 <= 500);
        assert_eq!(annotation.image.dimensions(), (1000, 500));
        assert_eq!(annotation.objects(), "solar panel");
        assert_eq!(vision.prompts.lock().unwrap().as_slice(), [DETECTION_PROMPT]);
    }

    #[tokio::test]
    async fn missing_image_is_rejected_before_the_model_call() {
        let vision = Arc::new(ScriptedVision::replying("[1,2,3,4,cup]"));
        let annotator = Annotator::new(vision.clone());

        let err = annotator.annotate(&[], &mut LabelColorMap::seeded(0)).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(vision.prompts.lock().unwrap().is_empty());

        let err = annotator
            .annotate(b"not an image", &mut LabelColorMap::seeded(0))
            .await
            .unwrap_err();
        assert!(matches!(err, LensError::InputInvalid(_)));
    }

    #[tokio::test]
    async fn model_failure_surfaces_and_leaves_colors_alone() {
        let annotator = Annotator::new(Arc::new(ScriptedVision::failing("quota exhausted")));
        let mut colors = LabelColorMap::seeded(0);

        let err = annotator.annotate(&png(10, 10), &mut colors).await.unwrap_err();

        match err {
            LensError::CollaboratorFailure { collaborator, message } => {
                assert_eq!(collaborator, Collaborator::Vision);
                assert!(message.contains("quota exhausted"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(colors.is_empty());
    }

    #[tokio::test]
    async fn custom_prompt_is_forwarded() {
        let vision = Arc::new(ScriptedVision::replying("nothing here"));
        let annotator = Annotator::new(vision.clone()).with_prompt("find panels");
        let annotation = annotator.annotate(&png(8, 8), &mut LabelColorMap::seeded(0)).await.unwrap();
        assert!(annotation.boxes.is_empty());
        assert_eq!(annotation.objects(), "");
        assert_eq!(vision.prompts.lock().unwrap()[0], "find panels");
    }

    #[test]
    fn prefetched_response_skips_the_model() {
        let vision = Arc::new(ScriptedVision::failing("should not be called"));
        let annotator = Annotator::new(vision.clone());
        let image = DynamicImage::ImageRgb8(RgbImage::new(100, 100));
        let annotation =
            annotator.annotate_response(&image, "[0,0,500,500,crate]", &mut LabelColorMap::seeded(1));
        assert_eq!(annotation.labels(), vec!["crate"]);
        assert!(vision.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn labels_are_unique_in_first_seen_order() {
        let pipeline = AnnotationPipeline::default();
        let image = DynamicImage::ImageRgb8(RgbImage::new(64, 64));
        let annotation = pipeline.run(
            &image,
            "[1,1,9,9,chair] [2,2,8,8,table] [3,3,7,7,chair]",
            &mut LabelColorMap::seeded(9),
        );
        assert_eq!(annotation.boxes.len(), 3);
        assert_eq!(annotation.labels(), vec!["chair", "table"]);
        assert_eq!(annotation.objects(), "chair,table");
    }
}
