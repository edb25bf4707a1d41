//! CLI Annotate Command
//!
//! Renders an already-obtained vision model reply onto an image file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::info;

use greenlens_config::AnnotateConfig;
use greenlens_logging::{EventLogger, PipelineEvent};
use greenlens_understanding::{decode_image, BoundingBox, PixelRect};

#[derive(Args)]
pub struct AnnotateArgs {
    /// Source image (PNG, JPEG, BMP or WebP)
    #[arg(long)]
    pub image: PathBuf,
    /// File holding the model's reply text; `-` reads stdin
    #[arg(long)]
    pub response: PathBuf,
    /// Where to write the annotated image; format follows the extension
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Serialize)]
struct AnnotateOutput<'a> {
    request_id: &'a str,
    objects: String,
    boxes: &'a [BoundingBox],
    rects: &'a [PixelRect],
    output: &'a Path,
}

pub async fn run(args: AnnotateArgs, config: &AnnotateConfig, request_id: &str) -> Result<()> {
    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read image {}", args.image.display()))?;
    let image = decode_image(&bytes)?;
    let response = read_response(&args.response).await?;

    let mut colors = config.color_map();
    let annotation = config.pipeline().run(&image, &response, &mut colors);

    annotation
        .image
        .save(&args.out)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    info!(request_id, out = %args.out.display(), "Wrote annotated image");

    EventLogger::log_event(
        request_id,
        PipelineEvent::Annotated {
            objects: annotation.objects(),
            detections: annotation.boxes.len(),
        },
    );

    let output = AnnotateOutput {
        request_id,
        objects: annotation.objects(),
        boxes: &annotation.boxes,
        rects: &annotation.rects,
        output: &args.out,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn read_response(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read model reply from stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read model reply {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("greenlens-cli-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn annotates_image_file_end_to_end() {
        let image_path = scratch("in.png");
        let reply_path = scratch("reply.txt");
        let out_path = scratch("out.png");
        image::RgbImage::new(200, 100).save(&image_path).unwrap();
        tokio::fs::write(&reply_path, "[100,200,300,400, solar panel] [x,1,2,3,junk]")
            .await
            .unwrap();

        let config = AnnotateConfig { color_seed: Some(1), ..Default::default() };
        let args = AnnotateArgs {
            image: image_path.clone(),
            response: reply_path.clone(),
            out: out_path.clone(),
        };
        let result = run(args, &config, "test-request").await;

        let written = image::open(&out_path).map(|img| (img.width(), img.height()));
        for path in [&image_path, &reply_path, &out_path] {
            let _ = std::fs::remove_file(path);
        }
        result.unwrap();
        assert_eq!(written.unwrap(), (200, 100));
    }

    #[tokio::test]
    async fn unreadable_image_is_a_client_error() {
        let image_path = scratch("bad.png");
        tokio::fs::write(&image_path, b"not an image").await.unwrap();
        let args = AnnotateArgs {
            image: image_path.clone(),
            response: PathBuf::from("-"),
            out: scratch("never.png"),
        };
        let err = run(args, &AnnotateConfig::default(), "req").await.unwrap_err();
        let _ = std::fs::remove_file(&image_path);
        let lens = err.downcast_ref::<greenlens_core::LensError>().unwrap();
        assert!(lens.is_client_error());
    }
}
