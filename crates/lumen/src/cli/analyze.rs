//! The `lumen analyze` command for a single image.

use std::path::PathBuf;

use clap::Args;
use lumen_core::{AnalysisError, AnalysisOptions, AnalysisResult, Config, Lumen};

use super::{build_lumen, is_url, media_type_for_path, to_json};

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image file path or http(s) URL
    #[arg(required = true)]
    pub input: String,

    /// Extra metrics, comma-separated (median, histogram)
    #[arg(short, long)]
    pub metrics: Option<String>,

    /// Edge brightness region (left_right, top_bottom, all)
    #[arg(short, long)]
    pub edge_mode: Option<String>,

    /// Media type of a local file (defaults to one inferred from its extension)
    #[arg(long)]
    pub media_type: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let pretty = args.pretty || config.output.pretty;
    let redact = config.output.redact_internal_errors;
    let lumen = build_lumen(config)?;

    match run(&lumen, &args).await? {
        Ok(result) => {
            println!("{}", to_json(&result, pretty)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", to_json(&err.to_body(redact), pretty)?);
            if err.is_client_error() {
                tracing::warn!("Analysis rejected: {}", err);
            } else {
                tracing::error!("Analysis failed: {}", err);
            }
            Err(err.into())
        }
    }
}

/// Analyze the requested input.
///
/// The outer error covers local I/O; the inner one is the analysis outcome.
async fn run(
    lumen: &Lumen,
    args: &AnalyzeArgs,
) -> anyhow::Result<Result<AnalysisResult, AnalysisError>> {
    let options = match AnalysisOptions::parse(args.metrics.as_deref(), args.edge_mode.as_deref()) {
        Ok(options) => options,
        Err(err) => return Ok(Err(err)),
    };

    if is_url(&args.input) {
        tracing::debug!("Analyzing URL input");
        return Ok(lumen.analyze_url(&args.input, &options).await);
    }

    let path = PathBuf::from(&args.input);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let media_type = args
        .media_type
        .as_deref()
        .unwrap_or_else(|| media_type_for_path(&path));
    tracing::debug!("Analyzing {:?} as {}", path, media_type);

    Ok(lumen.analyze_upload(bytes, Some(media_type), &options).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};

    fn args(input: &str) -> AnalyzeArgs {
        AnalyzeArgs {
            input: input.to_string(),
            metrics: None,
            edge_mode: None,
            media_type: None,
            pretty: false,
        }
    }

    fn write_png(dir: &tempfile::TempDir, name: &str, value: u8) -> PathBuf {
        let img = RgbImage::from_pixel(10, 10, Rgb([value, value, value]));
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(img.as_raw(), 10, 10, ExtendedColorType::Rgb8)
            .unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_analyze_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "white.png", 255);
        let lumen = build_lumen(Config::default()).unwrap();

        let mut a = args(path.to_str().unwrap());
        a.metrics = Some("median".to_string());
        let result = run(&lumen, &a).await.unwrap().unwrap();
        assert_eq!(result.brightness_score, 100);
        assert_eq!(result.median_luminance, Some(255.0));
    }

    #[tokio::test]
    async fn test_extension_drives_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "image.bin", 0);
        let lumen = build_lumen(Config::default()).unwrap();

        let err = run(&lumen, &args(path.to_str().unwrap()))
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err.code(), "unsupported_format");

        let mut a = args(path.to_str().unwrap());
        a.media_type = Some("image/png".to_string());
        assert!(run(&lumen, &a).await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_invalid_metric_is_analysis_error() {
        let lumen = build_lumen(Config::default()).unwrap();
        let mut a = args("missing.png");
        a.metrics = Some("sharpness".to_string());
        let err = run(&lumen, &a).await.unwrap().unwrap_err();
        assert_eq!(err.code(), "invalid_metric_request");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let lumen = build_lumen(Config::default()).unwrap();
        assert!(run(&lumen, &args("/nonexistent/lumen/a.png")).await.is_err());
    }
}
