use anyhow::{Context, Result};
use clap::Parser;
use img_drop_core::{init, sizing, ImgDrop, TargetFormat};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image file to convert; omit to launch the interactive window
    input: Option<PathBuf>,

    /// Target format: png, jpeg, bmp or webp
    #[arg(short, long, default_value = "png")]
    format: String,

    /// JPEG quality in [0, 1]; ignored for other formats
    #[arg(short, long)]
    quality: Option<f32>,

    /// Output path (defaults to the input directory with the suggested name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a machine-readable JSON report instead of the human summary
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Summary of a completed conversion, printable as JSON with `--json`.
#[derive(Serialize)]
struct ConversionReport {
    source: PathBuf,
    output: PathBuf,
    target_format: TargetFormat,
    original_bytes: u64,
    converted_bytes: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init();
    let args = Args::parse();

    let app = ImgDrop::new().context("Failed to load configuration")?;

    // No input: interactive mode.
    let Some(input) = args.input else {
        return app.run_interactive().context("Failed to run the converter window");
    };

    let format: TargetFormat = args
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("Unrecognized --format")?;

    if let Some(quality) = args.quality {
        anyhow::ensure!(
            (0.0..=1.0).contains(&quality),
            "--quality must be in [0, 1], got {quality}"
        );
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Converting to {}...", format.label()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = app
        .convert_file(&input, format, args.quality)
        .await
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    spinner.finish_and_clear();

    let output = args.output.unwrap_or_else(|| {
        input
            .parent()
            .map(|dir| dir.join(&result.file_name))
            .unwrap_or_else(|| PathBuf::from(&result.file_name))
    });

    let bytes = result
        .decoded_bytes()
        .context("Failed to decode the converted payload")?;
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let original_bytes = std::fs::metadata(&input).map(|m| m.len()).unwrap_or(0);

    if args.json {
        let report = ConversionReport {
            source: input,
            output,
            target_format: format,
            original_bytes,
            converted_bytes: result.estimated_size,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Wrote {}", output.display());
        println!(
            "  {} -> {}",
            sizing::format_bytes(original_bytes as f64, 2),
            sizing::format_bytes(result.estimated_size, 2)
        );
    }

    Ok(())
}
