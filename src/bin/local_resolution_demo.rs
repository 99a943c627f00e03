use local_resolution::image::io::{
    load_grayscale_image, load_mask, save_normalized_f64, save_resolution_map, write_json_file,
};
use local_resolution::{Mask, ResolutionEstimator, ResolutionParams};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct ResolutionToolConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    /// Foreground mask image; every pixel is analysed when absent.
    #[serde(default)]
    pub mask: Option<PathBuf>,
    #[serde(default)]
    pub params: ResolutionParams,
    pub output: ResolutionOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct ResolutionOutputConfig {
    #[serde(rename = "resolution_image")]
    pub resolution_image: PathBuf,
    #[serde(rename = "report_json")]
    pub report_json: PathBuf,
    /// Optional directory receiving one ratio PNG per width.
    #[serde(default)]
    pub ratio_dir: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<ResolutionToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let image = load_grayscale_image(&config.input)?;
    let mask = match &config.mask {
        Some(path) => load_mask(path)?,
        None => Mask::full(image.w, image.h),
    };

    let estimator = ResolutionEstimator::new(config.params).map_err(|e| e.to_string())?;
    let report = estimator
        .estimate_with_diagnostics(&image, &mask)
        .map_err(|e| e.to_string())?;

    save_resolution_map(&report.map, &config.output.resolution_image)?;
    write_json_file(&config.output.report_json, &report.trace)?;
    if let Some(dir) = &config.output.ratio_dir {
        let ratio = &report.volumes.ratio;
        for (level, plane) in ratio.planes.iter().enumerate() {
            let path = dir.join(format!("ratio_w{:02}.png", ratio.width_of(level)));
            save_normalized_f64(plane, &path)?;
        }
    }

    println!(
        "Resolved {} of {} foreground pixels in {:.1} ms",
        report.trace.resolved,
        report.trace.input.foreground,
        report.trace.timings.total_ms
    );
    println!(
        "Saved resolution map to {}",
        config.output.resolution_image.display()
    );
    println!("Saved report to {}", config.output.report_json.display());

    Ok(())
}

fn usage() -> String {
    "Usage: local_resolution_demo <config.json>".to_string()
}
