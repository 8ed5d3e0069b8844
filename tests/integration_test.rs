//! Integration tests for the extraction pipeline

use std::path::PathBuf;

use image::{Rgb, RgbImage, Rgba, RgbaImage};

// Import crate items
use slidecrop::detector::DetectorParams;
use slidecrop::pipeline::PipelineOptions;
use slidecrop::pyramid::{PyramidSource, PyramidSourceFactory};
use slidecrop::SlideCrop;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

/// Write a black PNG with a single bright rectangle to a temp file
fn write_specimen_png(name: &str, width: u32, height: u32, rect: (u32, u32, u32, u32)) -> PathBuf {
    let mut img = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    let (x0, y0, w, h) = rect;
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_pixel(x, y, Rgb([180, 150, 160]));
        }
    }
    let path = temp_path(name);
    img.save(&path).unwrap();
    path
}

#[test]
fn test_end_to_end_extraction_from_file() {
    // Large enough that the backend synthesizes a reduced detection level
    let input = write_specimen_png("slidecrop-it-input.png", 2048, 1024, (512, 256, 768, 384));
    let output = temp_path("slidecrop-it-output.png");

    let api = SlideCrop::new(Some(temp_path("slidecrop-it.log").to_str().unwrap())).unwrap();
    let result = api.extract_region(input.to_str().unwrap(), output.to_str().unwrap(), 80);

    assert!(result.succeeded, "extraction failed: {}", result.message);
    assert!(result.timing.total > std::time::Duration::ZERO);

    // The persisted region must sit inside the original specimen extent,
    // enclosing it to within one coarse-level pixel per edge.
    let saved = image::open(&output).unwrap().to_rgb8();
    let factory = PyramidSourceFactory::new();
    let source = factory.open(input.to_str().unwrap()).unwrap();
    let coarsest = source.level_count() - 1;
    let tolerance = source.level_downsample(coarsest).unwrap().ceil() as u32;

    // Lower bound: truncation may shave up to one coarse pixel per edge.
    // Upper bound: resampling halo on the synthesized levels may add a
    // couple of coarse pixels per edge.
    assert!(saved.width() + 2 * tolerance >= 768);
    assert!(saved.height() + 2 * tolerance >= 384);
    assert!(saved.width() <= 768 + 4 * tolerance);
    assert!(saved.height() <= 384 + 4 * tolerance);

    // Center of the saved region is specimen, not border
    let center = saved.get_pixel(saved.width() / 2, saved.height() / 2);
    assert_eq!(center.0, [180, 150, 160]);

    std::fs::remove_file(&input).unwrap();
    std::fs::remove_file(&output).unwrap();
}

#[test]
fn test_all_black_file_reports_no_region() {
    let input = temp_path("slidecrop-it-black.png");
    RgbImage::from_pixel(512, 512, Rgb([0, 0, 0])).save(&input).unwrap();
    let output = temp_path("slidecrop-it-black-out.png");

    let api = SlideCrop::new(Some(temp_path("slidecrop-it-black.log").to_str().unwrap())).unwrap();
    let result = api.extract_region(input.to_str().unwrap(), output.to_str().unwrap(), 80);

    assert!(!result.succeeded);
    assert!(result.message.contains("No specimen region detected"),
            "unexpected message: {}", result.message);
    assert!(result.timing.total > std::time::Duration::ZERO);
    assert!(!output.exists());

    std::fs::remove_file(&input).unwrap();
}

#[test]
fn test_missing_input_reports_open_failure() {
    let api = SlideCrop::new(Some(temp_path("slidecrop-it-missing.log").to_str().unwrap())).unwrap();
    let result = api.extract_region(
        temp_path("slidecrop-does-not-exist.png").to_str().unwrap(),
        temp_path("slidecrop-it-missing-out.png").to_str().unwrap(),
        80,
    );

    assert!(!result.succeeded);
    assert!(result.message.contains("Failed to open pyramid source"),
            "unexpected message: {}", result.message);
    assert!(result.timing.total > std::time::Duration::ZERO);
}

#[test]
fn test_quality_has_no_effect_on_output_pixels() {
    let input = write_specimen_png("slidecrop-it-quality.png", 1024, 1024, (256, 256, 512, 384));
    let out_low = temp_path("slidecrop-it-q1.png");
    let out_high = temp_path("slidecrop-it-q100.png");

    let api = SlideCrop::new(Some(temp_path("slidecrop-it-quality.log").to_str().unwrap())).unwrap();
    let low = api.extract_region(input.to_str().unwrap(), out_low.to_str().unwrap(), 1);
    let high = api.extract_region(input.to_str().unwrap(), out_high.to_str().unwrap(), 100);

    assert!(low.succeeded, "{}", low.message);
    assert!(high.succeeded, "{}", high.message);

    let pixels_low = image::open(&out_low).unwrap().to_rgb8();
    let pixels_high = image::open(&out_high).unwrap().to_rgb8();
    assert_eq!(pixels_low, pixels_high);

    std::fs::remove_file(&input).unwrap();
    std::fs::remove_file(&out_low).unwrap();
    std::fs::remove_file(&out_high).unwrap();
}

#[test]
fn test_describe_reports_level_layout() {
    let input = write_specimen_png("slidecrop-it-describe.png", 2048, 1024, (512, 256, 256, 256));

    let api = SlideCrop::new(Some(temp_path("slidecrop-it-describe.log").to_str().unwrap())).unwrap();
    let summary = api.describe(input.to_str().unwrap()).unwrap();

    assert!(summary.contains("Levels: 3"), "unexpected summary: {}", summary);
    assert!(summary.contains("Base dimensions: 2048x1024"));
    assert!(summary.contains("Level 0: 2048x1024 (downsample 1.00)"));
    assert!(summary.contains("Level 2: 128x64 (downsample 16.00)"));

    std::fs::remove_file(&input).unwrap();
}

#[test]
fn test_with_options_raises_detection_threshold() {
    // The specimen fill has luma around 160: detected with the default
    // threshold, invisible once the threshold is raised above it.
    let input = write_specimen_png("slidecrop-it-options.png", 1024, 512, (256, 128, 256, 256));
    let output = temp_path("slidecrop-it-options-out.png");

    let options = PipelineOptions {
        detector: DetectorParams { foreground_threshold: 200 },
        ..PipelineOptions::default()
    };
    let api = SlideCrop::with_options(
        Some(temp_path("slidecrop-it-options.log").to_str().unwrap()),
        options,
    )
    .unwrap();
    let result = api.extract_region(input.to_str().unwrap(), output.to_str().unwrap(), 80);

    assert!(!result.succeeded);
    assert!(result.message.contains("No specimen region detected"),
            "unexpected message: {}", result.message);
    assert!(!output.exists());

    std::fs::remove_file(&input).unwrap();
}

#[test]
fn test_rgba_input_is_normalized_to_rgb() {
    // PNG with an alpha channel: the saved output must decode as plain RGB
    let mut img = RgbaImage::from_pixel(1024, 512, Rgba([0, 0, 0, 255]));
    for y in 128..384 {
        for x in 256..768 {
            img.put_pixel(x, y, Rgba([120, 130, 140, 200]));
        }
    }
    let input = temp_path("slidecrop-it-rgba.png");
    img.save(&input).unwrap();
    let output = temp_path("slidecrop-it-rgba-out.png");

    let api = SlideCrop::new(Some(temp_path("slidecrop-it-rgba.log").to_str().unwrap())).unwrap();
    let result = api.extract_region(input.to_str().unwrap(), output.to_str().unwrap(), 80);
    assert!(result.succeeded, "{}", result.message);

    let saved = image::open(&output).unwrap();
    assert_eq!(saved.color(), image::ColorType::Rgb8);

    std::fs::remove_file(&input).unwrap();
    std::fs::remove_file(&output).unwrap();
}
