mod common;

use common::*;
use footscale::detection::{build_standard_pipeline, load_image};
use footscale::report::{render_frames, save_frames};

#[test]
fn loads_png_from_disk() -> anyhow::Result<()> {
    let file = save_temp_png(&foot_with_coin());
    let img = load_image(file.path())?;
    assert_eq!((img.width(), img.height()), (400, 400));
    Ok(())
}

#[test]
fn garbage_file_fails_to_decode() -> anyhow::Result<()> {
    let file = tempfile::Builder::new().suffix(".png").tempfile()?;
    std::fs::write(file.path(), b"not an image")?;
    let err = load_image(file.path()).unwrap_err();
    assert!(matches!(err, MeasureError::Decode(_)), "got {err:?}");
    Ok(())
}

#[test]
fn debug_mode_saves_every_step() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");
    let pipeline = build_standard_pipeline(&MeasureConfig::default()).with_debug(debug_dir.clone())?;
    pipeline.run(foot_with_coin())?;

    for step_dir in [
        "00_input",
        "01_hsv_skin_mask",
        "02_edge_detection",
        "03_foot_contour",
        "04_coin_detection",
        "05_scale",
    ] {
        assert!(
            debug_dir.join(step_dir).join("01.png").exists(),
            "missing {step_dir}/01.png"
        );
    }
    Ok(())
}

#[test]
fn debug_dir_must_be_empty() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("leftover.txt"), "x")?;
    let result = build_standard_pipeline(&MeasureConfig::default()).with_debug(dir.path().to_path_buf());
    assert!(matches!(result, Err(MeasureError::DebugDirNotEmpty(_))));
    Ok(())
}

#[test]
fn frames_are_written_in_order() -> anyhow::Result<()> {
    let data = footscale::measure(foot_with_coin(), &MeasureConfig::default())?;
    let frames = render_frames(&data)?;

    let dir = tempfile::TempDir::new()?;
    let written = save_frames(&frames, dir.path())?;
    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "01_hsv_filtered_image.png",
            "02_canny_edge_detection.png",
            "03_detected_foot_coin_contours.png",
        ]
    );

    let annotated = image::open(&written[2])?.to_rgb8();
    assert_eq!(annotated.dimensions(), (400, 400));
    Ok(())
}

#[test]
fn json_report_has_measurements() -> anyhow::Result<()> {
    let data = footscale::measure(foot_with_coin(), &MeasureConfig::default())?;
    let report = MeasurementReport::from_data(&data, "cm")?;
    let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&report)?)?;
    assert_eq!(json["circle_count"], 1);
    assert!(json["foot"]["length"].as_f64().unwrap() > 0.0);
    Ok(())
}
