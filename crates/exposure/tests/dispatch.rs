//! Dispatch through real worker processes.

use exposure_core::config::ProcessingConfig;
use exposure_core::pipeline::{DispatchOptions, Dispatcher, FileDiscovery, ProcessWorker};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

const COPYRIGHT: &str = "Copyright Test Photographer. All rights reserved.";

fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, ((x ^ y) % 256) as u8])
    });
    let path = dir.join(name);
    DynamicImage::ImageRgb8(img)
        .save_with_format(&path, image::ImageFormat::Jpeg)
        .unwrap();
    path
}

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("exposure.toml");
    std::fs::write(
        &path,
        format!("[metadata]\ncopyright = \"{COPYRIGHT}\"\n\n[logging]\nlevel = \"warn\"\n"),
    )
    .unwrap();
    path
}

fn copyright_tag(bytes: &[u8]) -> Option<String> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif.get_field(exif::Tag::Copyright, exif::In::PRIMARY)?;
    match &field.value {
        exif::Value::Ascii(parts) => parts
            .first()
            .map(|p| String::from_utf8_lossy(p).into_owned()),
        _ => None,
    }
}

fn worker(config: &Path) -> Arc<ProcessWorker> {
    Arc::new(
        ProcessWorker::new(env!("CARGO_BIN_EXE_exposure"))
            .leading_arg("--config")
            .leading_arg(config),
    )
}

fn discover(dir: &Path) -> Vec<exposure_core::pipeline::DiscoveredFile> {
    FileDiscovery::new(ProcessingConfig::default()).discover(dir)
}

#[tokio::test]
async fn ten_valid_inputs_produce_ten_tagged_outputs() {
    let tmp = tempfile::tempdir().unwrap();
    let images = tmp.path().join("images");
    std::fs::create_dir_all(&images).unwrap();
    for i in 0..10 {
        write_jpeg(&images, &format!("photo-{i:02}.jpg"), 320 + i * 16, 240);
    }
    let config = write_config(tmp.path());
    let out = tmp.path().join("tmp/images");

    let dispatcher = Dispatcher::new(worker(&config), DispatchOptions::default());
    let result = dispatcher.dispatch(&discover(&images), &out).await.unwrap();

    assert_eq!(result.total(), 10);
    assert_eq!(result.optimized(), 10);
    assert_eq!(result.exit_code(), 0);
    for outcome in &result.outcomes {
        let report = outcome.report.as_ref().expect("worker report");
        assert!(report.copyright_embedded);
        let bytes = std::fs::read(out.join(&outcome.name)).unwrap();
        assert_eq!(bytes.len() as u64, report.new_size);
        assert_eq!(copyright_tag(&bytes).as_deref(), Some(COPYRIGHT));
    }
}

#[tokio::test]
async fn one_corrupt_input_fails_batch_but_others_complete() {
    let tmp = tempfile::tempdir().unwrap();
    let images = tmp.path().join("images");
    std::fs::create_dir_all(&images).unwrap();
    for i in 0..9 {
        write_jpeg(&images, &format!("photo-{i:02}.jpg"), 200, 150);
    }
    // Valid JPEG header, truncated body.
    std::fs::write(
        images.join("photo-99.jpg"),
        [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'],
    )
    .unwrap();
    let config = write_config(tmp.path());
    let out = tmp.path().join("tmp/images");

    let dispatcher = Dispatcher::new(worker(&config), DispatchOptions::default());
    let result = dispatcher.dispatch(&discover(&images), &out).await.unwrap();

    assert_eq!(result.total(), 10);
    assert_eq!(result.failed(), 1);
    assert_eq!(result.optimized(), 9);
    assert_eq!(result.exit_code(), 1);
    assert_eq!(result.first_failure().unwrap().name, "photo-99.jpg");
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 9);
    assert!(!out.join("photo-99.jpg").exists());
}

#[tokio::test]
async fn dash_prefixed_file_name_is_processed() {
    let tmp = tempfile::tempdir().unwrap();
    let images = tmp.path().join("images");
    std::fs::create_dir_all(&images).unwrap();
    write_jpeg(&images, "-vacation.jpg", 160, 120);
    write_jpeg(&images, "ok.jpg", 160, 120);
    let config = write_config(tmp.path());
    let out = tmp.path().join("tmp/images");

    let dispatcher = Dispatcher::new(worker(&config), DispatchOptions::default());
    let result = dispatcher.dispatch(&discover(&images), &out).await.unwrap();

    assert_eq!(result.optimized(), 2, "{:?}", result.first_failure());
    let bytes = std::fs::read(out.join("-vacation.jpg")).unwrap();
    assert_eq!(copyright_tag(&bytes).as_deref(), Some(COPYRIGHT));
}

#[test]
fn worker_downscales_landscape_to_2500() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_jpeg(tmp.path(), "wide.jpg", 4000, 3000);
    let output = tmp.path().join("out/wide.jpg");
    let config = write_config(tmp.path());

    let status = Command::new(env!("CARGO_BIN_EXE_exposure"))
        .arg("--config")
        .arg(&config)
        .arg("worker")
        .arg("wide.jpg")
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(0));
    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(copyright_tag(&bytes).as_deref(), Some(COPYRIGHT));
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (2500, 1875));
}

#[test]
fn worker_keeps_small_square_dimensions() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_jpeg(tmp.path(), "square.jpg", 1200, 1200);
    let output = tmp.path().join("square-out.jpg");
    let config = write_config(tmp.path());

    let out = Command::new(env!("CARGO_BIN_EXE_exposure"))
        .arg("--config")
        .arg(&config)
        .args(["worker", "square.jpg"])
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();

    assert!(out.status.success());
    let report: exposure_core::AssetReport =
        serde_json::from_str(String::from_utf8_lossy(&out.stdout).trim()).unwrap();
    assert!(!report.resized);
    assert_eq!((report.width, report.height), (1200, 1200));

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(copyright_tag(&bytes).as_deref(), Some(COPYRIGHT));
    assert_eq!(
        image::load_from_memory(&bytes).unwrap().dimensions(),
        (1200, 1200)
    );
}

#[test]
fn worker_with_missing_argument_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_jpeg(tmp.path(), "a.jpg", 64, 64);
    let config = write_config(tmp.path());

    let status = Command::new(env!("CARGO_BIN_EXE_exposure"))
        .arg("--config")
        .arg(&config)
        .args(["worker", "a.jpg"])
        .arg(&input)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
}
