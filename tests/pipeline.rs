#![cfg(all(
  feature = "read_image_file",
  feature = "save_image_file",
  feature = "directory_record",
  feature = "model_replay"
))]

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use url::Url;

use visiondet::{
  FromUrl,
  input::ImageFileInput,
  model::{DetectionRecord, ReplayDetector, ReplayError},
  output::{DirectoryRecordOutput, OutputWrapper, SaveImageFileOutput},
  task::{OneShotTask, Task},
};

const SIZE: usize = 4;

fn write_fixture(dir: &Path) -> (Url, Url) {
  let image_path = dir.join("input.png");
  RgbImage::from_pixel(64, 48, Rgb([40, 40, 40]))
    .save(&image_path)
    .unwrap();

  let aligned: Vec<i32> = [200, 100, 50].repeat(SIZE * SIZE);
  let json = serde_json::json!([
    {
      "label": "face", "confidence": 0.93,
      "left": 8, "top": 6, "right": 40, "bottom": 42,
      "landmarks": [[16, 18], [32, 18], [24, 30]],
      "descriptors": [[0.1, 0.2, 0.3]],
      "aligned_images": [aligned]
    },
    {
      "label": "face", "confidence": 0.41,
      "left": 44, "top": 10, "right": 60, "bottom": 30
    }
  ]);
  let json_path = dir.join("detections.json");
  std::fs::write(&json_path, json.to_string()).unwrap();

  let input = Url::parse(&format!("image://{}", image_path.display())).unwrap();
  let detector = Url::parse(&format!("replay://{}?size={}", json_path.display(), SIZE)).unwrap();
  (input, detector)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
  for entry in std::fs::read_dir(dir).unwrap() {
    let path = entry.unwrap().path();
    if path.is_dir() {
      collect_files(&path, out);
    } else {
      out.push(path);
    }
  }
}

#[test]
fn directory_record_writes_overlay_record_and_aligned_crops() {
  let dir = tempfile::tempdir().unwrap();
  let (input, detector) = write_fixture(dir.path());
  let records = dir.path().join("records");
  let output = Url::parse(&format!("folder://{}", records.display())).unwrap();

  let result = OneShotTask
    .run_task(
      ImageFileInput::from_url(&input).unwrap(),
      ReplayDetector::<RgbImage>::from_url(&detector).unwrap(),
      DirectoryRecordOutput::from_url(&output).unwrap(),
    )
    .unwrap();
  assert_eq!(result.len(), 2);
  assert_eq!(result.items[0].descriptors().len(), 1);

  let mut files = Vec::new();
  collect_files(&records, &mut files);
  files.sort();
  assert_eq!(files.len(), 3, "{:?}", files);

  let json = files
    .iter()
    .find(|p| p.extension().is_some_and(|e| e == "json"))
    .unwrap();
  let saved: Vec<DetectionRecord> =
    serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
  assert_eq!(saved.len(), 2);
  assert_eq!(saved[0].landmarks, vec![[16, 18], [32, 18], [24, 30]]);
  assert!(saved[0].aligned_images.is_empty());

  let crop_path = files
    .iter()
    .find(|p| p.to_string_lossy().ends_with("-0-0.png"))
    .unwrap();
  let crop = image::open(crop_path).unwrap().to_rgb8();
  assert_eq!(crop.dimensions(), (SIZE as u32, SIZE as u32));
  let Rgb([r, g, b]) = *crop.get_pixel(1, 1);
  assert!((r as i32 - 200).abs() <= 7);
  assert!((g as i32 - 100).abs() <= 3);
  assert!((b as i32 - 50).abs() <= 7);

  let overlay_path = files
    .iter()
    .find(|p| {
      p.extension().is_some_and(|e| e == "png") && !p.to_string_lossy().ends_with("-0-0.png")
    })
    .unwrap();
  let overlay = image::open(overlay_path).unwrap().to_rgb8();
  assert_eq!(overlay.dimensions(), (64, 48));
  assert_ne!(overlay.get_pixel(8, 6), &Rgb([40, 40, 40]));
  assert_eq!(overlay.get_pixel(2, 2), &Rgb([40, 40, 40]));
}

#[test]
fn directory_record_skips_empty_frames_unless_always() {
  let dir = tempfile::tempdir().unwrap();
  let (input, _) = write_fixture(dir.path());
  let empty = dir.path().join("empty.json");
  std::fs::write(&empty, "[]").unwrap();
  let detector = Url::parse(&format!("replay://{}", empty.display())).unwrap();

  for (query, expected) in [("", 0), ("?always", 2)] {
    let records = dir.path().join(format!("records{}", expected));
    let output = Url::parse(&format!("folder://{}{}", records.display(), query)).unwrap();
    OneShotTask
      .run_task(
        ImageFileInput::from_url(&input).unwrap(),
        ReplayDetector::<RgbImage>::from_url(&detector).unwrap(),
        OutputWrapper::from_url(&output).unwrap(),
      )
      .unwrap();

    let mut files = Vec::new();
    if records.exists() {
      collect_files(&records, &mut files);
    }
    assert_eq!(files.len(), expected);
  }
}

#[test]
fn save_image_file_draws_overlay() {
  let dir = tempfile::tempdir().unwrap();
  let (input, detector) = write_fixture(dir.path());
  let out_path = dir.path().join("out").join("overlay.png");
  let output = Url::parse(&format!("image://{}", out_path.display())).unwrap();

  OneShotTask
    .run_task(
      ImageFileInput::from_url(&input).unwrap(),
      ReplayDetector::<RgbImage>::from_url(&detector).unwrap(),
      SaveImageFileOutput::from_url(&output).unwrap(),
    )
    .unwrap();

  let overlay = image::open(&out_path).unwrap().to_rgb8();
  assert_eq!(overlay.get_pixel(8, 6), &Rgb([0, 0, 255]));
  assert_eq!(overlay.get_pixel(24, 30), &Rgb([0, 255, 0]));
}

#[test]
fn directory_record_writes_nothing_when_an_aligned_buffer_is_short() {
  let dir = tempfile::tempdir().unwrap();
  let (input, _) = write_fixture(dir.path());
  let json = serde_json::json!([
    {
      "label": "face", "confidence": 0.9,
      "left": 8, "top": 6, "right": 40, "bottom": 42,
      "aligned_images": [[200, 100, 50]]
    }
  ]);
  let json_path = dir.path().join("short.json");
  std::fs::write(&json_path, json.to_string()).unwrap();
  let detector = Url::parse(&format!("replay://{}?size={}", json_path.display(), SIZE)).unwrap();
  let records = dir.path().join("records");
  let output = Url::parse(&format!("folder://{}", records.display())).unwrap();

  let result = OneShotTask.run_task(
    ImageFileInput::from_url(&input).unwrap(),
    ReplayDetector::<RgbImage>::from_url(&detector).unwrap(),
    DirectoryRecordOutput::from_url(&output).unwrap(),
  );
  assert!(result.is_err());
  assert!(!records.exists());
}

#[test]
fn zero_aligned_image_size_is_rejected() {
  let dir = tempfile::tempdir().unwrap();
  let (_, detector) = write_fixture(dir.path());
  let mut zero = detector.clone();
  zero.set_query(Some("size=0"));
  assert!(matches!(
    ReplayDetector::<RgbImage>::from_url(&zero),
    Err(ReplayError::InvalidSize(_))
  ));
}

#[test]
fn unknown_output_scheme_is_rejected() {
  let url = Url::parse("rtsp://camera/stream").unwrap();
  assert!(OutputWrapper::from_url(&url).is_err());
}
