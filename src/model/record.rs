// 该文件是 VisionDet 项目的一部分。
// src/model/record.rs - 检测结果的可序列化记录
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::model::DetectionResult;

/// `DetectionResult` 的 JSON 形式，用于回放与记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
  pub label: String,
  pub confidence: f32,
  pub left: i32,
  pub top: i32,
  pub right: i32,
  pub bottom: i32,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub landmarks: Vec<[i32; 2]>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub descriptors: Vec<Vec<f32>>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub aligned_images: Vec<Vec<i32>>,
}

impl DetectionRecord {
  /// 按原生检测器的调用顺序重建检测结果：先构造，再逐个追加
  pub fn into_result(self, aligned_image_size: NonZeroU32) -> DetectionResult {
    let mut result = DetectionResult::new(
      self.label,
      self.confidence,
      self.left,
      self.top,
      self.right,
      self.bottom,
    )
    .with_aligned_image_size(aligned_image_size);

    for [x, y] in self.landmarks {
      result.add_landmark(x, y);
    }
    for descriptor in self.descriptors {
      result.add_descriptor(descriptor);
    }
    for aligned_image in self.aligned_images {
      result.add_aligned_image(aligned_image);
    }
    result
  }

  /// 丢弃对齐图像缓冲区，只保留几何信息与特征
  pub fn without_aligned_images(mut self) -> Self {
    self.aligned_images.clear();
    self
  }
}

impl From<&DetectionResult> for DetectionRecord {
  fn from(result: &DetectionResult) -> Self {
    Self {
      label: result.label().to_string(),
      confidence: result.confidence(),
      left: result.left(),
      top: result.top(),
      right: result.right(),
      bottom: result.bottom(),
      landmarks: result
        .face_landmarks()
        .iter()
        .map(|p| [p.x, p.y])
        .collect(),
      descriptors: result.descriptors().to_vec(),
      aligned_images: (0..result.aligned_images_len())
        .filter_map(|i| result.aligned_image_buffer(i))
        .map(<[i32]>::to_vec)
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{DEFAULT_ALIGNED_IMAGE_SIZE, Landmark};

  #[test]
  fn parses_minimal_record() {
    let json = r#"{"label":"face","confidence":0.75,"left":1,"top":2,"right":30,"bottom":40}"#;
    let record: DetectionRecord = serde_json::from_str(json).unwrap();
    let result = record.into_result(DEFAULT_ALIGNED_IMAGE_SIZE);
    assert_eq!(result.to_string(), "Left:1, Top:2, Right:30, Bottom:40, Label:face");
    assert!(result.face_landmarks().is_empty());
    assert_eq!(result.aligned_images_len(), 0);
  }

  #[test]
  fn rebuilds_through_appends() {
    let json = r#"{
      "label": "face", "confidence": 0.5,
      "left": 0, "top": 0, "right": 8, "bottom": 8,
      "landmarks": [[1, 1], [6, 1], [4, 5]],
      "descriptors": [[0.25, -0.5]],
      "aligned_images": [[255, 0, 0, 0, 255, 0, 0, 0, 255, 9, 9, 9]]
    }"#;
    let record: DetectionRecord = serde_json::from_str(json).unwrap();
    let result = record.into_result(NonZeroU32::new(2).unwrap());
    assert_eq!(
      result.face_landmarks(),
      &[Landmark::new(1, 1), Landmark::new(6, 1), Landmark::new(4, 5)]
    );
    assert_eq!(result.descriptors(), &[vec![0.25f32, -0.5]]);
    let frame = result.render_aligned_image(0).unwrap();
    assert_eq!(frame.rgb(0, 0), Some([255, 0, 0]));
  }

  #[test]
  fn empty_sequences_are_omitted() {
    let result = DetectionResult::new("face", 0.5, 0, 0, 4, 4);
    let value = serde_json::to_value(DetectionRecord::from(&result)).unwrap();
    let object = value.as_object().unwrap();
    assert!(!object.contains_key("landmarks"));
    assert!(!object.contains_key("aligned_images"));
    assert_eq!(object["label"], "face");
  }

  #[test]
  fn record_mirrors_result() {
    let mut result = DetectionResult::new("face", 0.5, 0, 0, 4, 4);
    result.add_landmark(2, 3);
    result.add_aligned_image(vec![1, 2, 3]);
    let record = DetectionRecord::from(&result);
    assert_eq!(record.landmarks, vec![[2, 3]]);
    assert_eq!(record.aligned_images, vec![vec![1, 2, 3]]);
    assert!(record.without_aligned_images().aligned_images.is_empty());
  }
}
