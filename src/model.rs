// 该文件是 VisionDet 项目的一部分。
// src/model.rs - 检测模型与检测结果
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

/// 外部检测器：给定一帧图像，输出零个或多个检测结果
pub trait Detector {
  type Input;
  type Error;

  fn detect(&self, input: &Self::Input) -> Result<Detections, Self::Error>;
}

/// 一帧图像上的全部检测结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detections {
  pub items: Box<[DetectionResult]>,
}

impl Detections {
  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, DetectionResult> {
    self.items.iter()
  }
}

impl From<Vec<DetectionResult>> for Detections {
  fn from(items: Vec<DetectionResult>) -> Self {
    Self {
      items: items.into_boxed_slice(),
    }
  }
}

impl<'a> IntoIterator for &'a Detections {
  type Item = &'a DetectionResult;
  type IntoIter = std::slice::Iter<'a, DetectionResult>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}

mod detection;
pub use self::detection::{DEFAULT_ALIGNED_IMAGE_SIZE, DetectionError, DetectionResult, Landmark};

mod record;
pub use self::record::DetectionRecord;

#[cfg(feature = "model_replay")]
mod replay;
#[cfg(feature = "model_replay")]
pub use self::replay::{ReplayDetector, ReplayError};
