// 该文件是 VisionDet 项目的一部分。
// src/model/replay.rs - 检测结果回放
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

use std::marker::PhantomData;
use std::num::NonZeroU32;

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{DEFAULT_ALIGNED_IMAGE_SIZE, DetectionRecord, Detections, Detector},
};

#[derive(Error, Debug)]
pub enum ReplayError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{actual}'")]
  SchemeMismatch {
    expected: &'static str,
    actual: String,
  },
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("检测记录解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("对齐图像尺寸无效: {0}")]
  InvalidSize(String),
}

/// 从 JSON 文件回放检测结果的检测器，对每一帧输入都返回同一组结果。
///
/// 结果通过与原生检测器相同的构造与追加流程重建。
#[derive(Debug, Clone)]
pub struct ReplayDetector<Frame> {
  detections: Detections,
  _phantom: PhantomData<fn(&Frame)>,
}

impl<Frame> ReplayDetector<Frame> {
  pub fn from_records(records: Vec<DetectionRecord>, aligned_image_size: NonZeroU32) -> Self {
    let items: Vec<_> = records
      .into_iter()
      .map(|record| record.into_result(aligned_image_size))
      .collect();
    Self {
      detections: Detections::from(items),
      _phantom: PhantomData,
    }
  }

  pub fn from_json(json: &str, aligned_image_size: NonZeroU32) -> Result<Self, ReplayError> {
    let records: Vec<DetectionRecord> = serde_json::from_str(json)?;
    Ok(Self::from_records(records, aligned_image_size))
  }

  pub fn detections(&self) -> &Detections {
    &self.detections
  }
}

impl<Frame> FromUrlWithScheme for ReplayDetector<Frame> {
  const SCHEME: &'static str = "replay";
}

impl<Frame> FromUrl for ReplayDetector<Frame> {
  type Error = ReplayError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ReplayError::SchemeMismatch {
        expected: Self::SCHEME,
        actual: url.scheme().to_string(),
      });
    }

    let mut size = DEFAULT_ALIGNED_IMAGE_SIZE;
    for (k, v) in url.query_pairs() {
      if k == "size" {
        // NonZeroU32 的解析同时拒绝 0
        size = v
          .parse()
          .map_err(|_| ReplayError::InvalidSize(v.to_string()))?;
      }
    }

    let path = url.path();
    let json = std::fs::read_to_string(path)?;
    let detector = Self::from_json(&json, size)?;
    info!(
      "已加载回放检测记录: {} ({} 个目标, 对齐图像尺寸 {})",
      path,
      detector.detections.len(),
      size
    );
    Ok(detector)
  }
}

impl<Frame> Detector for ReplayDetector<Frame> {
  type Input = Frame;
  type Error = ReplayError;

  fn detect(&self, _input: &Self::Input) -> Result<Detections, Self::Error> {
    debug!("回放 {} 个检测结果", self.detections.len());
    Ok(self.detections.clone())
  }
}
