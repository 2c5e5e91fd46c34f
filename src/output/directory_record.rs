// 该文件是 VisionDet 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Datelike, Utc};
use image::RgbImage;
use thiserror::Error;
use tracing::info;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{DetectionError, DetectionRecord, Detections},
  output::{
    Render,
    draw::{Draw, DrawDetectionOnFrame, ToRgbImage},
  },
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("记录序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("对齐图像错误: {0}")]
  AlignedImageError(#[from] DetectionError),
}

/// 以 JSON 形式记录检测结果，对齐图像缓冲区单独保存为图片
pub struct Record;

impl Record {
  pub fn record(&self, result: &Detections, path: &Path) -> Result<(), DirectoryRecordOutputError> {
    let records: Vec<DetectionRecord> = result
      .iter()
      .map(|item| DetectionRecord::from(item).without_aligned_images())
      .collect();
    std::fs::write(
      path.with_extension("json"),
      serde_json::to_string_pretty(&records)?,
    )?;
    Ok(())
  }

  /// 将全部对齐图像缓冲区解码为 `(检测序号, 图像序号, 图像)`
  pub fn render_aligned_images(
    &self,
    result: &Detections,
  ) -> Result<Vec<(usize, usize, RgbImage)>, DirectoryRecordOutputError> {
    let mut images = Vec::new();
    for (d, item) in result.iter().enumerate() {
      for k in 0..item.aligned_images_len() {
        images.push((d, k, item.render_aligned_image(k)?.to_rgb_image()));
      }
    }
    Ok(images)
  }

  /// 保存为 `<stem>-<检测序号>-<图像序号>.png`
  pub fn save_aligned_images(
    &self,
    images: &[(usize, usize, RgbImage)],
    path: &Path,
  ) -> Result<usize, DirectoryRecordOutputError> {
    let stem = path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_default();
    for (d, k, image) in images {
      image.save(path.with_file_name(format!("{}-{}-{}.png", stem, d, k)))?;
    }
    Ok(images.len())
  }
}

pub struct DirectoryRecordOutput {
  directory: PathBuf,
  draw: Draw,
  record: Record,
  frame_counter: Mutex<u16>,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let always = uri.query_pairs().any(|(k, _)| k == "always");

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(uri.path()),
      draw: Draw::default(),
      record: Record,
      frame_counter: Mutex::new(0),
      always,
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    let mut counter = self
      .frame_counter
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    let id = counter.wrapping_add(1);
    *counter = id;
    id
  }

  fn frame_path(&self) -> Result<PathBuf, DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }
}

impl Render<RgbImage, Detections> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &RgbImage, result: &Detections) -> Result<(), Self::Error> {
    if !self.always && result.is_empty() {
      return Ok(());
    }

    // 先解码全部对齐图像，失败时不留下半份记录
    let aligned = self.record.render_aligned_images(result)?;
    let path = self.frame_path()?;
    let image = self.draw.draw_detection(frame, result);
    image.save(&path)?;
    self.record.record(result, &path)?;
    let aligned = self.record.save_aligned_images(&aligned, &path)?;
    info!(
      "记录帧到 {}: {} 个目标, {} 张对齐图像",
      path.display(),
      result.len(),
      aligned
    );
    Ok(())
  }
}
