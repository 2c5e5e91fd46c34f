// 该文件是 VisionDet 项目的一部分。
// src/model/detection.rs - 单个检测结果
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

use std::fmt;
use std::num::NonZeroU32;

use thiserror::Error;
use tracing::debug;

use crate::frame::{FrameError, Rgb565Frame};

/// 对齐图像的默认边长，与上游对齐模型的输出一致
pub const DEFAULT_ALIGNED_IMAGE_SIZE: NonZeroU32 = NonZeroU32::new(224).unwrap();

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
  #[error("对齐图像索引越界: 索引 {index}, 数量 {len}")]
  IndexOutOfRange { index: usize, len: usize },
  #[error("检测框无效: ({left}, {top}, {right}, {bottom})")]
  InvalidBox {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
  },
  #[error("置信度无效: {0}")]
  InvalidConfidence(f32),
  #[error("对齐图像解码错误: {0}")]
  Frame(#[from] FrameError),
}

impl DetectionError {
  /// 索引越界、缓冲区不足或尺寸溢出
  pub fn is_out_of_range(&self) -> bool {
    matches!(
      self,
      DetectionError::IndexOutOfRange { .. }
        | DetectionError::Frame(FrameError::BufferTooShort { .. })
        | DetectionError::Frame(FrameError::SizeTooLarge { .. })
    )
  }
}

/// 检测目标内的关键点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Landmark {
  pub x: i32,
  pub y: i32,
}

impl Landmark {
  pub fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }
}

impl From<(i32, i32)> for Landmark {
  fn from((x, y): (i32, i32)) -> Self {
    Self { x, y }
  }
}

/// 一个检测目标的位置、置信度、关键点、特征向量以及对齐图像。
///
/// 检测框与标签在构造时确定，之后只能通过 `add_*` 追加数据。
/// 该类型不做任何同步，多线程填充需由调用方串行化。
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
  label: String,
  confidence: f32,
  left: i32,
  top: i32,
  right: i32,
  bottom: i32,
  landmarks: Vec<Landmark>,
  descriptors: Vec<Vec<f32>>,
  aligned_images: Vec<Box<[i32]>>,
  aligned_image_size: NonZeroU32,
}

impl DetectionResult {
  /// 构造检测结果，不校验置信度范围与检测框顺序
  pub fn new(
    label: impl Into<String>,
    confidence: f32,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
  ) -> Self {
    Self {
      label: label.into(),
      confidence,
      left,
      top,
      right,
      bottom,
      landmarks: Vec::new(),
      descriptors: Vec::new(),
      aligned_images: Vec::new(),
      aligned_image_size: DEFAULT_ALIGNED_IMAGE_SIZE,
    }
  }

  /// 构造并校验：置信度须为 [0, 1] 内的有限值，且 `right >= left`、`bottom >= top`
  pub fn try_new(
    label: impl Into<String>,
    confidence: f32,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
  ) -> Result<Self, DetectionError> {
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
      return Err(DetectionError::InvalidConfidence(confidence));
    }
    if right < left || bottom < top {
      return Err(DetectionError::InvalidBox {
        left,
        top,
        right,
        bottom,
      });
    }
    Ok(Self::new(label, confidence, left, top, right, bottom))
  }

  /// 设置对齐图像的解码边长，边长不可为 0
  pub fn with_aligned_image_size(mut self, size: NonZeroU32) -> Self {
    self.aligned_image_size = size;
    self
  }

  pub fn aligned_image_size(&self) -> u32 {
    self.aligned_image_size.get()
  }

  pub fn left(&self) -> i32 {
    self.left
  }

  pub fn top(&self) -> i32 {
    self.top
  }

  pub fn right(&self) -> i32 {
    self.right
  }

  pub fn bottom(&self) -> i32 {
    self.bottom
  }

  pub fn width(&self) -> i32 {
    self.right - self.left
  }

  pub fn height(&self) -> i32 {
    self.bottom - self.top
  }

  pub fn confidence(&self) -> f32 {
    self.confidence
  }

  pub fn label(&self) -> &str {
    &self.label
  }

  /// 追加关键点，通常由原生检测器调用
  pub fn add_landmark(&mut self, x: i32, y: i32) -> bool {
    self.landmarks.push(Landmark::new(x, y));
    true
  }

  pub fn face_landmarks(&self) -> &[Landmark] {
    &self.landmarks
  }

  pub fn add_descriptor(&mut self, descriptor: Vec<f32>) -> bool {
    debug!("已追加描述子: {:?}", descriptor);
    self.descriptors.push(descriptor);
    true
  }

  pub fn descriptors(&self) -> &[Vec<f32>] {
    &self.descriptors
  }

  /// 追加对齐图像缓冲区，内容为按行优先交错的 R,G,B 值
  pub fn add_aligned_image(&mut self, aligned_image: impl Into<Box<[i32]>>) -> bool {
    let aligned_image = aligned_image.into();
    debug!("已追加对齐图像: {} 个元素", aligned_image.len());
    self.aligned_images.push(aligned_image);
    true
  }

  pub fn aligned_images_len(&self) -> usize {
    self.aligned_images.len()
  }

  /// 已存储的原始对齐图像缓冲区
  pub fn aligned_image_buffer(&self, index: usize) -> Option<&[i32]> {
    self.aligned_images.get(index).map(AsRef::as_ref)
  }

  /// 将第 `index` 个对齐图像解码为 `size x size` 的 RGB565 图像。
  ///
  /// 返回新分配的图像，存储的缓冲区不会被修改。
  pub fn render_aligned_image(&self, index: usize) -> Result<Rgb565Frame, DetectionError> {
    let buffer = self
      .aligned_images
      .get(index)
      .ok_or(DetectionError::IndexOutOfRange {
        index,
        len: self.aligned_images.len(),
      })?;
    let size = self.aligned_image_size.get();
    Ok(Rgb565Frame::from_rgb_triplets(size, size, buffer)?)
  }
}

impl fmt::Display for DetectionResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Left:{}, Top:{}, Right:{}, Bottom:{}, Label:{}",
      self.left, self.top, self.right, self.bottom, self.label
    )
  }
}
