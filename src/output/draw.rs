// 该文件是 VisionDet 项目的一部分。
// src/output/draw.rs - 检测结果可视化
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

use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::{
  frame::{Rgb565Frame, unpack_rgb565},
  model::{DetectionResult, Detections},
};

const BOX_THICKNESS: i32 = 2;
const BOX_COLOR: [u8; 3] = [0, 0, 255]; // 蓝色
const LANDMARK_RADIUS: i32 = 2;
const LANDMARK_COLOR: [u8; 3] = [0, 255, 0]; // 绿色

pub struct Draw {
  box_thickness: i32,
  box_color: [u8; 3],
  landmark_radius: i32,
  landmark_color: [u8; 3],
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      box_thickness: BOX_THICKNESS,
      box_color: BOX_COLOR,
      landmark_radius: LANDMARK_RADIUS,
      landmark_color: LANDMARK_COLOR,
    }
  }
}

impl Draw {
  pub fn with_box_color(mut self, color: [u8; 3]) -> Self {
    self.box_color = color;
    self
  }

  pub fn with_landmark_color(mut self, color: [u8; 3]) -> Self {
    self.landmark_color = color;
    self
  }

  // 检测框为像素坐标，越界部分裁剪到图像范围内
  fn draw_bbox(&self, image: &mut RgbImage, result: &DetectionResult) {
    let (w, h) = (image.width() as i32, image.height() as i32);
    if w == 0 || h == 0 {
      return;
    }

    let x_min = result.left().clamp(0, w - 1);
    let y_min = result.top().clamp(0, h - 1);
    let x_max = result.right().clamp(0, w - 1);
    let y_max = result.bottom().clamp(0, h - 1);

    if x_min >= x_max || y_min >= y_max {
      return;
    }

    for t in 0..self.box_thickness {
      let width = x_max - x_min - 2 * t;
      let height = y_max - y_min - 2 * t;
      if width <= 0 || height <= 0 {
        break;
      }
      let rect = Rect::at(x_min + t, y_min + t).of_size(width as u32 + 1, height as u32 + 1);
      draw_hollow_rect_mut(image, rect, Rgb(self.box_color));
    }
  }

  fn draw_landmarks(&self, image: &mut RgbImage, result: &DetectionResult) {
    for point in result.face_landmarks() {
      draw_filled_circle_mut(
        image,
        (point.x, point.y),
        self.landmark_radius,
        Rgb(self.landmark_color),
      );
    }
  }
}

pub trait DrawDetectionOnImage {
  fn draw_detections_on_image(&self, image: &mut RgbImage, result: &Detections);
}

pub trait ToRgbImage {
  fn to_rgb_image(&self) -> RgbImage;
}

pub trait DrawDetectionOnFrame<Frame> {
  fn draw_detection(&self, frame: &Frame, result: &Detections) -> RgbImage;
}

impl<Frame: ToRgbImage, D: DrawDetectionOnImage> DrawDetectionOnFrame<Frame> for D {
  fn draw_detection(&self, frame: &Frame, result: &Detections) -> RgbImage {
    let mut image = frame.to_rgb_image();
    self.draw_detections_on_image(&mut image, result);
    image
  }
}

impl DrawDetectionOnImage for Draw {
  fn draw_detections_on_image(&self, image: &mut RgbImage, result: &Detections) {
    for item in result {
      self.draw_bbox(image, item);
      self.draw_landmarks(image, item);
    }
  }
}

impl ToRgbImage for Rgb565Frame {
  fn to_rgb_image(&self) -> RgbImage {
    // 将 RGB565 展开为 8 位 RGB 图像
    ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
      let pixel = self.pixel(x, y).unwrap_or_default();
      Rgb(unpack_rgb565(pixel))
    })
  }
}

impl ToRgbImage for RgbImage {
  fn to_rgb_image(&self) -> RgbImage {
    self.clone()
  }
}
