// 该文件是 VisionDet 项目的一部分。
// src/frame.rs - RGB565 帧定义
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

use thiserror::Error;

const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
  #[error("缓冲区长度不足: 期望至少 {expected}, 实际 {actual}")]
  BufferTooShort { expected: usize, actual: usize },
  #[error("通道值越界: 偏移 {offset} 处的值 {value} 不在 [0, 255] 内")]
  ChannelOutOfRange { offset: usize, value: i32 },
  #[error("图像尺寸过大: {width}x{height}")]
  SizeTooLarge { width: u32, height: u32 },
}

/// 将 8 位 RGB 压缩为 RGB565
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
  ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// 将 RGB565 展开为 8 位 RGB，高位复制到低位，使 0 与满值保持不变
pub fn unpack_rgb565(pixel: u16) -> [u8; 3] {
  let r5 = ((pixel >> 11) & 0x1f) as u8;
  let g6 = ((pixel >> 5) & 0x3f) as u8;
  let b5 = (pixel & 0x1f) as u8;
  [
    (r5 << 3) | (r5 >> 2),
    (g6 << 2) | (g6 >> 4),
    (b5 << 3) | (b5 >> 2),
  ]
}

fn channel(buffer: &[i32], offset: usize) -> Result<u8, FrameError> {
  let value = buffer[offset];
  u8::try_from(value).map_err(|_| FrameError::ChannelOutOfRange { offset, value })
}

/// 16 位 RGB565 图像，按行优先存储
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rgb565Frame {
  width: u32,
  height: u32,
  data: Box<[u16]>,
}

impl Rgb565Frame {
  /// 从交错的 R,G,B 整数缓冲区构造图像。
  ///
  /// 缓冲区至少需要 `width * height * 3` 个元素，多余部分忽略。
  pub fn from_rgb_triplets(width: u32, height: u32, buffer: &[i32]) -> Result<Self, FrameError> {
    let too_large = FrameError::SizeTooLarge { width, height };
    let pixels = (width as usize)
      .checked_mul(height as usize)
      .ok_or(too_large.clone())?;
    let expected = pixels.checked_mul(RGB_CHANNELS).ok_or(too_large)?;
    if buffer.len() < expected {
      return Err(FrameError::BufferTooShort {
        expected,
        actual: buffer.len(),
      });
    }

    let data = (0..pixels)
      .map(|i| {
        let base = i * RGB_CHANNELS;
        let r = channel(buffer, base)?;
        let g = channel(buffer, base + 1)?;
        let b = channel(buffer, base + 2)?;
        Ok(pack_rgb565(r, g, b))
      })
      .collect::<Result<Box<[u16]>, FrameError>>()?;

    Ok(Self {
      width,
      height,
      data,
    })
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  /// 原始 RGB565 像素值
  pub fn pixel(&self, x: u32, y: u32) -> Option<u16> {
    if x >= self.width || y >= self.height {
      return None;
    }
    Some(self.data[(y as usize) * (self.width as usize) + (x as usize)])
  }

  /// 展开为 8 位 RGB 的像素值
  pub fn rgb(&self, x: u32, y: u32) -> Option<[u8; 3]> {
    self.pixel(x, y).map(unpack_rgb565)
  }

  pub fn as_slice(&self) -> &[u16] {
    &self.data
  }
}

impl AsRef<[u16]> for Rgb565Frame {
  fn as_ref(&self) -> &[u16] {
    &self.data
  }
}
