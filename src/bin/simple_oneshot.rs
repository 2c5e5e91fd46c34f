// 该文件是 VisionDet 项目的一部分。
// src/bin/simple_oneshot.rs - 单帧检测结果渲染
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

use anyhow::Result;
use clap::Parser;
use image::RgbImage;
use tracing::info;
use url::Url;

use visiondet::{
  FromUrl,
  input::InputWrapper,
  model::ReplayDetector,
  output::OutputWrapper,
  task::{OneShotTask, Task},
};

/// VisionDet 参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测器，例如 replay:///path/detections.json?size=224
  #[arg(long, value_name = "DETECTOR")]
  pub detector: Url,
  /// 输入来源，例如 image:///path/input.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，例如 image:///path/output.png 或 folder:///path/records?always
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("检测器: {}", args.detector);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let input = InputWrapper::from_url(&args.input)?;
  let detector = ReplayDetector::<RgbImage>::from_url(&args.detector)?;
  let output = OutputWrapper::from_url(&args.output)?;

  let result = OneShotTask.run_task(input, detector, output)?;
  for item in &result {
    info!(
      "{} 置信度 {:.2}, {} 个关键点, {} 张对齐图像",
      item,
      item.confidence(),
      item.face_landmarks().len(),
      item.aligned_images_len()
    );
  }

  Ok(())
}
