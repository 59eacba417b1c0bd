// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/crop.rs - 画布裁剪变换
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::{RgbImage, imageops};

/// 归一化画布默认宽度（桌面端）
pub const CANVAS_WIDTH: u32 = 640;
/// 归一化画布默认高度（桌面端）
pub const CANVAS_HEIGHT: u32 = 480;

/// 原图到归一化画布的裁剪变换。
///
/// 裁剪矩形是画布纵横比在原图内的最大居中矩形。同一个变换同时用于
/// 生成推理请求图像和渲染结果，保证预测坐标与画面对齐。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropTransform {
  /// 原图裁剪区域左上角 x
  pub source_x: f32,
  /// 原图裁剪区域左上角 y
  pub source_y: f32,
  /// 原图裁剪区域宽度
  pub source_width: f32,
  /// 原图裁剪区域高度
  pub source_height: f32,
  /// 画布宽度
  pub dest_width: u32,
  /// 画布高度
  pub dest_height: u32,
  /// 缩放比 dest_width / source_width（退化时为 1）
  pub scaling_ratio: f32,
}

impl CropTransform {
  /// 计算画布纵横比在原图内的最大居中裁剪矩形。
  pub fn compute(
    source_width: u32,
    source_height: u32,
    dest_width: u32,
    dest_height: u32,
  ) -> Self {
    let image_width = source_width as f32;
    let image_height = source_height as f32;

    let canvas_ratio = dest_width as f32 / dest_height as f32;
    let image_ratio = image_width / image_height;

    let (source_x, source_y, crop_width, crop_height) = if canvas_ratio >= image_ratio {
      // 原图相对更窄: 取全宽，高度按画布比例推出，垂直居中
      let crop_width = image_width;
      let crop_height = crop_width / canvas_ratio;
      (0.0, (image_height - crop_height) / 2.0, crop_width, crop_height)
    } else {
      // 原图相对更宽: 取全高，宽度按画布比例推出，水平居中
      let crop_height = image_height;
      let crop_width = crop_height * canvas_ratio;
      ((image_width - crop_width) / 2.0, 0.0, crop_width, crop_height)
    };

    let scaling_ratio = dest_width as f32 / crop_width;
    // 退化保护: 零宽裁剪时缩放比定义为 1
    let scaling_ratio = if scaling_ratio.is_finite() {
      scaling_ratio
    } else {
      1.0
    };

    CropTransform {
      source_x,
      source_y,
      source_width: crop_width,
      source_height: crop_height,
      dest_width,
      dest_height,
      scaling_ratio,
    }
  }

  /// 按变换提取归一化画布图像（裁剪后缩放到画布尺寸）。
  pub fn extract(&self, image: &RgbImage) -> RgbImage {
    let x = self.source_x.round().max(0.0) as u32;
    let y = self.source_y.round().max(0.0) as u32;
    let width = (self.source_width.round() as u32)
      .min(image.width().saturating_sub(x))
      .max(1);
    let height = (self.source_height.round() as u32)
      .min(image.height().saturating_sub(y))
      .max(1);

    let cropped = imageops::crop_imm(image, x, y, width, height).to_image();
    imageops::resize(
      &cropped,
      self.dest_width,
      self.dest_height,
      imageops::FilterType::Triangle,
    )
  }
}
