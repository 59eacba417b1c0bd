// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/output/draw.rs - 检测结果可视化
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::{HashMap, VecDeque};

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::{crop::CropTransform, model::Prediction};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 15.0;
const LABEL_BG_HEIGHT: i32 = 30;
const LABEL_BG_PADDING: i32 = 8;
const LABEL_TEXT_VERTICAL_PADDING: i32 = 8;
const LABEL_TEXT_COLOR: [u8; 3] = [0, 0, 0]; // 黑色
const BOX_STROKE_WIDTH: i32 = 4;

// 框离画布顶端太近时标签下移的阈值
const LABEL_TOP_LIMIT: f32 = 20.0;
const LABEL_TOP_FALLBACK: i32 = 30;

/// 类别颜色候选池
const COLOR_CHOICES: [Rgb<u8>; 12] = [
  Rgb([0xC7, 0xFC, 0x00]),
  Rgb([0xFF, 0x00, 0xFF]),
  Rgb([0x86, 0x22, 0xFF]),
  Rgb([0xFE, 0x00, 0x56]),
  Rgb([0x00, 0xFF, 0xCE]),
  Rgb([0xFF, 0x80, 0x00]),
  Rgb([0x00, 0xB7, 0xEB]),
  Rgb([0xFF, 0xFF, 0x00]),
  Rgb([0x0E, 0x7A, 0xFE]),
  Rgb([0xFF, 0xAB, 0xAB]),
  Rgb([0x00, 0x00, 0xFF]),
  Rgb([0xCC, 0xCC, 0xCC]),
];

/// 候选池耗尽后的兜底颜色
const FALLBACK_COLOR: Rgb<u8> = Rgb([0x00, 0xFF, 0xCE]);

/// 会话内的类别颜色表。首次遇到的类别从池头取色，
/// 池耗尽后确定性地退回兜底色。随会话存续，不跨会话保留。
#[derive(Debug, Clone)]
pub struct ColorContext {
  pool: VecDeque<Rgb<u8>>,
  assigned: HashMap<String, Rgb<u8>>,
}

impl Default for ColorContext {
  fn default() -> Self {
    ColorContext {
      pool: COLOR_CHOICES.into_iter().collect(),
      assigned: HashMap::new(),
    }
  }
}

impl ColorContext {
  /// 取类别颜色，同一类别整个会话内稳定
  pub fn color_for(&mut self, class: &str) -> Rgb<u8> {
    if let Some(color) = self.assigned.get(class) {
      return *color;
    }
    let color = self.pool.pop_front().unwrap_or(FALLBACK_COLOR);
    self.assigned.insert(class.to_string(), color);
    color
  }
}

pub struct Draw {
  font: FontArc,
  font_scale: PxScale,
  label_bg_height: i32,
  label_text_vertical_padding: i32,
  text_color: Rgb<u8>,
}

impl Default for Draw {
  fn default() -> Self {
    let font_data = include_bytes!("../../assets/DejaVuSans.ttf"); // default font
    let font = FontArc::try_from_slice(font_data).expect("无法加载嵌入的字体文件");

    Draw {
      font,
      font_scale: PxScale::from(LABEL_FONT_SIZE),
      label_bg_height: LABEL_BG_HEIGHT,
      label_text_vertical_padding: LABEL_TEXT_VERTICAL_PADDING,
      text_color: Rgb(LABEL_TEXT_COLOR),
    }
  }
}

impl Draw {
  /// 把预测框和标签画到画布上。
  ///
  /// `normalized` 表示预测坐标是否已在画布坐标系；否则先减裁剪偏移
  /// 再按缩放比放缩。负坐标裁剪到零并等量缩短宽高。
  pub fn render(
    &self,
    colors: &mut ColorContext,
    canvas: &mut RgbImage,
    predictions: &[Prediction],
    transform: &CropTransform,
    normalized: bool,
  ) {
    for prediction in predictions {
      let color = colors.color_for(&prediction.class);

      // 中心坐标转左上角
      let mut x = prediction.bbox.x - prediction.bbox.width / 2.0;
      let mut y = prediction.bbox.y - prediction.bbox.height / 2.0;
      let mut width = prediction.bbox.width;
      let mut height = prediction.bbox.height;

      if !normalized {
        x = (x - transform.source_x) * transform.scaling_ratio;
        y = (y - transform.source_y) * transform.scaling_ratio;
        width *= transform.scaling_ratio;
        height *= transform.scaling_ratio;
      }

      // 裁剪负坐标，宽高随之缩短
      if x < 0.0 {
        width += x;
        x = 0.0;
      }
      if y < 0.0 {
        height += y;
        y = 0.0;
      }
      if width < 1.0 || height < 1.0 {
        continue;
      }

      self.stroke_rect(canvas, x as i32, y as i32, width as u32, height as u32, color);
      self.draw_label(canvas, prediction, x, y, color);
    }
  }

  // 线宽 BOX_STROKE_WIDTH 的描边，逐像素向内收
  fn stroke_rect(&self, canvas: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>) {
    for inset in 0..BOX_STROKE_WIDTH {
      let w = width as i32 - 2 * inset;
      let h = height as i32 - 2 * inset;
      if w < 1 || h < 1 {
        break;
      }
      let rect = Rect::at(x + inset, y + inset).of_size(w as u32, h as u32);
      draw_hollow_rect_mut(canvas, rect, color);
    }
  }

  // 标签: 类别加置信度百分比，框上方实心底色，贴顶时下移
  fn draw_label(&self, canvas: &mut RgbImage, prediction: &Prediction, x: f32, y: f32, color: Rgb<u8>) {
    let label = format!(
      "{} {}%",
      prediction.class,
      (prediction.confidence * 100.0).round() as i32
    );
    let text_width = text_size(self.font_scale, &self.font, &label).0 as i32;

    let label_y = if y < LABEL_TOP_LIMIT {
      LABEL_TOP_FALLBACK
    } else {
      y as i32
    };
    let bg_x = (x as i32 - 2).max(0);
    let bg_y = (label_y - self.label_bg_height).max(0);
    let bg_width = text_width + LABEL_BG_PADDING;

    let rect = Rect::at(bg_x, bg_y).of_size(bg_width.max(1) as u32, self.label_bg_height as u32);
    draw_filled_rect_mut(canvas, rect, color);

    draw_text_mut(
      canvas,
      self.text_color,
      x as i32 + 2,
      bg_y + self.label_text_vertical_padding,
      self.font_scale,
      &self.font,
      &label,
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::BBox;

  fn prediction(class: &str, x: f32, y: f32, width: f32, height: f32) -> Prediction {
    Prediction {
      class: class.to_string(),
      confidence: 0.75,
      bbox: BBox { x, y, width, height },
    }
  }

  fn canvas_transform() -> CropTransform {
    CropTransform::compute(640, 480, 640, 480)
  }

  #[test]
  fn color_assignment_is_stable_within_a_session() {
    let mut colors = ColorContext::default();
    let zoea = colors.color_for("zoea");
    let megalopa = colors.color_for("megalopa");
    assert_eq!(zoea, COLOR_CHOICES[0]);
    assert_eq!(megalopa, COLOR_CHOICES[1]);
    // 第二张图里同一类别拿到同一颜色
    assert_eq!(colors.color_for("zoea"), zoea);
    assert_eq!(colors.color_for("megalopa"), megalopa);
  }

  #[test]
  fn exhausted_palette_falls_back_without_panicking() {
    let mut colors = ColorContext::default();
    for i in 0..COLOR_CHOICES.len() {
      colors.color_for(&format!("class-{i}"));
    }
    assert_eq!(colors.color_for("one-more"), FALLBACK_COLOR);
    assert_eq!(colors.color_for("and-another"), FALLBACK_COLOR);
    // 已分配的不受耗尽影响
    assert_eq!(colors.color_for("class-0"), COLOR_CHOICES[0]);
  }

  #[test]
  fn negative_origin_is_clipped_to_canvas_edge() {
    let draw = Draw::default();
    let mut colors = ColorContext::default();
    let mut canvas = RgbImage::new(640, 480);

    // 左上角 (-10, 80)，裁剪后应当落在 (0, 80)，宽 50 -> 40
    let predictions = [prediction("zoea", 15.0, 100.0, 50.0, 40.0)];
    draw.render(
      &mut colors,
      &mut canvas,
      &predictions,
      &canvas_transform(),
      true,
    );

    let stroke = COLOR_CHOICES[0];
    assert_eq!(canvas.get_pixel(0, 100), &stroke); // 左边缘在 x=0
    assert_eq!(canvas.get_pixel(39, 100), &stroke); // 右边缘在 x=39 (宽 40)
    assert_eq!(canvas.get_pixel(45, 100), &Rgb([0, 0, 0])); // 裁掉的宽度不再延伸
    assert_eq!(canvas.get_pixel(20, 100), &Rgb([0, 0, 0])); // 框内部未填充
  }

  #[test]
  fn non_normalized_coordinates_go_through_the_transform() {
    let draw = Draw::default();
    let mut colors = ColorContext::default();
    let mut canvas = RgbImage::new(640, 480);

    // 裁剪偏移 100，缩放 0.5: 中心 (300,200) 宽 100 高 80
    // -> 左上角 (250,160) -> 画布 (75,80)，宽 50 高 40
    let transform = CropTransform {
      source_x: 100.0,
      source_y: 0.0,
      source_width: 1280.0,
      source_height: 960.0,
      dest_width: 640,
      dest_height: 480,
      scaling_ratio: 0.5,
    };
    let predictions = [prediction("zoea", 300.0, 200.0, 100.0, 80.0)];
    draw.render(&mut colors, &mut canvas, &predictions, &transform, false);

    let stroke = COLOR_CHOICES[0];
    assert_eq!(canvas.get_pixel(75, 100), &stroke); // 左边缘
    assert_eq!(canvas.get_pixel(124, 100), &stroke); // 右边缘 (75 + 50 - 1)
    assert_eq!(canvas.get_pixel(130, 100), &Rgb([0, 0, 0]));
  }

  #[test]
  fn label_background_sits_above_the_box() {
    let draw = Draw::default();
    let mut colors = ColorContext::default();
    let mut canvas = RgbImage::new(640, 480);

    let predictions = [prediction("zoea", 320.0, 240.0, 100.0, 100.0)];
    draw.render(
      &mut colors,
      &mut canvas,
      &predictions,
      &canvas_transform(),
      true,
    );

    // 框顶在 y=190，标签底色占满其上方 30 像素
    let stroke = COLOR_CHOICES[0];
    assert_eq!(canvas.get_pixel(270, 165), &stroke);
    assert_eq!(canvas.get_pixel(270, 185), &stroke);
  }
}
