// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/model/demo.rs - 演示模式模型（确定性伪预测）
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use tracing::debug;

use crate::{
  input::EncodedImage,
  model::{BBox, CLASS_MEGALOPA, CLASS_ZOEA, DetectError, Model, Prediction},
};

// FNV-1a 32 位参数
const FNV_OFFSET_BASIS: u32 = 2166136261;
const FNV_PRIME: u32 = 16777619;

// 框数量: zoea 6..=15, megalopa 0..=3
const DEMO_ZOEA_COUNT_BASE: usize = 6;
const DEMO_ZOEA_COUNT_SPAN: f64 = 10.0;
const DEMO_MEGALOPA_COUNT_SPAN: f64 = 4.0;

// 子种子偏移量，保证两类同下标的框取到独立随机值
const DEMO_SEED_OFFSET_ZOEA: u32 = 1;
const DEMO_SEED_OFFSET_MEGALOPA: u32 = 2;

// 画布内框几何参数
const DEMO_BOX_X_BASE: f64 = 60.0;
const DEMO_BOX_X_SPAN: f64 = 520.0;
const DEMO_BOX_Y_BASE: f64 = 60.0;
const DEMO_BOX_Y_SPAN: f64 = 360.0;
const DEMO_BOX_W_BASE: f64 = 30.0;
const DEMO_BOX_W_SPAN: f64 = 60.0;
const DEMO_BOX_H_BASE: f64 = 20.0;
const DEMO_BOX_H_SPAN: f64 = 50.0;
const DEMO_CONFIDENCE_BASE: f64 = 0.45;
const DEMO_CONFIDENCE_SPAN: f64 = 0.45;

/// 把任意字符串散列为 [0,1) 内的浮点数。
///
/// FNV-1a 32 位累加，结果按 32 位整数范围折算为小数。纯函数，
/// 同一输入永远得到同一输出。
pub fn hash01(seed: &str) -> f64 {
  let mut h = FNV_OFFSET_BASIS;
  for c in seed.chars() {
    h ^= c as u32;
    h = h.wrapping_mul(FNV_PRIME);
  }
  h as f64 / u32::MAX as f64
}

/// 演示模式模型: 不做任何图像分析，由种子确定性地合成一组看起来
/// 合理的检测框。无网络访问。
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoModel;

impl DemoModel {
  /// 由种子生成预测列表。同一种子两次调用输出逐位一致。
  pub fn generate(&self, seed: &str) -> Vec<Prediction> {
    let r = hash01(seed);

    let zoea_count = DEMO_ZOEA_COUNT_BASE + (r * DEMO_ZOEA_COUNT_SPAN).floor() as usize;
    let megalopa_count = ((1.0 - r) * DEMO_MEGALOPA_COUNT_SPAN).floor() as usize;
    debug!("演示预测: zoea = {}, megalopa = {}", zoea_count, megalopa_count);

    let mut predictions = Vec::with_capacity(zoea_count + megalopa_count);
    push_boxes(
      &mut predictions,
      seed,
      CLASS_ZOEA,
      zoea_count,
      DEMO_SEED_OFFSET_ZOEA,
    );
    push_boxes(
      &mut predictions,
      seed,
      CLASS_MEGALOPA,
      megalopa_count,
      DEMO_SEED_OFFSET_MEGALOPA,
    );

    predictions
  }
}

fn push_boxes(out: &mut Vec<Prediction>, seed: &str, class: &str, count: usize, offset: u32) {
  for index in 0..count {
    // 子种子混入原种子、类别、下标和类别偏移量
    let rr = hash01(&format!("{seed}-{class}-{index}-{offset}"));
    out.push(Prediction {
      class: class.to_string(),
      confidence: (DEMO_CONFIDENCE_BASE + rr * DEMO_CONFIDENCE_SPAN) as f32,
      bbox: BBox {
        x: (DEMO_BOX_X_BASE + rr * DEMO_BOX_X_SPAN) as f32,
        y: (DEMO_BOX_Y_BASE + (1.0 - rr) * DEMO_BOX_Y_SPAN) as f32,
        width: (DEMO_BOX_W_BASE + rr * DEMO_BOX_W_SPAN) as f32,
        height: (DEMO_BOX_H_BASE + (1.0 - rr) * DEMO_BOX_H_SPAN) as f32,
      },
    });
  }
}

impl Model for DemoModel {
  type Input = EncodedImage;
  type Output = Vec<Prediction>;
  type Error = DetectError;

  async fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    Ok(self.generate(&input.seed()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash01_is_deterministic_and_in_unit_range() {
    for seed in ["", "a", "abc", "蟹苗", "data:image/jpeg;base64,/9j/4AAQ"] {
      let first = hash01(seed);
      let second = hash01(seed);
      assert_eq!(first.to_bits(), second.to_bits());
      assert!((0.0..1.0).contains(&first), "hash01({seed:?}) = {first}");
    }
  }

  #[test]
  fn hash01_separates_seeds_sharing_a_long_prefix() {
    // 编码图像常见情形: 头部字节相同，只有尾部不同
    let prefix = "data:image/jpeg;base64,".repeat(8);
    let mut values = Vec::new();
    for suffix in 0..64 {
      values.push(hash01(&format!("{prefix}{suffix:02}")).to_bits());
    }
    values.sort_unstable();
    values.dedup();
    assert_eq!(values.len(), 64);
  }

  #[test]
  fn generate_is_idempotent() {
    let model = DemoModel;
    let seed = "abcd|wxyz";
    assert_eq!(model.generate(seed), model.generate(seed));
  }

  #[test]
  fn counts_stay_in_documented_ranges() {
    let model = DemoModel;
    for i in 0..128 {
      let seed = format!("seed-{i}");
      let predictions = model.generate(&seed);
      let zoea = predictions.iter().filter(|p| p.class == CLASS_ZOEA).count();
      let megalopa = predictions
        .iter()
        .filter(|p| p.class == CLASS_MEGALOPA)
        .count();
      assert!((6..=15).contains(&zoea), "zoea = {zoea} for {seed}");
      assert!(megalopa <= 3, "megalopa = {megalopa} for {seed}");
      assert_eq!(predictions.len(), zoea + megalopa);
    }
  }

  #[test]
  fn boxes_follow_the_seeded_geometry() {
    let model = DemoModel;
    let seed = "geometry";
    for prediction in model.generate(seed) {
      let b = prediction.bbox;
      assert!((60.0..=580.0).contains(&b.x));
      assert!((60.0..=420.0).contains(&b.y));
      assert!((30.0..=90.0).contains(&b.width));
      assert!((20.0..=70.0).contains(&b.height));
      assert!((0.45..=0.9).contains(&prediction.confidence));
    }

    // 第一个 zoea 框由子种子 "<seed>-zoea-0-1" 决定
    let rr = hash01(&format!("{seed}-zoea-0-1"));
    let first = &model.generate(seed)[0];
    assert_eq!(first.bbox.x, (60.0 + rr * 520.0) as f32);
    assert_eq!(first.bbox.height, (20.0 + (1.0 - rr) * 50.0) as f32);
  }
}
