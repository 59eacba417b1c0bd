// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/output.rs - 输出定义
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use tracing::info;

use crate::model::{CLASS_MEGALOPA, CLASS_ZOEA, Prediction};

pub trait Render<Canvas, Output>: Sized {
  type Error;
  fn render_result(&self, canvas: &Canvas, result: &Output) -> Result<(), Self::Error>;
}

pub mod draw;
pub use self::draw::{ColorContext, Draw};

mod save_image_file;
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

/// 结果文本栏。页面上是一块文本区域，这里抽象成一个接收器:
/// 要么显示识别计数，要么显示状态消息。缺省实现为空操作。
pub trait ResultsSink {
  fn set_text(&mut self, text: &str);
}

/// 内存结果栏，测试和无界面场合使用
#[derive(Debug, Default, Clone)]
pub struct TextSink {
  text: String,
}

impl TextSink {
  pub fn text(&self) -> &str {
    &self.text
  }
}

impl ResultsSink for TextSink {
  fn set_text(&mut self, text: &str) {
    self.text = text.to_string();
  }
}

/// 日志结果栏，命令行使用
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ResultsSink for LogSink {
  fn set_text(&mut self, text: &str) {
    info!("{}", text);
  }
}

/// 两个已识别类别的计数。其余类别不计数，但仍会被渲染。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClassCount {
  pub zoea: usize,
  pub megalopa: usize,
}

pub fn count_recognized(predictions: &[Prediction]) -> ClassCount {
  let mut count = ClassCount::default();
  for prediction in predictions {
    match prediction.class.as_str() {
      CLASS_ZOEA => count.zoea += 1,
      CLASS_MEGALOPA => count.megalopa += 1,
      _ => {}
    }
  }
  count
}

pub fn format_results(count: ClassCount) -> String {
  format!(
    "Results: Zoea = {} | Megalopa = {}",
    count.zoea, count.megalopa
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::BBox;

  fn prediction(class: &str) -> Prediction {
    Prediction {
      class: class.to_string(),
      confidence: 0.5,
      bbox: BBox {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
      },
    }
  }

  #[test]
  fn counter_ignores_unrecognized_classes() {
    let predictions = [
      prediction("zoea"),
      prediction("zoea"),
      prediction("megalopa"),
      prediction("barnacle"),
    ];
    let count = count_recognized(&predictions);
    assert_eq!(count, ClassCount { zoea: 2, megalopa: 1 });
  }

  #[test]
  fn results_line_matches_display_format() {
    let count = ClassCount { zoea: 7, megalopa: 0 };
    assert_eq!(format_results(count), "Results: Zoea = 7 | Megalopa = 0");
  }

  #[test]
  fn text_sink_keeps_latest_message() {
    let mut sink = TextSink::default();
    sink.set_text("first");
    sink.set_text("second");
    assert_eq!(sink.text(), "second");
  }
}
