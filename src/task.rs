// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/task.rs - 会话编排
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  crop::{CANVAS_HEIGHT, CANVAS_WIDTH, CropTransform},
  input::{DroppedFile, EncodedImage, InputError, MIME_REJECTION_MESSAGE},
  model::{
    DemoModel, DetectError, Model, ModelDescriptor, ModelWrapper, Prediction, find_model,
  },
  output::{ClassCount, ColorContext, Draw, ResultsSink, count_recognized, format_results},
};

/// 演示模式提示
pub const DEMO_MODE_MESSAGE: &str = "Demo mode: showing simulated detections (no API key).";
/// 演示模式下进入图片模式时的提示
pub const DEMO_DROP_HINT: &str = "Demo mode: drop an image to see simulated detection.";

#[derive(Error, Debug)]
pub enum TaskError {
  #[error("输入错误: {0}")]
  Input(#[from] InputError),
  #[error("推理错误: {0}")]
  Detect(#[from] DetectError),
  #[error("未知模型: {0}")]
  UnknownModel(String),
}

/// 模型装载状态，显式区分演示模式和远程推理可用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
  /// 未配置凭据，本地确定性模拟
  Demo,
  /// 凭据就绪，走远程推理
  Ready,
}

/// 会话配置
#[derive(Debug, Clone)]
pub struct SessionConfig {
  pub model_id: String,
  pub api_key: Option<String>,
  pub endpoint: Option<String>,
  pub canvas_width: u32,
  pub canvas_height: u32,
}

impl Default for SessionConfig {
  fn default() -> Self {
    SessionConfig {
      model_id: "zoea-megalopa".to_string(),
      api_key: None,
      endpoint: None,
      canvas_width: CANVAS_WIDTH,
      canvas_height: CANVAS_HEIGHT,
    }
  }
}

/// 一次推理的中间结果，渲染前持有请求序号
pub struct InferenceOutcome {
  ticket: u64,
  transform: CropTransform,
  canvas: RgbImage,
  predictions: Vec<Prediction>,
}

/// 渲染完成的标注结果
pub struct Annotated {
  pub canvas: RgbImage,
  pub predictions: Vec<Prediction>,
  pub counts: ClassCount,
}

/// 一个标注会话: 当前模型、类别颜色表和请求序号。
///
/// 颜色表随会话存续；请求序号实现后写者胜——晚到的过期推理结果
/// 在渲染前被丢弃，不会盖掉更新的画面。
pub struct Session {
  descriptor: &'static ModelDescriptor,
  model: ModelWrapper,
  status: ModelStatus,
  api_key: Option<String>,
  endpoint: Option<String>,
  canvas_width: u32,
  canvas_height: u32,
  draw: Draw,
  colors: ColorContext,
  generation: AtomicU64,
}

impl Session {
  pub fn new(config: SessionConfig) -> Result<Self, TaskError> {
    let descriptor = find_model(&config.model_id)
      .ok_or_else(|| TaskError::UnknownModel(config.model_id.clone()))?;
    let (model, status) = make_model(
      descriptor,
      config.api_key.as_deref(),
      config.endpoint.as_deref(),
    );

    info!(
      "会话就绪: 模型 {} v{}, 状态 {:?}",
      descriptor.name, descriptor.version, status
    );

    Ok(Session {
      descriptor,
      model,
      status,
      api_key: config.api_key,
      endpoint: config.endpoint,
      canvas_width: config.canvas_width,
      canvas_height: config.canvas_height,
      draw: Draw::default(),
      colors: ColorContext::default(),
      generation: AtomicU64::new(0),
    })
  }

  pub fn status(&self) -> ModelStatus {
    self.status
  }

  pub fn descriptor(&self) -> &ModelDescriptor {
    self.descriptor
  }

  /// 切换当前模型，返回显式装载状态。未知标识符报错而不是吞掉。
  pub fn switch_model(
    &mut self,
    model_id: &str,
    sink: &mut dyn ResultsSink,
  ) -> Result<ModelStatus, TaskError> {
    let descriptor =
      find_model(model_id).ok_or_else(|| TaskError::UnknownModel(model_id.to_string()))?;
    self.descriptor = descriptor;
    let (model, status) = make_model(descriptor, self.api_key.as_deref(), self.endpoint.as_deref());
    self.model = model;
    self.status = status;

    if self.status == ModelStatus::Demo {
      sink.set_text(DEMO_MODE_MESSAGE);
    }

    Ok(self.status)
  }

  /// 对一个拖放文件做输入门检查、裁剪、编码和推理。
  ///
  /// MIME 类型不被接受时写提示文案并返回 `None`，流程就此打住。
  pub async fn detect(
    &self,
    file: &DroppedFile,
    sink: &mut dyn ResultsSink,
  ) -> Result<Option<InferenceOutcome>, TaskError> {
    if !file.is_supported_image() {
      warn!("拒绝不支持的输入类型: {} ({})", file.mime, file.name);
      sink.set_text(MIME_REJECTION_MESSAGE);
      return Ok(None);
    }

    let image = file.decode()?;
    let (width, height) = image.dimensions();
    let transform = CropTransform::compute(width, height, self.canvas_width, self.canvas_height);
    let canvas = transform.extract(&image);
    let payload = EncodedImage::from_canvas(&canvas)?;

    // 取号后再发请求，渲染时比对
    let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    debug!("推理请求 {} ({}x{})", ticket, width, height);
    let predictions = self.model.infer(&payload).await?;

    Ok(Some(InferenceOutcome {
      ticket,
      transform,
      canvas,
      predictions,
    }))
  }

  /// 渲染一次推理结果。过期结果（序号已被更新的请求超过）被丢弃。
  pub fn render(
    &mut self,
    outcome: InferenceOutcome,
    sink: &mut dyn ResultsSink,
  ) -> Option<Annotated> {
    if outcome.ticket != self.generation.load(Ordering::SeqCst) {
      debug!("丢弃过期推理结果 (请求 {})", outcome.ticket);
      return None;
    }

    let InferenceOutcome {
      transform,
      mut canvas,
      predictions,
      ..
    } = outcome;

    let counts = count_recognized(&predictions);
    sink.set_text(&format_results(counts));

    self
      .draw
      .render(&mut self.colors, &mut canvas, &predictions, &transform, true);

    Some(Annotated {
      canvas,
      predictions,
      counts,
    })
  }

  /// 单张图片的完整流程: 检测后立即渲染。
  pub async fn process_image(
    &mut self,
    file: &DroppedFile,
    sink: &mut dyn ResultsSink,
  ) -> Result<Option<Annotated>, TaskError> {
    match self.detect(file, sink).await? {
      Some(outcome) => Ok(self.render(outcome, sink)),
      None => Ok(None),
    }
  }
}

fn make_model(
  descriptor: &ModelDescriptor,
  api_key: Option<&str>,
  endpoint: Option<&str>,
) -> (ModelWrapper, ModelStatus) {
  #[cfg(feature = "remote_detect")]
  if let Some(key) = api_key {
    let mut model = crate::model::RemoteModel::new(key, descriptor);
    if let Some(endpoint) = endpoint {
      model = model.with_endpoint(endpoint);
    }
    return (ModelWrapper::Remote(model), ModelStatus::Ready);
  }

  #[cfg(not(feature = "remote_detect"))]
  let _ = (descriptor, api_key, endpoint);

  (ModelWrapper::Demo(DemoModel), ModelStatus::Demo)
}
