// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/model.rs - 模型
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::EncodedImage;

/// 蚤状幼体
pub const CLASS_ZOEA: &str = "zoea";
/// 大眼幼体
pub const CLASS_MEGALOPA: &str = "megalopa";

/// 检测框，中心点坐标加宽高，画布坐标系
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
  pub x: f32,
  pub y: f32,
  pub width: f32,
  pub height: f32,
}

/// 规范化后的单条预测
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
  pub class: String,
  pub confidence: f32,
  pub bbox: BBox,
}

#[allow(async_fn_in_trait)]
pub trait Model {
  type Input;
  type Output;
  type Error;

  async fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Error, Debug)]
pub enum DetectError {
  #[cfg(feature = "remote_detect")]
  #[error("推理请求错误: {0}")]
  Request(#[from] reqwest::Error),
  #[error("响应解析错误: {0}")]
  Response(#[from] serde_json::Error),
}

mod demo;
pub use self::demo::{DemoModel, hash01};

mod registry;
pub use self::registry::{ModelDescriptor, available_models, find_model};

#[cfg(feature = "remote_detect")]
mod remote;
#[cfg(feature = "remote_detect")]
pub use self::remote::RemoteModel;

pub enum ModelWrapper {
  Demo(DemoModel),
  #[cfg(feature = "remote_detect")]
  Remote(RemoteModel),
}

impl Model for ModelWrapper {
  type Input = EncodedImage;
  type Output = Vec<Prediction>;
  type Error = DetectError;

  async fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    match self {
      ModelWrapper::Demo(model) => model.infer(input).await,
      #[cfg(feature = "remote_detect")]
      ModelWrapper::Remote(model) => model.infer(input).await,
    }
  }
}
