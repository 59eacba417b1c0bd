// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/model/remote.rs - 远程推理模型（Detect API）
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use serde::Deserialize;
use tracing::{debug, info};

use crate::{
  input::EncodedImage,
  model::{BBox, DetectError, Model, ModelDescriptor, Prediction},
};

const DEFAULT_DETECT_ENDPOINT: &str = "https://detect.roboflow.com";

/// 请求携带的置信度阈值（百分比）
const DETECT_CONFIDENCE_PERCENT: u32 = 30;

/// 远程推理: 把编码图像 POST 到 Detect API，取回预测列表。
/// 单次请求，失败不重试。
pub struct RemoteModel {
  http: reqwest::Client,
  endpoint: String,
  api_key: String,
  model_id: String,
  version: u32,
}

impl RemoteModel {
  pub fn new(api_key: impl Into<String>, descriptor: &ModelDescriptor) -> Self {
    RemoteModel {
      http: reqwest::Client::new(),
      endpoint: DEFAULT_DETECT_ENDPOINT.to_string(),
      api_key: api_key.into(),
      model_id: descriptor.id.to_string(),
      version: descriptor.version,
    }
  }

  /// 覆盖默认服务地址（联调或自建网关）
  pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.endpoint = endpoint.into();
    self
  }
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
  #[serde(default)]
  predictions: Vec<RawPrediction>,
}

/// Detect API 的单条预测。坐标要么嵌在 bbox 里，要么平铺在顶层。
#[derive(Debug, Deserialize)]
struct RawPrediction {
  class: String,
  confidence: f32,
  #[serde(default)]
  bbox: Option<BBox>,
  #[serde(default)]
  x: Option<f32>,
  #[serde(default)]
  y: Option<f32>,
  #[serde(default)]
  width: Option<f32>,
  #[serde(default)]
  height: Option<f32>,
}

impl RawPrediction {
  /// 统一成嵌套 bbox 的规范形状
  fn normalize(self) -> Prediction {
    let bbox = self.bbox.unwrap_or(BBox {
      x: self.x.unwrap_or(0.0),
      y: self.y.unwrap_or(0.0),
      width: self.width.unwrap_or(0.0),
      height: self.height.unwrap_or(0.0),
    });
    Prediction {
      class: self.class,
      confidence: self.confidence,
      bbox,
    }
  }
}

impl Model for RemoteModel {
  type Input = EncodedImage;
  type Output = Vec<Prediction>;
  type Error = DetectError;

  async fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let url = format!(
      "{}/{}/{}?api_key={}&confidence={}",
      self.endpoint, self.model_id, self.version, self.api_key, DETECT_CONFIDENCE_PERCENT
    );

    // 负载为表单编码的裸 base64，数据 URL 前缀必须剥掉
    let body = format!(
      "imageToUpload={}",
      urlencoding::encode(input.raw_base64())
    );

    info!("远程推理请求: {}/{}", self.model_id, self.version);
    let response = self
      .http
      .post(&url)
      .header(
        reqwest::header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
      )
      .body(body)
      .send()
      .await?
      .error_for_status()?;

    let text = response.text().await?;
    let parsed: DetectResponse = serde_json::from_str(&text)?;
    debug!("远程推理返回 {} 条预测", parsed.predictions.len());

    Ok(
      parsed
        .predictions
        .into_iter()
        .map(RawPrediction::normalize)
        .collect(),
    )
  }
}
