// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/input.rs - 图像输入
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

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use image::RgbImage;
use thiserror::Error;

mod read_image_file;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

/// 拖放输入允许的 MIME 类型
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// MIME 类型被拒绝时写入结果栏的提示文案
pub const MIME_REJECTION_MESSAGE: &str = "Please drop a PNG/JPG image.";

/// 数据 URL 前缀
const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// 种子取自负载头尾各 200 字符
const SEED_SLICE_LEN: usize = 200;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("I/O error: {0}")]
  IoError(std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(image::ImageError),
}

impl From<std::io::Error> for InputError {
  fn from(err: std::io::Error) -> Self {
    InputError::IoError(err)
  }
}

impl From<image::ImageError> for InputError {
  fn from(err: image::ImageError) -> Self {
    InputError::ImageLoadError(err)
  }
}

/// 一次拖放得到的文件: 名称、MIME 类型和原始字节。
#[derive(Debug, Clone)]
pub struct DroppedFile {
  pub name: String,
  pub mime: String,
  pub bytes: Vec<u8>,
}

impl DroppedFile {
  /// 输入门: 只接受 PNG/JPEG
  pub fn is_supported_image(&self) -> bool {
    ALLOWED_MIME_TYPES.contains(&self.mime.as_str())
  }

  /// 解码为 RGB 图像
  pub fn decode(&self) -> Result<RgbImage, InputError> {
    let image = image::load_from_memory(&self.bytes)?;
    Ok(image.into())
  }
}

/// 按文件扩展名推断 MIME 类型
pub fn mime_for_path(path: &Path) -> &'static str {
  match path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| ext.to_ascii_lowercase())
    .as_deref()
  {
    Some("png") => "image/png",
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("gif") => "image/gif",
    Some("bmp") => "image/bmp",
    Some("webp") => "image/webp",
    _ => "application/octet-stream",
  }
}

/// 归一化画布编码成的推理负载: base64 JPEG 数据 URL。
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
  data_url: String,
}

impl EncodedImage {
  /// 把画布图像编码为 JPEG 并包成数据 URL
  pub fn from_canvas(canvas: &RgbImage) -> Result<Self, InputError> {
    let mut jpeg = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)?;

    let payload = base64::engine::general_purpose::STANDARD.encode(&jpeg);
    Ok(EncodedImage {
      data_url: format!("{DATA_URL_PREFIX}{payload}"),
    })
  }

  /// 测试和回放用: 直接以既有数据 URL 构造
  pub fn from_data_url(data_url: impl Into<String>) -> Self {
    EncodedImage {
      data_url: data_url.into(),
    }
  }

  pub fn as_data_url(&self) -> &str {
    &self.data_url
  }

  /// 去掉数据 URL 前缀后的裸 base64
  pub fn raw_base64(&self) -> &str {
    match self.data_url.split_once(',') {
      Some((_, raw)) => raw,
      None => &self.data_url,
    }
  }

  /// 推理种子: 负载头尾各取一段拼接。不同图像即使共享编码头部，
  /// 尾部切片也会让种子互不相同。
  pub fn seed(&self) -> String {
    // 数据 URL 为纯 ASCII，按字节切片安全
    let payload = &self.data_url;
    let head_end = payload.len().min(SEED_SLICE_LEN);
    let tail_start = payload.len().saturating_sub(SEED_SLICE_LEN);
    format!("{}|{}", &payload[..head_end], &payload[tail_start..])
  }
}
