// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::Path;

use thiserror::Error;
use tracing::error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::{DroppedFile, mime_for_path},
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(std::io::Error),
}

impl From<std::io::Error> for ImageFileInputError {
  fn from(err: std::io::Error) -> Self {
    ImageFileInputError::IoError(err)
  }
}

/// 从本地文件模拟一次拖放输入，URL 方案为 `image:`。
pub struct ImageFileInput {
  file: Option<DroppedFile>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = Path::new(url.path());
    let bytes = std::fs::read(path)?;
    let name = path
      .file_name()
      .and_then(|name| name.to_str())
      .unwrap_or("dropped")
      .to_string();
    let mime = mime_for_path(path).to_string();

    Ok(ImageFileInput {
      file: Some(DroppedFile { name, mime, bytes }),
    })
  }
}

impl Iterator for ImageFileInput {
  type Item = DroppedFile;

  fn next(&mut self) -> Option<Self::Item> {
    self.file.take()
  }
}
