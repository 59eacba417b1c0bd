// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use xiemiao::{
  FromUrl,
  input::ImageFileInput,
  output::{LogSink, Render, ResultsSink, SaveImageFileOutput},
  task::{DEMO_DROP_HINT, ModelStatus, Session, SessionConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  let api_key = args
    .api_key
    .clone()
    .or_else(|| std::env::var("DETECT_API_KEY").ok());

  let mut session = Session::new(SessionConfig {
    model_id: args.model.clone(),
    api_key,
    endpoint: args.endpoint.clone(),
    canvas_width: args.canvas_width,
    canvas_height: args.canvas_height,
  })?;

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);
  info!(
    "当前模型: {} v{} ({}x{})",
    session.descriptor().name,
    session.descriptor().version,
    args.canvas_width,
    args.canvas_height
  );

  let mut sink = LogSink;
  if session.status() == ModelStatus::Demo {
    sink.set_text(DEMO_DROP_HINT);
  }

  let input = ImageFileInput::from_url(&args.input)?;
  let output = SaveImageFileOutput::from_url(&args.output)?;

  for file in input {
    info!("处理图像: {}", file.name);
    let now = std::time::Instant::now();
    if let Some(annotated) = session.process_image(&file, &mut sink).await? {
      info!("推理完成，耗时: {:.2?}", now.elapsed());
      output.render_result(&annotated.canvas, &annotated.predictions)?;
      info!(
        "检测结果: Zoea = {} | Megalopa = {}",
        annotated.counts.zoea, annotated.counts.megalopa
      );
    }
  }

  Ok(())
}
