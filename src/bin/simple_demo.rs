// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/bin/simple_demo.rs - 演示模式测试代码
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use anyhow::Result;
use clap::Parser;
use url::Url;

use tracing::info;
use xiemiao::{
  FromUrl,
  input::ImageFileInput,
  output::{Render, SaveImageFileOutput, TextSink},
  task::{Session, SessionConfig},
};

/// Xiemiao 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let input = ImageFileInput::from_url(&args.input)?;
  let output = SaveImageFileOutput::from_url(&args.output)?;

  // 不带凭据，永远走演示模式
  let mut session = Session::new(SessionConfig::default())?;
  let mut sink = TextSink::default();

  info!("开始推理...");
  let now = std::time::Instant::now();
  for file in input {
    if let Some(annotated) = session.process_image(&file, &mut sink).await? {
      info!("推理完成，耗时: {:.2?}", now.elapsed());
      output.render_result(&annotated.canvas, &annotated.predictions)?;
    }
  }
  info!("{}", sink.text());

  Ok(())
}
