// 该文件是 Xiemiao （蟹苗） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use clap::Parser;
use url::Url;

/// Xiemiao 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图像（拖放文件的等价物）
  /// 支持格式: image:/path/to/picture.{png,jpg,jpeg}
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 标注结果输出路径
  /// 支持格式: image:/path/to/annotated.{png,jpg}
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  /// 模型标识符（见注册表）
  #[arg(long, default_value = "zoea-megalopa", value_name = "MODEL")]
  pub model: String,

  /// Detect API 密钥；不提供时回落到 DETECT_API_KEY 环境变量，
  /// 两者都缺省则进入演示模式
  #[arg(long, value_name = "KEY")]
  pub api_key: Option<String>,

  /// 推理服务地址（默认为官方 Detect API）
  #[arg(long, value_name = "URL")]
  pub endpoint: Option<String>,

  /// 画布宽度
  #[arg(long, default_value = "640", value_name = "WIDTH")]
  pub canvas_width: u32,

  /// 画布高度
  #[arg(long, default_value = "480", value_name = "HEIGHT")]
  pub canvas_height: u32,
}
