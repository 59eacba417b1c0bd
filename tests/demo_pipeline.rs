//! 演示模式端到端冒烟测试: 不配置凭据时整条流水线只在本地跑，
//! 预测数量与种子散列推出的数量一致。

use std::io::Cursor;

use image::RgbImage;

use xiemiao::{
  crop::CropTransform,
  input::{DroppedFile, EncodedImage},
  model::{DemoModel, Model, hash01},
  output::TextSink,
  task::{Session, SessionConfig},
};

fn dropped_png(width: u32, height: u32) -> DroppedFile {
  let image = RgbImage::from_fn(width, height, |x, y| {
    image::Rgb([((x + y) % 256) as u8, (x % 256) as u8, (y % 256) as u8])
  });
  let mut bytes = Vec::new();
  image
    .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
    .unwrap();
  DroppedFile {
    name: "sample.png".to_string(),
    mime: "image/png".to_string(),
    bytes,
  }
}

#[tokio::test]
async fn demo_mode_end_to_end_matches_the_seeded_counts() {
  let file = dropped_png(1000, 500);

  // 复算会话内部会得到的种子: 同一个裁剪变换既给编码也给渲染
  let decoded = file.decode().unwrap();
  let transform = CropTransform::compute(decoded.width(), decoded.height(), 640, 480);
  let canvas = transform.extract(&decoded);
  let payload = EncodedImage::from_canvas(&canvas).unwrap();
  let r = hash01(&payload.seed());
  let expected = 6 + (r * 10.0).floor() as usize + ((1.0 - r) * 4.0).floor() as usize;

  let mut session = Session::new(SessionConfig::default()).unwrap();
  let mut sink = TextSink::default();
  let annotated = session
    .process_image(&file, &mut sink)
    .await
    .unwrap()
    .unwrap();

  assert_eq!(annotated.predictions.len(), expected);
  assert_eq!(annotated.canvas.dimensions(), (640, 480));
  assert_eq!(
    annotated.counts.zoea + annotated.counts.megalopa,
    annotated.predictions.len()
  );
  assert!(sink.text().starts_with("Results: Zoea = "));
}

#[tokio::test]
async fn demo_infer_agrees_with_generate_on_a_fixed_payload() {
  // 头尾切片拼出的固定种子，约 400 字符
  let head = "abcdefghij".repeat(30);
  let tail = "qrstuvwxyz".repeat(30);
  let payload = EncodedImage::from_data_url(format!("{head}{tail}"));

  let model = DemoModel;
  let via_infer = model.infer(&payload).await.unwrap();
  assert_eq!(via_infer, model.generate(&payload.seed()));

  let r = hash01(&payload.seed());
  let zoea = 6 + (r * 10.0).floor() as usize;
  let megalopa = ((1.0 - r) * 4.0).floor() as usize;
  assert_eq!(via_infer.len(), zoea + megalopa);
}
