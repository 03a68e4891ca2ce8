use std::path::Path;

use anyhow::Result;
use image::DynamicImage;
use image::imageops::FilterType;
use log::info;
use ndarray::prelude::*;
use ort::inputs;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;

/// 模型输入边长
pub const INPUT_SIZE: u32 = 224;

/// ResNet-50 在 ImageNet 上训练时使用的 BGR 通道均值
const CHANNEL_MEAN_BGR: [f32; 3] = [103.939, 116.779, 123.68];

/// 将图片转换为模型输入张量
///
/// 输出形状固定为 (1, 224, 224, 3)：缩放到 224x224、强制三通道、
/// 通道翻转为 BGR 并减去 ImageNet 均值
pub fn preprocess(img: &DynamicImage) -> Array4<f32> {
    let img = img.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom).to_rgb8();
    let size = INPUT_SIZE as usize;
    let mut input = Array4::zeros((1, size, size, 3));
    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let (x, y) = (x as usize, y as usize);
        input[[0, y, x, 0]] = b as f32 - CHANNEL_MEAN_BGR[0];
        input[[0, y, x, 1]] = g as f32 - CHANNEL_MEAN_BGR[1];
        input[[0, y, x, 2]] = r as f32 - CHANNEL_MEAN_BGR[2];
    }
    input
}

/// 特征提取模型
///
/// 封装一个去掉分类层、以全局平均池化结尾的 ResNet-50 ONNX 会话。
/// 索引和查询共用这一条提取路径，两边的预处理必须保持一致，
/// 否则库中向量和查询向量不可比较
pub struct Extractor {
    session: Session,
    output_name: String,
}

impl Extractor {
    /// 从 ONNX 文件加载模型
    pub fn load(model: &Path) -> Result<Self> {
        info!("加载模型: {}", model.display());
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(model)?;
        let output_name = session.outputs[0].name.clone();
        Ok(Self { session, output_name })
    }

    /// 提取一张图片的特征向量，结果已做 L2 归一化
    pub fn extract(&self, img: &DynamicImage) -> Result<Array1<f32>> {
        let input = preprocess(img);
        let outputs = self.session.run(inputs![input]?)?;
        let output = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;
        let mut vector: Array1<f32> = output.to_shape(output.len())?.to_owned();
        l2_normalize(&mut vector);
        Ok(vector)
    }

    /// 提取一个图片文件的特征向量
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Array1<f32>> {
        let img = image::open(path)?;
        self.extract(&img)
    }

    /// 提取一段图片字节的特征向量
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<Array1<f32>> {
        let img = image::load_from_memory(bytes)?;
        self.extract(&img)
    }
}

/// 向量除以自身的欧氏范数
///
/// 全零向量保持原样，避免除零产生 NaN
pub fn l2_normalize(vector: &mut Array1<f32>) {
    let norm = vector.dot(vector).sqrt();
    if norm > 0.0 {
        *vector /= norm;
    }
}
