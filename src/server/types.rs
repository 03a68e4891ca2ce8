use axum::body::Bytes;
use axum_typed_multipart::TryFromMultipart;
use serde::Serialize;
use utoipa::ToSchema;

/// 上传请求参数
#[derive(TryFromMultipart)]
pub struct UploadRequest {
    pub file: Bytes,
}

/// 上传表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct UploadForm {
    /// 上传的查询图片
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// 搜索响应
#[derive(Debug, Serialize, ToSchema)]
pub struct SimilarImages {
    /// 最相似的数据集图片 URL，按距离升序排列
    pub similar_images: Vec<String>,
}
