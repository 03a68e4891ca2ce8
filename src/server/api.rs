use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum_typed_multipart::TypedMultipart;
use log::info;
use tokio::task::block_in_place;

use super::error::Result;
use super::state::AppState;
use super::types::*;
use crate::knn::VectorIndex;
use crate::metrics;

/// 搜索与上传图片最相似的数据集图片
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = SimilarImages),
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    data: TypedMultipart<UploadRequest>,
) -> Result<Json<SimilarImages>> {
    let start = Instant::now();

    info!("正在搜索上传图片");

    // 上传图片只在内存中处理，提取完向量即丢弃
    let vector = block_in_place(|| state.extractor.extract_bytes(&data.file))?;
    let neighbors = state.index.search(vector.view(), state.search.count)?;

    let similar_images = neighbors
        .into_iter()
        .map(|n| to_static_url(&state.static_route, &state.paths[n.index]))
        .collect::<Vec<_>>();

    metrics::inc_upload_count();
    metrics::observe_search_duration(start.elapsed().as_secs_f32());

    Ok(Json(SimilarImages { similar_images }))
}

/// 将库中路径转换为静态路由下的 URL
///
/// 只保留文件名部分，取不到文件名时退回原始路径
fn to_static_url(static_route: &str, path: &str) -> String {
    let name = Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    format!("{}/{}", static_route, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_url_strips_to_filename() {
        assert_eq!(to_static_url("/dataset", "dataset/cats/a.jpg"), "/dataset/a.jpg");
    }

    #[test]
    fn static_url_keeps_bare_filename() {
        assert_eq!(to_static_url("/dataset", "b.jpg"), "/dataset/b.jpg");
    }

    #[test]
    fn static_url_falls_back_to_raw_path() {
        assert_eq!(to_static_url("/dataset", ".."), "/dataset/..");
    }
}
