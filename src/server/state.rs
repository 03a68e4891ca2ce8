use std::sync::Arc;

use crate::cli::server::ServerCommand;
use crate::config::SearchOptions;
use crate::knn::FlatIndex;
use crate::model::Extractor;

/// 应用状态
///
/// 模型和向量库在启动时注入，服务期间不再变化
pub struct AppState {
    /// 特征提取模型
    pub extractor: Extractor,
    /// 暴力扫描索引
    pub index: FlatIndex,
    /// 与索引对齐的图片路径
    pub paths: Vec<String>,
    /// 搜索配置选项
    pub search: SearchOptions,
    /// 静态路由前缀
    pub static_route: String,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(
        extractor: Extractor,
        index: FlatIndex,
        paths: Vec<String>,
        opts: ServerCommand,
    ) -> Arc<Self> {
        Arc::new(AppState {
            extractor,
            index,
            paths,
            search: opts.search,
            static_route: opts.static_route,
        })
    }
}
