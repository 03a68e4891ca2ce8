use std::sync::LazyLock;

use prometheus::*;

static METRIC_UPLOAD_COUNT: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!("imsim_upload_count", "count of uploaded query images").unwrap()
});

static METRIC_SEARCH_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    register_histogram!(
        "imsim_search_duration",
        "duration of the per-query embed and scan in seconds"
    )
    .unwrap()
});

/// 增加上传图片计数
pub fn inc_upload_count() {
    METRIC_UPLOAD_COUNT.inc();
}

/// 记录单次查询耗时
pub fn observe_search_duration(duration: f32) {
    METRIC_SEARCH_DURATION.observe(duration as f64);
}
