use anyhow::{Result, bail};
use ndarray::prelude::*;

/// 一次查询命中的邻居
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f32,
}

/// 向量索引接口
///
/// 查询端只依赖这个接口，之后可以换成近似索引实现而不影响服务契约
pub trait VectorIndex {
    /// 返回与查询向量最近的 k 个邻居，按距离升序排列
    ///
    /// 库中向量不足 k 条时返回全部，查询向量维度与库不一致时报错
    fn search(&self, query: ArrayView1<f32>, k: usize) -> Result<Vec<Neighbor>>;
}

/// 暴力扫描索引：对库中每条向量计算欧氏距离，无任何加速结构
pub struct FlatIndex {
    vectors: Array2<f32>,
}

impl FlatIndex {
    pub fn new(vectors: Array2<f32>) -> Self {
        Self { vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.nrows() == 0
    }
}

impl VectorIndex for FlatIndex {
    fn search(&self, query: ArrayView1<f32>, k: usize) -> Result<Vec<Neighbor>> {
        // 库里的向量文件可能来自另一个模型，维度不一致时直接报错
        if !self.is_empty() && query.len() != self.vectors.ncols() {
            bail!("查询向量维度不匹配: {} != {}", query.len(), self.vectors.ncols());
        }

        let mut neighbors = self
            .vectors
            .outer_iter()
            .enumerate()
            .map(|(index, row)| {
                let diff = &row - &query;
                Neighbor { index, distance: diff.dot(&diff).sqrt() }
            })
            .collect::<Vec<_>>();
        // 距离相同时按索引升序排列，保证结果确定
        neighbors.sort_unstable_by(|a, b| {
            a.distance.total_cmp(&b.distance).then(a.index.cmp(&b.index))
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatIndex {
        FlatIndex::new(array![[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]])
    }

    #[test]
    fn distances_are_non_decreasing() {
        let index = sample_index();
        let result = index.search(array![0.9, 0.1, 0.].view(), 3).unwrap();
        assert_eq!(result.len(), 3);
        for pair in result.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn returns_at_most_k() {
        let index = sample_index();
        assert_eq!(index.search(array![1., 0., 0.].view(), 2).unwrap().len(), 2);
        // 库中向量不足 k 条时返回全部
        assert_eq!(index.search(array![1., 0., 0.].view(), 10).unwrap().len(), 3);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = FlatIndex::new(Array2::zeros((0, 3)));
        assert!(index.search(array![1., 0., 0.].view(), 10).unwrap().is_empty());
    }

    #[test]
    fn mismatched_query_dimension_is_an_error() {
        // 模拟加载了另一个模型留下的向量文件
        let index = FlatIndex::new(Array2::zeros((1, 512)));
        assert!(index.search(array![1., 0., 0.].view(), 10).is_err());
    }

    #[test]
    fn exact_match_ranks_first() {
        let index = sample_index();
        let result = index.search(array![0., 1., 0.].view(), 3).unwrap();
        assert_eq!(result[0].index, 1);
        assert!(result[0].distance < 1e-6);
    }

    #[test]
    fn nearest_vector_wins() {
        // 三张图片 A、B、C，查询向量离 B 最近
        let index = FlatIndex::new(array![
            [1., 0., 0.],  // A
            [0., 1., 0.],  // B
            [0., 0., 1.],  // C
        ]);
        let query = array![0.1, 0.9, 0.1];
        let result = index.search(query.view(), 3).unwrap();
        assert_eq!(result[0].index, 1);
    }

    #[test]
    fn equal_distances_break_ties_by_index() {
        let index = FlatIndex::new(array![[0., 1.], [1., 0.], [0., 1.]]);
        let result = index.search(array![0., 0.].view(), 3).unwrap();
        assert_eq!(result.iter().map(|n| n.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn nan_vectors_sort_last_without_panic() {
        let index = FlatIndex::new(array![[f32::NAN, 0.], [0., 1.]]);
        let result = index.search(array![0., 1.].view(), 2).unwrap();
        assert_eq!(result[0].index, 1);
        assert!(result[1].distance.is_nan());
    }
}
