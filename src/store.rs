use std::fs::File;
use std::io::{BufReader, BufWriter};

use anyhow::{Result, bail};
use ndarray::prelude::*;
use ndarray_npy::{read_npy, write_npy};

use crate::config::ConfDir;

/// 特征向量与图片路径的对齐存储
///
/// 不变量：向量行数等于路径条数，第 i 行向量与第 i 个路径指向同一张图片。
/// 索引阶段一次性构建，服务阶段只读
pub struct VectorStore {
    vectors: Array2<f32>,
    paths: Vec<String>,
}

impl VectorStore {
    pub fn new(dim: usize) -> Self {
        Self { vectors: Array2::zeros((0, dim)), paths: vec![] }
    }

    /// 追加一对向量和路径
    pub fn push(&mut self, vector: ArrayView1<f32>, path: impl Into<String>) -> Result<()> {
        if vector.len() != self.dim() {
            bail!("向量维度不匹配: {} != {}", vector.len(), self.dim());
        }
        self.vectors.push(Axis(0), vector)?;
        self.paths.push(path.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// 向量维度
    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn path(&self, index: usize) -> &str {
        &self.paths[index]
    }

    pub fn vectors(&self) -> ArrayView2<'_, f32> {
        self.vectors.view()
    }

    /// 拆分为向量矩阵和路径清单
    pub fn into_parts(self) -> (Array2<f32>, Vec<String>) {
        (self.vectors, self.paths)
    }

    /// 保存到配置目录
    ///
    /// 向量保存为 npy 格式的二维 float32 数组，路径清单用 bincode 序列化，
    /// 和原始数据集对应关系靠顺序对齐
    pub fn save(&self, conf_dir: &ConfDir) -> Result<()> {
        std::fs::create_dir_all(conf_dir.path())?;
        write_npy(conf_dir.vectors(), &self.vectors)?;
        let file = BufWriter::new(File::create(conf_dir.paths())?);
        bincode::serialize_into(file, &self.paths)?;
        Ok(())
    }

    /// 从配置目录加载，两个文件数量不一致时报错
    pub fn load(conf_dir: &ConfDir) -> Result<Self> {
        let vectors: Array2<f32> = read_npy(conf_dir.vectors())?;
        let file = BufReader::new(File::open(conf_dir.paths())?);
        let paths: Vec<String> = bincode::deserialize_from(file)?;
        if vectors.nrows() != paths.len() {
            bail!("向量与路径数量不一致: {} != {}", vectors.nrows(), paths.len());
        }
        Ok(Self { vectors, paths })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn temp_conf_dir(dir: &tempfile::TempDir) -> ConfDir {
        dir.path().to_str().unwrap().parse().unwrap()
    }

    #[test]
    fn push_checks_dimension() {
        let mut store = VectorStore::new(3);
        store.push(array![1., 0., 0.].view(), "a.jpg").unwrap();
        assert!(store.push(array![1., 0.].view(), "b.jpg").is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let conf_dir = temp_conf_dir(&dir);

        let mut store = VectorStore::new(2);
        store.push(array![1., 0.].view(), "dataset/a.jpg").unwrap();
        store.push(array![0., 1.].view(), "dataset/b.jpg").unwrap();
        store.save(&conf_dir).unwrap();

        let loaded = VectorStore::load(&conf_dir).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.vectors(), store.vectors());
        assert_eq!(loaded.path(0), "dataset/a.jpg");
        assert_eq!(loaded.path(1), "dataset/b.jpg");
    }

    #[test]
    fn load_rejects_count_mismatch() {
        let dir = tempfile::TempDir::new().unwrap();
        let conf_dir = temp_conf_dir(&dir);

        let mut store = VectorStore::new(2);
        store.push(array![1., 0.].view(), "a.jpg").unwrap();
        store.push(array![0., 1.].view(), "b.jpg").unwrap();
        store.save(&conf_dir).unwrap();

        // 路径文件被截断成一条记录
        let paths = vec!["a.jpg".to_string()];
        std::fs::write(conf_dir.paths(), bincode::serialize(&paths).unwrap()).unwrap();

        assert!(VectorStore::load(&conf_dir).is_err());
    }

    #[test]
    fn empty_store_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let conf_dir = temp_conf_dir(&dir);

        VectorStore::new(0).save(&conf_dir).unwrap();
        let loaded = VectorStore::load(&conf_dir).unwrap();
        assert!(loaded.is_empty());
    }
}
