use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;

static CONF_DIR: LazyLock<ConfDir> = LazyLock::new(|| {
    let proj_dirs = ProjectDirs::from("", "", "imsim").expect("failed to get project dir");
    ConfDir { path: proj_dirs.config_dir().to_path_buf() }
});

fn default_conf_dir() -> &'static str {
    CONF_DIR.path().to_str().unwrap()
}

#[derive(Parser, Debug, Clone)]
pub struct ModelOptions {
    /// ONNX 模型文件路径，默认为配置目录下的 resnet50.onnx
    #[arg(short = 'm', long, value_name = "FILE")]
    pub model: Option<PathBuf>,
}

impl ModelOptions {
    /// 返回实际使用的模型路径
    pub fn model_path(&self, conf_dir: &ConfDir) -> PathBuf {
        self.model.clone().unwrap_or_else(|| conf_dir.model())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// 返回的相似图片数量
    #[arg(long, value_name = "COUNT", default_value_t = 10)]
    pub count: usize,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "imsim", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// imsim 配置文件目录
    #[arg(short, long, default_value = default_conf_dir())]
    pub conf_dir: ConfDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 扫描数据集目录，为每张图片提取特征向量
    Index(IndexCommand),
    /// 在已建立的索引中搜索图片
    Search(SearchCommand),
    /// 启动 HTTP 搜索服务
    Server(ServerCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回向量文件的路径
    pub fn vectors(&self) -> PathBuf {
        self.path.join("vectors.npy")
    }

    /// 返回路径清单文件的路径
    pub fn paths(&self) -> PathBuf {
        self.path.join("paths.bin")
    }

    /// 返回默认模型文件的路径
    pub fn model(&self) -> PathBuf {
        self.path.join("resnet50.onnx")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}
