use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;
use log::info;
use walkdir::WalkDir;

use crate::cli::SubCommandExtend;
use crate::config::{ModelOptions, Opts};
use crate::model::Extractor;
use crate::store::VectorStore;
use crate::utils::pb_style;

#[derive(Parser, Debug, Clone)]
pub struct IndexCommand {
    #[command(flatten)]
    pub model: ModelOptions,
    /// 数据集目录，仅扫描第一层
    pub path: PathBuf,
}

impl SubCommandExtend for IndexCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let extractor = Extractor::load(&self.model.model_path(&opts.conf_dir))?;

        // 不过滤后缀，目录里任何无法解码的文件都会让整次索引失败
        let entries = WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect::<Vec<_>>();
        info!("扫描完成，共 {} 个文件", entries.len());

        let pb = ProgressBar::new(entries.len() as u64).with_style(pb_style());
        let mut store: Option<VectorStore> = None;
        for entry in entries {
            let vector = extractor.extract_file(&entry)?;
            let store = store.get_or_insert_with(|| VectorStore::new(vector.len()));
            store.push(vector.view(), entry.to_string_lossy())?;
            pb.set_message(entry.display().to_string());
            pb.inc(1);
        }
        pb.finish_with_message("特征提取完成");

        let store = store.unwrap_or_else(|| VectorStore::new(0));
        store.save(&opts.conf_dir)?;
        info!("索引完成，共 {} 张图片", store.len());

        Ok(())
    }
}
