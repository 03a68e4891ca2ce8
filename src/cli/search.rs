use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::debug;
use tokio::task::block_in_place;

use crate::cli::SubCommandExtend;
use crate::config::{ModelOptions, Opts, SearchOptions};
use crate::knn::{FlatIndex, VectorIndex};
use crate::model::Extractor;
use crate::store::VectorStore;

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    pub model: ModelOptions,
    #[command(flatten)]
    pub search: SearchOptions,
    /// 被搜索的图片路径
    pub image: PathBuf,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value = "table")]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let extractor = Extractor::load(&self.model.model_path(&opts.conf_dir))?;
        let vector = block_in_place(|| extractor.extract_file(&self.image))?;

        let store = VectorStore::load(&opts.conf_dir)?;
        debug!("加载了 {} 条向量", store.len());

        let (vectors, paths) = store.into_parts();
        let index = FlatIndex::new(vectors);

        let result = index
            .search(vector.view(), self.search.count)?
            .into_iter()
            .map(|n| (n.distance, paths[n.index].clone()))
            .collect::<Vec<_>>();

        print_result(&result, self)
    }
}

fn print_result(result: &[(f32, String)], opts: &SearchCommand) -> Result<()> {
    match opts.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?)
        }
        OutputFormat::Table => {
            for (distance, path) in result {
                println!("{:.4}\t{}", distance, path);
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone)]
pub enum OutputFormat {
    Json,
    Table,
}
