pub mod cli;
pub mod config;
pub mod knn;
mod metrics;
pub mod model;
mod server;
pub mod store;
pub mod utils;

pub use config::Opts;
pub use model::Extractor;
pub use store::VectorStore;
