use anyhow::Result;
use clap::Parser;

use imsim::Opts;
use imsim::cli::SubCommandExtend;
use imsim::config::SubCommand;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Index(cmd) => cmd.run(&opts).await,
        SubCommand::Search(cmd) => cmd.run(&opts).await,
        SubCommand::Server(cmd) => cmd.run(&opts).await,
    }
}
