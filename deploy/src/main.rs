mod command_line;
mod contracts;
mod deploy;
mod utils;

use anyhow::Result;
use clap::Parser;
use command_line::CommandLine;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries only the deployed address; progress goes to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    CommandLine::parse().execute().await
}
