use crate::settings::{Model, Temperature};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Model to start with [possible values: gpt-4o-mini, gpt-4.1-mini, o4-mini]
    #[arg(short, long)]
    pub model: Option<Model>,

    /// Sampling temperature between 0.0 and 1.2
    #[arg(short, long)]
    pub temperature: Option<Temperature>,

    /// Knowledge base file (defaults to data/important_knowledge.txt)
    #[arg(short, long)]
    pub knowledge: Option<PathBuf>,

    /// Start with the knowledge base left out of requests
    #[arg(long)]
    pub no_knowledge: bool,

    /// OpenAI-compatible API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Print debug logs to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
