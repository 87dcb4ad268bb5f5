use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use wordle_suggest::engine::{default_worker_count, Engine, EngineConfig, DEFAULT_SHARDS};
use wordle_suggest::server;
use wordle_suggest::wordle::WordLists;

/// Serves next-guess suggestions over an SSE endpoint.
#[derive(Parser, Debug)]
#[command(name = "wordle-suggest-serve", version, about)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Answer word list, one word per line (embedded list when omitted)
    #[arg(long, requires = "guesses")]
    answers: Option<PathBuf>,

    /// Guess word list, one word per line (embedded list when omitted)
    #[arg(long, requires = "answers")]
    guesses: Option<PathBuf>,

    /// Worker threads for scoring (defaults to cores minus one, capped at 8)
    #[arg(long)]
    workers: Option<usize>,

    /// Shards a request's candidate list is split into
    #[arg(long, default_value_t = DEFAULT_SHARDS)]
    shards: usize,

    /// Per-request wall clock budget, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let lists = match load_lists(&args) {
        Ok(lists) => lists,
        Err(err) => {
            log::error!("failed to load word lists: {}", err);
            process::exit(1);
        }
    };

    let config = EngineConfig {
        workers: args.workers.unwrap_or_else(default_worker_count),
        shards: args.shards,
        timeout: Duration::from_secs(args.timeout_secs),
    };

    let engine = match Engine::from_lists(lists, config) {
        Ok(engine) => Arc::new(engine),
        Err(err) => {
            log::error!("failed to build engine: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = server::run(engine, args.bind).await {
        log::error!("server error: {}", err);
        process::exit(1);
    }
}

fn load_lists(args: &Args) -> Result<WordLists, wordle_suggest::wordle::LoadDataErr> {
    match (&args.answers, &args.guesses) {
        (Some(answers), Some(guesses)) => WordLists::from_files(answers, guesses),
        _ => WordLists::embedded(),
    }
}
