mod cmd;
mod config;
mod modules;
mod types;

use crate::{
    cmd::{
        migrate::{self, MigrateArgs},
        server::{self, ServerArgs},
        sync::{self, SyncArgs},
    },
    config::Settings,
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{env, str::FromStr};
use tokio::runtime::Builder;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{self, time::OffsetTime},
};

#[derive(Debug, Parser)]
#[command(name = "medal_tracker")]
#[command(about = "Winter Games fantasy medal tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply database migrations.
    Migrate(MigrateArgs),
    /// Serve the HTTP API and run the periodic medal sync.
    Server(ServerArgs),
    /// Run one medal sync and exit.
    Sync(SyncArgs),
}

fn init_tracing() {
    let level = env::var("RUST_LOG")
        .ok()
        .and_then(|level| LevelFilter::from_str(&level).ok())
        .unwrap_or(LevelFilter::INFO);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    // Must run before the runtime spawns threads or the local offset cannot be read.
    let timer = OffsetTime::local_rfc_3339().expect("couldn't determine the local UTC offset");
    let format = fmt::format()
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_timer(timer);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(format)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");
}

fn main() {
    dotenv().ok();
    init_tracing();

    let settings = Settings::from_env();
    let runtime = Builder::new_multi_thread().enable_all().build().unwrap();

    let result = match Cli::parse().command {
        Commands::Migrate(args) => runtime.block_on(migrate::run(args, settings)),
        Commands::Server(args) => runtime.block_on(server::run(args, settings)),
        Commands::Sync(args) => runtime.block_on(sync::run(args, settings)),
    };
    if let Err(e) = result {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
