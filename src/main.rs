use anyhow::Result;
use clap::Parser;
use diffscribe::app::{Scribe, run_app};
use tracing::Level;

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Scribe::parse();
    init_tracing(cli.verbose);

    run_app(cli).await
}
