use clap::Parser;
use kroki_blocks::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    // CLI --log-level flag takes precedence over RUST_LOG.
    kroki_blocks::debug::init_log_bridge(cli.log_level.map(cli::LogLevelArg::to_level_filter));

    log::debug!("Starting kroki-blocks {}", kroki_blocks::VERSION);

    if let Err(e) = cli::run(cli) {
        eprintln!("kroki-blocks: error: {e:#}");
        std::process::exit(1);
    }
}
