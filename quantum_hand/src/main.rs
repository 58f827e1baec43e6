//! quantum_hand — interactive entry point.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use quantum_hand::app::run;
use quantum_hand::config::{AppConfig, Args};

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quantum_hand=info,quantum_field=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = AppConfig::from(Args::parse());
    info!(tracker = ?cfg.tracker, width = cfg.width, height = cfg.height, "starting quantum_hand");

    if let Err(e) = run(cfg) {
        error!(error = %e, "quantum_hand failed");
        std::process::exit(1);
    }
}
