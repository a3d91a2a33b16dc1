use clap::Parser;
use log::{error, info};
use std::process::ExitCode;
use uamask::cli::Cli;
use uamask::config::Config;
use uamask::network::processing;
use uamask::network::NfQueue;
use uamask::{shutdown, stats, Result, UamaskError};

fn main() -> ExitCode {
    init_logger();

    let cli = Cli::parse();

    info!("uamask {} starting up", uamask::cli::VERSION);

    if let Err(e) = require_root() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if config.has_custom_agent() {
        info!("using custom User-Agent from {:?}", config.source());
    } else {
        info!("no custom User-Agent configured, using the built-in default");
    }

    if let Err(e) = shutdown::install_handlers() {
        error!("failed to install signal handlers: {e}");
        return ExitCode::FAILURE;
    }

    let mut queue = match NfQueue::open(config.queue_num(), false) {
        Ok(queue) => queue,
        Err(e) => {
            error!("failed to open packet queue {}: {e}", config.queue_num());
            return ExitCode::FAILURE;
        }
    };

    let result = processing::run(&mut queue, &config, shutdown::flag(), stats::global());
    queue.close();

    match result {
        Ok(()) => {
            info!("uamask exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize the daemon logger: info level unless `RUST_LOG` overrides.
fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

/// Binding an NFQUEUE needs CAP_NET_ADMIN; effective uid 0 is the check
/// the init scripts rely on.
fn require_root() -> Result<()> {
    if unsafe { libc::geteuid() } != 0 {
        return Err(UamaskError::Privilege(
            "uamask must run as root to bind the kernel packet queue".into(),
        ));
    }
    Ok(())
}
