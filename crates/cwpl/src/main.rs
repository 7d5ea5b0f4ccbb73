// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! cwpl: monthly work report generator
//!
//! This binary lists the commits of the watched repositories written by the
//! configured authors and renders them into a report.

use clap::Parser;
use cwpl::config::Config;
use cwpl_log::GitCli;
use tracing::debug;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so reports can be piped
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    debug!(?config, "Starting cwpl");

    let git = GitCli::new().with_timeout(config.timeout());
    let today = chrono::Local::now().date_naive();
    let stdout = std::io::stdout();
    cwpl::app::execute(&config, &git, today, &mut stdout.lock())
}
