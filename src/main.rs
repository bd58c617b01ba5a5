//! Collector binary.
//!
//! Starts the trace collector with configuration from the TOML file named by
//! `TRACELOG_CONFIG`, or defaults if unset.
//!
//! # Startup
//!
//! 1. **Configure**: Load `Config`, initialize logging
//! 2. **Bootstrap**: Load the bearer token from `<data_dir>/.token`, or generate
//!    and persist one and print it once for the operator
//! 3. **Serve**: Accept submissions on `bind_addr` until Ctrl-C

#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::sync::Arc;

use tracelog::collector::{self, AuthToken, CollectorState, TokenOrigin};
use tracelog::infrastructure::{token_path, traces_dir};
use tracelog::storage::JsonTraceStore;
use tracelog::{Config, Result};

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "TRACELOG_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => Config::load(&PathBuf::from(path))?,
        None => Config::default(),
    };
    tracelog::observability::init_tracing(&config);

    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!(data_dir = ?data_dir, "collector starting");

    let (token, origin) = AuthToken::load_or_generate(&token_path(&data_dir))?;
    if origin == TokenOrigin::Generated {
        println!("Generated new API token: {}", token.secret());
    }

    let store = JsonTraceStore::new(traces_dir(&data_dir));
    let state = CollectorState::new(token, Arc::new(store));

    collector::serve(&config.bind_addr, state).await
}
