//! Local durable unit host.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────┐
//!                      │                     HOST                          │
//!   Client Request     │  ┌──────────┐   ┌────────────┐   ┌─────────────┐  │
//!   ───────────────────┼─▶│  server  │──▶│ namespace  │──▶│    unit     │  │
//!   /{unit}/{path}     │  │ (axum)   │   │ id → inst. │   │  .fetch()   │  │
//!                      │  └──────────┘   └────────────┘   └──────┬──────┘  │
//!                      │                                         ▼         │
//!   Client Response    │                                  ┌─────────────┐  │
//!   ◀──────────────────┼──────────────────────────────────│   router    │  │
//!                      │                                  │ (handlers)  │  │
//!                      │                                  └──────┬──────┘  │
//!                      │                                         ▼         │
//!                      │                                  ┌─────────────┐  │
//!                      │                                  │   storage   │  │
//!                      │                                  └─────────────┘  │
//!                      └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use durable_unit::config::{load_config, validate_config, ConfigError, HostConfig};
use durable_unit::counter;
use durable_unit::host::{open_backend, HostServer, Namespace};
use durable_unit::lifecycle::{signals, Shutdown};
use durable_unit::observability::init_logging;
use durable_unit::unit::env::UnitEnv;
use durable_unit::{UnitOptions, UnitRouter};

#[derive(Parser)]
#[command(name = "durable-unit")]
#[command(about = "Serve counter units locally", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => HostConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    init_logging(config.env.log_level, &config.observability);
    tracing::info!("durable-unit v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        namespace = %config.namespace.name,
        log_level = %config.env.log_level,
        "Configuration loaded"
    );

    let backend = open_backend(&config.storage)?;
    let env: Arc<UnitEnv> = Arc::new(config.env.clone());
    let options = UnitOptions {
        name: config.unit.name.clone(),
        router: config.unit.router.clone(),
    };
    let namespace = Arc::new(Namespace::<UnitRouter<UnitEnv>>::new(
        config.namespace.name.clone(),
        env,
        backend,
        counter::factory(options),
    ));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let _signal_task = signals::spawn_signal_listener(shutdown);

    HostServer::new(namespace).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
