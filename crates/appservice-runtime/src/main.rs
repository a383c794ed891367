//! Appservice runtime entry point.
//!
//! ```text
//! appservice-runtime                        # serve $AS_REGISTRATION
//! appservice-runtime generate <url> <path>  # write a fresh registration
//! ```

use anyhow::{bail, Context, Result};
use appservice_runtime::{generate, init_logging, AppserviceRuntime, RuntimeConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    init_logging(&config.log_level, config.json_logs)?;

    for (key, value) in &config.ignored {
        warn!(key = %key, value = %value, "Ignoring unparseable environment variable");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => serve(&config).await,
        [cmd, url, path] if cmd == "generate" => {
            generate(url, &config.sender_localpart, path)
                .with_context(|| format!("writing registration to {path}"))?;
            Ok(())
        }
        _ => bail!("usage: appservice-runtime [generate <url> <path>]"),
    }
}

async fn serve(config: &RuntimeConfig) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        registration = %config.registration_path.display(),
        "Starting appservice runtime"
    );

    let mut runtime = AppserviceRuntime::load(config).with_context(|| {
        format!(
            "loading registration from {}",
            config.registration_path.display()
        )
    })?;
    let addr = runtime.start().await?;
    info!(addr = %addr, "Listening; press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    runtime.stop().await?;
    Ok(())
}
