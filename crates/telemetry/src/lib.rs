//! Tracing subscriber bootstrap.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use catalog_kernel::settings::{LogFormat, TelemetrySettings};

/// Build the log filter: `RUST_LOG` when set, the configured level otherwise.
pub fn filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_level)
            .map_err(|err| anyhow!("invalid log level '{}': {}", settings.log_level, err)),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(settings)?);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

    tracing::info!(
        target: "catalog-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}
