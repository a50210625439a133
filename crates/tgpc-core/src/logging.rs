use tracing_subscriber::{fmt, EnvFilter};

use crate::Result;

/// Initialize tracing for the tool.
///
/// Logs go to stderr so `--csv` output on stdout stays pipeable.
pub fn init(service_name: &str) -> Result<()> {
    // Default: info for our crates, warn for everything else.
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,tgpc=info,tgpc_core=info,tgpc_telegram=info,{service_name}=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| crate::Error::Config(format!("failed to install logger: {e}")))?;

    Ok(())
}
