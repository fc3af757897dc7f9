use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber used by scenarios. `RUST_LOG` overrides the default `info` level.
///
/// Output goes through the test writer so it is captured per test. Calling it again is a
/// no-op.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        tracing::info!("logging initialized twice");
    }
}
