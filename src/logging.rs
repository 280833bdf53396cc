use std::time::Instant;

use tracing::{info, info_span};

/// Install the global subscriber: fmt output filtered by `RUST_LOG`,
/// defaulting to `info`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();
}

/// Run `f` inside an `info` span named after `operation`, logging when it
/// starts and when it finishes together with the elapsed time.
pub fn timed<T>(operation: &str, f: impl FnOnce() -> T) -> T {
    let span = info_span!("operation", name = operation);
    let _guard = span.enter();
    info!("Running '{operation}'");
    let start = Instant::now();
    let result = f();
    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Finished '{operation}'"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_inner_value() {
        assert_eq!(timed("answer", || 42), 42);
        let result: Result<u8, String> = timed("failing", || Err("boom".to_string()));
        assert_eq!(result.unwrap_err(), "boom");
    }
}
