use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Initializes tracing for general application use.
/// The log level comes from the RUST_LOG environment variable
/// (e.g., RUST_LOG=minischeme=trace,info) and is off when it is unset, since
/// program errors are already reported on stderr. Logs go to stderr so they
/// never mix with program output.
pub fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes tracing specifically for tests.
/// Runs once per process, logs everything at trace level
/// and captures output for the test runner.
#[cfg(test)]
pub fn init_test_logging() {
    static TRACING_INIT: std::sync::Once = std::sync::Once::new();
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("trace")
            .with_test_writer()
            .try_init()
            .ok(); // Ignore error if already initialized by another test
    });
}
