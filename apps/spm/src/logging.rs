//! Structured logging initialization (spec §2.2: `tracing` +
//! `tracing-subscriber`, level controlled by `RUST_LOG` / `--debug`).

/// Initialize the global tracing subscriber once, at process start.
///
/// In `--json` mode, console logging is suppressed so stdout stays pure
/// JSON; diagnostics still go to stderr when `--debug` or `RUST_LOG` is
/// set.
pub fn init(json_mode: bool, debug: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            tracing_subscriber::EnvFilter::new("debug")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    if json_mode && !debug && std::env::var("RUST_LOG").is_err() {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        builder.init();
    }
}
