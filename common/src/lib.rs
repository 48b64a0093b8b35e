use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub mod server;

pub use server::get_tcp_listener;

pub const ASCII_NEWLINE: u8 = b'\n';
pub const BUFFER_SIZE: usize = 1024;
pub const DEFAULT_PORT: u16 = 8096;
pub const THREAD_SLOW_DOWN: Duration = Duration::from_millis(100);

const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG` (defaults to `info`).
///
/// Output goes to stderr so interactive adapters keep stdout to themselves. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
