//! Tracing setup. The games own the terminal in raw mode, so log lines go to
//! a file under the data directory instead of stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the default `info`.
pub fn init_tracing(log_file: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(parent) = log_file.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);
    let result = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => builder.with_writer(Mutex::new(file)).try_init(),
        Err(_) => builder.with_writer(std::io::sink).try_init(),
    };

    if result.is_err() {
        eprintln!("tracing subscriber already set");
    }
}
