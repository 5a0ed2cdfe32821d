//! Unified logging integration
//!
//! The generator only emits `tracing` events. Host binaries call
//! [`init_logging`] once to route them somewhere: ftlog when the `ftlog`
//! feature is on (through tracing's `log` bridge), a `tracing-subscriber`
//! formatter otherwise.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use tracing::Level;
#[cfg(not(feature = "ftlog"))]
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Log levels accepted by [`init_logging_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Whether [`init_logging`] installed a backend in this process
pub fn logging_installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

/// Initialize logging at `info` unless `RUST_LOG` says otherwise
pub fn init_logging() {
    init_logging_with(LogLevel::Info);
}

/// Initialize logging with a default level; later calls are no-ops
pub fn init_logging_with(level: LogLevel) {
    INIT.call_once(|| {
        #[cfg(feature = "ftlog")]
        {
            init_ftlog(level);
        }

        #[cfg(not(feature = "ftlog"))]
        {
            init_tracing(level);
        }
    });
}

#[cfg(feature = "ftlog")]
fn init_ftlog(level: LogLevel) {
    let filter = match level {
        LogLevel::Trace => ftlog::LevelFilter::Trace,
        LogLevel::Debug => ftlog::LevelFilter::Debug,
        LogLevel::Info => ftlog::LevelFilter::Info,
        LogLevel::Warn => ftlog::LevelFilter::Warn,
        LogLevel::Error => ftlog::LevelFilter::Error,
    };

    match ftlog::builder()
        .max_log_level(filter)
        .bounded(100_000, false)
        .utc()
        .try_init()
    {
        Ok(guard) => {
            // Logger lives for the whole process
            std::mem::forget(guard);
            INSTALLED.store(true, Ordering::SeqCst);
            tracing::info!("📝 Initialized ftlog logging ({})", level.as_filter());
        }
        Err(e) => eprintln!("Failed to initialize ftlog: {e}"),
    }
}

#[cfg(not(feature = "ftlog"))]
fn init_tracing(level: LogLevel) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(LogLevel::Trace))
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter())),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    // Another subscriber may already be installed by the host or a test harness
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        INSTALLED.store(true, Ordering::SeqCst);
        tracing::info!("📝 Initialized tracing logging ({})", level.as_filter());
    }
}
