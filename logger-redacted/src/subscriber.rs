use tracing_appender::non_blocking::WorkerGuard;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::{LogFormat, LoggerConfig};
use crate::{LoggerError, Result};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. When a log
/// directory is configured the returned guard must be kept alive for the
/// lifetime of the process, dropping it flushes and stops the file writer.
pub fn init_logging(config: &LoggerConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| LoggerError::InvalidFilter(e.to_string()))?;

    let (file_writer, guard) = match &config.log_directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let json = config.format == LogFormat::Json;
    let storage_layer = json.then_some(JsonStorageLayer);
    let bunyan_layer =
        json.then(|| BunyanFormattingLayer::new(config.service_name.clone(), std::io::stdout));
    let pretty_layer = (!json).then(|| fmt::layer().with_target(true));
    let file_layer = file_writer.map(|writer| fmt::layer().with_ansi(false).with_writer(writer));

    Registry::default()
        .with(filter)
        .with(storage_layer)
        .with(bunyan_layer)
        .with(pretty_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        format = ?config.format,
        "Logging initialized"
    );

    Ok(guard)
}
