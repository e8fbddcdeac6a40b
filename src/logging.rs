// src/logging.rs

use crate::config::Config;
use crate::constants::LOG_BASENAME;
use crate::errors::ChatResult;
use crate::models::ApiCallLog;
use flexi_logger::{FileSpec, Logger, LoggerHandle};

/// Starts file logging. The terminal belongs to the UI, so nothing goes to stdout.
///
/// The level comes from the resolved config only; `RUST_LOG` is not consulted.
///
/// The returned handle must stay alive for the life of the program.
pub fn init(config: &Config) -> ChatResult<LoggerHandle> {
    let handle = Logger::try_with_str(&config.log_level)?
        .log_to_file(
            FileSpec::default()
                .directory(&config.log_dir)
                .basename(LOG_BASENAME),
        )
        .format(flexi_logger::detailed_format)
        .start()?;

    Ok(handle)
}

/// Logs an API call under the `api` target.
pub fn log_api_call(log: &ApiCallLog) {
    log::info!(
        target: "api",
        "[{}] {} - {} - Status: {} - Time: {}ms",
        log.timestamp.to_rfc3339(),
        log.endpoint,
        log.request_summary,
        log.response_status,
        log.response_time_ms
    );
}
