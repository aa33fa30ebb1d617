use flexi_logger::{Logger, LoggerHandle};

use crate::mops_errors::MopsError;

/// Start logging to stderr at `base_level`, unless `RUST_LOG` says otherwise.
///
/// The returned handle must be kept alive for the duration of the program.
pub fn setup_logging(base_level: &str) -> Result<LoggerHandle, MopsError> {
    let handle = Logger::try_with_env_or_str(base_level)?
        .log_to_stderr()
        .start()?;
    Ok(handle)
}
