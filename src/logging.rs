//! Logging bootstrap.
//!
//! The engine logs through the `log` facade; embedding applications that
//! already install a logger can skip this entirely. `init_logging` is a
//! convenience for shells and tools that want stderr logging with one call,
//! and it is idempotent so library consumers cannot double-initialize.

use flexi_logger::Logger;
use once_cell::sync::OnceCell;

static LOGGING_STARTED: OnceCell<&'static str> = OnceCell::new();

/// Start stderr logging at the given level (`trace`..`error`).
///
/// Repeat calls with the same level are no-ops; a conflicting level is
/// rejected rather than silently ignored.
pub fn init_logging(level: &str) -> Result<(), String> {
    let normalized = normalize_level(level)?;

    if let Some(active) = LOGGING_STARTED.get() {
        if *active == normalized {
            return Ok(());
        }
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            active, normalized
        ));
    }

    Logger::try_with_str(normalized)
        .map_err(|e| format!("invalid log level `{}`: {}", normalized, e))?
        .log_to_stderr()
        .start()
        .map_err(|e| format!("failed to start logger: {}", e))?;

    let _ = LOGGING_STARTED.set(normalized);
    log::debug!("logging initialized at {}", normalized);
    Ok(())
}

/// Default level for the current build mode.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{}`; expected trace|debug|info|warn|error",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(normalize_level("loud").is_err());
    }

    #[test]
    fn test_default_level_matches_build_mode() {
        let level = default_log_level();
        assert!(level == "debug" || level == "info");
    }
}
