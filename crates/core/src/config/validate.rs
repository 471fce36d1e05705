use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Sync intervals, timeout and buffer are not 0
/// - Sync server URL is http(s)
/// - Board limits are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    // Sync validation
    let sync = &config.sync;
    if !sync.server_url.starts_with("http://") && !sync.server_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "sync.server_url must start with http:// or https://, got '{}'",
            sync.server_url
        )));
    }
    if sync.poll_interval_ms == 0 {
        return Err(invalid("sync.poll_interval_ms cannot be 0"));
    }
    if sync.request_timeout_ms == 0 {
        return Err(invalid("sync.request_timeout_ms cannot be 0"));
    }
    if sync.forward_buffer == 0 {
        return Err(invalid("sync.forward_buffer cannot be 0"));
    }

    // Board validation
    if config.board.serving_limit == 0 || config.board.waiting_limit == 0 {
        return Err(invalid("board limits cannot be 0"));
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}
