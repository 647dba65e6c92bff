//! Configuration commands.

use std::path::Path;

use crate::config::{BackendKind, ClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::secret::TokenSource;

/// Renders the effective configuration as TOML.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<String> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::config(format!("failed to serialize config: {}", e)))?;
    Ok(format!("# config.toml ({})\n{}", path.display(), toml_str))
}

/// Validates the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<String> {
    let backend = &config.backend;
    let mut checked = Vec::new();

    if backend.timeout == 0 {
        return Err(ClientError::config("backend.timeout must be greater than 0"));
    }

    match backend.kind {
        BackendKind::Rest => {
            validate_rest(config)?;
            checked.push(format!("REST backend at {}", backend.base_url));
        }
        BackendKind::File => {
            let path = backend.snapshot_path();
            if path.is_dir() {
                return Err(ClientError::config(format!(
                    "backend.snapshot_path {} is a directory",
                    path.display()
                )));
            }
            checked.push(format!("file backend at {}", path.display()));
        }
    }

    if let Some(ref token) = backend.token {
        let source = TokenSource::parse(token);
        source
            .resolve()
            .map_err(|e| ClientError::config(format!("invalid backend.token: {}", e)))?;
        checked.push(format!("token from {} resolves", source));
    }

    if config.display.max_title_length == Some(0) {
        return Err(ClientError::config(
            "display.max_title_length must be greater than 0",
        ));
    }

    checked.push("Configuration is valid.".to_string());
    Ok(checked.join("\n"))
}

#[cfg(feature = "rest")]
fn validate_rest(config: &ClientConfig) -> ClientResult<()> {
    daylog_backend::RestConfig::new(&config.backend.base_url)?;
    Ok(())
}

#[cfg(not(feature = "rest"))]
fn validate_rest(_config: &ClientConfig) -> ClientResult<()> {
    Err(ClientError::config(
        "backend.kind = \"rest\" but this build has no REST support",
    ))
}

/// Shows the configuration file path.
pub fn path(path: &Path) -> String {
    let note = if path.exists() { "" } else { " (not found, using defaults)" };
    format!("config: {}{}", path.display(), note)
}
