//! Command implementations.
//!
//! Each command renders its output into a `String`; `main` prints it.

pub mod category;
pub mod config;
pub mod day;
pub mod diary;
pub mod event;
pub mod todo;

use std::sync::Arc;

use daylog_backend::{Backend, FileBackend};
use daylog_core::{AgendaFormatter, OutputFormat};
use daylog_store::{Snapshot, SnapshotStore};
use serde::Serialize;
use tracing::debug;

use crate::cli::Cli;
use crate::config::{BackendKind, ClientConfig};
use crate::error::{ClientError, ClientResult};

/// Everything a command needs: a backend, the shared store and output
/// settings.
pub struct Context {
    pub backend: Box<dyn Backend>,
    pub store: SnapshotStore,
    pub format: OutputFormat,
    pub formatter: AgendaFormatter,
}

impl Context {
    pub fn new(backend: Box<dyn Backend>, format: OutputFormat, formatter: AgendaFormatter) -> Self {
        Self {
            backend,
            store: SnapshotStore::new(),
            format,
            formatter,
        }
    }

    /// Builds the context from config with command-line overrides applied.
    pub fn from_config(config: &ClientConfig, cli: &Cli) -> ClientResult<Self> {
        let mut display = config.display.clone();
        if cli.max_title_length.is_some() {
            display.max_title_length = cli.max_title_length;
        }
        let formatter = AgendaFormatter::new(display.format_options());
        Ok(Self::new(
            build_backend(config, cli)?,
            cli.output_format(),
            formatter,
        ))
    }

    /// Fetches everything from the backend into the store.
    pub async fn load(&self) -> ClientResult<Arc<Snapshot>> {
        self.store.refresh(self.backend.as_ref()).await?;
        Ok(self.store.current())
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// Picks the backend: `--file` wins, then `--url`, then the config file.
pub fn build_backend(config: &ClientConfig, cli: &Cli) -> ClientResult<Box<dyn Backend>> {
    let settings = &config.backend;

    if let Some(ref path) = cli.file {
        debug!(path = %path.display(), "Using file backend from command line");
        return Ok(Box::new(FileBackend::new(path)));
    }

    let kind = if cli.url.is_some() {
        BackendKind::Rest
    } else {
        settings.kind
    };

    match kind {
        BackendKind::File => {
            let path = settings.snapshot_path();
            debug!(path = %path.display(), "Using file backend");
            Ok(Box::new(FileBackend::new(path)))
        }
        BackendKind::Rest => rest_backend(config, cli),
    }
}

#[cfg(feature = "rest")]
fn rest_backend(config: &ClientConfig, cli: &Cli) -> ClientResult<Box<dyn Backend>> {
    use daylog_backend::{RestBackend, RestConfig};
    use std::time::Duration;

    let settings = &config.backend;
    let base_url = cli.url.as_deref().unwrap_or(&settings.base_url);
    let mut rest = RestConfig::new(base_url)?.with_timeout(Duration::from_secs(settings.timeout));

    let token = match cli.token {
        Some(ref token) => Some(token.clone()),
        None => settings
            .token
            .as_deref()
            .map(crate::secret::resolve)
            .transpose()?,
    };
    if let Some(token) = token {
        rest = rest.with_token(token);
    }

    debug!(base_url, "Using REST backend");
    Ok(Box::new(RestBackend::new(rest)?))
}

#[cfg(not(feature = "rest"))]
fn rest_backend(_config: &ClientConfig, _cli: &Cli) -> ClientResult<Box<dyn Backend>> {
    Err(ClientError::config(
        "built without REST support; set backend.kind = \"file\" or pass --file",
    ))
}

/// Pretty-printed JSON for `--json` output.
pub(crate) fn to_json<T: Serialize>(value: &T) -> ClientResult<String> {
    serde_json::to_string_pretty(value).map_err(ClientError::from)
}
