//! Where the server's bearer token comes from.
//!
//! `backend.token` in `config.toml` is either the JWT itself or a reference:
//!
//! - `env::DAYLOG_TOKEN` reads an environment variable
//! - `file::~/.config/daylog/token` reads the first line of a file
//! - `pass::daylog/jwt` uses the first line of `pass show daylog/jwt`
//!
//! Whatever the source, surrounding whitespace and a pasted `Bearer `
//! prefix are stripped, and an empty token is an error.

use std::fmt;
use std::path::PathBuf;

use crate::error::{ClientError, ClientResult};

/// A parsed `backend.token` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Env(String),
    File(PathBuf),
    Pass(String),
    Literal(String),
}

impl TokenSource {
    pub fn parse(value: &str) -> Self {
        if let Some(var) = value.strip_prefix("env::") {
            Self::Env(var.to_string())
        } else if let Some(path) = value.strip_prefix("file::") {
            Self::File(expand_home(path))
        } else if let Some(entry) = value.strip_prefix("pass::") {
            Self::Pass(entry.to_string())
        } else {
            Self::Literal(value.to_string())
        }
    }

    /// Reads the token.
    pub fn resolve(&self) -> ClientResult<String> {
        let raw = match self {
            Self::Env(var) => std::env::var(var).map_err(|_| {
                ClientError::config(format!("environment variable `{}` is not set", var))
            })?,
            Self::File(path) => std::fs::read_to_string(path)
                .map(|s| s.lines().next().unwrap_or_default().to_string())
                .map_err(|e| ClientError::config(format!("cannot read {}: {}", path.display(), e)))?,
            Self::Pass(entry) => pass_show(entry)?,
            Self::Literal(token) => token.clone(),
        };
        clean(&raw).ok_or_else(|| ClientError::config(format!("token from {} is empty", self)))
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(var) => write!(f, "env {}", var),
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Pass(entry) => write!(f, "pass {}", entry),
            Self::Literal(_) => f.write_str("config"),
        }
    }
}

/// Resolves a `backend.token` value to the bearer token.
pub fn resolve(value: &str) -> ClientResult<String> {
    TokenSource::parse(value).resolve()
}

fn clean(raw: &str) -> Option<String> {
    let token = raw.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").zip(dirs::home_dir()) {
        Some((rest, home)) => home.join(rest),
        None => PathBuf::from(path),
    }
}

fn pass_show(entry: &str) -> ClientResult<String> {
    let output = std::process::Command::new("pass")
        .args(["show", entry])
        .output()
        .map_err(|e| ClientError::config(format!("failed to run `pass show {}`: {}", entry, e)))?;
    if !output.status.success() {
        return Err(ClientError::config(format!(
            "`pass show {}` failed ({}): {}",
            entry,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string())
}
