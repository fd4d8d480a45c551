//! Command implementations.

pub mod resources;
pub mod serve;
pub mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use storedesk_core::auth::{FileSessionRepository, PUBLIC_ROOT, UNAUTHORIZED_PAGE};
use storedesk_core::{ApiClient, Config, Console, ConsoleError};

pub(crate) fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

pub(crate) fn open_repository(config: &Config) -> Result<Arc<FileSessionRepository>> {
    let repo = FileSessionRepository::open(&config.cache_dir()?)?;
    Ok(Arc::new(repo))
}

pub(crate) fn open_console(config: &Config) -> Result<Console> {
    let repo = open_repository(config)?;
    let api = ApiClient::from_config(config, repo)?;
    Ok(Console::new(api))
}

/// Turn a console error into a message with the next step to take.
pub(crate) fn explain(err: ConsoleError) -> anyhow::Error {
    let hint = match err.redirect() {
        Some(PUBLIC_ROOT) => Some("run `storedesk login` to start a new session"),
        Some(UNAUTHORIZED_PAGE) => Some("your role cannot do this"),
        _ => None,
    };
    match hint {
        Some(hint) => anyhow::anyhow!("{} ({})", err, hint),
        None => anyhow::Error::new(err),
    }
}
