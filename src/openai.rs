//! OpenAI client configuration with sensible defaults.

use crate::error::{CodeeError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client for the caller-supplied API key.
///
/// The key is never read from the environment here: the tutor gates every
/// turn on the credential the participant entered.
pub fn create_client(api_key: &str) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    if api_key.trim().is_empty() {
        return Err(CodeeError::MissingCredential);
    }

    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new().with_api_key(api_key);
    Ok(Client::with_config(config).with_http_client(http_client))
}
