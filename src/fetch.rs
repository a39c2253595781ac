//! Retrieval of remote install scripts.
use anyhow::{Context as _, Result};

/// Source of installer scripts.
#[cfg_attr(test, mockall::automock)]
pub trait ScriptSource: Send + Sync {
    /// Fetch the script at `url` as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not UTF-8.
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Production [`ScriptSource`] using a blocking HTTPS client.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpScriptSource;

impl ScriptSource for HttpScriptSource {
    fn fetch(&self, url: &str) -> Result<String> {
        let mut response = ureq::get(url)
            .call()
            .with_context(|| format!("downloading {url}"))?;
        response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("reading response body from {url}"))
    }
}
