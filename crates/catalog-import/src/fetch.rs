//! HTTP client for fetching remote spreadsheet files.

use std::time::Duration;

use reqwest::Client;

use crate::error::ImportError;

/// HTTP client wrapper with a configured timeout and `User-Agent`.
///
/// Non-2xx responses and transport failures surface as typed errors; nothing
/// is retried. A remote import either fetches on the first attempt or the
/// whole import fails.
#[derive(Clone)]
pub struct RemoteFetcher {
    client: Client,
}

impl RemoteFetcher {
    /// Creates a `RemoteFetcher` with the given timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Fetch`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ImportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the response body as bytes.
    ///
    /// # Errors
    ///
    /// - [`ImportError::UnexpectedStatus`] — any non-2xx status.
    /// - [`ImportError::Fetch`] — network or TLS failure, or timeout.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ImportError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
