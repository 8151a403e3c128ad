//! HTTP collaborator used by the template catalog and the print client

use std::future::Future;
use thiserror::Error;

/// Raw response of the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request could not be completed (connection, timeout, ...)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Minimal HTTP client interface. Any status code is a successful transport;
/// callers decide what a non-2xx status means.
pub trait HttpClient {
    fn get(&self, url: &str)
    -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    /// POST an `application/x-www-form-urlencoded` body
    fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_client::ReqwestClient;

#[cfg(feature = "reqwest")]
mod reqwest_client {
    use super::*;
    use std::time::Duration;

    /// [`HttpClient`] backed by `reqwest`
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new(timeout: Duration) -> Result<Self, TransportError> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| TransportError::new(format!("Failed to build HTTP client: {e}")))?;
            Ok(Self { client })
        }

        /// Download a document body, e.g. the PDF behind a print URL
        pub async fn download(&self, url: &str) -> Result<Vec<u8>, TransportError> {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::new(format!("HTTP {} for {}", status, url)));
            }
            Ok(response.bytes().await?.to_vec())
        }

        async fn finish(response: reqwest::Response) -> Result<HttpResponse, TransportError> {
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        }
    }

    impl From<reqwest::Error> for TransportError {
        fn from(error: reqwest::Error) -> Self {
            TransportError::new(error.to_string())
        }
    }

    impl HttpClient for ReqwestClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            log::debug!("GET {}", url);
            let response = self
                .client
                .get(url)
                .header("Accept", "application/json")
                .send()
                .await?;
            Self::finish(response).await
        }

        async fn post_form(
            &self,
            url: &str,
            form: &[(String, String)],
        ) -> Result<HttpResponse, TransportError> {
            log::debug!("POST {} ({} fields)", url, form.len());
            let response = self.client.post(url).form(form).send().await?;
            Self::finish(response).await
        }
    }
}
