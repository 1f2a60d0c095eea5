//! HTTP client for network-based API calls
//!
//! Every call races the request against a [`CancellationToken`]; when the
//! token fires first the future is dropped, which aborts the underlying
//! connection instead of letting a superseded response settle.

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// HTTP client for communicating with the server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    /// Replace the session token (e.g., after sign-in)
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the server base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the current session token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET request returning JSON
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.get(self.url(path)));
        self.send(request, cancel).await
    }

    /// POST request with a JSON body, returning JSON
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        self.send(request, cancel).await
    }

    /// POST request without a body, returning JSON
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.post(self.url(path)));
        self.send(request, cancel).await
    }

    /// PUT request with a JSON body, returning JSON
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.put(self.url(path)).json(body));
        self.send(request, cancel).await
    }

    /// PATCH request with a JSON body; the response body is ignored
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let request = self.authorize(self.client.patch(self.url(path)).json(body));
        self.send_no_content(request, cancel).await
    }

    /// DELETE request; the response body is ignored
    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> ClientResult<()> {
        let request = self.authorize(self.client.delete(self.url(path)));
        self.send_no_content(request, cancel).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> ClientResult<T> {
        let round_trip = async {
            let response = request.send().await?;
            Self::handle_response(response).await
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = round_trip => result,
        }
    }

    async fn send_no_content(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let round_trip = async {
            let response = request.send().await?;
            Self::check_status(response).await.map(|_| ())
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = round_trip => result,
        }
    }

    /// Handle HTTP response, mapping status codes to errors
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Map a non-success status to the corresponding error
    pub(crate) async fn check_status(
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ClientError::Forbidden(message)),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ClientError::Validation(message))
            }
            _ => Err(ClientError::Internal(format!("{status}: {message}"))),
        }
    }
}
