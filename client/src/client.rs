use allerta_common::views::ApiErrorResponse;
use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Environment variable holding the API base URL, e.g. `http://localhost:4000`.
pub const BASE_URL_ENV: &str = "ALLERTA_API_BASE_URL";

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("{BASE_URL_ENV} is not set")]
    MissingBaseUrl,

    #[error("API error: {}", .0.message)]
    ApiError(ApiErrorResponse),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

/// Thin JSON client for the Allerta API. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    api_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self, ApiClientError> {
        let client = Client::builder()
            .user_agent(format!("allerta-client/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_url: api_url.into(),
            client,
        })
    }

    pub fn from_env() -> Result<Self, ApiClientError> {
        let api_url = std::env::var(BASE_URL_ENV).map_err(|_| ApiClientError::MissingBaseUrl)?;
        Self::new(api_url)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let req = self.client.request(method, self.url(path));
        match token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Turns a non-2xx response into [`ApiClientError::ApiError`].
    async fn check(response: Response) -> Result<Response, ApiClientError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let url = response.url().clone();
        let body = response.json::<ApiErrorResponse>().await.map_err(|e| {
            anyhow::anyhow!(
                "{} failed with status {} and invalid error response: {}",
                url,
                status,
                e
            )
        })?;
        Err(ApiClientError::ApiError(body))
    }

    pub(crate) async fn get<TResult>(&self, path: &str) -> Result<TResult, ApiClientError>
    where
        TResult: DeserializeOwned,
    {
        let response = Self::check(self.request(Method::GET, path, None).send().await?).await?;

        Ok(response
            .json::<TResult>()
            .await
            .with_context(|| format!("Failed to parse response from GET {path}"))?)
    }

    pub(crate) async fn post<TBody, TResult>(
        &self,
        path: &str,
        body: &TBody,
        token: Option<&str>,
    ) -> Result<TResult, ApiClientError>
    where
        TBody: Serialize,
        TResult: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body, token).await
    }

    pub(crate) async fn put<TBody, TResult>(
        &self,
        path: &str,
        body: &TBody,
        token: Option<&str>,
    ) -> Result<TResult, ApiClientError>
    where
        TBody: Serialize,
        TResult: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, body, token).await
    }

    pub(crate) async fn delete(&self, path: &str, token: Option<&str>) -> Result<(), ApiClientError> {
        Self::check(self.request(Method::DELETE, path, token).send().await?).await?;
        Ok(())
    }

    async fn send_json<TBody, TResult>(
        &self,
        method: Method,
        path: &str,
        body: &TBody,
        token: Option<&str>,
    ) -> Result<TResult, ApiClientError>
    where
        TBody: Serialize,
        TResult: DeserializeOwned,
    {
        let response = self
            .request(method.clone(), path, token)
            .json(body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        Ok(response
            .json::<TResult>()
            .await
            .with_context(|| format!("Failed to parse response from {method} {path}"))?)
    }
}
