// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the application's REST API.
//!
//! The API gateway authorizes requests with the raw identity token in the
//! `Authorization` header (no `Bearer` prefix).

use serde::de::DeserializeOwned;
use serde::Serialize;

/// REST API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API Error: {status}")]
    Status { status: u16, body: String },

    #[error("API request failed: {0}")]
    Transport(String),

    #[error("No identity token available for an authenticated request")]
    MissingToken,
}

/// Minimal JSON client for the REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `endpoint`; `id_token` is attached when given.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        id_token: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = self.http.get(self.url(endpoint));
        self.send(request, id_token).await
    }

    /// POST a JSON body to `endpoint`; `id_token` is attached when given.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
        id_token: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.url(endpoint)).json(body);
        self.send(request, id_token).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        id_token: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = match id_token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "API request rejected");
            return Err(ApiError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Transport(format!("JSON parse error: {}", e)))
    }
}
