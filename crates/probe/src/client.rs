//! HTTP client for the booking API.
//!
//! Thin wrapper over `reqwest`: every call returns the raw status and body
//! so scenarios decide what counts as success. There is no retry policy;
//! a transport failure fails the caller outright.

use crate::config::Credentials;
use crate::result::{ProbeError, ProbeResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// A response reduced to what the scenarios assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP method of the originating request
    pub method: String,
    /// Request URL
    pub url: String,
    /// Status code
    pub status: u16,
    /// Body text
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is 2xx
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> ProbeResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Fail unless the status equals `expected`.
    pub fn expect_status(&self, expected: u16) -> ProbeResult<&Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(self.unexpected(expected.to_string()))
        }
    }

    /// Fail unless the status is 2xx.
    pub fn expect_ok(&self) -> ProbeResult<&Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(self.unexpected("2xx".to_string()))
        }
    }

    fn unexpected(&self, expected: String) -> ProbeError {
        ProbeError::UnexpectedStatus {
            method: self.method.clone(),
            url: self.url.clone(),
            expected,
            actual: self.status,
            body: self.body.clone(),
        }
    }
}

/// Client for the booking API
#[derive(Debug, Clone)]
pub struct BookerClient {
    base_url: String,
    client: reqwest::Client,
}

impl BookerClient {
    /// Create a new client pointing at the given base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ProbeResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `POST /auth` with the given credentials, returning the raw response.
    pub async fn auth(&self, credentials: &Credentials) -> ProbeResult<ApiResponse> {
        let body = serde_json::json!({
            "username": credentials.username,
            "password": credentials.password,
        });
        let request = self.client.post(self.url("/auth")).json(&body);
        self.send("POST", request).await
    }

    /// `POST /booking`
    pub async fn create_booking<B: Serialize + ?Sized>(&self, body: &B) -> ProbeResult<ApiResponse> {
        let request = self.client.post(self.url("/booking")).json(body);
        self.send("POST", request).await
    }

    /// `GET /booking/{id}`
    pub async fn get_booking(&self, id: u64) -> ProbeResult<ApiResponse> {
        let request = self.client.get(self.url(&format!("/booking/{id}")));
        self.send("GET", request).await
    }

    /// `GET /booking?firstname=..&lastname=..`
    pub async fn search_bookings(&self, firstname: &str, lastname: &str) -> ProbeResult<ApiResponse> {
        let request = self
            .client
            .get(self.url("/booking"))
            .query(&[("firstname", firstname), ("lastname", lastname)]);
        self.send("GET", request).await
    }

    /// `PUT /booking/{id}` authenticated with the session token cookie
    pub async fn update_booking<B: Serialize + ?Sized>(
        &self,
        id: u64,
        body: &B,
        token: &str,
    ) -> ProbeResult<ApiResponse> {
        let request = self
            .client
            .put(self.url(&format!("/booking/{id}")))
            .header(reqwest::header::COOKIE, format!("token={token}"))
            .json(body);
        self.send("PUT", request).await
    }

    /// `DELETE /booking/{id}` authenticated with the session token cookie
    pub async fn delete_booking(&self, id: u64, token: &str) -> ProbeResult<ApiResponse> {
        let request = self
            .client
            .delete(self.url(&format!("/booking/{id}")))
            .header(reqwest::header::COOKIE, format!("token={token}"))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        self.send("DELETE", request).await
    }

    async fn send(&self, method: &str, request: reqwest::RequestBuilder) -> ProbeResult<ApiResponse> {
        let response = request.send().await?;
        let url = response.url().to_string();
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(%method, %url, status, %body, "booking api response");
        Ok(ApiResponse {
            method: method.to_string(),
            url,
            status,
            body,
        })
    }
}

/// Pull the `token` field out of an auth response body.
pub fn extract_token(body: &Value) -> ProbeResult<String> {
    body.get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProbeError::assertion(format!("auth response has no token: {body}")))
}

/// Pull the integer `bookingid` field out of a create response body.
pub fn extract_booking_id(body: &Value) -> ProbeResult<u64> {
    body.get("bookingid")
        .and_then(Value::as_u64)
        .ok_or_else(|| ProbeError::assertion(format!("create response has no bookingid: {body}")))
}
