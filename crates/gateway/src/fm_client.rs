//! FileMaker Data API client.
//!
//! Session calls (login, validateSession, logout) back the authenticator.
//! Record calls go through [`FmClient::data_call`], which every Record
//! Service operation shares. Each call is a single attempt; retries and
//! recovery are decided by the caller.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::auth::{Credential, SessionBackend};
use crate::config::BackendConfig;

/// Errors talking to the Data API.
#[derive(Debug, Error)]
pub enum FmError {
    /// Network failure, timeout, TLS error.
    #[error("Data API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status. `body` is the parsed JSON, or the raw text.
    #[error("Data API returned {status}: {body}")]
    Status { status: u16, body: Value },

    /// Login succeeded but `response.token` was absent.
    #[error("Data API login response has no session token")]
    MissingToken,

    #[error("Unexpected Data API response: {0}")]
    UnexpectedBody(String),

    /// `fmServer` is not a bare host[:port].
    #[error("Invalid Data API server: {0}")]
    InvalidServer(String),
}

#[derive(Clone, Debug)]
pub struct FmClient {
    http: reqwest::Client,
    scheme: String,
    api_version: String,
}

impl FmClient {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate verification for the Data API is disabled");
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            scheme: config.scheme.clone(),
            api_version: config.api_version.clone(),
        })
    }

    /// Build `<scheme>://<server>/fmi/data/<version>/<segments...>`.
    /// Segments are percent-encoded.
    pub fn api_url(&self, server: &str, segments: &[&str]) -> Result<Url, FmError> {
        let invalid = || FmError::InvalidServer(server.to_string());

        if server.is_empty() || server.contains(['/', '?', '#', '@']) {
            return Err(invalid());
        }
        let mut url = Url::parse(&format!("{}://{}/", self.scheme, server)).map_err(|_| invalid())?;

        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["fmi", "data", self.api_version.as_str()])
            .extend(segments);

        Ok(url)
    }

    /// Create a Data API session.
    /// POST /databases/{database}/sessions with `Authorization: Basic`
    pub async fn login(
        &self,
        server: &str,
        database: &str,
        credential: &Credential,
    ) -> Result<String, FmError> {
        let url = self.api_url(server, &["databases", database, "sessions"])?;

        let res = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Basic {}", credential.expose()))
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let body = read_json(res).await?;
        body.pointer("/response/token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or(FmError::MissingToken)
    }

    /// Check a session token.
    /// GET /validateSession with `Authorization: Bearer`
    pub async fn validate_session(&self, server: &str, token: &str) -> Result<bool, FmError> {
        let url = self.api_url(server, &["validateSession"])?;

        let res = self.http.get(url).bearer_auth(token).send().await?;

        let body = read_json(res).await?;
        Ok(is_ok(&body))
    }

    /// Close a Data API session.
    /// DELETE /databases/{database}/sessions/{token}
    pub async fn logout(&self, server: &str, database: &str, token: &str) -> Result<bool, FmError> {
        let url = self.api_url(server, &["databases", database, "sessions", token])?;

        let res = self.http.delete(url).bearer_auth(token).send().await?;

        let body = read_json(res).await?;
        Ok(is_ok(&body))
    }

    /// Bearer-authenticated call under `/databases/{database}/...`.
    pub async fn data_call(
        &self,
        method: Method,
        target: &DataTarget<'_>,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, FmError> {
        let mut path = vec!["databases", target.database];
        path.extend_from_slice(segments);
        let mut url = self.api_url(target.server, &path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        tracing::debug!(method = %method, url = %url, "Data API call");

        let mut req = self.http.request(method, url).bearer_auth(target.token);
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await?;
        read_json(res).await
    }
}

/// Where a record call goes, and the session it runs under.
#[derive(Debug, Clone, Copy)]
pub struct DataTarget<'a> {
    pub server: &'a str,
    pub database: &'a str,
    pub token: &'a str,
}

#[async_trait]
impl SessionBackend for FmClient {
    async fn login(
        &self,
        server: &str,
        database: &str,
        credential: &Credential,
    ) -> Result<String, FmError> {
        FmClient::login(self, server, database, credential).await
    }

    async fn validate(&self, server: &str, token: &str) -> Result<bool, FmError> {
        self.validate_session(server, token).await
    }
}

/// `messages[0].message == "OK"`, the Data API's success marker.
pub fn is_ok(body: &Value) -> bool {
    body.pointer("/messages/0/message").and_then(Value::as_str) == Some("OK")
}

async fn read_json(res: reqwest::Response) -> Result<Value, FmError> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        return Err(FmError::Status {
            status: status.as_u16(),
            body: parse_or_text(&text),
        });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| FmError::UnexpectedBody(e.to_string()))
}

fn parse_or_text(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
