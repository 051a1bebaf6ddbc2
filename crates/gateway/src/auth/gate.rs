//! Request gate: pulls the Basic credential out of the `Authorization` header
//! before any session work happens.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use thiserror::Error;

use super::types::Credential;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Authorization header is missing")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    MalformedAuthHeader,
}

/// Extract the Basic credential from request headers.
pub fn basic_credential(headers: &HeaderMap) -> Result<Credential, GateError> {
    match headers.get(AUTHORIZATION) {
        None => Err(GateError::MissingAuthHeader),
        Some(value) => {
            let raw = value.to_str().map_err(|_| GateError::MalformedAuthHeader)?;
            parse_basic(raw)
        }
    }
}

/// Parse a raw header value of the form `Basic <credential>`.
///
/// The value must split on single spaces into exactly two parts, and the
/// scheme is matched case-insensitively. The credential is returned as-is.
pub fn parse_basic(raw: &str) -> Result<Credential, GateError> {
    let parts: Vec<&str> = raw.split(' ').collect();
    match parts.as_slice() {
        [scheme, credential] if scheme.eq_ignore_ascii_case("basic") && !credential.is_empty() => {
            Ok(Credential::new(*credential))
        }
        _ => Err(GateError::MalformedAuthHeader),
    }
}
