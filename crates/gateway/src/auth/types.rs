use std::fmt;

/// Basic credential taken verbatim from the `Authorization` header.
///
/// Never decoded and never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw header value, for forwarding to the Data API login call only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Per-request input to the session authenticator.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub credential: Credential,
    pub supplied_token: Option<String>,
    /// Caller forbids replacing `supplied_token` with a fresh login.
    pub required: bool,
    pub database: String,
    pub server: String,
}

impl SessionContext {
    /// The caller's token, with an empty string treated as absent.
    pub fn supplied_token(&self) -> Option<&str> {
        self.supplied_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Why a request was refused a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Login against the Data API failed, for any reason.
    ReauthenticationFailed,
    /// A freshly issued token did not pass validation.
    ValidationFailed,
    /// The supplied token is invalid and the caller marked it required.
    InvalidToken,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::ReauthenticationFailed => "re-authentication failed",
            RejectReason::ValidationFailed => "session token validation failed",
            RejectReason::InvalidToken => "invalid session token",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of the session authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Token validated during this request; usable as a Bearer credential.
    Confirmed(String),
    Rejected(RejectReason),
}

/// Shorten a session token for log output.
pub fn token_hint(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    format!("{prefix}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("dXNlcjpwYXNz");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
        assert_eq!(credential.expose(), "dXNlcjpwYXNz");
    }

    #[test]
    fn test_empty_supplied_token_is_absent() {
        let ctx = SessionContext {
            credential: Credential::new("c"),
            supplied_token: Some(String::new()),
            required: true,
            database: "db".to_string(),
            server: "fm.local".to_string(),
        };
        assert_eq!(ctx.supplied_token(), None);
    }

    #[test]
    fn test_reject_reason_messages() {
        assert_eq!(RejectReason::ReauthenticationFailed.to_string(), "re-authentication failed");
        assert_eq!(RejectReason::ValidationFailed.to_string(), "session token validation failed");
        assert_eq!(RejectReason::InvalidToken.to_string(), "invalid session token");
    }

    #[test]
    fn test_token_hint() {
        assert_eq!(token_hint("abcdefghijkl"), "abcdef…");
        assert_eq!(token_hint("ab"), "ab…");
    }
}
