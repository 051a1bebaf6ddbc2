//! Session authentication and revalidation.
//!
//! Every `dataApi` request either proves the session token it carries or
//! re-establishes one from its Basic credential. Nothing is cached between
//! requests: the token the caller holds is the only session state, and it is
//! echoed back on every successful response.
//!
//! ```text
//! no token ──────────────► login ─► validate ─► Confirmed(new)
//!                            │          └─────► Rejected(validation failed)
//!                            └────────────────► Rejected(re-authentication failed)
//!
//! token ─► validate ─ ok ──► Confirmed(token)
//!             └─ invalid ─┬─ required ────────► Rejected(invalid session token)
//!                         └─ otherwise ───────► login ─► validate (as above, once)
//! ```

pub mod gate;
pub mod types;

use async_trait::async_trait;

use crate::fm_client::FmError;
pub use types::{token_hint, Credential, RejectReason, SessionContext, SessionOutcome};

/// The two Data API calls the authenticator depends on.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Exchange a Basic credential for a session token on `database`.
    async fn login(
        &self,
        server: &str,
        database: &str,
        credential: &Credential,
    ) -> Result<String, FmError>;

    /// Ask the backend whether `token` is still accepted.
    async fn validate(&self, server: &str, token: &str) -> Result<bool, FmError>;
}

/// Resolve a confirmed session token for one request.
///
/// Makes at most one login call, and at most two validate calls.
pub async fn authenticate<B>(backend: &B, ctx: &SessionContext) -> SessionOutcome
where
    B: SessionBackend + ?Sized,
{
    let Some(token) = ctx.supplied_token() else {
        tracing::debug!(database = %ctx.database, "No session token supplied, logging in");
        return login_and_confirm(backend, ctx).await;
    };

    if is_valid(backend, &ctx.server, token).await {
        tracing::debug!(token = %token_hint(token), "Supplied session token is valid");
        return SessionOutcome::Confirmed(token.to_string());
    }

    if ctx.required {
        tracing::warn!(
            token = %token_hint(token),
            "Supplied session token is invalid and marked required, not re-authenticating"
        );
        return SessionOutcome::Rejected(RejectReason::InvalidToken);
    }

    tracing::info!(
        token = %token_hint(token),
        database = %ctx.database,
        "Supplied session token is invalid, re-authenticating"
    );
    login_and_confirm(backend, ctx).await
}

async fn login_and_confirm<B>(backend: &B, ctx: &SessionContext) -> SessionOutcome
where
    B: SessionBackend + ?Sized,
{
    let token = match backend.login(&ctx.server, &ctx.database, &ctx.credential).await {
        Ok(token) => token,
        Err(e) => {
            // Transport failures and refused credentials look the same to the caller.
            tracing::warn!(error = %e, database = %ctx.database, "Data API login failed");
            return SessionOutcome::Rejected(RejectReason::ReauthenticationFailed);
        }
    };

    if is_valid(backend, &ctx.server, &token).await {
        tracing::info!(token = %token_hint(&token), "Issued new session token");
        SessionOutcome::Confirmed(token)
    } else {
        tracing::warn!(token = %token_hint(&token), "Freshly issued session token failed validation");
        SessionOutcome::Rejected(RejectReason::ValidationFailed)
    }
}

/// Collapse a validation result to a yes/no answer.
///
/// An unreachable validation endpoint and a refused token are deliberately
/// indistinguishable here: both mean the token can't be used for this request.
async fn is_valid<B>(backend: &B, server: &str, token: &str) -> bool
where
    B: SessionBackend + ?Sized,
{
    match backend.validate(server, token).await {
        Ok(valid) => valid,
        Err(e) => {
            tracing::debug!(error = %e, token = %token_hint(token), "Session validation errored, treating as invalid");
            false
        }
    }
}
