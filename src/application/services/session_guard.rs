use std::sync::Arc;

use crate::application::ports::{IdentityClient, SessionRefresh};
use crate::domain::{Credentials, set_cookie_name};

/// Outcome of gating one request on a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Forward,
    /// Forward, and hand these `Set-Cookie` values back to the caller unchanged.
    ForwardWithRotatedCredentials {
        set_cookies: Vec<String>,
    },
    /// Redirect to the login entry point.
    Deny {
        reason: DenyReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoCredentials,
    MissingRefreshToken,
    RefreshRejected,
    RefreshFailed,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoCredentials => "no_credentials",
            DenyReason::MissingRefreshToken => "missing_refresh_token",
            DenyReason::RefreshRejected => "refresh_rejected",
            DenyReason::RefreshFailed => "refresh_failed",
        }
    }
}

/// Keeps requests authenticated across an access-token expiry.
///
/// A request carrying only a refresh token triggers exactly one identity check
/// upstream; every failure mode of that check denies the request.
pub struct SessionGuard {
    identity_client: Arc<dyn IdentityClient>,
}

impl SessionGuard {
    pub fn new(identity_client: Arc<dyn IdentityClient>) -> Self {
        Self { identity_client }
    }

    pub async fn evaluate(&self, credentials: &Credentials) -> GuardDecision {
        let refresh_token = match (&credentials.access_token, &credentials.refresh_token) {
            (Some(_), Some(_)) => return GuardDecision::Forward,
            (None, None) => return deny(DenyReason::NoCredentials),
            (Some(_), None) => return deny(DenyReason::MissingRefreshToken),
            (None, Some(refresh_token)) => refresh_token,
        };

        match self.identity_client.refresh_session(refresh_token).await {
            Ok(SessionRefresh::Accepted { set_cookies }) => {
                let rotated: Vec<&str> = set_cookies.iter().map(|c| set_cookie_name(c)).collect();
                tracing::debug!(cookies = ?rotated, "Session refreshed");
                GuardDecision::ForwardWithRotatedCredentials { set_cookies }
            }
            Ok(SessionRefresh::Rejected) => deny(DenyReason::RefreshRejected),
            Err(e) => {
                tracing::warn!(error = %e, "Identity check failed, denying request");
                deny(DenyReason::RefreshFailed)
            }
        }
    }
}

fn deny(reason: DenyReason) -> GuardDecision {
    GuardDecision::Deny { reason }
}
