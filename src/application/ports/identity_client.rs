use async_trait::async_trait;

/// Backend identity check used to mint a new access token from a refresh token.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    async fn refresh_session(&self, refresh_token: &str)
    -> Result<SessionRefresh, IdentityClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRefresh {
    /// The backend accepted the refresh token and issued these `Set-Cookie` values.
    Accepted { set_cookies: Vec<String> },
    /// The backend answered 401.
    Rejected,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityClientError {
    #[error("identity check failed: {0}")]
    Transport(String),
    #[error("identity check timed out")]
    Timeout,
    #[error("unexpected identity check status: {0}")]
    UnexpectedStatus(u16),
}
