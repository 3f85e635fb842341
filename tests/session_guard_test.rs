mod helpers;

use std::sync::Arc;

use acacia_edge::application::services::{DenyReason, GuardDecision, SessionGuard};
use acacia_edge::domain::Credentials;

use helpers::{IdentityBehavior, MockIdentityClient};

fn guard_with(behavior: IdentityBehavior) -> (SessionGuard, Arc<MockIdentityClient>) {
    let identity = Arc::new(MockIdentityClient::new(behavior));
    (SessionGuard::new(identity.clone()), identity)
}

fn tokens(access: Option<&str>, refresh: Option<&str>) -> Credentials {
    Credentials::new(access.map(String::from), refresh.map(String::from))
}

#[tokio::test]
async fn given_both_tokens_when_evaluating_then_forwards_without_identity_call() {
    let (guard, identity) = guard_with(IdentityBehavior::Reject);

    let decision = guard.evaluate(&tokens(Some("a1"), Some("r1"))).await;

    assert_eq!(decision, GuardDecision::Forward);
    assert_eq!(identity.call_count(), 0);
}

#[tokio::test]
async fn given_empty_valued_token_cookies_when_evaluating_then_forwards() {
    let (guard, identity) = guard_with(IdentityBehavior::Reject);
    let credentials = Credentials::from_cookie_headers(["access-token=; refresh-token=r1"]);

    let decision = guard.evaluate(&credentials).await;

    assert_eq!(decision, GuardDecision::Forward);
    assert_eq!(identity.call_count(), 0);
}

#[tokio::test]
async fn given_no_tokens_when_evaluating_then_denies_without_identity_call() {
    let (guard, identity) = guard_with(IdentityBehavior::Accept(vec!["access-token=a2"]));

    let decision = guard.evaluate(&Credentials::default()).await;

    assert_eq!(
        decision,
        GuardDecision::Deny {
            reason: DenyReason::NoCredentials
        }
    );
    assert_eq!(identity.call_count(), 0);
}

#[tokio::test]
async fn given_access_token_only_when_evaluating_then_denies() {
    let (guard, identity) = guard_with(IdentityBehavior::Accept(vec!["access-token=a2"]));

    let decision = guard.evaluate(&tokens(Some("a1"), None)).await;

    assert_eq!(
        decision,
        GuardDecision::Deny {
            reason: DenyReason::MissingRefreshToken
        }
    );
    assert_eq!(identity.call_count(), 0);
}

#[tokio::test]
async fn given_refresh_token_only_and_identity_accepts_when_evaluating_then_forwards_rotated_cookies()
{
    let rotated = vec![
        "access-token=a2; Path=/; HttpOnly",
        "refresh-token=r2; Path=/; HttpOnly",
    ];
    let (guard, identity) = guard_with(IdentityBehavior::Accept(rotated.clone()));

    let decision = guard.evaluate(&tokens(None, Some("r1"))).await;

    assert_eq!(
        decision,
        GuardDecision::ForwardWithRotatedCredentials {
            set_cookies: rotated.into_iter().map(String::from).collect()
        }
    );
    assert_eq!(identity.call_count(), 1);
    assert_eq!(*identity.seen_tokens.lock().unwrap(), vec!["r1".to_string()]);
}

#[tokio::test]
async fn given_refresh_token_only_and_identity_rejects_when_evaluating_then_denies() {
    let (guard, identity) = guard_with(IdentityBehavior::Reject);

    let decision = guard.evaluate(&tokens(None, Some("expired"))).await;

    assert_eq!(
        decision,
        GuardDecision::Deny {
            reason: DenyReason::RefreshRejected
        }
    );
    assert_eq!(identity.call_count(), 1);
}

#[tokio::test]
async fn given_refresh_token_only_and_identity_unreachable_when_evaluating_then_fails_closed() {
    let (guard, identity) = guard_with(IdentityBehavior::Fail);

    let decision = guard.evaluate(&tokens(None, Some("r1"))).await;

    assert_eq!(
        decision,
        GuardDecision::Deny {
            reason: DenyReason::RefreshFailed
        }
    );
    assert_eq!(identity.call_count(), 1);
}

#[test]
fn given_cookie_header_when_parsing_credentials_then_reads_both_tokens() {
    let credentials =
        Credentials::from_cookie_headers(["theme=dark; access-token=a1", "refresh-token=r1"]);

    assert_eq!(credentials, tokens(Some("a1"), Some("r1")));
    assert_eq!(
        credentials.cookie_header().as_deref(),
        Some("access-token=a1; refresh-token=r1")
    );
}

#[test]
fn given_empty_cookie_values_when_parsing_credentials_then_tokens_are_present() {
    let credentials = Credentials::from_cookie_headers(["access-token=; refresh-token="]);

    assert_eq!(credentials, tokens(Some(""), Some("")));
    assert_eq!(
        credentials.cookie_header().as_deref(),
        Some("access-token=; refresh-token=")
    );
}

#[test]
fn given_no_session_cookies_when_parsing_credentials_then_tokens_are_absent() {
    let credentials = Credentials::from_cookie_headers(["theme=dark"]);

    assert_eq!(credentials, Credentials::default());
    assert_eq!(credentials.cookie_header(), None);
}

#[test]
fn given_set_cookie_clearing_a_token_when_rotating_then_token_is_dropped() {
    let credentials = tokens(Some("a1"), Some("r1"));

    let rotated = credentials.rotated(["access-token=; Path=/; Max-Age=0"]);

    assert_eq!(rotated, tokens(None, Some("r1")));
}

#[test]
fn given_set_cookie_values_when_rotating_then_only_session_tokens_change() {
    let credentials = tokens(None, Some("r1"));

    let rotated = credentials.rotated(["access-token=a2; Path=/; HttpOnly", "theme=light"]);

    assert_eq!(rotated, tokens(Some("a2"), Some("r1")));
}

#[test]
fn given_credentials_when_debug_formatting_then_token_values_are_hidden() {
    let formatted = format!("{:?}", tokens(Some("secret-access"), Some("secret-refresh")));

    assert!(!formatted.contains("secret-access"));
    assert!(!formatted.contains("secret-refresh"));
    assert!(formatted.contains("[REDACTED]"));
}
