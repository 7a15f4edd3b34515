// Credential Provider Port
// Resolves and validates the code-hosting token handed to the template script

use async_trait::async_trait;

/// Credential provider trait
///
/// Implementations:
/// - GithubCredentials: env/config tokens, `gh auth token`, identity endpoint
/// - StaticCredentials: fixed answers for tests
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Resolve a token through the precedence chain.
    ///
    /// `None` is a hard precondition failure for any token-consuming command.
    async fn resolve_token(&self) -> Option<String>;

    /// Single authenticated call to the provider's identity endpoint.
    ///
    /// Any transport error or non-success status yields `false`.
    async fn verify(&self, token: &str) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed token and verification verdict
    pub struct StaticCredentials {
        token: Option<String>,
        valid: bool,
        verify_calls: AtomicUsize,
    }

    impl StaticCredentials {
        pub fn valid(token: impl Into<String>) -> Self {
            Self {
                token: Some(token.into()),
                valid: true,
                verify_calls: AtomicUsize::new(0),
            }
        }

        pub fn rejected(token: impl Into<String>) -> Self {
            Self {
                token: Some(token.into()),
                valid: false,
                verify_calls: AtomicUsize::new(0),
            }
        }

        pub fn missing() -> Self {
            Self {
                token: None,
                valid: false,
                verify_calls: AtomicUsize::new(0),
            }
        }

        pub fn verify_calls(&self) -> usize {
            self.verify_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialProvider for StaticCredentials {
        async fn resolve_token(&self) -> Option<String> {
            self.token.clone()
        }

        async fn verify(&self, token: &str) -> bool {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            self.valid && self.token.as_deref() == Some(token)
        }
    }
}
