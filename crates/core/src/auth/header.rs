//! Trusted-header authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

const MAX_USER_ID_LEN: usize = 128;

/// Authenticator that trusts a user id set by the fronting layer.
///
/// The presentation layer in front of this service performs the actual
/// login flow and forwards the authenticated user id in a header
/// (default `x-user-id`). This service never sees credentials.
pub struct HeaderAuthenticator {
    header_name: String,
}

impl HeaderAuthenticator {
    pub fn new(header_name: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into().to_lowercase(),
        }
    }
}

#[async_trait]
impl Authenticator for HeaderAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let raw = request
            .headers
            .get(&self.header_name)
            .ok_or(AuthError::NotAuthenticated)?;

        let user_id = raw.trim();
        if user_id.is_empty() {
            return Err(AuthError::NotAuthenticated);
        }
        if user_id.len() > MAX_USER_ID_LEN || user_id.chars().any(|c| c.is_control()) {
            return Err(AuthError::InvalidCredentials(
                "Malformed user id header".to_string(),
            ));
        }

        Ok(Identity {
            user_id: user_id.to_string(),
            method: "header".to_string(),
        })
    }

    fn method_name(&self) -> &'static str {
        "header"
    }
}
