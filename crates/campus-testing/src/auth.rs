//! Mock caller helpers for integration tests.
//!
//! Services validate the `Authorization: Bearer <jwt>` header themselves. In tests,
//! `MockCaller` signs a token with the test secret so no identity platform is needed.

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use uuid::Uuid;

use campus_auth_types::token::issue_access_token;
use campus_domain::id::UserId;

/// Secret shared by the mock caller and the service under test.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// A synthetic caller identified only by user id; its role lives in the role table.
pub struct MockCaller {
    pub user_id: UserId,
}

impl MockCaller {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn random() -> Self {
        Self::new(UserId(Uuid::new_v4()))
    }

    /// A valid access token signed with [`TEST_JWT_SECRET`].
    pub fn token(&self) -> String {
        issue_access_token(self.user_id.0, TEST_JWT_SECRET, 3600)
    }

    /// Return headers as the admin UI would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token())).unwrap(),
        );
        map
    }
}
