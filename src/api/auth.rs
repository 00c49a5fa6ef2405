//! `/auth/*` endpoints

use tracing::debug;

use crate::error::ApiResult;

use super::ApiClient;
use super::types::{AuthResponse, LoginRequest, RegisterRequest, User};

impl ApiClient {
    /// Exchange credentials for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let auth: AuthResponse = self.post("/auth/login", &request).await?;
        debug!("logged in as {}", auth.user.email);
        Ok(auth)
    }

    /// Create an account; the backend logs the new user in directly
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<AuthResponse> {
        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        self.post("/auth/register", &request).await
    }

    /// Invalidate the token server-side
    pub async fn logout(&self) -> ApiResult<()> {
        self.require_token()?;
        self.post_empty("/auth/logout").await
    }

    /// Profile of the token's owner
    pub async fn me(&self) -> ApiResult<User> {
        self.require_token()?;
        self.get("/auth/me").await
    }
}
