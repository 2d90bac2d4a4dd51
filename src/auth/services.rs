use tracing::{info, warn};

use crate::{
    auth::{dto::LoginResponse, jwt::JwtKeys, password},
    error::{AppError, AppResult},
    users::{repo_types::User, services::UserService},
};

/// Credential checks and token issuance on top of [`UserService`].
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: UserService, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    /// Unknown email and wrong password both come back as `None`.
    pub async fn validate_credentials(&self, email: &str, password: &str) -> AppResult<Option<User>> {
        let Some(record) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };

        if password::verify(password.to_owned(), record.password_hash.clone()).await? {
            Ok(Some(record.into()))
        } else {
            Ok(None)
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        let Some(user) = self.validate_credentials(email, password).await? else {
            warn!("login failed");
            return Err(AppError::Unauthorized("invalid email or password".into()));
        };

        let access_token = self.keys.issue(user.id, &user.email)?;
        info!(user_id = %user.id, email = %user.email, "user logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer",
            expires_in: self.keys.ttl.as_secs(),
            user,
        })
    }

    pub async fn register(&self, email: &str, password: &str, name: Option<&str>) -> AppResult<User> {
        self.users.create(email, password, name).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::JwtConfig, users::memory::MemoryUserStore};

    fn service() -> (AuthService, JwtKeys) {
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "test-secret".into(),
            issuer: "test".into(),
            audience: "test".into(),
            ttl_minutes: 60,
        });
        let users = UserService::new(Arc::new(MemoryUserStore::new()));
        (AuthService::new(users, keys.clone()), keys)
    }

    #[tokio::test]
    async fn register_then_login_issues_token_for_user() {
        let (auth, keys) = service();
        let user = auth
            .register("John.Doe@Example.com", "Password123!", Some("John"))
            .await
            .expect("register");

        let res = auth
            .login("john.doe@example.com", "Password123!")
            .await
            .expect("login");

        assert_eq!(res.user, user);
        assert_eq!(res.token_type, "Bearer");
        assert_eq!(res.expires_in, 3600);

        let claims = keys.verify(&res.access_token).expect("token verifies");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "john.doe@example.com");
    }

    #[tokio::test]
    async fn login_accepts_any_email_case() {
        let (auth, _) = service();
        auth.register("a@example.com", "Password123!", None).await.unwrap();
        assert!(auth.login("A@EXAMPLE.com", "Password123!").await.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let (auth, _) = service();
        auth.register("a@example.com", "Password123!", None).await.unwrap();

        let wrong_password = auth.login("a@example.com", "Wrong123456!").await.unwrap_err();
        let unknown_email = auth.login("b@example.com", "Password123!").await.unwrap_err();

        assert!(matches!(wrong_password, AppError::Unauthorized(_)));
        assert!(matches!(unknown_email, AppError::Unauthorized(_)));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn validate_credentials_returns_public_user() {
        let (auth, _) = service();
        let user = auth.register("a@example.com", "Password123!", None).await.unwrap();

        let found = auth.validate_credentials("a@example.com", "Password123!").await.unwrap();
        assert_eq!(found, Some(user));
        assert!(auth
            .validate_credentials("a@example.com", "nope-nope")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let (auth, _) = service();
        auth.register("a@example.com", "Password123!", None).await.unwrap();
        let err = auth
            .register("a@example.com", "Password123!", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
