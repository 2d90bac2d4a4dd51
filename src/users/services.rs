use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::password,
    error::{AppError, AppResult},
    users::{
        repo::{StoreError, UserStore},
        repo_types::{NewUser, User, UserChanges, UserRecord},
    },
    validation::{self, ValidationErrors},
};

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("user with id {id} not found"))
}

/// User lifecycle operations over an injected store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, email: &str, password: &str, name: Option<&str>) -> AppResult<User> {
        let mut errors = ValidationErrors::new();
        let email = validation::email(email, &mut errors);
        validation::password("password", password, &mut errors);
        let name = validation::name(name, &mut errors);
        errors.into_result()?;

        let password_hash = password::hash(password.to_owned()).await?;

        let record = self
            .store
            .insert(NewUser {
                id: Uuid::new_v4(),
                email,
                password_hash,
                name,
            })
            .await
            .map_err(|e| {
                if matches!(e, StoreError::UniqueViolation) {
                    warn!("email already registered");
                }
                AppError::from(e)
            })?;

        info!(user_id = %record.id, email = %record.email, "user created");
        Ok(record.into())
    }

    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        let rows = self.store.list_all().await?;
        debug!(count = rows.len(), "users listed");
        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn find_one(&self, id: Uuid) -> AppResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .map(User::from)
            .ok_or_else(|| not_found(id))
    }

    pub async fn update(&self, id: Uuid, name: Option<&str>) -> AppResult<User> {
        let mut errors = ValidationErrors::new();
        let name = validation::name(name, &mut errors);
        errors.into_result()?;

        self.find_one(id).await?;

        let record = self
            .store
            .update(
                id,
                UserChanges {
                    name,
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(user_id = %id, "user updated");
        Ok(record.into())
    }

    pub async fn update_password(
        &self,
        id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<User> {
        let mut errors = ValidationErrors::new();
        validation::password("old_password", old_password, &mut errors);
        validation::password("new_password", new_password, &mut errors);
        errors.into_result()?;

        // full record: the public view has no hash to verify against
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        if !password::verify(old_password.to_owned(), current.password_hash).await? {
            warn!(user_id = %id, "password change with wrong current password");
            return Err(AppError::Unauthorized("invalid current password".into()));
        }

        if old_password == new_password {
            return Err(AppError::InvalidArgument(
                "new password must be different from the old one".into(),
            ));
        }

        let password_hash = password::hash(new_password.to_owned()).await?;
        let record = self
            .store
            .update(
                id,
                UserChanges {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(user_id = %id, "password updated");
        Ok(record.into())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<User> {
        self.find_one(id).await?;

        let record = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(user_id = %id, email = %record.email, "user deleted");
        Ok(record.into())
    }

    /// Full record lookup for credential checks. Absence is not an error.
    pub(crate) async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let email = validation::normalize_email(email);
        Ok(self.store.find_by_email(&email).await?)
    }
}
