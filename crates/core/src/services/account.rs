//! Account service: registration, credential checks and user lookup.

use serde::Deserialize;
use sea_orm::Set;
use tracing::info;
use tweeter_common::{AppError, AppResult, IdGenerator, hash_password, verify_password};
use tweeter_db::{
    entities::{user, user_profile},
    repositories::{UserProfileRepository, UserRepository},
};
use validator::{Validate, ValidateEmail, ValidationError};

/// Longest accepted username, in characters.
pub const USERNAME_MAX_CHARS: usize = 150;

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[serde(default)]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "validate_blank_or_email"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(min = 6, message = "Ensure this field has at least 6 characters."))]
    pub password: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("This field may not be blank.".into()));
    }
    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(ValidationError::new("max_length")
            .with_message("Ensure this field has no more than 150 characters.".into()));
    }
    let allowed = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !allowed {
        return Err(ValidationError::new("invalid").with_message(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .into(),
        ));
    }
    Ok(())
}

fn validate_blank_or_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || email.to_string().validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Enter a valid email address.".into()))
    }
}

/// Account service for business logic.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, profile_repo: UserProfileRepository) -> Self {
        Self {
            user_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a user and create their profile.
    pub async fn register(
        &self,
        input: RegisterInput,
    ) -> AppResult<(user::Model, user_profile::Model)> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::field("username", "Username already taken."));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            email: Set(input.email.map(|e| e.trim().to_string()).unwrap_or_default()),
            password: Set(password_hash),
            date_joined: Set(chrono::Utc::now().into()),
            last_login: Set(None),
        };

        // A concurrent registration can still win the unique index.
        let (user, profile) = self
            .user_repo
            .create_with_profile(model, self.id_gen.generate())
            .await
            .map_err(|e| match e {
                AppError::Conflict(msg) => AppError::field("username", msg),
                other => other,
            })?;

        info!(user_id = %user.id, username = %user.username, "Registered user");
        Ok((user, profile))
    }

    /// Check a username/password pair.
    ///
    /// Unknown usernames and wrong passwords yield the same
    /// [`AppError::Unauthorized`].
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        self.user_repo.touch_last_login(&user.id).await?;
        Ok(user)
    }

    /// Return the user's profile, creating it if missing.
    pub async fn ensure_profile(&self, user_id: &str) -> AppResult<user_profile::Model> {
        self.profile_repo
            .get_or_create(user_id, self.id_gen.generate())
            .await
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by exact username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }
}
