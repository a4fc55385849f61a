//! Accounts service: sign-up, authentication and capability grants

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        user::{CapabilitiesForm, LoginResponse, SignUpForm, User, UserClaims, UserInfo, DUPLICATE_USERNAME},
        validation::FormErrors,
    },
    policy::Capability,
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a reader account. New accounts hold no capability.
    pub async fn sign_up(&self, mut form: SignUpForm) -> AppResult<UserInfo> {
        let mut errors = FormErrors::from(form.clean());
        if !form.username.is_empty() && self.repository.users.username_exists(&form.username).await? {
            errors.push("username", DUPLICATE_USERNAME);
        }
        errors.into_result()?;

        let hash = self.hash_password(&form.password1)?;
        let user = self
            .repository
            .users
            .create(&form.username, &form.first_name, &form.last_name, &hash, false)
            .await?;
        tracing::info!("Registered user {} ({})", user.id, user.username);

        Ok(UserInfo::new(user, Vec::new()))
    }

    /// Check credentials and issue a bearer token carrying the user's capabilities
    pub async fn authenticate(&self, username: &str, password: &str, next: Option<String>) -> AppResult<LoginResponse> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            tracing::warn!("Failed login for {}", username);
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let capabilities = self.repository.users.capabilities(user.id).await?;
        let now = Utc::now();
        let expires_in = Duration::hours(self.config.jwt_expiration_hours as i64);
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_superuser: user.is_superuser,
            capabilities: capabilities.clone(),
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
        };
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!("User {} logged in", user.id);
        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: expires_in.num_seconds(),
            next,
            user: UserInfo::new(user, capabilities),
        })
    }

    pub async fn get_info(&self, user_id: i64) -> AppResult<UserInfo> {
        let user = self.repository.users.get_by_id(user_id).await?;
        let capabilities = self.repository.users.capabilities(user_id).await?;
        Ok(UserInfo::new(user, capabilities))
    }

    /// Replace a user's grants. Tokens already issued keep their claims until they expire.
    pub async fn set_capabilities(&self, user_id: i64, form: CapabilitiesForm) -> AppResult<UserInfo> {
        let mut capabilities: Vec<Capability> = form.capabilities;
        capabilities.sort_by_key(|c| c.codename());
        capabilities.dedup();

        self.repository
            .users
            .set_capabilities(user_id, &capabilities, form.is_superuser)
            .await?;
        tracing::info!(
            "Capabilities of user {} set to [{}] (superuser: {})",
            user_id,
            capabilities.iter().map(|c| c.codename()).collect::<Vec<_>>().join(", "),
            form.is_superuser
        );
        self.get_info(user_id).await
    }

    /// Create the configured superuser if no account of that name exists yet
    pub async fn ensure_superuser(&self) -> AppResult<()> {
        let Some((username, password)) = self.config.admin_credentials() else {
            return Ok(());
        };

        if self.repository.users.username_exists(username).await? {
            return Ok(());
        }

        let hash = self.hash_password(password)?;
        let user = self.repository.users.create(username, "", "", &hash, true).await?;
        tracing::info!("Created superuser {} ({})", user.id, user.username);
        Ok(())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
