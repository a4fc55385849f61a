//! User model, account forms and token claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::validation::{clean, FormErrors};
use crate::{error::FieldError, policy::Capability};

pub const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

/// User account from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
    pub capabilities: Vec<Capability>,
}

impl UserInfo {
    pub fn new(user: User, capabilities: Vec<Capability>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_superuser: user.is_superuser,
            capabilities,
        }
    }
}

/// Self-registration form
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SignUpForm {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub username: String,
    /// Enter your first name
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    /// Enter your last name
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    pub password1: String,
    pub password2: String,
}

impl SignUpForm {
    pub fn clean(&mut self) -> Vec<FieldError> {
        clean(&mut self.username);
        clean(&mut self.first_name);
        clean(&mut self.last_name);

        let mut errors = FormErrors::from_rules(self);
        errors.require("username", &self.username);
        errors.require("first_name", &self.first_name);
        errors.require("last_name", &self.last_name);
        if self.password1 != self.password2 {
            errors.push("password2", "The two password fields didn't match.");
        }
        errors.into_vec()
    }
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Where the client was headed before being sent to login
    pub next: Option<String>,
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub next: Option<String>,
    pub user: UserInfo,
}

/// Superuser form replacing the capabilities of an account
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(default)]
pub struct CapabilitiesForm {
    pub capabilities: Vec<Capability>,
    pub is_superuser: bool,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i64,
    pub is_superuser: bool,
    pub capabilities: Vec<Capability>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Superusers implicitly hold every capability
    pub fn has(&self, capability: Capability) -> bool {
        self.is_superuser || self.capabilities.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(capabilities: Vec<Capability>, is_superuser: bool) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "librarian".into(),
            user_id: 7,
            is_superuser,
            capabilities,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn token_round_trip() {
        let original = claims(vec![Capability::CanMarkReturned], false);
        let token = original.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 7);
        assert_eq!(parsed.capabilities, vec![Capability::CanMarkReturned]);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn superuser_has_everything() {
        let admin = claims(vec![], true);
        assert!(admin.has(Capability::DeleteGenre));

        let reader = claims(vec![Capability::AddBook], false);
        assert!(reader.has(Capability::AddBook));
        assert!(!reader.has(Capability::DeleteBook));
    }

    #[test]
    fn sign_up_passwords_must_match() {
        let mut form = SignUpForm {
            username: "reader".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            password1: "correct horse".into(),
            password2: "battery staple".into(),
        };
        let errors = form.clean();
        assert_eq!(errors, vec![FieldError::new("password2", "The two password fields didn't match.")]);
    }
}
