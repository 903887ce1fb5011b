//! Signup, login, logout and password changes.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::auth::{bearer_token, AuthConfig, PasswordHasher, TokenIssuer, TokenValidator};
use crate::error::{AuthError, Error, Result};
use crate::models::{to_storage_precision, RevokeOutcome, SignupRequest, User};
use crate::traits::UnitOfWork;
use crate::validation;

/// Account operations plus the token gate every protected request uses.
#[derive(Debug, Clone)]
pub struct AccountService {
    hasher: PasswordHasher,
    validator: TokenValidator,
}

impl AccountService {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            hasher: PasswordHasher::new(config.hash_params),
            validator: TokenValidator::new(TokenIssuer::new(config)?),
        })
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Register a new user.
    pub async fn signup(&self, uow: &mut dyn UnitOfWork, req: &SignupRequest) -> Result<User> {
        validation::required(&[&req.username, &req.email, &req.password])?;
        let username = validation::username(&req.username)?;
        let email = validation::email(&req.email)?;
        validation::password(&req.password)?;

        if uow.user_exists(&username, &email).await? {
            return Err(Error::Conflict(
                "Username or email already exists".to_string(),
            ));
        }

        let user = User {
            id: Uuid::now_v7(),
            username,
            email,
            password_hash: self.hasher.hash(&req.password).await?,
            created_at: to_storage_precision(Utc::now()),
        };
        uow.insert_user(&user).await?;

        info!(
            subsystem = "auth",
            op = "signup",
            user_id = %user.id,
            "User registered"
        );
        Ok(user)
    }

    /// Exchange credentials for a bearer token. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(
        &self,
        uow: &mut dyn UnitOfWork,
        email: &str,
        password: &str,
    ) -> Result<String> {
        validation::required(&[email, password])?;
        let email = validation::normalize_email(email);
        let user = uow
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.validator.issuer().issue(user.id)?;
        info!(subsystem = "auth", op = "login", user_id = %user.id, "User logged in");
        Ok(token)
    }

    /// Authenticate the header, then revoke its token.
    pub async fn logout(
        &self,
        uow: &mut dyn UnitOfWork,
        header: Option<&str>,
    ) -> Result<RevokeOutcome> {
        let user_id = self.validator.authenticate(&mut *uow, header).await?;
        let token = bearer_token(header)?;
        let outcome = uow.revoke(token, Utc::now()).await?;
        info!(
            subsystem = "auth",
            op = "logout",
            user_id = %user_id,
            outcome = ?outcome,
            "Token revoked"
        );
        Ok(outcome)
    }

    /// Replace a user's password after checking the old one.
    pub async fn change_password(
        &self,
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        validation::required(&[old_password, new_password])?;
        validation::password(new_password)?;

        let user = uow
            .find_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))?;

        if !self.hasher.verify(old_password, &user.password_hash).await? {
            return Err(AuthError::IncorrectPassword.into());
        }

        let password_hash = self.hasher.hash(new_password).await?;
        uow.update_password_hash(user_id, &password_hash).await?;

        info!(
            subsystem = "auth",
            op = "change_password",
            user_id = %user_id,
            "Password changed"
        );
        Ok(())
    }
}
