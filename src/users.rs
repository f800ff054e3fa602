//! Registration and token login.

use crate::auth::TokenService;
use crate::credentials::{hash_password, verify_password};
use crate::error::ApiError;
use crate::models::{Credentials, TokenResponse, User};
use crate::repo::{Repo, RepoError, UserRepo};

fn validate(c: &Credentials) -> Result<(), ApiError> {
    if c.username.is_empty() || c.password.is_empty() {
        return Err(ApiError::invalid("invalid user information"));
    }
    Ok(())
}

/// Register a new user. Uniqueness is checked up front and enforced again by
/// the store, which settles concurrent registrations of the same name.
pub async fn register(repo: &dyn Repo, creds: Credentials) -> Result<User, ApiError> {
    validate(&creds)?;
    if repo.find_user_by_name(&creds.username).await?.is_some() {
        return Err(ApiError::invalid("username exists"));
    }
    let passhash = hash_password(&creds.password).map_err(|e| {
        log::error!("{e}");
        ApiError::invalid(e.to_string())
    })?;
    match repo.create_user(&creds.username, &passhash).await {
        Ok(user) => {
            log::info!("registered user {} ({})", user.id, user.username);
            Ok(user)
        }
        Err(RepoError::Conflict) => Err(ApiError::invalid("username exists")),
        Err(e) => Err(e.into()),
    }
}

/// Exchange a username and password for a signed token.
pub async fn login(
    repo: &dyn Repo,
    tokens: &TokenService,
    creds: Credentials,
) -> Result<TokenResponse, ApiError> {
    validate(&creds)?;
    let record = repo
        .find_user_by_name(&creds.username)
        .await?
        .ok_or_else(|| ApiError::invalid("no such user"))?;
    if !verify_password(&creds.password, &record.passhash) {
        log::warn!("wrong password for user {}", record.id);
        return Err(ApiError::invalid("wrong password"));
    }
    let token = tokens.issue(record.id)?;
    Ok(TokenResponse { id: record.id, username: record.username, token })
}
